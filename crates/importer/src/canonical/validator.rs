use super::models::{FORMAT_VERSION, PlayerRecord, RosterFile, RoundFile};
use crate::{ImporterError, Result};
use std::collections::HashSet;
use storage::dto::round::RoundSubmission;
use storage::services::rating::RATING_FLOOR;
use storage::services::settlement;
use tracing::warn;

pub struct CanonicalValidator;

impl CanonicalValidator {
    pub fn validate_roster(roster: &RosterFile) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();
        check_version(&roster.format_version, &mut report);

        let mut names = HashSet::new();
        for (section, records) in [("volunteers", &roster.volunteers), ("players", &roster.players)] {
            for (idx, record) in records.iter().enumerate() {
                check_player(section, idx, record, &mut report);

                if !names.insert(record.label()) {
                    report.warnings.push(format!(
                        "'{}' is listed more than once; the last entry wins",
                        record.label()
                    ));
                }
            }
        }

        let mut class_names = HashSet::new();
        for class in &roster.classes {
            if class.name.trim().is_empty() {
                report.errors.push("Class name cannot be empty".to_string());
            }
            if class.teacher.trim().is_empty() {
                report
                    .errors
                    .push(format!("Class '{}' has no teacher", class.name));
            }
            if !class_names.insert(class.name.trim()) {
                report
                    .errors
                    .push(format!("Duplicate class name: '{}'", class.name));
            }
        }

        if roster.volunteers.is_empty() && roster.classes.is_empty() && roster.players.is_empty() {
            report.warnings.push("Roster is empty".to_string());
        }

        report.into_result()
    }

    /// Round files go through the same board, name and result parsing as a
    /// settlement request.
    pub fn validate_round(round: &RoundFile) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();
        check_version(&round.format_version, &mut report);

        if round.week_number.is_some_and(|week| !(1..=53).contains(&week)) {
            report.errors.push(format!(
                "Invalid week_number {:?}. Must be 1-53",
                round.week_number
            ));
        }

        let submission = RoundSubmission::from(round.clone());
        match settlement::parse_boards(&submission) {
            Ok(boards) => {
                for board in boards {
                    if board.white.is_none() || board.black.is_none() {
                        report
                            .warnings
                            .push(format!("Board {} has an empty seat", board.board));
                    }
                    if !board.result.is_decided() {
                        report
                            .warnings
                            .push(format!("Board {} has no result yet", board.board));
                    }
                }
            }
            Err(e) => report.errors.push(e.to_string()),
        }

        if round.boards.is_empty() {
            report.warnings.push(format!(
                "Round for {} has no boards; every game on file for that date will be closed",
                round.date
            ));
        }

        report.into_result()
    }
}

fn check_version(format_version: &str, report: &mut ValidationReport) {
    if format_version != FORMAT_VERSION {
        report.errors.push(format!(
            "Unsupported format version: {}. Expected {}",
            format_version, FORMAT_VERSION
        ));
    }
}

fn check_player(section: &str, idx: usize, record: &PlayerRecord, report: &mut ValidationReport) {
    let label = format!("{} #{} ({})", section, idx + 1, record.label());

    if record.first_name.trim().is_empty() {
        report.errors.push(format!("{} has empty first_name", label));
    }
    if record.last_name.trim().is_empty() {
        report.errors.push(format!("{} has empty last_name", label));
    }
    if record.first_name.contains(',') || record.last_name.contains(',') {
        report
            .errors
            .push(format!("{} has a comma in the name", label));
    }

    if let Some(rating) = record.rating
        && rating < RATING_FLOOR
    {
        report.warnings.push(format!(
            "{} has rating {}, raised to {}",
            label, rating, RATING_FLOOR
        ));
    }
    if record.grade.is_some_and(|grade| !(0..=12).contains(&grade)) {
        report
            .errors
            .push(format!("{} has invalid grade {:?}", label, record.grade));
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }

    fn into_result(self) -> Result<Self> {
        if !self.errors.is_empty() {
            Err(ImporterError::ValidationError(format!(
                "Validation failed with {} error(s): {}",
                self.errors.len(),
                self.errors.join("; ")
            )))
        } else {
            Ok(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(json: &str) -> RosterFile {
        serde_json::from_str(json).unwrap()
    }

    fn round(json: &str) -> RoundFile {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_roster_with_warnings() {
        let report = CanonicalValidator::validate_roster(&roster(
            r#"{
                "format_version": "1.0.0",
                "volunteers": [{"first_name": "Anna", "last_name": "Coach"}],
                "classes": [{"name": "Knights", "teacher": "Anna"}],
                "players": [
                    {"first_name": "Judit", "last_name": "Polgar", "rating": 50, "lesson_class": "Anna"},
                    {"first_name": "Judit", "last_name": "Polgar", "grade": 3}
                ]
            }"#,
        ))
        .unwrap();

        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_invalid_roster() {
        let err = CanonicalValidator::validate_roster(&roster(
            r#"{
                "format_version": "0.9",
                "classes": [
                    {"name": "Knights", "teacher": ""},
                    {"name": "Knights", "teacher": "Anna"}
                ],
                "players": [{"first_name": "", "last_name": "Polgar", "grade": 15}]
            }"#,
        ))
        .unwrap_err();

        match err {
            ImporterError::ValidationError(msg) => assert!(msg.contains("5 error(s)"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_round_validation() {
        let report = CanonicalValidator::validate_round(&round(
            r#"{
                "format_version": "1.0.0",
                "date": "2024-10-07",
                "boards": [
                    {"board": "G-1", "white": "Tal, Mikhail", "black": "Petrosian, Tigran", "result": "W"},
                    {"board": "2G", "white": "Smyslov, Vasily", "black": null, "result": null}
                ]
            }"#,
        ))
        .unwrap();
        assert_eq!(report.warnings.len(), 2);

        assert!(
            CanonicalValidator::validate_round(&round(
                r#"{
                    "format_version": "1.0.0",
                    "date": "2024-10-07",
                    "boards": [
                        {"board": "G-1", "white": null, "black": null, "result": null},
                        {"board": "g1", "white": null, "black": null, "result": null}
                    ]
                }"#,
            ))
            .is_err()
        );
    }
}
