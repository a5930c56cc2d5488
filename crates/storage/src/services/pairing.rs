//! Weekly board pairings.
//!
//! The engine is a single greedy pass over the field in seed order: each
//! player with history takes the first eligible opponent below them and both
//! leave the pool. There is no backtracking, so a pairing taken early can
//! leave later players without an opponent even when a full matching exists;
//! those players are left for the director to pair by hand.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::pairing::{PairingEntry, PairingRequest, PairingResponse};
use crate::error::{Result, StorageError};
use crate::models::{Board, Color, Player};
use crate::services::history;
use crate::store::{ClubStore, seed_order};

pub const DEFAULT_MAX_RATING_GAP: i32 = 20;

/// Group shared by every player when classes are not kept apart.
const COMBINED_GROUP: &str = "all";

/// Group for players with no lesson class.
const UNASSIGNED_GROUP: &str = "unassigned";

/// Named groups of lesson classes that play each other when classes are kept
/// separate. Written `group=ClassA,ClassB;other=ClassC`. A class not listed
/// anywhere is a group of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassGroups {
    by_class: HashMap<String, String>,
}

impl ClassGroups {
    pub fn group_for(&self, class_name: Option<&str>) -> String {
        match class_name {
            Some(name) => self
                .by_class
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string()),
            None => UNASSIGNED_GROUP.to_string(),
        }
    }
}

impl FromStr for ClassGroups {
    type Err = StorageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut by_class = HashMap::new();

        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (group, classes) = entry.split_once('=').ok_or_else(|| {
                StorageError::InvalidSubmission(format!("class group '{}' has no '='", entry))
            })?;

            let group = group.trim();
            if group.is_empty() {
                return Err(StorageError::InvalidSubmission(format!(
                    "class group '{}' has no name",
                    entry
                )));
            }

            for class in classes.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                by_class.insert(class.to_string(), group.to_string());
            }
        }

        Ok(Self { by_class })
    }
}

#[derive(Debug, Clone)]
pub struct PairingOptions {
    pub separate_classes: bool,
    pub max_rating_gap: i32,
    pub class_groups: ClassGroups,
}

impl Default for PairingOptions {
    fn default() -> Self {
        Self {
            separate_classes: false,
            max_rating_gap: DEFAULT_MAX_RATING_GAP,
            class_groups: ClassGroups::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub white: Uuid,
    pub black: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingOutcome {
    pub pairings: Vec<Pairing>,
    /// Players left without an opponent, in seed order.
    pub unpaired: Vec<Uuid>,
}

/// Pairs `players`, which must already be in seed order.
///
/// `class_names` maps lesson class ids to names; `last_colors` holds each
/// player's color in their game against `opponent_one`. Volunteers, former
/// members and closed versions are dropped before pairing and do not appear
/// in the outcome at all.
pub fn pair_players(
    players: &[Player],
    class_names: &HashMap<Uuid, String>,
    last_colors: &HashMap<Uuid, Color>,
    options: &PairingOptions,
) -> PairingOutcome {
    let field: Vec<&Player> = players
        .iter()
        .filter(|p| p.is_competitor() && p.version.is_active)
        .collect();

    let group_of = |player: &Player| -> String {
        if !options.separate_classes {
            return COMBINED_GROUP.to_string();
        }
        let class_name = player
            .lesson_class_id
            .and_then(|id| class_names.get(&id))
            .map(String::as_str);
        options.class_groups.group_for(class_name)
    };
    let groups: HashMap<Uuid, String> = field.iter().map(|p| (p.player_id, group_of(*p))).collect();

    let mut taken: HashSet<Uuid> = HashSet::new();
    let mut pairings = Vec::new();

    for player in &field {
        if taken.contains(&player.player_id) {
            continue;
        }

        if player.opponent_one.is_none() {
            debug!("{} has no game history, leaving unpaired", player.display_name());
            continue;
        }

        let candidate = field.iter().find(|candidate| {
            candidate.player_id != player.player_id
                && !taken.contains(&candidate.player_id)
                && groups.get(&candidate.player_id) == groups.get(&player.player_id)
                && (player.rating - candidate.rating).abs() <= options.max_rating_gap
                && !player.has_recently_played(candidate.player_id)
                && !candidate.has_recently_played(player.player_id)
        });

        let Some(candidate) = candidate else {
            debug!("No eligible opponent for {}", player.display_name());
            continue;
        };

        let pairing = assign_colors(player, candidate, last_colors);
        taken.insert(player.player_id);
        taken.insert(candidate.player_id);
        pairings.push(pairing);
    }

    let unpaired = field
        .iter()
        .filter(|p| !taken.contains(&p.player_id))
        .map(|p| p.player_id)
        .collect();

    PairingOutcome { pairings, unpaired }
}

/// Colors for `player` against the `candidate` found further down the field.
///
/// When both last colors are known and equal, or neither is known, the lower
/// rated player takes white (the candidate on equal ratings). Otherwise
/// colors alternate: whoever had white last gets black now.
fn assign_colors(player: &Player, candidate: &Player, last_colors: &HashMap<Uuid, Color>) -> Pairing {
    let by_rating = || {
        if player.rating < candidate.rating {
            Pairing { white: player.player_id, black: candidate.player_id }
        } else {
            Pairing { white: candidate.player_id, black: player.player_id }
        }
    };
    let player_white = || Pairing { white: player.player_id, black: candidate.player_id };
    let candidate_white = || Pairing { white: candidate.player_id, black: player.player_id };

    match (
        last_colors.get(&player.player_id),
        last_colors.get(&candidate.player_id),
    ) {
        (Some(p), Some(c)) if p == c => by_rating(),
        (Some(Color::White), _) | (None, Some(Color::Black)) => candidate_white(),
        (Some(Color::Black), _) | (None, Some(Color::White)) => player_white(),
        (None, None) => by_rating(),
    }
}

/// Proposes pairings for the current roster.
///
/// When the request names a date, players already seated on an active game
/// that day are left out. When it names a board letter, pairings are
/// numbered onto boards of that letter starting at 1.
pub async fn propose_pairings<S: ClubStore + ?Sized>(
    store: &S,
    request: &PairingRequest,
    base: &PairingOptions,
) -> Result<PairingResponse> {
    let options = PairingOptions {
        separate_classes: request.separate_classes,
        ..base.clone()
    };

    let mut players = store.active_players().await?;
    players.sort_by(seed_order);

    if let Some(date) = request.date {
        let seated: HashSet<Uuid> = store
            .active_games_on(date)
            .await?
            .iter()
            .flat_map(|g| [g.white, g.black])
            .flatten()
            .collect();
        players.retain(|p| !seated.contains(&p.player_id));
    }

    let class_names: HashMap<Uuid, String> = store
        .lesson_classes()
        .await?
        .into_iter()
        .map(|c| (c.class_id, c.name))
        .collect();

    let field: Vec<Player> = players.into_iter().filter(Player::is_competitor).collect();
    let last_colors = history::last_colors(store, &field).await?;

    let outcome = pair_players(&field, &class_names, &last_colors, &options);

    let names: HashMap<Uuid, String> = field
        .iter()
        .map(|p| (p.player_id, p.display_name()))
        .collect();
    let name_of = |id: &Uuid| names.get(id).cloned().unwrap_or_default();

    let letter = request.board_letter();
    let mut entries = Vec::with_capacity(outcome.pairings.len());
    for (idx, pairing) in outcome.pairings.iter().enumerate() {
        let board = match letter {
            Some(letter) => {
                let number = u16::try_from(idx + 1).map_err(|_| {
                    StorageError::InvalidSubmission("too many boards for one letter".to_string())
                })?;
                Some(Board::new(letter, number)?.to_string())
            }
            None => None,
        };

        entries.push(PairingEntry {
            white_id: pairing.white,
            white: name_of(&pairing.white),
            black_id: pairing.black,
            black: name_of(&pairing.black),
            board,
        });
    }

    info!(
        "Proposed {} pairing(s), {} player(s) left unpaired",
        entries.len(),
        outcome.unpaired.len()
    );

    Ok(PairingResponse {
        pairings: entries,
        unpaired: outcome.unpaired.iter().map(name_of).collect(),
    })
}
