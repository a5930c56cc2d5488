use anyhow::{Context, Result};
use storage::services::pairing::{ClassGroups, DEFAULT_MAX_RATING_GAP, PairingOptions};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub pairing_max_rating_gap: i32,
    pub pairing_class_groups: ClassGroups,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let pairing_max_rating_gap = match std::env::var("PAIRING_MAX_RATING_GAP") {
            Ok(gap) => gap
                .parse()
                .context("PAIRING_MAX_RATING_GAP must be a number")?,
            Err(_) => DEFAULT_MAX_RATING_GAP,
        };

        let pairing_class_groups = std::env::var("PAIRING_CLASS_GROUPS")
            .unwrap_or_default()
            .parse()
            .context("PAIRING_CLASS_GROUPS must look like 'group=ClassA,ClassB;other=ClassC'")?;

        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("PORT must be a number")?
                .parse()?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            pairing_max_rating_gap,
            pairing_class_groups,
        })
    }

    /// Pairing defaults; each request still decides whether classes are
    /// kept apart.
    pub fn pairing_options(&self) -> PairingOptions {
        PairingOptions {
            separate_classes: false,
            max_rating_gap: self.pairing_max_rating_gap,
            class_groups: self.pairing_class_groups.clone(),
        }
    }
}
