use crate::toonbase::Clock;
use crate::toonbase::catalog;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: catalog::Source,
    pub database: Option<PathBuf>,
    /// Pins "today" for release countdowns.
    pub reference_date: Option<NaiveDate>,
    pub utc_offset_hours: i32,
}

impl Config {
    /// Loads the configuration file, if any, and applies the environment
    /// overrides on top of it.
    pub async fn load() -> Result<Self, anywho::Error> {
        let path = config_path();

        let config = if fs::try_exists(&path).await? {
            log::info!("Loading configuration: {}", path.display());

            Self::parse(&fs::read_to_string(&path).await?)?
        } else {
            Self::default()
        };

        config.override_with(|name| env::var(name).ok())
    }

    pub fn parse(config: &str) -> Result<Self, anywho::Error> {
        Ok(ron::from_str(config)?)
    }

    fn override_with(
        mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, anywho::Error> {
        if let Some(source) = var("MANTA_CATALOG") {
            self.catalog = catalog::Source::parse(&source);
        }

        if let Some(database) = var("MANTA_DATABASE") {
            self.database = Some(PathBuf::from(database));
        }

        if let Some(date) = var("MANTA_REFERENCE_DATE") {
            self.reference_date = Some(NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")?);
        }

        Ok(self)
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| data_dir().join("db.sqlite3"))
    }

    pub fn clock(&self) -> Clock {
        let Some(offset) = Clock::offset(self.utc_offset_hours) else {
            log::warn!(
                "Invalid UTC offset {}h, using the default one",
                self.utc_offset_hours
            );

            return Clock::default();
        };

        match self.reference_date {
            Some(date) => Clock::pinned(date, offset),
            None => Clock::system(offset),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: catalog::Source::Bundled,
            database: None,
            reference_date: None,
            utc_offset_hours: Clock::DEFAULT_OFFSET_HOURS,
        }
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_default()
        .join(env!("CARGO_PKG_NAME"))
        .join("config.ron")
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_default()
        .join(env!("CARGO_PKG_NAME"))
}
