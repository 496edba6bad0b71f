use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use config::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Environment variable naming an extra config file to layer on top.
pub const CONFIG_ENV_VAR: &str = "KHATA_CONFIG";
const ENV_PREFIX: &str = "KHATA";

/// Runtime knobs, loaded from `khata.toml` and `KHATA_*` variables.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite file backing everything.
    pub db_path: PathBuf,
    /// Balance floor for the low-balance dashboard list.
    pub low_balance_threshold: Decimal,
    /// Offset applied to UTC when deriving "today" for boards and
    /// dashboards. Default +06:00.
    pub utc_offset_minutes: i32,
    pub busy_timeout_ms: u64,
    /// Widened lock wait for the attendance batch.
    pub batch_busy_timeout_ms: u64,
    /// Email acted as when `--actor` is not passed.
    pub actor: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("khata.db"),
            low_balance_threshold: Decimal::from(200),
            utc_offset_minutes: 360,
            busy_timeout_ms: 5_000,
            batch_busy_timeout_ms: 30_000,
            actor: None,
        }
    }
}

impl Settings {
    /// Layered load: `khata.toml` in the working directory, then the file
    /// named by `KHATA_CONFIG`, then an explicit `--config` path, then
    /// `KHATA_*` environment overrides. Later sources win.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::with_name("khata").required(false));
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::from(PathBuf::from(env_path)));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("loading configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Today in the organization's local day, not the UTC one; kitchens
    /// east of Greenwich flip their boards before UTC midnight.
    pub fn today(&self) -> NaiveDate {
        (Utc::now() + Duration::minutes(i64::from(self.utc_offset_minutes))).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.db_path, PathBuf::from("khata.db"));
        assert_eq!(settings.low_balance_threshold, Decimal::from(200));
        assert_eq!(settings.utc_offset_minutes, 360);
        assert_eq!(settings.batch_busy_timeout_ms, 30_000);
        assert!(settings.actor.is_none());
    }

    #[test]
    fn settings_roundtrip_through_toml() {
        let rendered = toml::to_string_pretty(&Settings::default()).unwrap();
        let parsed: Settings = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.utc_offset_minutes, 360);
        assert_eq!(parsed.low_balance_threshold, Decimal::from(200));
    }
}
