//! Runtime configuration loaded from the environment.
//!
//! # Responsibility
//! - Resolve database path, logging settings, and the map fallback point.
//! - Report malformed values as errors instead of panicking.
//!
//! # Invariants
//! - Missing keys fall back to documented defaults.
//! - Loading never logs; the resolved values are logged through
//!   `log_resolved` once the logger is running.
//! - `default_location` always passes `GeoPoint::validate()`.

use crate::logging::default_log_level;
use crate::model::household::GeoPoint;
use crate::model::validation::ValidationError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_KEY: &str = "BARANGAY_DB_PATH";
pub const LOG_LEVEL_KEY: &str = "BARANGAY_LOG_LEVEL";
pub const LOG_DIR_KEY: &str = "BARANGAY_LOG_DIR";
pub const DEFAULT_LAT_KEY: &str = "BARANGAY_DEFAULT_LAT";
pub const DEFAULT_LNG_KEY: &str = "BARANGAY_DEFAULT_LNG";

const DEFAULT_DB_PATH: &str = "barangay.sqlite3";

/// Map center used when a household has no picked location.
pub const FALLBACK_LOCATION: GeoPoint = GeoPoint::new(17.65, 120.85);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key} value `{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Rolling log directory. File logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub default_location: GeoPoint,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_location: FALLBACK_LOCATION,
        }
    }
}

impl CoreConfig {
    /// Loads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_KEY).map_or(defaults.db_path, PathBuf::from);

        let log_level = read(LOG_LEVEL_KEY).unwrap_or(defaults.log_level);
        let log_dir = read(LOG_DIR_KEY).map(PathBuf::from);

        let latitude = parse_coordinate(
            DEFAULT_LAT_KEY,
            read(DEFAULT_LAT_KEY),
            defaults.default_location.latitude,
        )?;
        let longitude = parse_coordinate(
            DEFAULT_LNG_KEY,
            read(DEFAULT_LNG_KEY),
            defaults.default_location.longitude,
        )?;
        let default_location = GeoPoint::new(latitude, longitude);
        default_location.validate().map_err(|err| {
            let key = match err {
                ValidationError::LatitudeOutOfRange(_) => DEFAULT_LAT_KEY,
                _ => DEFAULT_LNG_KEY,
            };
            ConfigError::InvalidValue {
                key,
                value: format!("{latitude},{longitude}"),
                reason: err.to_string(),
            }
        })?;

        Ok(Self {
            db_path,
            log_level,
            log_dir,
            default_location,
        })
    }

    /// Names of settings still equal to their built-in default.
    pub fn defaulted_fields(&self) -> Vec<&'static str> {
        let defaults = Self::default();
        let mut fields = Vec::new();
        if self.db_path == defaults.db_path {
            fields.push("db_path");
        }
        if self.log_level == defaults.log_level {
            fields.push("log_level");
        }
        if self.log_dir.is_none() {
            fields.push("log_dir");
        }
        if self.default_location == defaults.default_location {
            fields.push("default_location");
        }
        fields
    }

    /// Emits one `config_resolved` line. Call after logging is initialized.
    pub fn log_resolved(&self) {
        let defaulted = self.defaulted_fields();
        info!(
            "event=config_resolved module=config db_path={} log_level={} default_lat={} default_lng={} defaulted={}",
            self.db_path.display(),
            self.log_level,
            self.default_location.latitude,
            self.default_location.longitude,
            if defaulted.is_empty() {
                "none".to_string()
            } else {
                defaulted.join(",")
            }
        );
    }
}

fn parse_coordinate(
    key: &'static str,
    value: Option<String>,
    default: f64,
) -> Result<f64, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    value
        .parse::<f64>()
        .map_err(|err| ConfigError::InvalidValue {
            key,
            value: value.clone(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, CoreConfig, DB_PATH_KEY, DEFAULT_LAT_KEY, FALLBACK_LOCATION, LOG_DIR_KEY,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.default_location, FALLBACK_LOCATION);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[
            (DB_PATH_KEY, "/var/lib/barangay/records.db"),
            (DEFAULT_LAT_KEY, " 14.5995 "),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/barangay/records.db"));
        assert_eq!(config.default_location.latitude, 14.5995);
        assert_eq!(
            config.default_location.longitude,
            FALLBACK_LOCATION.longitude
        );
    }

    #[test]
    fn defaulted_fields_name_settings_left_unset() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(
            config.defaulted_fields(),
            vec!["db_path", "log_level", "log_dir", "default_location"]
        );

        let config = CoreConfig::from_lookup(lookup(&[
            (DB_PATH_KEY, "/srv/records.db"),
            (LOG_DIR_KEY, "/var/log/barangay"),
        ]))
        .unwrap();
        assert_eq!(config.defaulted_fields(), vec!["log_level", "default_location"]);
    }

    #[test]
    fn malformed_and_out_of_range_coordinates_are_rejected() {
        let err = CoreConfig::from_lookup(lookup(&[(DEFAULT_LAT_KEY, "north")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: DEFAULT_LAT_KEY,
                ..
            }
        ));

        let err = CoreConfig::from_lookup(lookup(&[(DEFAULT_LAT_KEY, "123.0")])).unwrap_err();
        assert!(err.to_string().contains("latitude out of range"));
    }
}
