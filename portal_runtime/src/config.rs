//! Portal configuration.
//!
//! Defaults, then an optional `portal.toml`, then `PORTAL__*` environment
//! overrides. The result is validated before use.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directory_store::metrics::{GRADE_SCALE_MAX, WEAK_SUBJECT_THRESHOLD};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    pub weak_subject_threshold: f64,
    /// Top of the grading scale. Bounds the weak-subject threshold and
    /// caps the suggested target average.
    pub grade_scale_max: f64,
    pub upcoming_events_limit: usize,
    pub recent_messages_limit: usize,
    pub tutor_reply_delay_ms: u64,
    /// JSON dataset to seed from; the built-in mock data when unset.
    pub dataset_path: Option<PathBuf>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            weak_subject_threshold: WEAK_SUBJECT_THRESHOLD,
            grade_scale_max: GRADE_SCALE_MAX,
            upcoming_events_limit: 3,
            recent_messages_limit: 3,
            tutor_reply_delay_ms: 2000,
            dataset_path: None,
        }
    }
}

impl PortalConfig {
    /// Load from `path`, or from `portal.toml` in the working directory
    /// when no path is given. An explicit path must exist; the default
    /// file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `PORTAL__<FIELD>` overrides from `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("PORTAL__WEAK_SUBJECT_THRESHOLD") {
            self.weak_subject_threshold = parse_env("weak_subject_threshold", &v)?;
        }
        if let Some(v) = lookup("PORTAL__GRADE_SCALE_MAX") {
            self.grade_scale_max = parse_env("grade_scale_max", &v)?;
        }
        if let Some(v) = lookup("PORTAL__UPCOMING_EVENTS_LIMIT") {
            self.upcoming_events_limit = parse_env("upcoming_events_limit", &v)?;
        }
        if let Some(v) = lookup("PORTAL__RECENT_MESSAGES_LIMIT") {
            self.recent_messages_limit = parse_env("recent_messages_limit", &v)?;
        }
        if let Some(v) = lookup("PORTAL__TUTOR_REPLY_DELAY_MS") {
            self.tutor_reply_delay_ms = parse_env("tutor_reply_delay_ms", &v)?;
        }
        if let Some(v) = lookup("PORTAL__DATASET_PATH") {
            let v = v.trim();
            self.dataset_path = if v.is_empty() { None } else { Some(PathBuf::from(v)) };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grade_scale_max > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "grade_scale_max",
                reason: format!("{} must be positive", self.grade_scale_max),
            });
        }
        if !(self.weak_subject_threshold > 0.0 && self.weak_subject_threshold <= self.grade_scale_max)
        {
            return Err(ConfigError::InvalidValue {
                key: "weak_subject_threshold",
                reason: format!(
                    "{} must lie in (0, {}]",
                    self.weak_subject_threshold, self.grade_scale_max
                ),
            });
        }
        if self.upcoming_events_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "upcoming_events_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.recent_messages_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "recent_messages_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: format!("{raw:?}: {e}"),
        })
}
