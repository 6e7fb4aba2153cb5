//! Agent configuration, stored as TOML.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fuzzy::{DefuzzificationKind, FuzzyBundle};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read agent config: {path}")]
    #[diagnostic(
        code(akh::bdi::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write agent config: {path}")]
    #[diagnostic(
        code(akh::bdi::config::write),
        help("Check that the directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse agent config: {path}")]
    #[diagnostic(
        code(akh::bdi::config::parse),
        help("The file is not valid TOML for an agent config: {message}")
    )]
    Parse { path: String, message: String },

    #[error("invalid agent config: {message}")]
    #[diagnostic(
        code(akh::bdi::config::invalid),
        help("Fix the named field; see `AgentConfig::default()` for sane values.")
    )]
    Invalid { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// AgentConfig
// ---------------------------------------------------------------------------

/// Runtime settings of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    /// Strategy reducing fuzzy results to a decision.
    pub defuzzification: DefuzzificationKind,
    /// Decision for an empty result sequence.
    pub default_decision: f64,
    /// Try plan and rule candidates concurrently.
    pub parallel_candidates: bool,
    /// Worker pool size; rayon's default when unset.
    pub worker_threads: Option<usize>,
    /// Bound on nested immediate dispatch.
    pub max_dispatch_depth: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "agent".to_string(),
            defuzzification: DefuzzificationKind::CenterOfGravity,
            default_decision: 0.0,
            parallel_candidates: false,
            worker_threads: None,
            max_dispatch_depth: 64,
        }
    }
}

impl AgentConfig {
    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Fuzzy bundle for this configuration.
    pub fn fuzzy(&self) -> FuzzyBundle {
        FuzzyBundle::from_kind(self.defuzzification, self.default_decision)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.default_decision) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "default_decision must lie in [0, 1], got {}",
                    self.default_decision
                ),
            });
        }
        if self.worker_threads == Some(0) {
            return Err(ConfigError::Invalid {
                message: "worker_threads must be at least 1".to_string(),
            });
        }
        if self.max_dispatch_depth == 0 {
            return Err(ConfigError::Invalid {
                message: "max_dispatch_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &std::path::Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &std::path::Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config = AgentConfig::from_toml_str(
            r#"
            name = "scout"
            defuzzification = "first-of-maxima"
            "#,
        )
        .unwrap();
        assert_eq!(config.name, "scout");
        assert_eq!(config.defuzzification, DefuzzificationKind::FirstOfMaxima);
        assert_eq!(config.max_dispatch_depth, 64);
        assert!(!config.parallel_candidates);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = AgentConfig::from_toml_str("default_decision = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        let err = AgentConfig::from_toml_str("worker_threads = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        let err = AgentConfig::from_toml_str("name = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("agent.toml");
        let config = AgentConfig {
            worker_threads: Some(2),
            parallel_candidates: true,
            ..AgentConfig::with_name("saved")
        };
        config.save(&path).unwrap();
        assert_eq!(AgentConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AgentConfig::load(std::path::Path::new("/nonexistent/agent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
