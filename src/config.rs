//! Configuration for recommender selection.
//!
//! Loaded from an explicit path, `.recsel.yml` or `~/.config/recsel/recsel.yml`.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project-local configuration file name.
pub const PROJECT_CONFIG_FILE: &str = ".recsel.yml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Train/test split used during evaluation.
    pub split: SplitConfig,

    /// Evaluation limits.
    pub evaluation: EvaluationConfig,

    /// Worker pool settings.
    pub scheduler: SchedulerConfig,

    /// Event publishing settings.
    pub events: EventsConfig,
}

impl SelectionConfig {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .recsel.yml in current directory
    /// 3. ~/.config/recsel/recsel.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(PROJECT_CONFIG_FILE);
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from {}", PROJECT_CONFIG_FILE);
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load {}: {}", PROJECT_CONFIG_FILE, e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("recsel").join("recsel.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.split.held_out_ratio > 0.0 && self.split.held_out_ratio < 1.0) {
            eyre::bail!("split.held-out-ratio must be in (0, 1)");
        }
        if self.split.increment == 0 {
            eyre::bail!("split.increment must be > 0");
        }
        if self.evaluation.timeout_ms == 0 {
            eyre::bail!("evaluation.timeout-ms must be > 0");
        }
        if self.scheduler.max_workers == 0 {
            eyre::bail!("scheduler.max-workers must be > 0");
        }
        if self.scheduler.event_capacity == 0 || self.events.capacity == 0 {
            eyre::bail!("channel capacities must be > 0");
        }
        Ok(())
    }
}

/// Train/test split settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Share of every block of units held out for testing.
    #[serde(rename = "held-out-ratio")]
    pub held_out_ratio: f64,

    /// Block size; also the minimum number of units required to evaluate.
    pub increment: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            held_out_ratio: 0.2,
            increment: 10,
        }
    }
}

/// Evaluation limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Deadline for a single recommender evaluation in milliseconds.
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl EvaluationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 300_000, // 5 minutes
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Tasks allowed to run at the same time.
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// Capacity of the task event channel.
    #[serde(rename = "event-capacity")]
    pub event_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            event_capacity: 100,
        }
    }
}

/// Event publishing settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Capacity of the recommender event channel.
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SelectionConfig::default();
        assert_eq!(config.split.held_out_ratio, 0.2);
        assert_eq!(config.split.increment, 10);
        assert_eq!(config.evaluation.timeout(), Duration::from_secs(300));
        assert_eq!(config.scheduler.max_workers, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("recsel.yml");
        fs::write(
            &path,
            "split:\n  held-out-ratio: 0.25\n  increment: 4\nscheduler:\n  max-workers: 2\n",
        )
        .unwrap();

        let config = SelectionConfig::load(Some(&path)).unwrap();
        assert_eq!(config.split.held_out_ratio, 0.25);
        assert_eq!(config.split.increment, 4);
        assert_eq!(config.scheduler.max_workers, 2);
        // untouched sections keep their defaults
        assert_eq!(config.evaluation.timeout_ms, 300_000);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.yml");
        assert!(SelectionConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("recsel.yml");
        fs::write(&path, "split:\n  held-out-ratio: 1.5\n").unwrap();
        assert!(SelectionConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_validate_zero_workers() {
        let mut config = SelectionConfig::default();
        config.scheduler.max_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_round_trip_uses_kebab_keys() {
        let yaml = serde_yaml::to_string(&SelectionConfig::default()).unwrap();
        assert!(yaml.contains("held-out-ratio"));
        assert!(yaml.contains("timeout-ms"));
    }
}
