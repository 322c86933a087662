//! Occurrence highlighting configuration
//!
//! Stores user preferences in `~/.config/mark-occurrences/occurrences.yaml`

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How a multi-character selection picks its symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSelection {
    /// Resolve the identifier at the selection start
    #[default]
    Start,
    /// Only highlight when the whole selection lies inside one identifier
    Enclosing,
}

/// Occurrence highlighting configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Background workers running highlight jobs (at least one)
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    #[serde(default)]
    pub range_selection: RangeSelection,

    /// Reject results of jobs scheduled before the last committed one
    #[serde(default = "default_discard_superseded")]
    pub discard_superseded: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_worker_threads() -> usize {
    2
}

fn default_discard_superseded() -> bool {
    true
}

impl Default for OccurrenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            worker_threads: default_worker_threads(),
            range_selection: RangeSelection::default(),
            discard_superseded: default_discard_superseded(),
        }
    }
}

impl OccurrenceConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<Self>(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config.normalized()
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    fn normalized(mut self) -> Self {
        if self.worker_threads == 0 {
            tracing::warn!("worker_threads must be at least 1, using 1");
            self.worker_threads = 1;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OccurrenceConfig::default();
        assert!(config.enabled);
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.range_selection, RangeSelection::Start);
        assert!(config.discard_superseded);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: OccurrenceConfig =
            serde_yaml::from_str("range_selection: enclosing\n").unwrap();
        assert_eq!(config.range_selection, RangeSelection::Enclosing);
        assert!(config.enabled);
        assert_eq!(config.worker_threads, 2);
    }

    #[test]
    fn test_zero_workers_is_normalized() {
        let config = OccurrenceConfig {
            worker_threads: 0,
            ..Default::default()
        };
        assert_eq!(config.normalized().worker_threads, 1);
    }
}
