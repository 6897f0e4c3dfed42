use std::path::Path;

use crate::error::ConfigError;
use crate::game::COLS;

/// Column ordering: center-first for better alpha-beta pruning.
pub const DEFAULT_MOVE_ORDER: [usize; COLS] = [3, 2, 4, 1, 5, 0, 6];

/// Settings shared by every engine.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default search depth in plies, used by the binaries.
    pub depth: u32,
    /// Order in which columns are tried at every node. Ties between equally
    /// scored moves go to the one earliest in this list.
    pub move_order: [usize; COLS],
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: 4,
            move_order: DEFAULT_MOVE_ORDER,
        }
    }
}

/// Settings for the parallel alpha-beta engine.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Plies expanded breadth-first before work is handed to threads.
    pub seed_depth: u32,
    /// Below this, the serial engine is used instead.
    pub min_seed_depth: u32,
    /// Worker thread count; hardware parallelism when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Fixed seed for the seed-board shuffle; OS entropy when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        ParallelConfig {
            seed_depth: 2,
            min_seed_depth: 2,
            workers: None,
            shuffle_seed: None,
        }
    }
}

impl ParallelConfig {
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub parallel: ParallelConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.depth == 0 {
            return Err(ConfigError::Validation(
                "search.depth must be >= 1".into(),
            ));
        }

        let mut seen = [false; COLS];
        for &col in &self.search.move_order {
            if col >= COLS || seen[col] {
                return Err(ConfigError::Validation(format!(
                    "search.move_order must be a permutation of 0..{COLS}, got {:?}",
                    self.search.move_order
                )));
            }
            seen[col] = true;
        }

        if self.parallel.seed_depth == 0 {
            return Err(ConfigError::Validation(
                "parallel.seed_depth must be >= 1".into(),
            ));
        }
        if self.parallel.min_seed_depth == 0 {
            return Err(ConfigError::Validation(
                "parallel.min_seed_depth must be >= 1".into(),
            ));
        }
        if self.parallel.workers == Some(0) {
            return Err(ConfigError::Validation(
                "parallel.workers must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
