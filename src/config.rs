//! Configuration loaded from a TOML file.
//!
//! ```toml
//! [table]
//! size = 11
//! hashing = "simple"
//! collision = "double-hashing"
//!
//! [logging]
//! level = "info"
//! ```

use crate::hashing::{CollisionResolution, HashingStrategy, Substitution};
use crate::table::{
    DEFAULT_LOAD_FACTOR_WARNING, MAX_TABLE_SIZE, TableOptions, UniversalRegeneration,
};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Table construction parameters
    #[serde(default)]
    pub table: TableConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Table construction parameters.
///
/// Strategy names are resolved leniently: an unknown name falls back to the
/// default strategy with a warning instead of rejecting the file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    /// Requested capacity
    #[serde(default = "default_size")]
    pub size: usize,

    /// Hashing strategy: "simple" or "universal"
    #[serde(default = "default_hashing")]
    pub hashing: String,

    /// Collision resolution: "chaining", "linear-probing", or "double-hashing"
    #[serde(default = "default_collision")]
    pub collision: String,

    /// When universal parameters are regenerated: "on-strategy-change" or "on-resize"
    #[serde(default)]
    pub universal_regeneration: UniversalRegeneration,

    /// Load factor at which open addressing inserts recommend a resize
    #[serde(default = "default_load_factor_warning")]
    pub load_factor_warning: f64,

    /// Fixed seed for universal parameters (random if unset)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            hashing: default_hashing(),
            collision: default_collision(),
            universal_regeneration: UniversalRegeneration::default(),
            load_factor_warning: default_load_factor_warning(),
            seed: None,
        }
    }
}

impl TableConfig {
    /// Resolve into table options, reporting any substituted defaults.
    pub fn options(&self) -> (TableOptions, Vec<Substitution>) {
        let (hashing, h) = HashingStrategy::parse_lenient(&self.hashing);
        let (collision, c) = CollisionResolution::parse_lenient(&self.collision);

        let mut options = TableOptions::new()
            .with_size(self.size)
            .with_hashing(hashing)
            .with_collision(collision)
            .with_universal_regeneration(self.universal_regeneration)
            .with_load_factor_warning(self.load_factor_warning);
        if let Some(seed) = self.seed {
            options = options.with_seed(seed);
        }

        (options, h.into_iter().chain(c).collect())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
    /// Single-line output
    Compact,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level ("error", "warn", "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Include timestamps
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Include module target
    #[serde(default = "default_true")]
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            timestamps: true,
            target: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.table.size > MAX_TABLE_SIZE {
            return Err(format!(
                "table size ({}) must be at most {}",
                self.table.size, MAX_TABLE_SIZE
            )
            .into());
        }

        let threshold = self.table.load_factor_warning;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(format!(
                "load_factor_warning ({}) must be in (0, 1]",
                threshold
            )
            .into());
        }

        Ok(())
    }
}

// Default value functions

fn default_size() -> usize {
    11
}

fn default_hashing() -> String {
    "simple".to_string()
}

fn default_collision() -> String {
    "chaining".to_string()
}

fn default_load_factor_warning() -> f64 {
    DEFAULT_LOAD_FACTOR_WARNING
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
