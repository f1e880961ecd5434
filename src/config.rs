//! Service configuration
//!
//! Loaded from YAML; every key is optional and falls back to its default.
//!
//! ```yaml
//! damping_factor: 0.85
//! iterations: 20
//! engine: parallel   # array | map | parallel
//! workers: 4
//! queue_capacity: 100
//! write_property: pagerank
//! ```

use graphrank_algorithms::{PageRankConfig, PoolConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Engine variant the service runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Serial, dense index with array storage
    Array,
    /// Serial, native ids with map storage; no index is built
    Map,
    /// Partitioned across a worker pool, array storage
    Parallel,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EngineKind::Array => "array",
            EngineKind::Map => "map",
            EngineKind::Parallel => "parallel",
        })
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "array" => Ok(EngineKind::Array),
            "map" => Ok(EngineKind::Map),
            "parallel" => Ok(EngineKind::Parallel),
            other => Err(ConfigError::Invalid(format!("unknown engine '{}'", other))),
        }
    }
}

/// PageRank service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub damping_factor: f64,
    /// Iterations per run
    pub iterations: usize,
    pub engine: EngineKind,
    /// Worker threads (parallel engine only)
    pub workers: usize,
    /// Maximum partition tasks per fork-join batch (parallel engine only)
    pub queue_capacity: usize,
    /// Node property the ranks are written to
    pub write_property: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let pool = PoolConfig::default();
        Self {
            damping_factor: PageRankConfig::default().damping_factor,
            iterations: 20,
            engine: EngineKind::Parallel,
            workers: pool.workers,
            queue_capacity: pool.queue_capacity,
            write_property: "pagerank".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.pagerank_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        // One partition task per worker is submitted each iteration
        if self.queue_capacity < self.workers {
            return Err(ConfigError::Invalid(format!(
                "queue_capacity ({}) must be at least workers ({})",
                self.queue_capacity, self.workers
            )));
        }
        if self.write_property.is_empty() {
            return Err(ConfigError::Invalid("write_property must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn pagerank_config(&self) -> PageRankConfig {
        PageRankConfig {
            damping_factor: self.damping_factor,
        }
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers: self.workers,
            queue_capacity: self.queue_capacity,
        }
    }
}
