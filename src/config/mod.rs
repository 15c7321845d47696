pub mod cli;
pub mod jsonc;
pub mod schema;

pub use cli::CliConfig;

use crate::domain::model::{MilestoneConfig, RepoTarget};
use crate::utils::error::{Result, SyncError};
use serde::Deserialize;
use std::fs;

/// Parsed and schema-validated milestones configuration. Repos and milestones
/// keep their config order; the work set is the full cross-product, repos
/// outer, so runs are deterministic.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub repos: Vec<RepoTarget>,
    pub milestones: Vec<MilestoneConfig>,
}

impl SyncConfig {
    pub fn load(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| SyncError::ConfigError {
            message: format!("Cannot read configuration file {}: {}", path, e),
        })?;
        Self::parse(&raw)
    }

    /// Comment-strip, parse, schema-validate, then deserialize. A schema
    /// violation aborts before anything is deserialized.
    pub fn parse(raw: &str) -> Result<Self> {
        let stripped = jsonc::strip_comments(raw);
        let value: serde_json::Value = serde_json::from_str(&stripped)?;
        schema::validate(&value)?;
        let config: SyncConfig = serde_json::from_value(value)?;
        Ok(config)
    }
}
