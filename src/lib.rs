pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::github::GithubClient;
pub use config::{CliConfig, SyncConfig};
pub use core::engine::ReconcileEngine;
pub use utils::error::{Result, SyncError};
