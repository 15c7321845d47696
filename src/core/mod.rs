pub mod engine;
pub mod matcher;
pub mod report;
pub mod resolve;

pub use crate::domain::model::{
    FieldValue, MilestoneConfig, ReconcileAction, ReconcileOutcome, RemoteMilestone, RepoTarget,
};
pub use crate::domain::ports::MilestoneHost;
pub use crate::utils::error::Result;
