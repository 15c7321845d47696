use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::SyncError;

/// One `owner/repo` pair from the `repos` config array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
}

impl FromStr for RepoTarget {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(SyncError::ConfigError {
                message: format!("Invalid repository format: {} (expected owner/repo)", s),
            }),
        }
    }
}

impl fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl<'de> Deserialize<'de> for RepoTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Three-state config field: the JSON key being absent means "leave the remote
/// field alone", `null` or `""` means "clear it", anything else means "set it".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[default]
    Unset,
    Clear,
    Set(String),
}

impl FieldValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, FieldValue::Unset)
    }

    /// The value this field would leave on the remote record, given what is
    /// there now. `Unset` keeps the current value, `Clear` removes it.
    pub fn applied_to<'a>(&'a self, current: Option<&'a str>) -> Option<&'a str> {
        match self {
            FieldValue::Unset => current,
            FieldValue::Clear => None,
            FieldValue::Set(v) => Some(v),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // An absent key never reaches this point; `#[serde(default)]` on the
        // struct field yields `Unset` for it.
        Ok(match Option::<String>::deserialize(deserializer)? {
            None => FieldValue::Clear,
            Some(s) if s.is_empty() => FieldValue::Clear,
            Some(s) => FieldValue::Set(s),
        })
    }
}

/// One desired milestone definition from the `milestones` config array.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MilestoneConfig {
    pub name: Option<String>,

    #[serde(rename = "referenceMilestoneUrl")]
    pub reference_milestone_url: Option<String>,

    #[serde(rename = "existingNameToRename")]
    pub existing_name_to_rename: Option<String>,

    #[serde(default)]
    pub description: FieldValue,

    #[serde(default, rename = "dueDate")]
    pub due_date: FieldValue,
}

/// Ground-truth milestone record as returned by the remote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMilestone {
    pub number: u64,
    pub title: String,
    pub description: Option<String>,
    pub due_on: Option<String>,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Dry-run verbs: the decision was made but no call was issued.
    Create,
    Update,
    /// Past-tense verbs: the mutating call succeeded.
    Created,
    Updated,
}

impl ReconcileAction {
    pub fn is_create(&self) -> bool {
        matches!(self, ReconcileAction::Create | ReconcileAction::Created)
    }

    pub fn is_update(&self) -> bool {
        matches!(self, ReconcileAction::Update | ReconcileAction::Updated)
    }
}

/// Outcome of reconciling one (repository, milestone spec) pair. Constructed
/// by the engine, immutable afterwards; the report renderer only reads these.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub repo: RepoTarget,
    pub action: Option<ReconcileAction>,
    pub milestone_number: Option<u64>,
    pub milestone_url: Option<String>,
    pub name: Option<String>,
    pub error: Option<String>,
    pub previous_name: Option<String>,
    pub previous_description: Option<String>,
    pub previous_due_date: Option<String>,
    pub new_name: Option<String>,
    pub new_description: FieldValue,
    pub new_due_date: FieldValue,
}

impl ReconcileOutcome {
    pub fn new(repo: RepoTarget) -> Self {
        Self {
            repo,
            action: None,
            milestone_number: None,
            milestone_url: None,
            name: None,
            error: None,
            previous_name: None,
            previous_description: None,
            previous_due_date: None,
            new_name: None,
            new_description: FieldValue::Unset,
            new_due_date: FieldValue::Unset,
        }
    }
}
