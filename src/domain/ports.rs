use crate::domain::model::{FieldValue, RemoteMilestone, RepoTarget};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Remote milestone store. `get_milestone` returns `Ok(None)` when the
/// milestone is confirmed absent; transport failures stay `Err` so callers can
/// tell "not there" from "could not look".
#[async_trait]
pub trait MilestoneHost: Send + Sync {
    async fn list_milestones(&self, repo: &RepoTarget) -> Result<Vec<RemoteMilestone>>;

    async fn get_milestone(
        &self,
        repo: &RepoTarget,
        number: u64,
    ) -> Result<Option<RemoteMilestone>>;

    async fn create_milestone(
        &self,
        repo: &RepoTarget,
        title: &str,
        description: Option<&str>,
        due_on: Option<&str>,
    ) -> Result<RemoteMilestone>;

    /// `title` is only sent when a rename is required. `Unset` fields must be
    /// omitted from the request entirely; `Clear` sends the API's clearing form.
    async fn update_milestone(
        &self,
        repo: &RepoTarget,
        number: u64,
        title: Option<&str>,
        description: &FieldValue,
        due_on: &FieldValue,
    ) -> Result<RemoteMilestone>;

    /// Public web URL for a milestone on this host.
    fn milestone_web_url(&self, repo: &RepoTarget, number: u64) -> String {
        format!("https://github.com/{}/milestone/{}", repo, number)
    }
}
