//! GitHub REST implementation of the milestone host port.

use crate::domain::model::{FieldValue, RemoteMilestone, RepoTarget};
use crate::domain::ports::MilestoneHost;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use std::time::Duration;

const PER_PAGE: usize = 100;

pub struct GithubClient {
    client: Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("token {}", token)).map_err(|_| {
                SyncError::ConfigError {
                    message: "Token contains characters not usable in a header".to_string(),
                }
            })?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let client = Client::builder()
            .user_agent(concat!("milestone-sync/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn milestones_url(&self, repo: &RepoTarget) -> String {
        format!("{}/repos/{}/milestones", self.base_url, repo)
    }

    /// Sends a request; on a quota-exhausted 403 sleeps until the advertised
    /// reset and retries once.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let retry = request.try_clone();
        let response = request.send().await?;

        if response.status() == StatusCode::FORBIDDEN && rate_limit_exhausted(&response) {
            if let Some(retry) = retry {
                let wait = rate_limit_wait(&response);
                tracing::warn!(
                    "Rate limit exceeded. Waiting {}s before retrying...",
                    wait.as_secs()
                );
                tokio::time::sleep(wait).await;
                return Ok(retry.send().await?);
            }
        }
        Ok(response)
    }

    /// Turns non-success responses into `RemoteError`, pulling GitHub's JSON
    /// `message` field out of the body when it is there.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message")?.as_str().map(String::from))
            .unwrap_or(body);
        Err(SyncError::RemoteError {
            status: status.as_u16(),
            message,
        })
    }
}

fn rate_limit_exhausted(response: &Response) -> bool {
    response
        .headers()
        .get("X-RateLimit-Remaining")
        .and_then(|v| v.to_str().ok())
        == Some("0")
}

fn rate_limit_wait(response: &Response) -> Duration {
    let reset = response
        .headers()
        .get("X-RateLimit-Reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0);
    seconds_until(reset, chrono::Utc::now().timestamp())
}

fn seconds_until(reset: i64, now: i64) -> Duration {
    Duration::from_secs((reset - now + 5).max(0) as u64)
}

#[async_trait]
impl MilestoneHost for GithubClient {
    async fn list_milestones(&self, repo: &RepoTarget) -> Result<Vec<RemoteMilestone>> {
        let url = self.milestones_url(repo);
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let request = self.client.get(&url).query(&[
                ("state", "all".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ]);
            let response = Self::check(self.send(request).await?).await?;
            let milestones: Vec<RemoteMilestone> = response.json().await?;

            let last_page = milestones.len() < PER_PAGE;
            all.extend(milestones);
            if last_page {
                break;
            }
            page += 1;
        }

        tracing::debug!("Listed {} milestone(s) in {}", all.len(), repo);
        Ok(all)
    }

    async fn get_milestone(
        &self,
        repo: &RepoTarget,
        number: u64,
    ) -> Result<Option<RemoteMilestone>> {
        let url = format!("{}/{}", self.milestones_url(repo), number);
        let response = self.send(self.client.get(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(response).await?;
        Ok(Some(response.json().await?))
    }

    async fn create_milestone(
        &self,
        repo: &RepoTarget,
        title: &str,
        description: Option<&str>,
        due_on: Option<&str>,
    ) -> Result<RemoteMilestone> {
        let mut body = serde_json::Map::new();
        body.insert("title".to_string(), json!(title));
        if let Some(description) = description {
            body.insert("description".to_string(), json!(description));
        }
        if let Some(due_on) = due_on {
            body.insert("due_on".to_string(), json!(due_on));
        }

        let request = self
            .client
            .post(self.milestones_url(repo))
            .json(&serde_json::Value::Object(body));
        let response = Self::check(self.send(request).await?).await?;
        Ok(response.json().await?)
    }

    async fn update_milestone(
        &self,
        repo: &RepoTarget,
        number: u64,
        title: Option<&str>,
        description: &FieldValue,
        due_on: &FieldValue,
    ) -> Result<RemoteMilestone> {
        let mut body = serde_json::Map::new();
        if let Some(title) = title {
            body.insert("title".to_string(), json!(title));
        }
        // Unset keys stay out of the patch entirely. The API's clearing forms
        // differ per field: empty string for description, null for due_on.
        match description {
            FieldValue::Unset => {}
            FieldValue::Clear => {
                body.insert("description".to_string(), json!(""));
            }
            FieldValue::Set(v) => {
                body.insert("description".to_string(), json!(v));
            }
        }
        match due_on {
            FieldValue::Unset => {}
            FieldValue::Clear => {
                body.insert("due_on".to_string(), serde_json::Value::Null);
            }
            FieldValue::Set(v) => {
                body.insert("due_on".to_string(), json!(v));
            }
        }

        let url = format!("{}/{}", self.milestones_url(repo), number);
        let request = self
            .client
            .patch(&url)
            .json(&serde_json::Value::Object(body));
        let response = Self::check(self.send(request).await?).await?;
        Ok(response.json().await?)
    }

    fn milestone_web_url(&self, repo: &RepoTarget, number: u64) -> String {
        // api.github.com serves the web UI from github.com; GitHub Enterprise
        // serves the API under /api/v3 on the web host.
        let web_base = self
            .base_url
            .replace("https://api.github.com", "https://github.com");
        let web_base = web_base.trim_end_matches("/api/v3");
        format!("{}/{}/milestone/{}", web_base, repo, number)
    }
}
