//! Work-tracking integration used by the work-item capability.
//!
//! The contract is narrow: a title and description go in, a stable
//! human-viewable URL for the new item comes out.

use std::time::Duration;

use async_trait::async_trait;
use huddle_core::config::WorkTrackerConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

#[async_trait]
pub trait WorkTracker: Send + Sync {
    /// Create one work item and return its browser URL.
    async fn create_work_item(&self, title: &str, description: &str)
        -> Result<String, ActionError>;
}

/// Azure DevOps style REST tracker (JSON-patch create, basic auth with a
/// personal access token).
pub struct HttpWorkTracker {
    client: Client,
    base_url: String,
    project: String,
    work_item_type: String,
    access_token: Option<String>,
}

impl HttpWorkTracker {
    pub fn from_config(config: &WorkTrackerConfig) -> Result<Self, ActionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ActionError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project: config.project.clone(),
            work_item_type: config.work_item_type.clone(),
            access_token: config.resolve_access_token(),
        })
    }

    fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.project.is_empty() && self.access_token.is_some()
    }

    fn create_url(&self) -> String {
        format!(
            "{}/{}/_apis/wit/workitems/${}?api-version=7.0",
            self.base_url, self.project, self.work_item_type
        )
    }
}

/// Browser URL of work item `id`.
pub fn browse_url(base_url: &str, project: &str, id: u64) -> String {
    format!(
        "{}/{}/_workitems/edit/{}",
        base_url.trim_end_matches('/'),
        project,
        id
    )
}

#[derive(Debug, Serialize)]
struct PatchOperation<'a> {
    op: &'static str,
    path: &'static str,
    value: &'a str,
}

fn create_patch<'a>(title: &'a str, description: &'a str) -> Vec<PatchOperation<'a>> {
    vec![
        PatchOperation {
            op: "add",
            path: "/fields/System.Title",
            value: title,
        },
        PatchOperation {
            op: "add",
            path: "/fields/System.Description",
            value: description,
        },
    ]
}

#[derive(Deserialize)]
struct CreatedWorkItem {
    id: u64,
}

#[async_trait]
impl WorkTracker for HttpWorkTracker {
    async fn create_work_item(
        &self,
        title: &str,
        description: &str,
    ) -> Result<String, ActionError> {
        if !self.is_configured() {
            return Err(ActionError::DownstreamUnavailable(
                "work tracker is not configured".to_string(),
            ));
        }

        let body = serde_json::to_vec(&create_patch(title, description))
            .map_err(|e| ActionError::InvalidParameters(e.to_string()))?;

        let response = self
            .client
            .post(self.create_url())
            .basic_auth("", self.access_token.as_deref())
            .header(reqwest::header::CONTENT_TYPE, "application/json-patch+json")
            .body(body)
            .send()
            .await
            .map_err(|e| ActionError::DownstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ActionError::DownstreamUnavailable(format!(
                "work tracker returned {}",
                status
            )));
        }

        let created: CreatedWorkItem = response
            .json()
            .await
            .map_err(|e| ActionError::DownstreamUnavailable(e.to_string()))?;

        let url = browse_url(&self.base_url, &self.project, created.id);
        tracing::info!(id = created.id, url = %url, "Work item created");
        Ok(url)
    }
}
