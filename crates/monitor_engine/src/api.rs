//! REST calls that start and stop remote scraping jobs.

use monitor_logging::{monitor_info, monitor_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{StreamSettings, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Maps,
    Linkedin,
}

/// Job parameters accepted by `POST /api/scrape/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub source: Source,
    /// Keyword or business sector to search for.
    pub sector: String,
    /// Only used by the maps source; the backend falls back to Paris.
    pub city: Option<String>,
    pub limit: u32,
}

impl Default for StartRequest {
    fn default() -> Self {
        Self {
            source: Source::Maps,
            sector: "Coiffeur".to_string(),
            city: Some("Paris".to_string()),
            limit: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    task_id: TaskId,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("backend answered {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

pub struct ScrapeApi {
    client: reqwest::Client,
    settings: StreamSettings,
}

impl ScrapeApi {
    pub fn new(settings: StreamSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { client, settings })
    }

    /// Starts a job and returns the identifier to stream it with.
    pub async fn start(&self, request: &StartRequest) -> Result<TaskId, ApiError> {
        let url = self.settings.endpoint(&["api", "scrape", "start"])?;
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let response = check_status(response).await?;
        let body: StartResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        monitor_info!(
            "Started task {} (status {})",
            body.task_id,
            body.status.as_deref().unwrap_or("unknown")
        );
        Ok(body.task_id)
    }

    /// Asks the backend to cancel a running job.
    pub async fn stop(&self, task_id: &TaskId) -> Result<(), ApiError> {
        let url = self
            .settings
            .endpoint(&["api", "scrape", "stop", task_id.as_str()])?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        check_status(response).await?;
        monitor_info!("Stopped task {}", task_id);
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if text.is_empty() => status.to_string(),
        Err(_) => text,
    };
    monitor_warn!("Backend answered {}: {}", status, detail);
    Err(ApiError::Status {
        status: status.as_u16(),
        detail,
    })
}
