//! HTTP client for the mirror API write endpoints

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OrchestratorError, Result};

/// Body of `POST /projects`
#[derive(Debug, Clone, Serialize)]
pub struct ProjectPayload {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub funds: String,
    pub milestone_reached: bool,
    pub tx_hash: String,
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_goal: Option<String>,
}

/// Body of `POST /stakes`
#[derive(Debug, Clone, Serialize)]
pub struct StakePayload {
    pub project_id: String,
    pub staker: String,
    pub amount: String,
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Body of `POST /withdrawals`
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalPayload {
    pub project_id: String,
    pub withdrawer: String,
    pub amount: String,
    pub milestone: bool,
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// The parts of a write response the client cares about
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorAck {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
    #[serde(default, alias = "milestoneReached")]
    pub milestone_reached: Option<bool>,
    #[serde(default)]
    pub funds: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MirrorClient {
    http: Client,
    base_url: String,
}

impl MirrorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn save_project(&self, payload: &ProjectPayload) -> Result<MirrorAck> {
        self.post("projects", payload).await
    }

    pub async fn save_stake(&self, payload: &StakePayload) -> Result<MirrorAck> {
        self.post("stakes", payload).await
    }

    pub async fn save_withdrawal(&self, payload: &WithdrawalPayload) -> Result<MirrorAck> {
        self.post("withdrawals", payload).await
    }

    async fn post<T: Serialize>(&self, path: &str, payload: &T) -> Result<MirrorAck> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.http.post(&url).json(payload).send().await?;
        let status = response.status();
        let ack: MirrorAck = response.json().await.map_err(|e| {
            OrchestratorError::Mirror(format!("{} returned an unreadable body ({}): {}", url, status, e))
        })?;

        if !status.is_success() || !ack.success {
            let reason = ack
                .error
                .clone()
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(OrchestratorError::Mirror(reason));
        }
        Ok(ack)
    }
}
