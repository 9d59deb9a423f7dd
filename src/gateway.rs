//! Gateway client seam.
//!
//! Planners produce plain data; everything that leaves the process goes
//! through [`GatewayClient`]. The production implementation speaks the
//! gateway management REST protocol against a configurable endpoint
//! URL, so the same binary works against a real control plane or a
//! local emulator. Tests inject [`RecordingClient`].

use crate::error::{Error, Result};
use crate::http_api_planner::RouteThrottling;
use crate::patch::PatchOperation;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Mutex;

/// One REST-style stage update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestStageUpdate {
    pub rest_api_id: String,
    pub stage_name: String,
    pub patch_operations: Vec<PatchOperation>,
}

/// One HTTP-style stage update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpApiStageUpdate {
    pub api_id: String,
    pub stage_name: String,
    pub default_route_settings: RouteThrottling,
    pub route_settings: IndexMap<String, RouteThrottling>,
}

/// Transport for stage updates. Retries, timeouts and credentials are
/// the implementation's concern; a rejection propagates to the caller
/// as-is.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    async fn update_rest_stage(&self, update: &RestStageUpdate) -> Result<()>;
    async fn update_http_api_stage(&self, update: &HttpApiStageUpdate) -> Result<()>;
}

/// HTTP implementation of [`GatewayClient`].
pub struct HttpGatewayClient {
    http: reqwest::Client,
    endpoint_url: String,
}

impl HttpGatewayClient {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint_url: endpoint_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn send(&self, url: String, body: serde_json::Value) -> Result<()> {
        let response = self.http.patch(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GatewayRejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn update_rest_stage(&self, update: &RestStageUpdate) -> Result<()> {
        let url = format!(
            "{}/restapis/{}/stages/{}",
            self.endpoint_url, update.rest_api_id, update.stage_name
        );
        let body = serde_json::json!({ "patchOperations": update.patch_operations });
        self.send(url, body).await
    }

    async fn update_http_api_stage(&self, update: &HttpApiStageUpdate) -> Result<()> {
        let url = format!(
            "{}/v2/apis/{}/stages/{}",
            self.endpoint_url, update.api_id, update.stage_name
        );
        let body = serde_json::to_value(update)?;
        self.send(url, body).await
    }
}

/// Records every update instead of sending it. Optionally starts
/// rejecting after a number of accepted calls, for exercising the
/// non-transactional failure path.
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<RecordedUpdate>>,
    fail_after: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedUpdate {
    Rest(RestStageUpdate),
    HttpApi(HttpApiStageUpdate),
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(accepted_calls: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_after: Some(accepted_calls),
        }
    }

    pub fn calls(&self) -> Vec<RecordedUpdate> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rest_calls(&self) -> Vec<RestStageUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedUpdate::Rest(update) => Some(update),
                RecordedUpdate::HttpApi(_) => None,
            })
            .collect()
    }

    pub fn http_api_calls(&self) -> Vec<HttpApiStageUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedUpdate::HttpApi(update) => Some(update),
                RecordedUpdate::Rest(_) => None,
            })
            .collect()
    }

    fn record(&self, update: RecordedUpdate) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if calls.len() >= limit {
                return Err(Error::GatewayRejected {
                    status: 429,
                    body: "TooManyRequestsException".to_string(),
                });
            }
        }
        calls.push(update);
        Ok(())
    }
}

#[async_trait]
impl GatewayClient for RecordingClient {
    async fn update_rest_stage(&self, update: &RestStageUpdate) -> Result<()> {
        self.record(RecordedUpdate::Rest(update.clone()))
    }

    async fn update_http_api_stage(&self, update: &HttpApiStageUpdate) -> Result<()> {
        self.record(RecordedUpdate::HttpApi(update.clone()))
    }
}
