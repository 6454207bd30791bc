//! Client of the scan-control service (the "brain") that schedules probe jobs.
//!
//! The brain speaks JSON over HTTP:
//! - `GET  /probes` answers `{"probe_list": [..]}`
//! - `POST /scans/<id>/launch` takes a [LaunchRequest] and answers `{"probe_list": [..]}`
//! - `GET  /scans/<id>/progress` answers [ProgressDetails]
//! - `POST /scans/<id>/cancel` answers [CancelDetails]

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configuration::config::Config;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("{0}")]
    Unavailable(String),
    #[error("scan-control call timed out after {0} seconds")]
    Timeout(u64),
    #[error("scan-control refused the request: {0}")]
    Rejected(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressDetails {
    pub total: u32,
    pub finished: u32,
    pub successful: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelDetails {
    pub total: u32,
    pub finished: u32,
    pub cancelled: u32,
}

/// Body of a launch call
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LaunchRequest {
    pub scan_id: String,
    /// Passed through untouched, the brain decides what it means
    pub force: bool,
    pub probes: Vec<String>,
    /// sha256 of every file of the scan, in scan order
    pub files: Vec<String>,
}

#[derive(Deserialize)]
struct ProbeListBody {
    probe_list: Vec<String>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScanControl: Send + Sync {
    /// Every probe registered on the brain
    async fn probe_list(&self) -> Result<Vec<String>, ControlError>;
    /// Schedules the probe jobs and returns the probes actually used
    async fn launch(&self, request: LaunchRequest) -> Result<Vec<String>, ControlError>;
    async fn progress(&self, scan_id: &str) -> Result<ProgressDetails, ControlError>;
    async fn cancel(&self, scan_id: &str) -> Result<CancelDetails, ControlError>;
}

/// HTTP implementation of [ScanControl]
pub struct BrainClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl BrainClient {
    /// Builds the client from the `[brain]` section of the [Config].
    pub fn new(config: &Config) -> Result<Self, ControlError> {
        let timeout = config.brain_timeout();
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|err| ControlError::Unavailable(err.to_string()))?;
        Ok(BrainClient {
            client,
            base_url: config.brain_url.trim_end_matches('/').to_owned(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn map_err(&self, err: reqwest::Error) -> ControlError {
        if err.is_timeout() {
            ControlError::Timeout(self.timeout.as_secs())
        } else {
            ControlError::Unavailable(err.to_string())
        }
    }

    async fn read<T: DeserializeOwned>(&self, response: Response) -> Result<T, ControlError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ControlError::Rejected(format!("{} {}", status, body)));
        }
        response.json::<T>().await.map_err(|err| self.map_err(err))
    }
}

#[async_trait]
impl ScanControl for BrainClient {
    async fn probe_list(&self) -> Result<Vec<String>, ControlError> {
        let response = self
            .client
            .get(self.url("probes"))
            .send()
            .await
            .map_err(|err| self.map_err(err))?;
        let body: ProbeListBody = self.read(response).await?;
        debug!("Brain reported {} probe(s).", body.probe_list.len());
        Ok(body.probe_list)
    }

    async fn launch(&self, request: LaunchRequest) -> Result<Vec<String>, ControlError> {
        info!(
            "Launching scan {} on {} file(s) with probes {:?}.",
            request.scan_id,
            request.files.len(),
            request.probes
        );
        let response = self
            .client
            .post(self.url(&format!("scans/{}/launch", request.scan_id)))
            .json(&request)
            .send()
            .await
            .map_err(|err| self.map_err(err))?;
        let body: ProbeListBody = self.read(response).await?;
        Ok(body.probe_list)
    }

    async fn progress(&self, scan_id: &str) -> Result<ProgressDetails, ControlError> {
        let response = self
            .client
            .get(self.url(&format!("scans/{}/progress", scan_id)))
            .send()
            .await
            .map_err(|err| self.map_err(err))?;
        self.read(response).await
    }

    async fn cancel(&self, scan_id: &str) -> Result<CancelDetails, ControlError> {
        info!("Cancelling scan {} on the brain.", scan_id);
        let response = self
            .client
            .post(self.url(&format!("scans/{}/cancel", scan_id)))
            .send()
            .await
            .map_err(|err| self.map_err(err))?;
        self.read(response).await
    }
}
