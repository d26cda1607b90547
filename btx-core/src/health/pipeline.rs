//! Synthetic end-to-end check of the extraction endpoint.
use std::time::Duration;

use btx_common::{
    log::debug,
    reqwest::Client,
    serde_json::{self, json, Value},
    SiteStatus, Status,
};
use tokio::time::Instant;
use url::Url;

use crate::error::CoreError;

pub const PIPELINE_CHECK_NAME: &str = "Extraction pipeline";

/// Posts a known-good URL to an extract endpoint.
///
/// Any JSON answer, error payloads included, proves the service is up and parsing requests;
/// only a non-JSON body or no answer at all count against it.
#[derive(Debug, Clone)]
pub struct PipelineCheck {
    client: Client,
    endpoint: Url,
    target_url: String,
    timeout: Duration,
}

impl PipelineCheck {
    pub fn new(
        client: Client,
        endpoint: &str,
        target_url: &str,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let endpoint = Url::parse(endpoint).map_err(|_| CoreError::InvalidSelfCheck {
            url: endpoint.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            target_url: target_url.to_string(),
            timeout,
        })
    }

    pub async fn run(&self) -> SiteStatus {
        let started = Instant::now();
        let elapsed = || u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "targetUrl": self.target_url }))
            .timeout(self.timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                debug!("Pipeline check failed: {err}");
                return SiteStatus::new(
                    PIPELINE_CHECK_NAME,
                    Status::MajorOutage,
                    elapsed(),
                    Some(err.to_string()),
                );
            }
        };

        let code = response.status().as_u16();
        let (status, error) = match response.bytes().await {
            Ok(body) if serde_json::from_slice::<Value>(&body).is_ok() => (Status::Operational, None),
            Ok(_) => (
                Status::PartialOutage,
                Some(format!("Non-JSON response (HTTP {code})")),
            ),
            Err(err) => (Status::MajorOutage, Some(err.to_string())),
        };

        SiteStatus::new(PIPELINE_CHECK_NAME, status, elapsed(), error)
    }
}
