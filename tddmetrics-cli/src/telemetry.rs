//! Optional upload of recorded commit events to a telemetry service.

use crate::CliResult;
use crate::config::TelemetryConfig;
use log::{info, warn};
use reqwest::Client;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tddmetrics_core::EventEnvelope;

const UPLOAD_TIMEOUT_SECS: u64 = 10;

/// Result of attempting to upload one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TelemetryOutcome {
    /// The service accepted the event.
    Uploaded,
    /// Upload was not attempted.
    Skipped(String),
    /// Upload was attempted and failed.
    Failed(String),
}

impl fmt::Display for TelemetryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryOutcome::Uploaded => write!(f, "uploaded"),
            TelemetryOutcome::Skipped(reason) => write!(f, "skipped ({reason})"),
            TelemetryOutcome::Failed(detail) => write!(f, "failed ({detail})"),
        }
    }
}

/// HTTP client abstraction for telemetry uploads.
pub(crate) trait TelemetryClient {
    fn send<'a>(
        &'a self,
        endpoint: &'a str,
        token: &'a str,
        envelope: &'a EventEnvelope,
    ) -> Pin<Box<dyn Future<Output = CliResult<()>> + Send + 'a>>;
}

/// Reqwest-backed telemetry client.
pub(crate) struct ReqwestTelemetryClient {
    client: Client,
}

impl ReqwestTelemetryClient {
    /// Build a new reqwest telemetry client.
    pub(crate) fn new() -> CliResult<Self> {
        let client = Client::builder()
            .user_agent("tddmetrics-cli")
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

impl TelemetryClient for ReqwestTelemetryClient {
    fn send<'a>(
        &'a self,
        endpoint: &'a str,
        token: &'a str,
        envelope: &'a EventEnvelope,
    ) -> Pin<Box<dyn Future<Output = CliResult<()>> + Send + 'a>> {
        Box::pin(post_event(&self.client, endpoint, token, envelope))
    }
}

/// POST a single event envelope as JSON.
async fn post_event(
    client: &Client,
    endpoint: &str,
    token: &str,
    envelope: &EventEnvelope,
) -> CliResult<()> {
    client
        .post(endpoint)
        .bearer_auth(token)
        .json(envelope)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

/// Upload an event if telemetry is configured.
///
/// Never returns an error: every failure is folded into the outcome so the
/// caller's own result is unaffected.
pub(crate) async fn upload_event<C: TelemetryClient>(
    client: &C,
    config: &TelemetryConfig,
    envelope: &EventEnvelope,
) -> TelemetryOutcome {
    let Some(endpoint) = config.endpoint.as_deref() else {
        return TelemetryOutcome::Skipped("no telemetry endpoint configured".to_string());
    };
    let Some(token) = config.token.as_deref() else {
        return TelemetryOutcome::Skipped("no telemetry token configured".to_string());
    };

    match client.send(endpoint, token, envelope).await {
        Ok(()) => {
            info!(
                "uploaded commit {} to {endpoint}",
                envelope.data.commit_hash
            );
            TelemetryOutcome::Uploaded
        }
        Err(err) => {
            warn!(
                "telemetry upload of commit {} failed: {err}",
                envelope.data.commit_hash
            );
            TelemetryOutcome::Failed(err.to_string())
        }
    }
}
