use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::DetectConfig;
use crate::types::{ProbeOutcome, ProbeResult};

/// Marker the tagger's local service puts in its response body.
pub const TAGGER_MARKER: &str = "MusicBrainz-Picard";
/// Placeholder text some tagger builds answer with instead.
pub const TAGGER_FALLBACK_MARKER: &str = "Nothing to see here";

const METHOD: &str = "GET";

/// A single observation against one candidate port.
///
/// Implementations never fail: transport errors are reported as
/// [`ProbeOutcome::Failed`].
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, port: u16) -> ProbeResult;
}

/// Classify a response body. The status code plays no part.
pub fn classify_body(text: &str) -> ProbeOutcome {
    if text.contains(TAGGER_MARKER) || text.contains(TAGGER_FALLBACK_MARKER) {
        ProbeOutcome::Matched
    } else {
        ProbeOutcome::NotMatched
    }
}

/// Probes `http://<host>:<port>/` with a plain GET.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProber {
    pub fn new(config: &DetectConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.probe_timeout)
            // Loopback requests go straight to the tagger, never via HTTP_PROXY.
            .no_proxy()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    pub fn url_for(&self, port: u16) -> String {
        format!("{}:{}", self.base_url, port)
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, port: u16) -> ProbeResult {
        let url = self.url_for(port);
        let start = Instant::now();

        let response = match self.client.get(&url).send().await {
            Ok(resp) => {
                let status = resp.status();
                resp.text().await.map(|text| (status, text))
            }
            Err(e) => Err(e),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        match response {
            Ok((status, text)) => {
                let result = ProbeResult {
                    method: METHOD.to_string(),
                    url,
                    port,
                    outcome: classify_body(&text),
                    status: Some(status.as_u16()),
                    status_text: status.canonical_reason().map(str::to_string),
                    response_text: Some(text),
                    error: None,
                    latency_ms,
                };
                debug!(?result, "probe completed");
                result
            }
            Err(e) => {
                warn!(method = METHOD, url = %url, error = %e, "probe failed");
                ProbeResult {
                    method: METHOD.to_string(),
                    url,
                    port,
                    outcome: ProbeOutcome::Failed,
                    status: None,
                    status_text: None,
                    response_text: None,
                    error: Some(e.to_string()),
                    latency_ms,
                }
            }
        }
    }
}
