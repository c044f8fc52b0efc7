use serde::{Deserialize, Serialize};

/// Classification of a single probe against a candidate port.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The response body carried one of the tagger signatures.
    Matched,
    /// Something answered, but it is not the tagger.
    NotMatched,
    /// Transport failure: refused, timed out, reset.
    Failed,
}

/// One probe observation, kept for diagnostics and the run report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub method: String,
    pub url: String,
    pub port: u16,
    pub outcome: ProbeOutcome,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub response_text: Option<String>,
    pub error: Option<String>,
    pub latency_ms: u64,
}

impl ProbeResult {
    pub fn is_match(&self) -> bool {
        self.outcome == ProbeOutcome::Matched
    }
}

/// Terminal state of one orchestrator run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Page policy excluded this page; nothing was probed.
    Skip,
    /// The port the page already uses still answers as the tagger.
    ReuseConfirmed { port: u16 },
    /// A different port was found and the page was navigated.
    Reload { port: u16 },
    /// Full scan found the port the page already uses.
    NoChangeNeeded { port: u16 },
    /// No candidate port answered as the tagger.
    NotFound,
}

/// Everything observed during a run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub current_port: Option<u16>,
    pub probes: Vec<ProbeResult>,
    pub navigated_to: Option<String>,
    pub timestamp: String,
}
