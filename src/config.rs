use std::time::Duration;

use crate::ports::PortRange;

/// Where the tagger is expected to listen.
pub const TAGGER_HOST: &str = "127.0.0.1";

/// Per-probe timeout. Bounds a whole scan to `range.len() * timeout`.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Settings for one discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectConfig {
    pub host: String,
    pub ports: PortRange,
    pub probe_timeout: Duration,
}

impl DetectConfig {
    /// Base URL probes are issued against, without a port.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.host)
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            host: TAGGER_HOST.to_string(),
            ports: PortRange::default(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}
