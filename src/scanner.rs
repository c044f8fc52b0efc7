use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ports::PortRange;
use crate::probe::Prober;
use crate::types::ProbeResult;

/// Result of walking the candidate range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortScan {
    /// Lowest port that answered as the tagger.
    pub found: Option<u16>,
    /// Every probe issued, in scan order.
    pub probes: Vec<ProbeResult>,
}

/// Find the tagger port in `range`.
///
/// Ports are probed one at a time in ascending order and the scan stops at
/// the first match, so the lowest matching port always wins.
pub async fn detect_tagger_port<P>(prober: &P, range: PortRange) -> Option<u16>
where
    P: Prober + ?Sized,
{
    scan_ports(prober, range).await.found
}

/// Like [`detect_tagger_port`], keeping every probe result.
pub async fn scan_ports<P>(prober: &P, range: PortRange) -> PortScan
where
    P: Prober + ?Sized,
{
    scan_ports_internal(prober, range, None).await
}

/// Variant that stops before the next probe once `cancel` fires.
pub async fn scan_ports_with_cancel<P>(
    prober: &P,
    range: PortRange,
    cancel: CancellationToken,
) -> PortScan
where
    P: Prober + ?Sized,
{
    scan_ports_internal(prober, range, Some(cancel)).await
}

async fn scan_ports_internal<P>(
    prober: &P,
    range: PortRange,
    cancel_opt: Option<CancellationToken>,
) -> PortScan
where
    P: Prober + ?Sized,
{
    let mut scan = PortScan::default();

    for port in range.iter() {
        if cancel_opt.as_ref().is_some_and(|c| c.is_cancelled()) {
            debug!(port, "scan cancelled");
            break;
        }
        debug!("Probing port {port}");
        let result = prober.probe(port).await;
        let matched = result.is_match();
        scan.probes.push(result);
        if matched {
            scan.found = Some(port);
            break;
        }
    }

    scan
}
