use ::time::{format_description::well_known, OffsetDateTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::page::{self, PageLocation, TaggerDocument};
use crate::ports::PortRange;
use crate::probe::Prober;
use crate::scanner;
use crate::types::{RunOutcome, RunReport};

/// Run discovery once for the current page.
///
/// - Excluded pages are left alone without probing.
/// - A port the page already uses is re-probed first; if it still answers
///   as the tagger the run ends there.
/// - Otherwise `range` is scanned and the page is navigated to the found
///   port, but only when it differs from the current one.
///
/// `location` is assigned at most once.
pub async fn run<P, L, D>(
    prober: &P,
    location: &mut L,
    document: &D,
    range: PortRange,
) -> RunReport
where
    P: Prober + ?Sized,
    L: PageLocation + ?Sized,
    D: TaggerDocument + ?Sized,
{
    run_internal(prober, location, document, range, None).await
}

/// Variant of [`run`] whose full scan stops once `cancel` fires. A cancelled
/// scan ends as [`RunOutcome::NotFound`].
pub async fn run_with_cancel<P, L, D>(
    prober: &P,
    location: &mut L,
    document: &D,
    range: PortRange,
    cancel: CancellationToken,
) -> RunReport
where
    P: Prober + ?Sized,
    L: PageLocation + ?Sized,
    D: TaggerDocument + ?Sized,
{
    run_internal(prober, location, document, range, Some(cancel)).await
}

async fn run_internal<P, L, D>(
    prober: &P,
    location: &mut L,
    document: &D,
    range: PortRange,
    cancel_opt: Option<CancellationToken>,
) -> RunReport
where
    P: Prober + ?Sized,
    L: PageLocation + ?Sized,
    D: TaggerDocument + ?Sized,
{
    info!("MusicBrainz auto tagger button!");

    let mut report = RunReport {
        outcome: RunOutcome::Skip,
        current_port: None,
        probes: Vec::new(),
        navigated_to: None,
        timestamp: now_iso_like(),
    };

    if page::is_page_excluded(location.href()) {
        return report;
    }

    let current_port = page::current_tagger_port(location.href(), document);
    report.current_port = current_port;

    if let Some(port) = current_port {
        let result = prober.probe(port).await;
        let matched = result.is_match();
        report.probes.push(result);
        if matched {
            info!("Tagger button configured for port {port}.");
            report.outcome = RunOutcome::ReuseConfirmed { port };
            return report;
        }
    }

    let scan = match cancel_opt {
        Some(cancel) => scanner::scan_ports_with_cancel(prober, range, cancel).await,
        None => scanner::scan_ports(prober, range).await,
    };
    report.probes.extend(scan.probes);

    report.outcome = match scan.found {
        Some(port) => {
            info!("Found Picard listening on port {port}.");
            if current_port != Some(port) {
                info!("Reloading to activate tagger button...");
                let target = page::with_tagger_port(location.href(), port);
                info!(url = %target, "navigating");
                report.navigated_to = Some(target.to_string());
                location.assign(target);
                RunOutcome::Reload { port }
            } else {
                debug!("Tagger button already active");
                RunOutcome::NoChangeNeeded { port }
            }
        }
        None => {
            info!("Could not find Picard listening for tagger button");
            RunOutcome::NotFound
        }
    };

    report
}

fn now_iso_like() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
