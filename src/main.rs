use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use tagger_port_rs::activation;
use tagger_port_rs::config::{DetectConfig, TAGGER_HOST};
use tagger_port_rs::orchestrator;
use tagger_port_rs::page::{MemoryDocument, MemoryLocation};
use tagger_port_rs::ports::PortRange;
use tagger_port_rs::probe::HttpProber;
use tagger_port_rs::types::{RunOutcome, RunReport};

/// tagger-port-rs — Find the local MusicBrainz tagger port and activate the tagger button.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tagger-port-rs",
    version,
    about = "Find the local MusicBrainz tagger port and activate the tagger button.",
    long_about = None
)]
struct Cli {
    /// URL of the MusicBrainz page being loaded.
    #[arg(long)]
    url: String,

    /// Link target of the tagger button rendered on the page, if any.
    #[arg(long = "button-href")]
    button_href: Option<String>,

    /// Host the tagger listens on.
    #[arg(long, default_value = TAGGER_HOST)]
    host: String,

    /// Candidate ports, as a range (8000-8010) or a single port.
    #[arg(long, default_value_t = PortRange::default())]
    ports: PortRange,

    /// Per-probe timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 3000)]
    timeout_ms: u64,

    /// Write the run report as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run even when the page is not a tagger-enabled MusicBrainz page.
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Enable debug logging.
    #[arg(long, default_value_t = false)]
    debug: bool,
}

impl Cli {
    fn detect_config(&self) -> DetectConfig {
        DetectConfig {
            host: self.host.clone(),
            ports: self.ports,
            probe_timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    let config = cli.detect_config();
    let page_url =
        Url::parse(&cli.url).with_context(|| format!("invalid page URL: {}", cli.url))?;

    println!("tagger-port-rs configuration:");
    println!("  url          : {}", page_url);
    println!(
        "  button_href  : {}",
        cli.button_href.as_deref().unwrap_or("<none>")
    );
    println!("  tagger       : {}", config.base_url());
    println!("  ports        : {}", config.ports);
    println!("  timeout_ms   : {}", cli.timeout_ms);

    if !cli.force && !activation::should_activate(&page_url) {
        info!(url = %page_url, "page does not carry tagger buttons; nothing to do");
        return Ok(());
    }

    let prober = HttpProber::new(&config)?;
    let mut location = MemoryLocation::new(page_url);
    let document = MemoryDocument {
        tagger_button_href: cli.button_href.clone(),
    };

    // Ctrl-C stops the scan before the next probe.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_ctrlc.cancel();
        }
    });

    let report =
        orchestrator::run_with_cancel(&prober, &mut location, &document, config.ports, cancel)
            .await;
    print_report(&report);

    if let Some(path) = cli.output.as_deref() {
        if let Err(e) = write_report_json(path, &report) {
            warn!("Failed to write JSON to {}: {e:#}", path.display());
        } else {
            println!("Wrote JSON report to {}", path.display());
        }
    }

    Ok(())
}

fn setup_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("tagger_port_rs=debug")
        } else {
            EnvFilter::new("tagger_port_rs=info")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn print_report(report: &RunReport) {
    let state = match report.outcome {
        RunOutcome::Skip => "skip (page excluded)".to_string(),
        RunOutcome::ReuseConfirmed { port } => format!("reuse confirmed (port {port})"),
        RunOutcome::Reload { port } => format!("reload (port {port})"),
        RunOutcome::NoChangeNeeded { port } => format!("no change needed (port {port})"),
        RunOutcome::NotFound => "not found".to_string(),
    };
    println!("\nResult: {state} (probes: {})", report.probes.len());
    if let Some(target) = &report.navigated_to {
        println!("Navigate to: {target}");
    }
    for p in &report.probes {
        println!(
            "  {:>5}  {:<11}  {:>6}  {}ms",
            p.port,
            format!("{:?}", p.outcome),
            p.status.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
            p.latency_ms
        );
    }
}

fn write_report_json(path: &std::path::Path, report: &RunReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}
