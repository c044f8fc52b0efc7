use std::time::{Duration, Instant};

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use url::Url;

use tagger_port_rs::config::DetectConfig;
use tagger_port_rs::orchestrator;
use tagger_port_rs::page::{MemoryDocument, MemoryLocation, PageLocation};
use tagger_port_rs::ports::PortRange;
use tagger_port_rs::probe::{HttpProber, Prober};
use tagger_port_rs::types::{ProbeOutcome, RunOutcome};

/// Serve `body` with `status` on every request to `/`; returns the port.
async fn spawn_fake_service(status: StatusCode, body: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let app = Router::new().route("/", get(move || async move { (status, body) }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    port
}

/// A loopback port nothing listens on.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Accepts connections and never answers them.
async fn spawn_silent_service() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    port
}

fn prober_for(port: u16) -> HttpProber {
    prober_with_timeout(port, Duration::from_secs(2))
}

fn prober_with_timeout(port: u16, probe_timeout: Duration) -> HttpProber {
    let config = DetectConfig {
        ports: PortRange::new(port, port).unwrap(),
        probe_timeout,
        ..DetectConfig::default()
    };
    HttpProber::new(&config).unwrap()
}

#[tokio::test]
async fn tagger_marker_matches() {
    let port = spawn_fake_service(
        StatusCode::OK,
        "<html><body>MusicBrainz-Picard listening</body></html>",
    )
    .await;
    let result = prober_for(port).probe(port).await;

    assert_eq!(result.outcome, ProbeOutcome::Matched);
    assert_eq!(result.method, "GET");
    assert_eq!(result.url, format!("http://127.0.0.1:{port}"));
    assert_eq!(result.status, Some(200));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn fallback_marker_matches_regardless_of_status() {
    let port = spawn_fake_service(StatusCode::NOT_FOUND, "Nothing to see here").await;
    let result = prober_for(port).probe(port).await;

    assert_eq!(result.outcome, ProbeOutcome::Matched);
    assert_eq!(result.status, Some(404));
    assert_eq!(result.status_text.as_deref(), Some("Not Found"));
}

#[tokio::test]
async fn other_service_does_not_match() {
    let port = spawn_fake_service(StatusCode::OK, "<h1>It works!</h1>").await;
    let result = prober_for(port).probe(port).await;

    assert_eq!(result.outcome, ProbeOutcome::NotMatched);
    assert_eq!(result.response_text.as_deref(), Some("<h1>It works!</h1>"));
}

#[tokio::test]
async fn refused_connection_is_failed_not_error() {
    let port = closed_port().await;
    let result = prober_for(port).probe(port).await;

    assert_eq!(result.outcome, ProbeOutcome::Failed);
    assert!(result.status.is_none());
    assert!(result.error.is_some());
}

#[tokio::test]
async fn environment_proxy_is_bypassed_for_loopback() {
    let dead_proxy = format!("http://127.0.0.1:{}", closed_port().await);
    std::env::set_var("HTTP_PROXY", &dead_proxy);
    std::env::set_var("http_proxy", &dead_proxy);
    std::env::set_var("ALL_PROXY", &dead_proxy);

    let port = spawn_fake_service(StatusCode::OK, "MusicBrainz-Picard").await;
    let result = prober_for(port).probe(port).await;

    assert_eq!(result.outcome, ProbeOutcome::Matched, "{:?}", result.error);
    assert_eq!(result.status, Some(200));
}

#[tokio::test]
async fn silent_service_times_out_as_failed() {
    let port = spawn_silent_service().await;
    let prober = prober_with_timeout(port, Duration::from_millis(300));

    let start = Instant::now();
    let result = prober.probe(port).await;
    let elapsed = start.elapsed();

    assert_eq!(result.outcome, ProbeOutcome::Failed);
    assert!(result.status.is_none());
    assert!(result.error.is_some());
    assert!(elapsed >= Duration::from_millis(250), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(1), "{elapsed:?}");
}

#[tokio::test]
async fn end_to_end_reload_against_fake_tagger() {
    let port = spawn_fake_service(StatusCode::OK, "MusicBrainz-Picard").await;
    let prober = prober_for(port);
    let mut loc = MemoryLocation::new(Url::parse("https://musicbrainz.org/release/abc").unwrap());

    let report = orchestrator::run(
        &prober,
        &mut loc,
        &MemoryDocument::default(),
        PortRange::new(port, port).unwrap(),
    )
    .await;

    assert_eq!(report.outcome, RunOutcome::Reload { port });
    assert_eq!(
        loc.href().as_str(),
        format!("https://musicbrainz.org/release/abc?tport={port}")
    );
}
