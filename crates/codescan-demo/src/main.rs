//! Codescan demo: drives a scanner facade against a simulated camera.

mod history;
mod sim;

use anyhow::Context;
use codescan_core::{ScannerSettings, StaticImage};
use codescan_session::{FacadeInputs, ScannerEvent, ScannerFacade, SessionManager};
use history::ScanHistory;
use sim::{SimulatedEngine, SimulatedHost};
use std::sync::Arc;
use tracing::{debug, info, warn};

const HISTORY_LIMIT: usize = 10;
const DEMO_SCANS: usize = 12;
/// Switch to the second camera after this many scans
const CAMERA_SWITCH_AT: usize = 6;

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,codescan=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting codescan demo v{}", env!("CARGO_PKG_VERSION"));

    let settings = ScannerSettings::load_with_env().context("failed to load scanner settings")?;

    let codes = vec![
        "https://example.com/ticket/1042".to_string(),
        "4006381333931".to_string(),
        "WIFI:S:guest;T:WPA;P:letmein;;".to_string(),
    ];
    let engine = Arc::new(SimulatedEngine::new(codes));
    let host = Arc::new(SimulatedHost::new(3));
    let manager = Arc::new(SessionManager::from_settings(engine, host, &settings));

    let inputs = FacadeInputs {
        config: settings.scan.clone(),
        auto_start: true,
        ..Default::default()
    };
    let (facade, mut events) = ScannerFacade::new(Arc::clone(&manager), inputs);
    facade.mount().await;

    for camera in &manager.state().available_cameras {
        info!("Camera {}: {}", camera.id, camera.label);
    }

    let mut history = ScanHistory::new(HISTORY_LIMIT);
    let mut torch_lit = false;

    while history.total() < DEMO_SCANS {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };
        let Some(event) = event else {
            break;
        };

        match event {
            ScannerEvent::Started => info!("Scanner started on {}", facade.surface_id()),
            ScannerEvent::Stopped => info!("Scanner stopped"),
            ScannerEvent::ScanSucceeded(result) => {
                info!("Scanned: {}", result.decoded_text);
                history.push(result);
                if history.total() == CAMERA_SWITCH_AT {
                    facade.select_camera("cam-front").await;
                }
            }
            ScannerEvent::Failed(message) => debug!("{}", message),
        }

        if !torch_lit && manager.state().is_torch_available {
            facade.toggle_torch().await;
            torch_lit = manager.state().is_torch_on;
        }
    }

    facade.stop_scanning().await;

    info!("Last {} of {} scans:", history.len(), history.total());
    for (i, result) in history.iter().enumerate() {
        info!("  {:>2}. {}", i + 1, result.decoded_text);
    }
    history.clear();
    manager.clear_results();

    let image = StaticImage::new("receipt.png", b"RCPT-2024-000187".to_vec());
    match facade.scan_file(&image).await {
        Some(result) => info!("Scanned file {}: {}", image.name, result.decoded_text),
        None => warn!("No code found in {}", image.name),
    }

    facade.teardown().await;
    Ok(())
}
