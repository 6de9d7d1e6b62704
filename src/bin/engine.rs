//! Engine binary: runs the harness until SIGINT/SIGTERM.
//!
//! Takes no arguments. Order flow is admitted by embedding callers or a
//! driver process; this binary keeps the book, telemetry and shared-memory
//! channels live and shuts the regions down cleanly on signal.

use std::process::ExitCode;
use tracing::{error, info};

use matchbook_rs::harness::{EngineHarness, HarnessConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config = HarnessConfig::default();
    let mut harness = match EngineHarness::start(config) {
        Ok(harness) => harness,
        Err(err) => {
            eprintln!("failed to start engine: {err}");
            return ExitCode::FAILURE;
        }
    };

    info!("engine running; press Ctrl-C to stop");
    wait_for_shutdown().await;

    harness.stop();
    ExitCode::SUCCESS
}

async fn wait_for_shutdown() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
                if let Err(err) = ctrl_c.await {
                    error!("failed to wait for Ctrl-C: {err}");
                }
                return;
            }
        };

        tokio::select! {
            result = ctrl_c => {
                if let Err(err) = result {
                    error!("failed to wait for Ctrl-C: {err}");
                }
            }
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!("failed to wait for Ctrl-C: {err}");
        }
    }
}
