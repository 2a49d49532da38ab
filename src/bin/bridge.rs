//! genesis-bridge binary.
//!
//! Serves newline-delimited JSON requests on stdin and writes one JSON
//! response per line on stdout. Logs go to stderr.
//!
//! # Environment Variables
//!
//! - `GOOGLE_API_KEY` / `GENESIS_API_KEY` — Gemini API key (fallback mode without one)
//! - `GENESIS_MODEL` — model name (default: gemini-2.5-flash)
//! - `GENESIS_REQUEST_TIMEOUT_SECS` — HTTP timeout for generation calls (default: none)
//! - `GENESIS_IDLE_PAUSE_MS` — pause after a blank input line (default: 100)
//! - `RUST_LOG` — tracing filter (default: "info,genesis_bridge=debug")

use std::future::Future;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use genesis_bridge::protocol::envelope;
use genesis_bridge::{
    BridgeSettings, Collaborators, GenesisBridgeServer, GenesisConnector, ModelConfig, StopReason,
};
use tokio::runtime::Runtime;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,genesis_bridge=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build the async runtime")
        .and_then(|runtime| block_then_abandon(runtime, run()));

    match result {
        Ok(StopReason::EndOfInput) | Ok(StopReason::Shutdown) => ExitCode::SUCCESS,
        Ok(reason) => {
            tracing::error!(?reason, "bridge stopped on I/O failure");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            let line =
                envelope::to_line(&envelope::error(format!("Bridge startup failed: {:#}", e)));
            // stdout may already be gone; the exit code still reports the failure.
            let _ = writeln!(std::io::stdout(), "{}", line);
            ExitCode::FAILURE
        }
    }
}

/// Drive `future` to completion, then drop the runtime without waiting for
/// blocking-pool work.
///
/// The stdin reader parks a blocking read that only returns on the next
/// input byte; waiting for it would keep the process alive after Ctrl-C.
fn block_then_abandon<F: Future>(runtime: Runtime, future: F) -> F::Output {
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    output
}

async fn run() -> anyhow::Result<StopReason> {
    let config = ModelConfig::from_env().context("invalid model configuration")?;
    let settings = BridgeSettings::from_env().context("invalid bridge settings")?;
    tracing::info!(?config, "configuration loaded");

    let connector = GenesisConnector::from_config(Arc::new(config));
    let server = GenesisBridgeServer::new(connector, Collaborators::default(), settings);

    let handle = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            handle.shutdown();
        }
    });

    let reason = server.run_stdio().await.context("bridge failed to start")?;
    Ok(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_stuck_blocking_read_does_not_hold_the_process() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let started = Instant::now();

        let value = block_then_abandon(runtime, async {
            tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(5)));
            tokio::task::yield_now().await;
            7
        });

        assert_eq!(value, 7);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
