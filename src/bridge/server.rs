//! Bridge server: the dual-loop request pipeline and its lifecycle.
//!
//! ```text
//! input ──► ingestion loop ──► mpsc queue ──► processing loop ──► output
//!                │  (parse)                    (route, emit)        ▲
//!                └──── parse errors ────────────────────────────────┘
//! ```
//!
//! The ingestion loop reads lines, parses them and pushes well-formed
//! requests onto an unbounded FIFO queue; malformed lines are answered
//! immediately and never enqueued. The processing loop pops requests in
//! enqueue order, routes each on a blocking worker (so a slow provider call
//! never stalls intake) and writes exactly one response per request.
//!
//! Both loops observe a shared running flag at every iteration boundary.
//! Flipping it (Ctrl-C, [`ShutdownHandle::shutdown`]) stops both loops and
//! abandons whatever is still queued. End of input instead closes the queue:
//! requests already queued are still answered before the server stops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::Instrument;
use uuid::Uuid;

use crate::bridge::router::Router;
use crate::bridge::sink::ResponseSink;
use crate::collaborators::{Collaborators, ConsciousnessTracker};
use crate::config::BridgeSettings;
use crate::connector::GenesisConnector;
use crate::protocol::envelope::{self, timestamp, READY_SENTINEL};
use crate::protocol::types::{BridgeRequest, BridgeResponse};
use crate::utilities::errors::BridgeError;

/// Version reported in the initialization event.
pub const BRIDGE_VERSION: &str = "2.0";

// ---------------------------------------------------------------------------
// StopReason / ShutdownHandle
// ---------------------------------------------------------------------------

/// Why [`GenesisBridgeServer::start`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The input stream reached end of file; queued requests were answered.
    EndOfInput,
    /// The running flag was cleared; queued requests were abandoned.
    Shutdown,
    /// Reading the input stream failed.
    InputFailed(String),
    /// Writing the output stream failed.
    OutputFailed(String),
}

/// Clears the running flag from anywhere (signal handlers, other tasks).
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    running: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Ask both loops to stop at their next iteration boundary.
    pub fn shutdown(&self) {
        self.running.send_replace(false);
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }
}

// ---------------------------------------------------------------------------
// GenesisBridgeServer
// ---------------------------------------------------------------------------

/// Newline-delimited JSON bridge between a foreground client and the backend.
#[derive(Debug)]
pub struct GenesisBridgeServer {
    router: Arc<Router>,
    consciousness: Arc<dyn ConsciousnessTracker>,
    settings: BridgeSettings,
    running: Arc<watch::Sender<bool>>,
    shutdown_reported: AtomicBool,
}

impl GenesisBridgeServer {
    /// Build the server with the standard handlers and report initialization.
    pub fn new(
        connector: GenesisConnector,
        collaborators: Collaborators,
        settings: BridgeSettings,
    ) -> Self {
        let model = connector.model_name().to_string();
        let router = Router::with_default_handlers(connector, &collaborators);
        let server = Self::with_router(router, collaborators.consciousness, settings);

        server.consciousness.perceive_information(
            "android_bridge_initialized",
            json!({
                "timestamp": timestamp(),
                "bridge_version": BRIDGE_VERSION,
                "sdk": crate::bridge::handlers::SDK,
                "model": model,
                "status": "active",
            }),
        );
        server
    }

    /// Build the server around a custom router.
    pub fn with_router(
        router: Router,
        consciousness: Arc<dyn ConsciousnessTracker>,
        settings: BridgeSettings,
    ) -> Self {
        let (running, _) = watch::channel(false);
        Self {
            router: Arc::new(router),
            consciousness,
            settings,
            running: Arc::new(running),
            shutdown_reported: AtomicBool::new(false),
        }
    }

    /// A handle that can stop this server from another task or thread.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: Arc::clone(&self.running),
        }
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    /// Clear the running flag and report the shutdown event (once).
    pub fn shutdown(&self) {
        self.running.send_replace(false);
        if !self.shutdown_reported.swap(true, Ordering::SeqCst) {
            tracing::info!("bridge shutting down");
            self.consciousness.perceive_information(
                "bridge_shutdown",
                json!({
                    "timestamp": timestamp(),
                    "status": "shutdown",
                }),
            );
        }
    }

    /// Serve requests on the process's stdin/stdout.
    pub async fn run_stdio(&self) -> Result<StopReason, BridgeError> {
        self.start(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Emit the readiness sentinel, then serve until end of input, an I/O
    /// failure, or shutdown.
    ///
    /// Returns `Err` only when the bridge could not start (the sentinel could
    /// not be written).
    pub async fn start<R, W>(&self, reader: R, writer: W) -> Result<StopReason, BridgeError>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        self.shutdown_reported.store(false, Ordering::SeqCst);
        self.running.send_replace(true);

        let sink = ResponseSink::new(writer);
        if let Err(e) = sink.write_line(READY_SENTINEL).await {
            self.running.send_replace(false);
            return Err(BridgeError::Io(e));
        }
        tracing::info!("bridge ready");

        let (queue_tx, queue_rx) = mpsc::unbounded_channel();

        let processing = tokio::spawn(processing_loop(
            Arc::clone(&self.router),
            queue_rx,
            sink.clone(),
            Arc::clone(&self.running),
        ));

        let mut reason = ingestion_loop(
            BufReader::new(reader),
            queue_tx,
            sink,
            self.running.subscribe(),
            self.settings.idle_pause,
        )
        .await;

        // A broken output stream outranks however ingestion noticed the stop.
        match processing.await {
            Ok(Some(output_error)) => reason = StopReason::OutputFailed(output_error),
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "processing task failed"),
        }

        tracing::info!(?reason, "bridge stopped");
        self.shutdown();
        Ok(reason)
    }
}

// ---------------------------------------------------------------------------
// Loops
// ---------------------------------------------------------------------------

async fn ingestion_loop<R, W>(
    mut reader: R,
    queue: mpsc::UnboundedSender<BridgeRequest>,
    sink: ResponseSink<W>,
    mut running: watch::Receiver<bool>,
    idle_pause: Duration,
) -> StopReason
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    let mut buf = Vec::new();

    loop {
        if !*running.borrow_and_update() {
            return StopReason::Shutdown;
        }

        // read_until is not cancel safe; a partial line lost here is only
        // lost on the way to shutdown.
        buf.clear();
        let read = tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => read,
            changed = running.changed() => {
                if changed.is_err() {
                    return StopReason::Shutdown;
                }
                continue;
            }
        };

        match read {
            Ok(0) => {
                tracing::debug!("input stream closed");
                return StopReason::EndOfInput;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "input stream failed");
                return StopReason::InputFailed(e.to_string());
            }
        }

        // Invalid UTF-8 is a malformed line, not a stream failure.
        let rejection = match std::str::from_utf8(&buf) {
            Err(e) => Some(format!("Invalid JSON input: {}", e)),
            Ok(line) if line.trim().is_empty() => {
                tokio::time::sleep(idle_pause).await;
                continue;
            }
            Ok(line) => match BridgeRequest::parse_line(line.trim()) {
                Ok(request) => {
                    tracing::debug!(request_type = request.request_type(), "request enqueued");
                    if queue.send(request).is_err() {
                        // The processing loop is gone; nothing can answer anymore.
                        return StopReason::Shutdown;
                    }
                    None
                }
                Err(BridgeError::Serialization(e)) => Some(format!("Invalid JSON input: {}", e)),
                Err(e) => Some(format!("Invalid request: {}", e)),
            },
        };

        if let Some(message) = rejection {
            tracing::warn!(error = %message, "rejected malformed input line");
            if let Err(e) = sink.send_error(message).await {
                return StopReason::OutputFailed(e.to_string());
            }
        }
    }
}

/// Returns the output error that stopped the loop, if any.
///
/// A failed write clears the running flag so ingestion stops reading
/// requests that can no longer be answered.
async fn processing_loop<W>(
    router: Arc<Router>,
    mut queue: mpsc::UnboundedReceiver<BridgeRequest>,
    sink: ResponseSink<W>,
    running_tx: Arc<watch::Sender<bool>>,
) -> Option<String>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut running = running_tx.subscribe();

    loop {
        if !*running.borrow_and_update() {
            tracing::debug!("processing stopped, queued requests abandoned");
            return None;
        }

        let request = tokio::select! {
            biased;
            changed = running.changed() => {
                if changed.is_err() {
                    return None;
                }
                continue;
            }
            request = queue.recv() => match request {
                Some(request) => request,
                None => return None,
            },
        };

        let response = dispatch(Arc::clone(&router), request).await;
        if let Err(e) = sink.send(&response).await {
            tracing::error!(error = %e, "failed to write response");
            running_tx.send_replace(false);
            return Some(e.to_string());
        }
    }
}

/// Route one request on a blocking worker.
async fn dispatch(router: Arc<Router>, request: BridgeRequest) -> BridgeResponse {
    let span = tracing::info_span!(
        "request",
        id = %Uuid::new_v4(),
        request_type = request.request_type(),
    );

    let worker_span = span.clone();
    let handle = tokio::task::spawn_blocking(move || {
        let _entered = worker_span.enter();
        router.route(&request)
    });

    async move {
        match handle.await {
            Ok(response) => {
                tracing::debug!(success = response.success, "request routed");
                response
            }
            Err(e) => {
                tracing::error!(error = %e, "routing task failed");
                envelope::error(format!("Processing error: {}", e))
            }
        }
    }
    .instrument(span)
    .await
}
