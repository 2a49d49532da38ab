//! The stdin/stdout request bridge.
//!
//! - [`router`] - request kinds and dispatch to handlers
//! - [`handlers`] - the five standard request handlers
//! - [`fusion`] - fusion mode tags and descriptions
//! - [`sink`] - line-oriented output shared by both loops
//! - [`server`] - ingestion/processing loops and lifecycle

pub mod fusion;
pub mod handlers;
pub mod router;
pub mod server;
pub mod sink;

pub use fusion::FusionMode;
pub use router::{HandlerResult, RequestHandler, RequestKind, Router};
pub use server::{GenesisBridgeServer, ShutdownHandle, StopReason};
pub use sink::ResponseSink;
