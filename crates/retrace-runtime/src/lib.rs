#![forbid(unsafe_code)]

//! Clients, transport and configuration for Retrace histories.
//!
//! [`retrace_core`] holds the history itself. This crate decides where that
//! history lives and how editor code reaches it:
//!
//! - [`LocalHistory`] calls an in-process [`UndoList`](retrace_core::UndoList).
//! - [`RemoteHistory`] encodes calls as [`HistoryRequest`] frames for a
//!   [`HistoryHost`] thread.
//! - [`HistorySession`] picks one of the two from a [`RetraceConfig`].

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod remote;
pub mod session;

pub use client::{HistoryClient, LocalHistory};
pub use config::{LoggingConfig, RetraceConfig, TransportConfig, TransportMode};
pub use error::{ClientError, ConfigError, LoggingError};
pub use logging::init_tracing;
pub use protocol::{HistoryReply, HistoryRequest};
pub use remote::{ChannelTransport, DEFAULT_REPLY_TIMEOUT, HistoryHost, RemoteHistory, Transport};
pub use session::HistorySession;
