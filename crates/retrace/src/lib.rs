#![forbid(unsafe_code)]

//! Retrace public facade crate.
//!
//! Re-exports the history types from `retrace-core` and, with the default
//! `runtime` feature, the clients and configuration from `retrace-runtime`.

// --- Core re-exports -------------------------------------------------------

pub use retrace_core::{
    ChangeNotifier, Command, CommandError, CommandFactory, CommandGroup, CommandRegistry,
    CommandResult, HistoryConfig, HistoryError, Subscription, UndoList,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use retrace_runtime::{
    ClientError, ConfigError, HistoryClient, HistorySession, LocalHistory, RemoteHistory,
    RetraceConfig, TransportMode, init_tracing,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{Command, CommandError, CommandResult, HistoryConfig, UndoList};

    #[cfg(feature = "runtime")]
    pub use crate::{HistoryClient, HistorySession, RetraceConfig};

    pub use crate::core;
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use retrace_core as core;
#[cfg(feature = "runtime")]
pub use retrace_runtime as runtime;
