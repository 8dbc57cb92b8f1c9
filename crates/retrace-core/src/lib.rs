#![forbid(unsafe_code)]

//! Retrace Core
//!
//! Transactional undo/redo history for editors.
//!
//! # Key Components
//!
//! - [`Command`] - One reversible edit, built by a registered factory
//! - [`CommandGroup`] - Commands committed, undone and redone as a unit
//! - [`CommandRegistry`] - Command-kind id to factory lookup
//! - [`UndoList`] - The history: committed groups, cursor, save point and the
//!   pending group of uncommitted edits
//! - [`ChangeNotifier`] - "History changed" broadcast fired after every
//!   mutating call
//!
//! # Quick Start
//!
//! ```ignore
//! use retrace_core::{Command, CommandResult, UndoList};
//! use serde_json::json;
//!
//! let mut history = UndoList::default();
//! history.register_typed("move", |info: MoveInfo| MoveCmd::new(info));
//!
//! // Apply the edit, then record it.
//! history.add("move", json!({ "from": 0, "to": 5 }))?;
//! history.commit("Move item");
//!
//! history.undo();
//! history.redo();
//! ```

pub mod command;
pub mod notify;
pub mod registry;
pub mod undo_list;

pub use command::{Command, CommandError, CommandGroup, CommandResult};
pub use notify::{ChangeNotifier, Subscription};
pub use registry::{CommandFactory, CommandRegistry};
pub use undo_list::{HistoryConfig, HistoryError, UndoList};
