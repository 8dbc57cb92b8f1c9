#![forbid(unsafe_code)]

//! Reversible commands and the groups that batch them.
//!
//! A [`Command`] is one reversible edit. Concrete kinds live outside this
//! crate; the history only ever sees them through the trait, built by a
//! factory looked up in the [`CommandRegistry`](crate::CommandRegistry).
//!
//! A [`CommandGroup`] is the atomic unit the history stores: everything added
//! between two commits is redone front to back and undone back to front.
//!
//! # Invariants
//!
//! - `redo()` visits commands in insertion order.
//! - `undo()` visits commands in reverse insertion order, since later
//!   commands may depend on state established by earlier ones.
//! - A group is dirty iff any of its commands is dirty.
//! - An empty group cannot be committed.
//!
//! # Failure Modes
//!
//! - **Unimplemented kind**: a command that never overrides `undo`/`redo`
//!   returns [`CommandError::Unimplemented`]. The group logs a warning and
//!   carries on; the edit behaves as a no-op.
//! - **Failing command**: any other error is logged the same way. Remaining
//!   commands in the group still run so one broken kind cannot wedge the
//!   history.

use std::fmt;

/// Result of undoing or redoing a single command.
pub type CommandResult = Result<(), CommandError>;

/// Errors raised by commands and their factories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The command kind does not implement the requested direction.
    #[error("command {kind} does not implement {op}")]
    Unimplemented {
        kind: &'static str,
        op: &'static str,
    },
    /// The `info` payload could not be turned into a command.
    #[error("invalid command payload: {0}")]
    InvalidInfo(String),
    /// The command target is gone or in an unexpected state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInfo(err.to_string())
    }
}

/// A reversible unit of edit.
///
/// Commands are built already applied: the caller performs the edit, then
/// records it with [`UndoList::add`](crate::UndoList::add). `undo` must
/// exactly reverse `redo`.
pub trait Command: Send {
    /// Revert the effect of this command.
    fn undo(&mut self) -> CommandResult {
        Err(CommandError::Unimplemented {
            kind: self.debug_name(),
            op: "undo",
        })
    }

    /// Re-apply the effect of this command after it was undone.
    fn redo(&mut self) -> CommandResult {
        Err(CommandError::Unimplemented {
            kind: self.debug_name(),
            op: "redo",
        })
    }

    /// Whether this command changes the document in a way that needs saving.
    ///
    /// Selection changes and other view-only edits can return `false`.
    fn is_dirty(&self) -> bool {
        true
    }

    /// Kind name used in logs.
    fn debug_name(&self) -> &'static str {
        "Command"
    }
}

impl fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

/// Ordered batch of commands committed, undone and redone as one.
#[derive(Default)]
pub struct CommandGroup {
    /// Commands in apply order.
    commands: Vec<Box<dyn Command>>,
    /// Human-readable label shown in history UIs.
    description: String,
}

impl fmt::Debug for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandGroup")
            .field("commands_count", &self.commands.len())
            .field("description", &self.description)
            .finish()
    }
}

impl CommandGroup {
    /// Create an empty group with no description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command. It will be redone after, and undone before, every
    /// command already in the group.
    pub fn add(&mut self, cmd: Box<dyn Command>) {
        self.commands.push(cmd);
    }

    /// Undo every command, last added first. No-op when empty.
    pub fn undo(&mut self) {
        for cmd in self.commands.iter_mut().rev() {
            if let Err(err) = cmd.undo() {
                report_failure(cmd.as_ref(), "undo", &err);
            }
        }
    }

    /// Redo every command, first added first.
    pub fn redo(&mut self) {
        for cmd in &mut self.commands {
            if let Err(err) = cmd.redo() {
                report_failure(cmd.as_ref(), "redo", &err);
            }
        }
    }

    /// True iff any command reports dirty.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.commands.iter().any(|c| c.is_dirty())
    }

    /// True iff the group holds at least one command.
    #[must_use]
    pub fn can_commit(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Drop every command without undoing it.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of commands in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }
}

fn report_failure(cmd: &dyn Command, op: &'static str, err: &CommandError) {
    tracing::warn!(
        target: "retrace.command",
        kind = cmd.debug_name(),
        op,
        error = %err,
        "command failed, treating as no-op"
    );
}

// ============================================================================
// Tests
// ============================================================================
