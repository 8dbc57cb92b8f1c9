#![forbid(unsafe_code)]

//! The history facade seen by editor code.
//!
//! Editor code talks to a [`HistoryClient`] and never to an
//! [`UndoList`] directly, so the same call sites work whether the history
//! lives in this context ([`LocalHistory`]) or behind a transport
//! ([`RemoteHistory`](crate::RemoteHistory)).
//!
//! # Ordering
//!
//! Calls take effect in the order they are made. Only [`dirty`] returns a
//! value; everything else is fire-and-forget for remote clients.
//!
//! [`dirty`]: HistoryClient::dirty

use retrace_core::{CommandFactory, UndoList};
use serde_json::Value;

use crate::error::ClientError;

/// Operations every history handle supports.
pub trait HistoryClient {
    /// Register a command-kind factory with the history.
    fn register(&mut self, id: &str, factory: CommandFactory) -> Result<(), ClientError>;

    /// Record an already-applied edit of kind `id`.
    fn add(&mut self, id: &str, info: Value) -> Result<(), ClientError>;

    /// Seal pending edits into one undo step.
    fn commit(&mut self, description: &str) -> Result<(), ClientError>;

    fn undo(&mut self) -> Result<(), ClientError>;

    fn redo(&mut self) -> Result<(), ClientError>;

    /// Mark the current state as saved.
    fn save(&mut self) -> Result<(), ClientError>;

    /// Drop history, keep registrations.
    fn clear(&mut self) -> Result<(), ClientError>;

    /// Drop history and registrations.
    fn reset(&mut self) -> Result<(), ClientError>;

    /// Whether there are unsaved changes. Blocks on remote clients.
    fn dirty(&mut self) -> Result<bool, ClientError>;
}

/// In-process client holding the [`UndoList`] directly.
#[derive(Debug, Default)]
pub struct LocalHistory {
    list: UndoList,
}

impl LocalHistory {
    #[must_use]
    pub fn new(list: UndoList) -> Self {
        Self { list }
    }

    /// Independent history for a scoped undo domain (a sub-editor, say).
    ///
    /// Shares configuration with this client and nothing else.
    #[must_use]
    pub fn local(&self) -> Self {
        Self::new(self.list.local())
    }

    #[must_use]
    pub fn list(&self) -> &UndoList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut UndoList {
        &mut self.list
    }

    #[must_use]
    pub fn into_inner(self) -> UndoList {
        self.list
    }
}

impl HistoryClient for LocalHistory {
    fn register(&mut self, id: &str, factory: CommandFactory) -> Result<(), ClientError> {
        self.list.register_factory(id, factory);
        Ok(())
    }

    fn add(&mut self, id: &str, info: Value) -> Result<(), ClientError> {
        self.list.add(id, info)?;
        Ok(())
    }

    fn commit(&mut self, description: &str) -> Result<(), ClientError> {
        self.list.commit(description);
        Ok(())
    }

    fn undo(&mut self) -> Result<(), ClientError> {
        self.list.undo();
        Ok(())
    }

    fn redo(&mut self) -> Result<(), ClientError> {
        self.list.redo();
        Ok(())
    }

    fn save(&mut self) -> Result<(), ClientError> {
        self.list.save();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        self.list.clear();
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ClientError> {
        self.list.reset();
        Ok(())
    }

    fn dirty(&mut self) -> Result<bool, ClientError> {
        Ok(self.list.dirty())
    }
}
