#![forbid(unsafe_code)]

//! Command-kind registry.
//!
//! Maps a command-kind identifier to the factory that builds it from an
//! `info` payload. The payload is a [`serde_json::Value`] so the same call can
//! arrive in-process or as a serialized frame from another context.
//!
//! Registration is last-writer-wins: registering an id twice silently replaces
//! the earlier factory.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::command::{Command, CommandError};

/// Builds a command from its `info` payload.
pub type CommandFactory =
    Arc<dyn Fn(Value) -> Result<Box<dyn Command>, CommandError> + Send + Sync>;

/// Lookup table from command-kind id to factory.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    factories: HashMap<String, CommandFactory>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("CommandRegistry").field("ids", &ids).finish()
    }
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite the factory for `id`.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(Value) -> Result<Box<dyn Command>, CommandError> + Send + Sync + 'static,
    {
        self.insert(id, Arc::new(factory));
    }

    /// Store or overwrite an already shared factory.
    pub fn insert(&mut self, id: impl Into<String>, factory: CommandFactory) {
        self.factories.insert(id.into(), factory);
    }

    /// Register a factory that takes a typed payload.
    ///
    /// The raw `info` is deserialized into `T` before `build` runs; a payload
    /// that does not match `T` surfaces as [`CommandError::InvalidInfo`].
    pub fn register_typed<T, C, F>(&mut self, id: impl Into<String>, build: F)
    where
        T: DeserializeOwned + 'static,
        C: Command + 'static,
        F: Fn(T) -> C + Send + Sync + 'static,
    {
        self.register(id, move |info: Value| {
            let payload: T = serde_json::from_value(info)?;
            Ok(Box::new(build(payload)) as Box<dyn Command>)
        });
    }

    /// Look up the factory for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CommandFactory> {
        self.factories.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        self.factories.clear();
    }
}
