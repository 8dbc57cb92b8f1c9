#![forbid(unsafe_code)]

//! A history handle wired up from [`RetraceConfig`].
//!
//! [`HistorySession`] owns the history for one document. Depending on
//! [`TransportMode`] it either calls an in-process [`UndoList`] directly or
//! starts a [`HistoryHost`] and talks to it through a channel. Callers see the
//! same [`HistoryClient`] either way.

use retrace_core::{ChangeNotifier, CommandFactory, Subscription, UndoList};
use serde_json::Value;

use crate::client::{HistoryClient, LocalHistory};
use crate::config::{RetraceConfig, TransportMode};
use crate::error::{ClientError, ConfigError};
use crate::remote::{ChannelTransport, HistoryHost, RemoteHistory};

enum Backend {
    InProcess(LocalHistory),
    Threaded {
        client: RemoteHistory<ChannelTransport>,
        host: HistoryHost,
    },
}

/// History for one document, local or hosted.
pub struct HistorySession {
    backend: Backend,
    notifier: ChangeNotifier,
}

impl std::fmt::Debug for HistorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistorySession")
            .field("mode", &self.mode())
            .field("version", &self.notifier.version())
            .finish()
    }
}

impl HistorySession {
    /// Build the history described by `config`.
    ///
    /// `config` is validated first; out-of-range values fail with
    /// [`ClientError::Config`]. `setup` runs on the fresh list before it is
    /// handed to the backend, so command factories registered there work in
    /// both modes.
    pub fn open(
        config: &RetraceConfig,
        setup: impl FnOnce(&mut UndoList),
    ) -> Result<Self, ClientError> {
        let errors = config.validate();
        if !errors.is_empty() {
            tracing::error!(
                target: "retrace.host",
                errors = %errors.join("; "),
                "refusing invalid history config"
            );
            return Err(ConfigError::Invalid(errors).into());
        }

        let mut list = UndoList::new(config.history.clone());
        setup(&mut list);

        let (backend, notifier) = match config.transport.mode {
            TransportMode::InProcess => {
                let notifier = list.notifier().clone();
                (Backend::InProcess(LocalHistory::new(list)), notifier)
            }
            TransportMode::Threaded => {
                let host = HistoryHost::with_reply_timeout(list, config.transport.reply_timeout())?;
                let notifier = host.notifier().clone();
                let backend = Backend::Threaded {
                    client: host.client(),
                    host,
                };
                (backend, notifier)
            }
        };

        tracing::debug!(
            target: "retrace.host",
            mode = ?config.transport.mode,
            max_depth = ?config.history.max_depth,
            "history session opened"
        );
        Ok(Self { backend, notifier })
    }

    #[must_use]
    pub fn mode(&self) -> TransportMode {
        match self.backend {
            Backend::InProcess(_) => TransportMode::InProcess,
            Backend::Threaded { .. } => TransportMode::Threaded,
        }
    }

    /// Change notifier of the underlying list.
    ///
    /// In threaded mode callbacks run on the `retrace-notify` thread and may
    /// call back into the session's history through
    /// [`remote_client`](Self::remote_client).
    #[must_use]
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }

    /// Direct access to the list when it lives in this context.
    #[must_use]
    pub fn list(&self) -> Option<&UndoList> {
        match &self.backend {
            Backend::InProcess(local) => Some(local.list()),
            Backend::Threaded { .. } => None,
        }
    }

    /// A second client for the same hosted history.
    ///
    /// `None` in process, where the session itself is the only handle.
    #[must_use]
    pub fn remote_client(&self) -> Option<RemoteHistory<ChannelTransport>> {
        match &self.backend {
            Backend::InProcess(_) => None,
            Backend::Threaded { host, .. } => Some(host.client()),
        }
    }

    /// End the session and take the list back.
    ///
    /// Returns `None` if the host thread panicked.
    pub fn close(self) -> Option<UndoList> {
        match self.backend {
            Backend::InProcess(local) => Some(local.into_inner()),
            Backend::Threaded { host, .. } => host.shutdown(),
        }
    }

    fn client(&mut self) -> &mut dyn HistoryClient {
        match &mut self.backend {
            Backend::InProcess(local) => local as &mut dyn HistoryClient,
            Backend::Threaded { client, .. } => client,
        }
    }
}

impl HistoryClient for HistorySession {
    /// Only possible in process; hosted lists take registrations in
    /// [`open`](Self::open)'s setup.
    fn register(&mut self, id: &str, factory: CommandFactory) -> Result<(), ClientError> {
        self.client().register(id, factory)
    }

    fn add(&mut self, id: &str, info: Value) -> Result<(), ClientError> {
        self.client().add(id, info)
    }

    fn commit(&mut self, description: &str) -> Result<(), ClientError> {
        self.client().commit(description)
    }

    fn undo(&mut self) -> Result<(), ClientError> {
        self.client().undo()
    }

    fn redo(&mut self) -> Result<(), ClientError> {
        self.client().redo()
    }

    fn save(&mut self) -> Result<(), ClientError> {
        self.client().save()
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        self.client().clear()
    }

    fn reset(&mut self) -> Result<(), ClientError> {
        self.client().reset()
    }

    fn dirty(&mut self) -> Result<bool, ClientError> {
        self.client().dirty()
    }
}
