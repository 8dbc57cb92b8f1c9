#![forbid(unsafe_code)]

//! Remote history: a proxy client and the host thread that serves it.
//!
//! The [`UndoList`] lives on a dedicated host thread. Clients hold a
//! [`RemoteHistory`] that encodes each call as a [`HistoryRequest`] frame
//! and pushes it through a [`Transport`].
//!
//! # Ordering
//!
//! [`ChannelTransport`] feeds a single bounded FIFO channel drained by a
//! single host thread, so frames from one client are applied in send order.
//! A `dirty` request sent after a batch of fire-and-forget calls observes
//! all of them.
//!
//! # Change notifications
//!
//! The hosted list's "changed" events are relayed to a separate
//! `retrace-notify` thread, which runs [`HistoryHost::subscribe`] callbacks.
//! A callback may therefore call back into the host (`dirty()` to refresh a
//! modified indicator, say) without stalling it.
//!
//! # Failure handling
//!
//! History-level failures (unknown command kind, rejected payload) are logged
//! on the host under `retrace.host` and dropped. Only transport problems
//! reach the client as [`ClientError`].

use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use retrace_core::{ChangeNotifier, CommandFactory, Subscription, UndoList};
use serde_json::Value;

use crate::client::HistoryClient;
use crate::error::ClientError;
use crate::protocol::{HistoryReply, HistoryRequest};

/// Channel capacity for the host's inbound queue.
const CHANNEL_CAPACITY: usize = 256;

/// Reply wait used when none is configured.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(1000);

/// Ordered frame delivery to a history host.
pub trait Transport {
    /// Deliver a frame without waiting for the host to handle it.
    fn send(&self, frame: String) -> Result<(), ClientError>;

    /// Deliver a frame and block for the reply frame.
    fn request(&self, frame: String) -> Result<String, ClientError>;
}

/// [`HistoryClient`] that forwards every call to a host.
#[derive(Debug, Clone)]
pub struct RemoteHistory<T> {
    transport: T,
}

impl<T: Transport> RemoteHistory<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn post(&self, request: &HistoryRequest) -> Result<(), ClientError> {
        tracing::trace!(target: "retrace.host", channel = request.channel(), "post");
        self.transport.send(request.encode()?)
    }

    fn call(&self, request: &HistoryRequest) -> Result<HistoryReply, ClientError> {
        tracing::trace!(target: "retrace.host", channel = request.channel(), "call");
        let reply = self.transport.request(request.encode()?)?;
        Ok(HistoryReply::decode(&reply)?)
    }
}

impl<T: Transport> HistoryClient for RemoteHistory<T> {
    fn register(&mut self, _id: &str, _factory: CommandFactory) -> Result<(), ClientError> {
        Err(ClientError::Unsupported("register"))
    }

    fn add(&mut self, id: &str, info: Value) -> Result<(), ClientError> {
        self.post(&HistoryRequest::Add {
            id: id.to_owned(),
            info,
        })
    }

    fn commit(&mut self, description: &str) -> Result<(), ClientError> {
        self.post(&HistoryRequest::Commit {
            description: description.to_owned(),
        })
    }

    fn undo(&mut self) -> Result<(), ClientError> {
        self.post(&HistoryRequest::Undo)
    }

    fn redo(&mut self) -> Result<(), ClientError> {
        self.post(&HistoryRequest::Redo)
    }

    fn save(&mut self) -> Result<(), ClientError> {
        self.post(&HistoryRequest::Save)
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        self.post(&HistoryRequest::Clear)
    }

    fn reset(&mut self) -> Result<(), ClientError> {
        self.post(&HistoryRequest::Reset)
    }

    fn dirty(&mut self) -> Result<bool, ClientError> {
        match self.call(&HistoryRequest::Dirty)? {
            HistoryReply::Dirty { value } => Ok(value),
            other => Err(ClientError::UnexpectedReply {
                request: HistoryRequest::Dirty.channel(),
                reply: format!("{other:?}"),
            }),
        }
    }
}

/// A frame plus the channel to answer on, if the caller is waiting.
#[derive(Debug)]
struct Envelope {
    frame: String,
    reply: Option<mpsc::SyncSender<String>>,
}

#[derive(Debug)]
enum HostMsg {
    Frame(Envelope),
    Shutdown,
}

/// Forwards the hosted list's change events to the notify thread.
#[derive(Debug)]
struct NotifyRelay {
    _forward: Subscription,
    handle: JoinHandle<()>,
}

impl NotifyRelay {
    fn start(list: &UndoList, notifier: ChangeNotifier) -> Result<Self, ClientError> {
        let (tx, rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("retrace-notify".into())
            .spawn(move || {
                while rx.recv().is_ok() {
                    notifier.notify();
                }
            })?;
        // Unbounded so the host thread never waits on observers.
        let forward = list.subscribe(move || {
            let _ = tx.send(());
        });
        Ok(Self {
            _forward: forward,
            handle,
        })
    }

    /// Deliver events already queued, then stop.
    fn stop(self) {
        let Self { _forward, handle } = self;
        drop(_forward);
        if handle.join().is_err() {
            tracing::error!(target: "retrace.host", "change observer panicked");
        }
    }
}

/// Thread that owns an [`UndoList`] and serves requests to it.
///
/// Dropping the host stops the thread after it drains frames already queued.
#[derive(Debug)]
pub struct HistoryHost {
    sender: mpsc::SyncSender<HostMsg>,
    handle: Option<JoinHandle<UndoList>>,
    relay: Option<NotifyRelay>,
    notifier: ChangeNotifier,
    reply_timeout: Duration,
}

impl HistoryHost {
    /// Move `list` onto a new host thread.
    ///
    /// Register command factories on `list` before spawning; the host does
    /// not accept registrations over the wire.
    pub fn spawn(list: UndoList) -> Result<Self, ClientError> {
        Self::with_reply_timeout(list, DEFAULT_REPLY_TIMEOUT)
    }

    /// Like [`spawn`](Self::spawn), with the wait bound for sync requests.
    pub fn with_reply_timeout(list: UndoList, reply_timeout: Duration) -> Result<Self, ClientError> {
        let (tx, rx) = mpsc::sync_channel::<HostMsg>(CHANNEL_CAPACITY);
        let notifier = ChangeNotifier::new();
        let relay = NotifyRelay::start(&list, notifier.clone())?;

        let handle = thread::Builder::new()
            .name("retrace-host".into())
            .spawn(move || host_loop(list, rx))?;

        tracing::debug!(target: "retrace.host", "history host started");
        Ok(Self {
            sender: tx,
            handle: Some(handle),
            relay: Some(relay),
            notifier,
            reply_timeout,
        })
    }

    /// A transport feeding this host.
    #[must_use]
    pub fn transport(&self) -> ChannelTransport {
        ChannelTransport {
            sender: self.sender.clone(),
            timeout: self.reply_timeout,
        }
    }

    /// A client bound to this host.
    #[must_use]
    pub fn client(&self) -> RemoteHistory<ChannelTransport> {
        RemoteHistory::new(self.transport())
    }

    /// Change notifier fed by the hosted list.
    ///
    /// Callbacks run on the `retrace-notify` thread, after the host has moved
    /// on, so they may issue requests of their own. Subscribers added to the
    /// list itself before [`spawn`](Self::spawn) still run on the host thread.
    #[must_use]
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }

    /// Handle one request against `list`.
    ///
    /// Returns the reply for requests that expect one.
    pub fn dispatch(list: &mut UndoList, request: HistoryRequest) -> Option<HistoryReply> {
        tracing::debug!(target: "retrace.host", channel = request.channel(), "dispatch");
        match request {
            HistoryRequest::Add { id, info } => {
                // UndoList already logged the failure; nothing to report back.
                let _ = list.add(&id, info);
            }
            HistoryRequest::Commit { description } => list.commit(description),
            HistoryRequest::Undo => list.undo(),
            HistoryRequest::Redo => list.redo(),
            HistoryRequest::Save => list.save(),
            HistoryRequest::Clear => list.clear(),
            HistoryRequest::Reset => list.reset(),
            HistoryRequest::Dirty => {
                return Some(HistoryReply::Dirty {
                    value: list.dirty(),
                });
            }
        }
        None
    }

    /// Stop the thread and take the list back.
    ///
    /// Frames queued before this call are still applied. Returns `None` if
    /// the host thread panicked.
    pub fn shutdown(mut self) -> Option<UndoList> {
        self.stop()
    }

    fn stop(&mut self) -> Option<UndoList> {
        let _ = self.sender.send(HostMsg::Shutdown);
        let handle = self.handle.take()?;
        let list = match handle.join() {
            Ok(list) => Some(list),
            Err(_) => {
                tracing::error!(target: "retrace.host", "history host panicked");
                None
            }
        };
        if let Some(relay) = self.relay.take() {
            relay.stop();
        }
        list
    }
}

impl Drop for HistoryHost {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn host_loop(mut list: UndoList, rx: mpsc::Receiver<HostMsg>) -> UndoList {
    while let Ok(msg) = rx.recv() {
        match msg {
            HostMsg::Frame(envelope) => handle_frame(&mut list, envelope),
            HostMsg::Shutdown => break,
        }
    }
    tracing::debug!(target: "retrace.host", "history host stopped");
    list
}

fn handle_frame(list: &mut UndoList, envelope: Envelope) {
    let reply = match HistoryRequest::decode(&envelope.frame) {
        Ok(request) => HistoryHost::dispatch(list, request),
        Err(err) => {
            tracing::warn!(
                target: "retrace.host",
                error = %err,
                frame = %envelope.frame,
                "dropping malformed frame"
            );
            Some(HistoryReply::Error {
                message: err.to_string(),
            })
        }
    };

    let (Some(tx), Some(reply)) = (envelope.reply, reply) else {
        return;
    };
    match reply.encode() {
        // The caller may have timed out and gone away.
        Ok(frame) => {
            let _ = tx.try_send(frame);
        }
        Err(err) => {
            tracing::error!(target: "retrace.host", error = %err, "failed to encode reply");
        }
    }
}

/// In-process [`Transport`] backed by the host's channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::SyncSender<HostMsg>,
    timeout: Duration,
}

impl ChannelTransport {
    #[must_use]
    pub fn reply_timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for ChannelTransport {
    fn send(&self, frame: String) -> Result<(), ClientError> {
        self.sender
            .send(HostMsg::Frame(Envelope { frame, reply: None }))
            .map_err(|_| ClientError::Disconnected)
    }

    fn request(&self, frame: String) -> Result<String, ClientError> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.sender
            .send(HostMsg::Frame(Envelope {
                frame,
                reply: Some(reply_tx),
            }))
            .map_err(|_| ClientError::Disconnected)?;
        reply_rx.recv_timeout(self.timeout).map_err(|err| match err {
            mpsc::RecvTimeoutError::Timeout => ClientError::Timeout(self.timeout),
            mpsc::RecvTimeoutError::Disconnected => ClientError::Disconnected,
        })
    }
}
