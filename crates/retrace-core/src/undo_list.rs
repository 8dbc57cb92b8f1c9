#![forbid(unsafe_code)]

//! Linear undo history of committed command groups.
//!
//! [`UndoList`] keeps an ordered list of committed [`CommandGroup`]s, a cursor
//! into it, a save-point marker and a pending group that accumulates
//! uncommitted edits.
//!
//! # Cursor Model
//!
//! `position == None` means nothing has been committed. `position == Some(p)`
//! means `groups[..=p]` are applied and `groups[p + 1..]` can be redone.
//!
//! ```text
//! commit x3                    undo()                      add(..)  <-- truncates
//! ┌─────────────────────┐     ┌─────────────────────┐     ┌─────────────────────┐
//! │ [g0, g1, g2]        │     │ [g0, g1, g2]        │     │ [g0, g1] + pending  │
//! │            ^ pos 2  │     │        ^ pos 1      │     │        ^ pos 1      │
//! └─────────────────────┘     └─────────────────────┘     └─────────────────────┘
//! ```
//!
//! The first committed group is the baseline: stack-level undo stops at
//! `Some(0)` without reverting it, and redo from `None` jumps straight to
//! index 1. A freshly added but uncommitted edit can still be reverted through
//! the pending group.
//!
//! # Invariants
//!
//! 1. `position.map_or(0, |p| p + 1) <= groups.len()`.
//! 2. After a successful `commit`, `position` indexes the pushed group.
//! 3. Any `add` while redo history exists drops `groups[position + 1..]`.
//! 4. `dirty()` is false right after `save()`.
//! 5. A call that fails (unknown kind, bad payload) leaves the history as it
//!    was.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::{CommandError, CommandGroup};
use crate::notify::{ChangeNotifier, Subscription};
use crate::registry::{CommandFactory, CommandRegistry};

/// Tunables for an [`UndoList`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of committed groups kept. The oldest groups are evicted
    /// after a commit pushes the count past the limit. `None` keeps everything.
    pub max_depth: Option<usize>,
}

impl HistoryConfig {
    /// Create a configuration with a depth limit. A limit of 0 is raised to 1.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth.max(1)),
        }
    }

    /// Create unlimited configuration.
    #[must_use]
    pub fn unlimited() -> Self {
        Self { max_depth: None }
    }
}

/// Errors reported by [`UndoList::add`]. The history is untouched when one is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// No factory registered for the command kind.
    #[error("cannot find undo command {0}, register it first")]
    Unregistered(String),
    /// The factory rejected the payload.
    #[error("cannot build undo command {id}: {source}")]
    Factory {
        id: String,
        #[source]
        source: CommandError,
    },
}

/// Where the document was last saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SavePoint {
    /// Cursor value at the last save.
    At(Option<usize>),
    /// The saved state was truncated or evicted and can no longer be reached.
    Lost,
}

/// Undo/redo history with grouped commits and a save point.
pub struct UndoList {
    registry: CommandRegistry,
    pending: CommandGroup,
    groups: Vec<CommandGroup>,
    position: Option<usize>,
    save_point: SavePoint,
    notifier: ChangeNotifier,
    config: HistoryConfig,
}

impl fmt::Debug for UndoList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoList")
            .field("groups", &self.groups.len())
            .field("position", &self.position)
            .field("save_point", &self.save_point)
            .field("pending", &self.pending.len())
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for UndoList {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl UndoList {
    /// Create an empty history with no registered command kinds.
    ///
    /// A `max_depth` of 0 would evict every commit, so it is raised to 1.
    #[must_use]
    pub fn new(mut config: HistoryConfig) -> Self {
        if config.max_depth == Some(0) {
            tracing::warn!(target: "retrace.history", "max_depth 0 raised to 1");
            config.max_depth = Some(1);
        }
        Self {
            registry: CommandRegistry::new(),
            pending: CommandGroup::new(),
            groups: Vec::new(),
            position: None,
            save_point: SavePoint::At(None),
            notifier: ChangeNotifier::new(),
            config,
        }
    }

    /// Create an independent history for a scoped undo domain.
    ///
    /// The new list shares this list's configuration and nothing else: it has
    /// its own registry, stack and subscribers.
    #[must_use]
    pub fn local(&self) -> Self {
        Self::new(self.config.clone())
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Store or overwrite the factory for command kind `id`.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(Value) -> Result<Box<dyn crate::Command>, CommandError> + Send + Sync + 'static,
    {
        self.registry.register(id, factory);
    }

    /// Store or overwrite an already shared factory for `id`.
    pub fn register_factory(&mut self, id: impl Into<String>, factory: CommandFactory) {
        self.registry.insert(id, factory);
    }

    /// Register a factory taking a typed payload. See
    /// [`CommandRegistry::register_typed`].
    pub fn register_typed<T, C, F>(&mut self, id: impl Into<String>, build: F)
    where
        T: serde::de::DeserializeOwned + 'static,
        C: crate::Command + 'static,
        F: Fn(T) -> C + Send + Sync + 'static,
    {
        self.registry.register_typed(id, build);
    }

    #[must_use]
    pub fn is_registered(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Record an already-applied edit of kind `id` in the pending group.
    ///
    /// Redo history is discarded first. An unknown kind or a payload the
    /// factory rejects is logged and returned; nothing changes in that case.
    pub fn add(&mut self, id: &str, info: Value) -> Result<(), HistoryError> {
        let Some(factory) = self.registry.get(id) else {
            tracing::error!(
                target: "retrace.history",
                id,
                "cannot find undo command, register it first"
            );
            return Err(HistoryError::Unregistered(id.to_owned()));
        };

        let cmd = match factory(info) {
            Ok(cmd) => cmd,
            Err(source) => {
                tracing::error!(
                    target: "retrace.history",
                    id,
                    error = %source,
                    "undo command factory rejected payload"
                );
                return Err(HistoryError::Factory {
                    id: id.to_owned(),
                    source,
                });
            }
        };

        self.clear_redo();
        self.pending.add(cmd);
        tracing::debug!(
            target: "retrace.history",
            id,
            pending = self.pending.len(),
            "command added"
        );
        self.changed();
        Ok(())
    }

    /// Seal the pending group onto the stack with `description`.
    ///
    /// Does nothing visible when the pending group is empty. Either way the
    /// pending group is replaced by a fresh one.
    pub fn commit(&mut self, description: impl Into<String>) {
        let mut group = std::mem::take(&mut self.pending);
        if !group.can_commit() {
            return;
        }

        group.set_description(description);
        tracing::debug!(
            target: "retrace.history",
            description = group.description(),
            commands = group.len(),
            "group committed"
        );
        self.groups.push(group);
        let next = self.applied_len();
        debug_assert_eq!(next + 1, self.groups.len());
        self.position = Some(next);

        self.enforce_limits();
        self.changed();
    }

    /// Undo the most recent edit.
    ///
    /// Uncommitted edits take priority: if the pending group holds anything it
    /// is reverted and discarded without touching the stack. Otherwise the
    /// last applied group is reverted, unless it is the baseline group at
    /// index 0.
    pub fn undo(&mut self) {
        if self.pending.can_commit() {
            tracing::debug!(
                target: "retrace.history",
                commands = self.pending.len(),
                "reverting uncommitted edits"
            );
            self.pending.undo();
            self.pending.clear();
            self.changed();
            return;
        }

        let Some(pos) = self.position else {
            return;
        };
        if pos == 0 {
            tracing::trace!(target: "retrace.history", "undo stopped at baseline group");
            return;
        }

        let group = &mut self.groups[pos];
        tracing::debug!(
            target: "retrace.history",
            position = pos,
            description = group.description(),
            "undo"
        );
        group.undo();
        self.position = Some(pos - 1);
        self.changed();
    }

    /// Re-apply the next undone group.
    ///
    /// Index 0 is the baseline and is never re-applied: redo from an empty
    /// cursor lands on index 1.
    pub fn redo(&mut self) {
        let Some(next) = self.next_redo_index() else {
            return;
        };

        let group = &mut self.groups[next];
        tracing::debug!(
            target: "retrace.history",
            position = next,
            description = group.description(),
            "redo"
        );
        group.redo();
        self.position = Some(next);
        self.changed();
    }

    /// Mark the current cursor as the saved state.
    pub fn save(&mut self) {
        self.save_point = SavePoint::At(self.position);
        tracing::debug!(target: "retrace.history", position = ?self.position, "save point set");
        self.changed();
    }

    /// Drop all history. Registrations are kept.
    pub fn clear(&mut self) {
        self.pending = CommandGroup::new();
        self.groups.clear();
        self.position = None;
        self.save_point = SavePoint::At(None);
        self.changed();
    }

    /// Drop all history and every registration.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.clear();
    }

    /// True when the current state differs from the saved one in a way that
    /// needs saving.
    ///
    /// Only groups between the save point and the cursor are consulted; a
    /// range made purely of non-dirty commands (selection changes, say) is
    /// clean. A save point that was truncated away always reads as dirty.
    #[must_use]
    pub fn dirty(&self) -> bool {
        let saved = match self.save_point {
            SavePoint::At(saved) => saved,
            SavePoint::Lost => return true,
        };
        if saved == self.position {
            return false;
        }

        let (lo, hi) = if saved < self.position {
            (saved, self.position)
        } else {
            (self.position, saved)
        };
        let Some(hi) = hi else {
            return false;
        };
        let start = lo.map_or(0, |i| i + 1);

        (start..=hi).any(|i| self.groups.get(i).is_none_or(CommandGroup::is_dirty))
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Cursor into the committed groups. `None` when nothing is applied.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Number of committed groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Committed group at `index`.
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&CommandGroup> {
        self.groups.get(index)
    }

    /// Whether uncommitted edits are waiting in the pending group.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.can_commit()
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether [`undo`](Self::undo) would change anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.has_pending() || self.position.is_some_and(|p| p > 0)
    }

    /// Whether [`redo`](Self::redo) would change anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.next_redo_index().is_some()
    }

    /// Description of the group the next stack-level undo would revert.
    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        match self.position {
            Some(p) if p > 0 => Some(self.groups[p].description()),
            _ => None,
        }
    }

    /// Description of the group the next redo would apply.
    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.next_redo_index()
            .map(|i| self.groups[i].description())
    }

    /// Descriptions of undoable groups, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        let applied = self.applied_len();
        self.groups[..applied]
            .iter()
            .skip(1)
            .rev()
            .take(limit)
            .map(CommandGroup::description)
            .collect()
    }

    /// Descriptions of redoable groups, next redo first.
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        let Some(next) = self.next_redo_index() else {
            return Vec::new();
        };
        self.groups[next..]
            .iter()
            .take(limit)
            .map(CommandGroup::description)
            .collect()
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Run `callback` after every mutating call.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }

    /// Handle to the change broadcaster, for observers that outlive a borrow.
    #[must_use]
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Number of change notifications sent.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.notifier.version()
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Number of groups currently applied.
    fn applied_len(&self) -> usize {
        self.position.map_or(0, |p| p + 1)
    }

    /// Index redo would apply, skipping the baseline group at 0.
    fn next_redo_index(&self) -> Option<usize> {
        let next = self.applied_len().max(1);
        (next < self.groups.len()).then_some(next)
    }

    /// Discard redo history ahead of the cursor.
    fn clear_redo(&mut self) {
        let keep = self.applied_len();
        if keep == self.groups.len() {
            return;
        }

        tracing::debug!(
            target: "retrace.history",
            dropped = self.groups.len() - keep,
            "discarding redo history"
        );
        self.groups.truncate(keep);
        // Redo history only exists after a stack-level undo, which needs an
        // empty pending group.
        debug_assert!(self.pending.is_empty());
        self.pending.clear();
        if matches!(self.save_point, SavePoint::At(Some(saved)) if saved >= keep) {
            self.save_point = SavePoint::Lost;
        }
    }

    /// Evict the oldest groups past `max_depth`, shifting cursor and save
    /// point to match.
    fn enforce_limits(&mut self) {
        let Some(max_depth) = self.config.max_depth else {
            return;
        };
        let excess = self.groups.len().saturating_sub(max_depth);
        if excess == 0 {
            return;
        }

        self.groups.drain(..excess);
        self.position = self.position.and_then(|p| p.checked_sub(excess));
        self.save_point = match self.save_point {
            SavePoint::At(Some(saved)) if saved >= excess => SavePoint::At(Some(saved - excess)),
            SavePoint::At(Some(saved)) if saved + 1 == excess => SavePoint::At(None),
            _ => SavePoint::Lost,
        };
        tracing::debug!(
            target: "retrace.history",
            evicted = excess,
            max_depth,
            "evicted oldest groups"
        );
    }

    fn changed(&self) {
        self.notifier.notify();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandResult};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Shared document the test commands edit.
    type Doc = Arc<Mutex<Vec<i64>>>;

    #[derive(Deserialize)]
    struct PushInfo {
        value: i64,
        #[serde(default = "default_dirty")]
        dirty: bool,
    }

    fn default_dirty() -> bool {
        true
    }

    /// Records a push that was already applied to `doc`.
    struct PushCmd {
        doc: Doc,
        value: i64,
        dirty: bool,
    }

    impl Command for PushCmd {
        fn undo(&mut self) -> CommandResult {
            let popped = self.doc.lock().unwrap().pop();
            assert_eq!(popped, Some(self.value));
            Ok(())
        }

        fn redo(&mut self) -> CommandResult {
            self.doc.lock().unwrap().push(self.value);
            Ok(())
        }

        fn is_dirty(&self) -> bool {
            self.dirty
        }

        fn debug_name(&self) -> &'static str {
            "PushCmd"
        }
    }

    fn history() -> (UndoList, Doc) {
        history_with(HistoryConfig::default())
    }

    fn history_with(config: HistoryConfig) -> (UndoList, Doc) {
        let doc: Doc = Arc::new(Mutex::new(Vec::new()));
        let mut list = UndoList::new(config);
        let d = doc.clone();
        list.register_typed("push", move |info: PushInfo| PushCmd {
            doc: d.clone(),
            value: info.value,
            dirty: info.dirty,
        });
        (list, doc)
    }

    /// Apply a push to the document and record it.
    fn push(list: &mut UndoList, doc: &Doc, value: i64) {
        doc.lock().unwrap().push(value);
        list.add("push", json!({ "value": value })).unwrap();
    }

    fn commit_push(list: &mut UndoList, doc: &Doc, value: i64) {
        push(list, doc, value);
        list.commit(format!("push {value}"));
    }

    fn snapshot(doc: &Doc) -> Vec<i64> {
        doc.lock().unwrap().clone()
    }

    #[test]
    fn new_list_is_empty() {
        let list = UndoList::default();
        assert!(list.is_empty());
        assert_eq!(list.position(), None);
        assert!(!list.can_undo());
        assert!(!list.can_redo());
        assert!(!list.dirty());
    }

    #[test]
    fn commit_advances_position() {
        let (mut list, doc) = history();
        for i in 0..4 {
            commit_push(&mut list, &doc, i);
            assert_eq!(list.position(), Some(i as usize));
            assert_eq!(list.len(), i as usize + 1);
        }
        assert_eq!(list.group(2).unwrap().description(), "push 2");
    }

    #[test]
    fn commit_without_pending_is_noop() {
        let (mut list, _doc) = history();
        let version = list.version();
        list.commit("nothing");
        assert!(list.is_empty());
        assert_eq!(list.position(), None);
        assert_eq!(list.version(), version);
    }

    #[test]
    fn commit_groups_multiple_adds() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        push(&mut list, &doc, 1);
        push(&mut list, &doc, 2);
        list.commit("two pushes");

        assert_eq!(list.len(), 2);
        assert_eq!(list.group(1).unwrap().len(), 2);

        list.undo();
        assert_eq!(snapshot(&doc), vec![0]);
        list.redo();
        assert_eq!(snapshot(&doc), vec![0, 1, 2]);
    }

    #[test]
    fn unregistered_add_leaves_history_untouched() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        let version = list.version();

        let err = list.add("rotate", json!({})).unwrap_err();
        assert_eq!(err, HistoryError::Unregistered("rotate".into()));
        assert!(!list.has_pending());
        assert_eq!(list.len(), 1);
        assert_eq!(list.version(), version);
    }

    #[test]
    fn rejected_payload_leaves_redo_history_alone() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        commit_push(&mut list, &doc, 1);
        commit_push(&mut list, &doc, 2);
        list.undo();

        let err = list.add("push", json!({ "value": "nope" })).unwrap_err();
        assert!(matches!(err, HistoryError::Factory { .. }));
        assert_eq!(list.len(), 3);
        assert!(list.can_redo());
    }

    #[test]
    fn undo_reverts_last_applied_group() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        commit_push(&mut list, &doc, 1);
        commit_push(&mut list, &doc, 2);

        list.undo();
        assert_eq!(list.position(), Some(1));
        assert_eq!(snapshot(&doc), vec![0, 1]);

        list.undo();
        assert_eq!(list.position(), Some(0));
        assert_eq!(snapshot(&doc), vec![0]);
    }

    #[test]
    fn undo_redo_are_inverse() {
        let (mut list, doc) = history();
        for i in 0..4 {
            commit_push(&mut list, &doc, i);
        }
        list.undo();
        list.undo();
        let before = snapshot(&doc);

        list.redo();
        assert_eq!(snapshot(&doc), vec![0, 1, 2]);
        list.undo();
        assert_eq!(snapshot(&doc), before);
    }

    #[test]
    fn redo_at_tail_is_noop() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        commit_push(&mut list, &doc, 1);
        let version = list.version();

        list.redo();
        assert_eq!(list.position(), Some(1));
        assert_eq!(list.version(), version);
    }

    #[test]
    fn add_after_undo_truncates_redo() {
        let (mut list, doc) = history();
        for i in 0..4 {
            commit_push(&mut list, &doc, i);
        }
        list.undo();
        list.undo();
        assert_eq!(list.position(), Some(1));

        push(&mut list, &doc, 9);
        assert_eq!(list.len(), 2);
        assert!(!list.can_redo());

        list.redo();
        assert_eq!(list.position(), Some(1));

        list.commit("push 9");
        assert_eq!(list.len(), 3);
        assert_eq!(list.position(), Some(2));
        assert_eq!(snapshot(&doc), vec![0, 1, 9]);
    }

    #[test]
    fn undo_prefers_pending_group() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        commit_push(&mut list, &doc, 1);
        push(&mut list, &doc, 2);
        push(&mut list, &doc, 3);

        list.undo();
        assert_eq!(snapshot(&doc), vec![0, 1]);
        assert_eq!(list.position(), Some(1));
        assert_eq!(list.len(), 2);
        assert!(!list.has_pending());

        // Next undo falls through to the stack.
        list.undo();
        assert_eq!(snapshot(&doc), vec![0]);
        assert_eq!(list.position(), Some(0));
    }

    #[test]
    fn pending_undo_reverts_even_the_first_edit() {
        let (mut list, doc) = history();
        push(&mut list, &doc, 7);
        list.undo();
        assert!(snapshot(&doc).is_empty());
        assert!(list.is_empty());
        assert_eq!(list.position(), None);
    }

    /// The first committed group is a floor for stack-level undo. A single
    /// committed "move" cannot be undone once sealed; this mirrors the
    /// established history behavior and is kept on purpose.
    #[test]
    fn baseline_group_is_undo_floor() {
        let undos = Arc::new(AtomicUsize::new(0));
        let mut list = UndoList::default();

        #[derive(Deserialize)]
        struct MoveInfo {
            from: i64,
            to: i64,
        }
        struct Move {
            undos: Arc<AtomicUsize>,
        }
        impl Command for Move {
            fn undo(&mut self) -> CommandResult {
                self.undos.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            fn redo(&mut self) -> CommandResult {
                Ok(())
            }
        }

        let u = undos.clone();
        list.register_typed("move", move |info: MoveInfo| {
            assert!(info.from != info.to);
            Move { undos: u.clone() }
        });

        list.add("move", json!({ "from": 0, "to": 5 })).unwrap();
        list.commit("move item");
        assert_eq!(list.len(), 1);
        assert_eq!(list.position(), Some(0));

        list.undo();
        assert_eq!(list.position(), Some(0));
        assert_eq!(undos.load(Ordering::SeqCst), 0);
        assert!(!list.can_undo());
    }

    #[test]
    fn redo_skips_baseline_index() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        commit_push(&mut list, &doc, 1);
        commit_push(&mut list, &doc, 2);
        doc.lock().unwrap().truncate(1);
        list.position = None;

        assert_eq!(list.redo_description(), Some("push 1"));
        list.redo();
        assert_eq!(list.position(), Some(1));
        assert_eq!(snapshot(&doc), vec![0, 1]);
    }

    #[test]
    fn redo_from_empty_cursor_with_only_baseline_is_noop() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        list.position = None;

        assert!(!list.can_redo());
        list.redo();
        assert_eq!(list.position(), None);
    }

    #[test]
    fn dirty_tracks_save_point() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        list.save();
        assert!(!list.dirty());

        commit_push(&mut list, &doc, 1);
        assert!(list.dirty());

        list.undo();
        assert!(!list.dirty());

        list.redo();
        assert!(list.dirty());
    }

    #[test]
    fn dirty_ignores_clean_commands() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        list.save();

        doc.lock().unwrap().push(1);
        list.add("push", json!({ "value": 1, "dirty": false })).unwrap();
        list.commit("select");
        assert!(!list.dirty());

        commit_push(&mut list, &doc, 2);
        assert!(list.dirty());
    }

    #[test]
    fn dirty_when_cursor_below_save_point() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        commit_push(&mut list, &doc, 1);
        commit_push(&mut list, &doc, 2);
        list.save();

        list.undo();
        assert!(list.dirty());
        list.redo();
        assert!(!list.dirty());
    }

    #[test]
    fn truncated_save_point_stays_dirty() {
        let (mut list, doc) = history();
        for i in 0..4 {
            commit_push(&mut list, &doc, i);
        }
        list.save();
        list.undo();
        list.undo();

        commit_push(&mut list, &doc, 8);
        commit_push(&mut list, &doc, 9);
        assert_eq!(list.position(), Some(3));
        assert!(list.dirty());
    }

    #[test]
    fn never_saved_history_is_dirty_after_edits() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        assert!(list.dirty());
    }

    #[test]
    fn clear_keeps_registrations() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);
        push(&mut list, &doc, 1);
        list.save();

        list.clear();
        assert!(list.is_empty());
        assert!(!list.has_pending());
        assert_eq!(list.position(), None);
        assert!(!list.dirty());
        assert!(list.is_registered("push"));
    }

    #[test]
    fn reset_drops_registrations() {
        let (mut list, doc) = history();
        commit_push(&mut list, &doc, 0);

        list.reset();
        assert!(list.is_empty());
        assert!(!list.is_registered("push"));
        assert!(list.add("push", json!({ "value": 1 })).is_err());
    }

    #[test]
    fn local_list_is_independent() {
        let (mut list, doc) = history_with(HistoryConfig::with_max_depth(8));
        commit_push(&mut list, &doc, 0);

        let local = list.local();
        assert!(local.is_empty());
        assert!(!local.is_registered("push"));
        assert_eq!(local.config().max_depth, Some(8));
    }

    #[test]
    fn every_mutation_notifies() {
        let (mut list, doc) = history();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let _sub = list.subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        push(&mut list, &doc, 0); // 1
        list.commit("push 0"); // 2
        commit_push(&mut list, &doc, 1); // 4
        list.undo(); // 5
        list.redo(); // 6
        list.save(); // 7
        list.undo(); // 8
        list.undo(); // floor, no-op
        list.clear(); // 9
        assert_eq!(hits.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn max_depth_evicts_oldest() {
        let (mut list, doc) = history_with(HistoryConfig::with_max_depth(3));
        for i in 0..5 {
            commit_push(&mut list, &doc, i);
        }
        assert_eq!(list.len(), 3);
        assert_eq!(list.position(), Some(2));
        assert_eq!(list.group(0).unwrap().description(), "push 2");

        list.undo();
        list.undo();
        list.undo();
        assert_eq!(list.position(), Some(0));
        assert_eq!(snapshot(&doc), vec![0, 1, 2]);
    }

    #[test]
    fn zero_max_depth_keeps_latest_group() {
        assert_eq!(HistoryConfig::with_max_depth(0).max_depth, Some(1));

        let (mut list, doc) = history_with(HistoryConfig { max_depth: Some(0) });
        assert_eq!(list.config().max_depth, Some(1));
        commit_push(&mut list, &doc, 0);
        commit_push(&mut list, &doc, 1);
        assert_eq!(list.len(), 1);
        assert_eq!(list.position(), Some(0));
        assert_eq!(list.group(0).unwrap().description(), "push 1");
    }

    #[test]
    fn eviction_shifts_save_point() {
        let (mut list, doc) = history_with(HistoryConfig::with_max_depth(3));
        for i in 0..3 {
            commit_push(&mut list, &doc, i);
        }
        list.save();
        commit_push(&mut list, &doc, 3);
        assert!(list.dirty());

        list.undo();
        assert_eq!(list.position(), Some(1));
        assert!(!list.dirty());
    }

    #[test]
    fn eviction_past_save_point_is_dirty() {
        let (mut list, doc) = history_with(HistoryConfig::with_max_depth(2));
        commit_push(&mut list, &doc, 0);
        list.save();
        for i in 1..4 {
            commit_push(&mut list, &doc, i);
        }
        assert!(list.dirty());
    }

    #[test]
    fn descriptions_listing() {
        let (mut list, doc) = history();
        for i in 0..4 {
            commit_push(&mut list, &doc, i);
        }
        list.undo();

        assert_eq!(list.undo_descriptions(10), vec!["push 2", "push 1"]);
        assert_eq!(list.undo_descriptions(1), vec!["push 2"]);
        assert_eq!(list.redo_descriptions(10), vec!["push 3"]);
        assert_eq!(list.undo_description(), Some("push 2"));
        assert_eq!(list.redo_description(), Some("push 3"));
    }

    #[test]
    fn config_defaults_and_serde() {
        assert_eq!(HistoryConfig::default().max_depth, None);
        let config: HistoryConfig = serde_json::from_str(r#"{"max_depth": 50}"#).unwrap();
        assert_eq!(config, HistoryConfig::with_max_depth(50));
        let config: HistoryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, HistoryConfig::unlimited());
    }

    #[test]
    fn debug_impl() {
        let (list, _doc) = history();
        let debug_str = format!("{list:?}");
        assert!(debug_str.contains("UndoList"));
        assert!(debug_str.contains("push"));
    }
}
