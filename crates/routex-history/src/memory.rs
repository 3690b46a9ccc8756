//! In-memory history backend.
//!
//! Keeps a list of entries and a cursor, the way a browser session history
//! does, without any platform integration. Used by default when no backend is
//! supplied, and by tests.

use crate::backend::{HistoryBackend, HistoryListener, HistoryListenerId};
use crate::location::{Location, NavigationType};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

struct Entries {
	stack: Vec<Location>,
	cursor: usize,
}

/// A session history kept in memory.
pub struct MemoryHistory {
	entries: Mutex<Entries>,
	listeners: RwLock<Vec<(HistoryListenerId, HistoryListener)>>,
	next_listener: AtomicU64,
}

impl MemoryHistory {
	/// Creates a history with a single entry at `path`.
	pub fn new(path: &str) -> Self {
		Self::with_entries([path], 0)
	}

	/// Creates a history from a list of paths, positioned at `index`.
	///
	/// An empty list yields a single `/` entry; `index` is clamped to the
	/// last entry.
	pub fn with_entries<'a>(paths: impl IntoIterator<Item = &'a str>, index: usize) -> Self {
		let mut stack: Vec<Location> = paths.into_iter().map(Location::new).collect();
		if stack.is_empty() {
			stack.push(Location::default());
		}
		let cursor = index.min(stack.len() - 1);

		Self {
			entries: Mutex::new(Entries { stack, cursor }),
			listeners: RwLock::new(Vec::new()),
			next_listener: AtomicU64::new(0),
		}
	}

	/// Returns a snapshot of all entries.
	pub fn entries(&self) -> Vec<Location> {
		self.entries.lock().stack.clone()
	}

	/// Returns the cursor position.
	pub fn index(&self) -> usize {
		self.entries.lock().cursor
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.lock().stack.len()
	}

	/// Returns the number of subscribed listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.read().len()
	}

	/// Returns whether the history holds no entries. Always `false`.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().stack.is_empty()
	}

	/// Moves the cursor by `delta` entries and notifies with
	/// [`NavigationType::Pop`]. Out-of-range moves are ignored.
	pub fn go(&self, delta: isize) {
		let location = {
			let mut entries = self.entries.lock();
			let Some(target) = entries.cursor.checked_add_signed(delta) else {
				tracing::debug!(delta, "history move out of range");
				return;
			};
			if delta == 0 || target >= entries.stack.len() {
				tracing::debug!(delta, "history move out of range");
				return;
			}
			entries.cursor = target;
			entries.stack[target].clone()
		};

		self.notify(&location, NavigationType::Pop);
	}

	fn notify(&self, location: &Location, kind: NavigationType) {
		let listeners = self.listeners.read().clone();
		tracing::trace!(path = %location.path(), %kind, listeners = listeners.len(), "history notification");
		for (_, listener) in &listeners {
			listener(location, kind);
		}
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new("/")
	}
}

impl std::fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let entries = self.entries.lock();
		f.debug_struct("MemoryHistory")
			.field("entries", &entries.stack)
			.field("cursor", &entries.cursor)
			.field("listeners", &self.listeners.read().len())
			.finish()
	}
}

impl HistoryBackend for MemoryHistory {
	fn location(&self) -> Location {
		let entries = self.entries.lock();
		entries.stack[entries.cursor].clone()
	}

	fn listen(&self, listener: HistoryListener) -> HistoryListenerId {
		let id = HistoryListenerId::new(self.next_listener.fetch_add(1, Ordering::Relaxed));
		self.listeners.write().push((id, listener.clone()));
		let location = self.location();
		listener(&location, NavigationType::Pop);
		id
	}

	fn unlisten(&self, id: HistoryListenerId) -> bool {
		let mut listeners = self.listeners.write();
		let before = listeners.len();
		listeners.retain(|(listener_id, _)| *listener_id != id);
		listeners.len() != before
	}

	fn replace_state(&self, state: Value, path: &str) {
		let location = Location::new(path).with_state(state);
		{
			let mut entries = self.entries.lock();
			let cursor = entries.cursor;
			entries.stack[cursor] = location.clone();
		}
		self.notify(&location, NavigationType::Replace);
	}

	fn push_state(&self, state: Value, path: &str) {
		let location = Location::new(path).with_state(state);
		{
			let mut entries = self.entries.lock();
			let next = entries.cursor + 1;
			entries.stack.truncate(next);
			entries.stack.push(location.clone());
			entries.cursor = next;
		}
		self.notify(&location, NavigationType::Push);
	}

	fn go_back(&self) {
		self.go(-1);
	}

	fn go_forward(&self) {
		self.go(1);
	}
}
