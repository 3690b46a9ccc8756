//! The history backend contract.

use crate::location::{Location, NavigationType};
use serde_json::Value;
use std::sync::Arc;

/// Callback invoked on every history notification.
pub type HistoryListener = Arc<dyn Fn(&Location, NavigationType) + Send + Sync>;

/// Handle of a subscription made with [`HistoryBackend::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryListenerId(u64);

impl HistoryListenerId {
	/// Creates a handle from a backend-assigned number.
	pub fn new(id: u64) -> Self {
		Self(id)
	}

	/// Returns the backend-assigned number.
	pub fn get(self) -> u64 {
		self.0
	}
}

/// A session history the router reads from and writes to.
///
/// Implementations must notify listeners after releasing any internal lock,
/// since listeners may call back into the backend.
pub trait HistoryBackend: Send + Sync {
	/// Returns the current entry.
	fn location(&self) -> Location;

	/// Subscribes to navigation notifications.
	///
	/// The listener is invoked once immediately with the current location and
	/// [`NavigationType::Pop`], then on every navigation until it is removed
	/// with [`unlisten`](Self::unlisten).
	fn listen(&self, listener: HistoryListener) -> HistoryListenerId;

	/// Removes a subscription. Returns `false` if `id` is not subscribed.
	fn unlisten(&self, id: HistoryListenerId) -> bool;

	/// Replaces the current entry and notifies with [`NavigationType::Replace`].
	fn replace_state(&self, state: Value, path: &str);

	/// Pushes a new entry and notifies with [`NavigationType::Push`].
	fn push_state(&self, state: Value, path: &str);

	/// Moves one entry back and notifies with [`NavigationType::Pop`].
	///
	/// Does nothing at the first entry.
	fn go_back(&self);

	/// Moves one entry forward and notifies with [`NavigationType::Pop`].
	///
	/// Does nothing at the last entry.
	fn go_forward(&self);
}
