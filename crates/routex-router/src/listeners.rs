//! Transition event listeners.
//!
//! Listeners are plain synchronous callbacks grouped by event kind. Each kind
//! is dispatched over a snapshot of its receivers, so a listener may register
//! or remove listeners while being called.

use crate::definition::ResolvedRoute;
use crate::error::HookRejectionError;
use parking_lot::RwLock;
use routex_core::RouteNotFoundError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Type alias for a listener callback.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Payload of ChangeStart and ChangeSuccess events.
pub struct ChangeEvent<C: Clone + Send + Sync + 'static> {
	/// The route being (or just) entered.
	pub route: Arc<ResolvedRoute<C>>,
	/// The route committed before this transition.
	pub previous: Option<Arc<ResolvedRoute<C>>>,
}

/// Payload of ChangeFail events.
pub struct ChangeFailEvent<C: Clone + Send + Sync + 'static> {
	/// The route that was rejected.
	pub route: Arc<ResolvedRoute<C>>,
	/// The route that stays current.
	pub previous: Option<Arc<ResolvedRoute<C>>>,
	/// The rejection.
	pub error: HookRejectionError,
}

/// Payload of NotFound events.
#[derive(Debug, Clone)]
pub struct NotFoundEvent {
	/// The requested location.
	pub path: String,
	/// The resolution error.
	pub error: RouteNotFoundError,
}

struct Receivers<E> {
	entries: RwLock<Vec<(ListenerId, Listener<E>)>>,
}

impl<E> Default for Receivers<E> {
	fn default() -> Self {
		Self {
			entries: RwLock::new(Vec::new()),
		}
	}
}

impl<E> Receivers<E> {
	fn push(&self, id: ListenerId, listener: Listener<E>) {
		self.entries.write().push((id, listener));
	}

	fn remove(&self, id: ListenerId) -> bool {
		let mut entries = self.entries.write();
		let before = entries.len();
		entries.retain(|(entry, _)| *entry != id);
		entries.len() != before
	}

	fn len(&self) -> usize {
		self.entries.read().len()
	}

	fn emit(&self, event: &E) {
		let snapshot: Vec<Listener<E>> = self
			.entries
			.read()
			.iter()
			.map(|(_, listener)| Arc::clone(listener))
			.collect();
		for listener in snapshot {
			listener(event);
		}
	}
}

/// Registry of transition listeners, one receiver list per event kind.
pub(crate) struct ListenerRegistry<C: Clone + Send + Sync + 'static> {
	next_id: AtomicU64,
	change_start: Receivers<ChangeEvent<C>>,
	change_success: Receivers<ChangeEvent<C>>,
	change_fail: Receivers<ChangeFailEvent<C>>,
	not_found: Receivers<NotFoundEvent>,
}

impl<C: Clone + Send + Sync + 'static> Default for ListenerRegistry<C> {
	fn default() -> Self {
		Self {
			next_id: AtomicU64::new(0),
			change_start: Receivers::default(),
			change_success: Receivers::default(),
			change_fail: Receivers::default(),
			not_found: Receivers::default(),
		}
	}
}

impl<C: Clone + Send + Sync + 'static> ListenerRegistry<C> {
	fn next_id(&self) -> ListenerId {
		ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
	}

	pub(crate) fn add_change_start(&self, listener: Listener<ChangeEvent<C>>) -> ListenerId {
		let id = self.next_id();
		self.change_start.push(id, listener);
		id
	}

	pub(crate) fn add_change_success(&self, listener: Listener<ChangeEvent<C>>) -> ListenerId {
		let id = self.next_id();
		self.change_success.push(id, listener);
		id
	}

	pub(crate) fn add_change_fail(&self, listener: Listener<ChangeFailEvent<C>>) -> ListenerId {
		let id = self.next_id();
		self.change_fail.push(id, listener);
		id
	}

	pub(crate) fn add_not_found(&self, listener: Listener<NotFoundEvent>) -> ListenerId {
		let id = self.next_id();
		self.not_found.push(id, listener);
		id
	}

	/// Removes a listener of any kind.
	pub(crate) fn remove(&self, id: ListenerId) -> bool {
		self.change_start.remove(id)
			|| self.change_success.remove(id)
			|| self.change_fail.remove(id)
			|| self.not_found.remove(id)
	}

	pub(crate) fn len(&self) -> usize {
		self.change_start.len()
			+ self.change_success.len()
			+ self.change_fail.len()
			+ self.not_found.len()
	}

	pub(crate) fn change_start(&self, event: &ChangeEvent<C>) {
		self.change_start.emit(event);
	}

	pub(crate) fn change_success(&self, event: &ChangeEvent<C>) {
		self.change_success.emit(event);
	}

	pub(crate) fn change_fail(&self, event: &ChangeFailEvent<C>) {
		self.change_fail.emit(event);
	}

	pub(crate) fn not_found(&self, event: &NotFoundEvent) {
		self.not_found.emit(event);
	}
}
