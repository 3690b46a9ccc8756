//! Lazily evaluated, cached route node slots.
//!
//! Route components and children may be plain values, synchronous factories
//! or asynchronous loaders. Each slot evaluates its source at most once; while
//! a load is in flight every caller awaits the same shared future. A source
//! that panics leaves the slot unresolved, so the next caller retries it.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Type alias for the source function of a lazy slot.
pub type Loader<T> = Arc<dyn Fn() -> BoxFuture<'static, T> + Send + Sync>;

enum Slot<T: Clone> {
	/// Source not evaluated yet.
	Unresolved(Loader<T>),
	/// Source evaluated, value still loading.
	Pending {
		loader: Loader<T>,
		future: Shared<BoxFuture<'static, T>>,
	},
	/// Value available.
	Ready(T),
}

/// A cached value produced by a value, factory or async loader.
///
/// Cloning a `Lazy` shares the underlying slot.
pub struct Lazy<T: Clone> {
	slot: Arc<Mutex<Slot<T>>>,
}

impl<T: Clone> Clone for Lazy<T> {
	fn clone(&self) -> Self {
		Self {
			slot: Arc::clone(&self.slot),
		}
	}
}

impl<T: Clone> std::fmt::Debug for Lazy<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = match &*self.slot.lock() {
			Slot::Unresolved(_) => "unresolved",
			Slot::Pending { .. } => "pending",
			Slot::Ready(_) => "ready",
		};
		f.debug_struct("Lazy").field("state", &state).finish()
	}
}

impl<T> Lazy<T>
where
	T: Clone + Send + Sync + 'static,
{
	/// Creates an already resolved slot.
	pub fn ready(value: T) -> Self {
		Self::with_slot(Slot::Ready(value))
	}

	/// Creates a slot from a synchronous factory.
	pub fn from_fn<F>(factory: F) -> Self
	where
		F: Fn() -> T + Send + Sync + 'static,
	{
		Self::with_slot(Slot::Unresolved(Arc::new(move || {
			futures::future::ready(factory()).boxed()
		})))
	}

	/// Creates a slot from an asynchronous loader.
	pub fn from_future_fn<F, Fut>(loader: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = T> + Send + 'static,
	{
		Self::with_slot(Slot::Unresolved(Arc::new(move || loader().boxed())))
	}

	fn with_slot(slot: Slot<T>) -> Self {
		Self {
			slot: Arc::new(Mutex::new(slot)),
		}
	}

	/// Resolves the slot, evaluating its source on first use.
	///
	/// # Panics
	///
	/// Propagates a panic raised by the source. The slot is reset to
	/// unresolved first, so a later call runs the source again.
	pub fn get(&self) -> BoxFuture<'static, T> {
		let slot = Arc::clone(&self.slot);
		async move {
			let pending = {
				let mut guard = slot.lock();
				match &*guard {
					Slot::Ready(value) => return value.clone(),
					Slot::Pending { future, .. } => future.clone(),
					Slot::Unresolved(loader) => {
						let loader = Arc::clone(loader);
						let future = loader().shared();
						*guard = Slot::Pending {
							loader,
							future: future.clone(),
						};
						future
					}
				}
			};

			match AssertUnwindSafe(pending.clone()).catch_unwind().await {
				Ok(value) => {
					let mut guard = slot.lock();
					if !matches!(*guard, Slot::Ready(_)) {
						*guard = Slot::Ready(value.clone());
					}
					value
				}
				Err(payload) => {
					{
						let mut guard = slot.lock();
						let loader = match &*guard {
							Slot::Pending { loader, future } if future.ptr_eq(&pending) => {
								Some(Arc::clone(loader))
							}
							_ => None,
						};
						if let Some(loader) = loader {
							*guard = Slot::Unresolved(loader);
						}
					}
					std::panic::resume_unwind(payload)
				}
			}
		}
		.boxed()
	}

	/// Returns the value if it has already been resolved.
	pub fn peek(&self) -> Option<T> {
		match &*self.slot.lock() {
			Slot::Ready(value) => Some(value.clone()),
			_ => None,
		}
	}

	/// Returns whether the value has already been resolved.
	pub fn is_resolved(&self) -> bool {
		matches!(*self.slot.lock(), Slot::Ready(_))
	}
}
