//! History synchronization.
//!
//! `listen` subscribes to the history backend and forwards every notification
//! through a channel to a driver task. The driver runs the first notification
//! as the initial transition, resolves later POPs without hooks, and ignores
//! PUSH/REPLACE notifications, which echo the router's own history writes.
//! The subscription is removed from the backend when the last router handle
//! is dropped.

use crate::error::{RouterError, RouterResult};
use crate::pipeline::Origin;
use crate::router::{Router, RouterInner};
use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedReceiver};
use routex_history::{Location, NavigationType};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

type HistoryEvent = (Location, NavigationType);

impl<C: Clone + Send + Sync + 'static> Router<C> {
	/// Starts synchronizing with the history backend.
	///
	/// The backend's current location (or the route passed to
	/// `RouterBuilder::initial_route`) is resolved and committed with
	/// `replace_state`. Calling `listen` again has no effect.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Invariant`] when called outside a Tokio runtime.
	pub fn listen(&self) -> RouterResult<()> {
		let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
			RouterError::invariant("Router::listen must be called within a Tokio runtime")
		})?;

		if self.inner.listening.swap(true, Ordering::SeqCst) {
			tracing::debug!("router is already listening");
			return Ok(());
		}

		let (sender, receiver) = mpsc::unbounded::<HistoryEvent>();
		let subscription =
			self.inner
				.history
				.listen(Arc::new(move |location: &Location, kind: NavigationType| {
					if sender.unbounded_send((location.clone(), kind)).is_err() {
						tracing::trace!("history driver has stopped");
					}
				}));
		*self.inner.subscription.lock() = Some(subscription);

		runtime.spawn(drive(Arc::downgrade(&self.inner), receiver));
		tracing::debug!("router listening to history");
		Ok(())
	}
}

async fn drive<C: Clone + Send + Sync + 'static>(
	inner: Weak<RouterInner<C>>,
	mut events: UnboundedReceiver<HistoryEvent>,
) {
	let mut activated = false;

	while let Some((location, kind)) = events.next().await {
		let Some(inner) = inner.upgrade() else {
			break;
		};
		let router = Router { inner };

		if !activated {
			activated = true;
			let target = router
				.take_seed()
				.map(|seed| seed.location())
				.unwrap_or_else(|| location.path());
			if let Err(error) = router.transition(&target, Vec::new(), Origin::Initial).await {
				tracing::debug!(location = %target, %error, "initial transition failed");
			}
			continue;
		}

		match kind {
			NavigationType::Pop => {
				let target = location.path();
				if let Err(error) = router.transition(&target, Vec::new(), Origin::Pop).await {
					tracing::debug!(location = %target, %error, "history transition failed");
				}
			}
			NavigationType::Push | NavigationType::Replace => {
				tracing::debug!(path = %location.path(), %kind, "ignoring history echo");
			}
		}
	}

	tracing::debug!("history driver stopped");
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::definition::RouteDefinition;
	use rstest::rstest;
	use routex_history::MemoryHistory;

	#[rstest]
	fn test_listen_requires_runtime() {
		let router = Router::new(
			vec![RouteDefinition::new("/", "home")],
			Arc::new(MemoryHistory::default()),
		);

		let err = router.listen().unwrap_err();

		assert!(matches!(err, RouterError::Invariant(_)));
		assert!(!router.is_listening());
	}

	#[rstest]
	#[tokio::test]
	async fn test_listen_is_idempotent() {
		// Arrange
		let router = Router::new(
			vec![RouteDefinition::new("/", "home")],
			Arc::new(MemoryHistory::default()),
		);
		let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
		router.add_change_success_listener(move |event| {
			let _ = sender.send(event.route.pathname().to_string());
		});

		// Act
		router.listen().unwrap();
		router.listen().unwrap();
		let first = receiver.recv().await;

		// Assert
		assert_eq!(first.as_deref(), Some("/"));
		assert!(router.is_listening());
		tokio::task::yield_now().await;
		assert!(receiver.try_recv().is_err());
	}
}
