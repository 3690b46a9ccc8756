//! Shared helpers for router integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use routex_history::{HistoryBackend, HistoryListener, HistoryListenerId, Location, MemoryHistory};
use routex_router::{HookError, HookKind, RouteDefinition, Router, RouterError};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Component type used across the integration tests.
pub type Comp = &'static str;

/// A [`MemoryHistory`] that counts the router's writes.
pub struct RecordingHistory {
	inner: MemoryHistory,
	pushes: AtomicUsize,
	replaces: AtomicUsize,
}

impl RecordingHistory {
	pub fn new(path: &str) -> Arc<Self> {
		Self::with_entries(&[path], 0)
	}

	pub fn with_entries(paths: &[&str], index: usize) -> Arc<Self> {
		Arc::new(Self {
			inner: MemoryHistory::with_entries(paths.iter().copied(), index),
			pushes: AtomicUsize::new(0),
			replaces: AtomicUsize::new(0),
		})
	}

	pub fn push_count(&self) -> usize {
		self.pushes.load(Ordering::SeqCst)
	}

	pub fn replace_count(&self) -> usize {
		self.replaces.load(Ordering::SeqCst)
	}

	pub fn entries(&self) -> Vec<Location> {
		self.inner.entries()
	}

	pub fn listener_count(&self) -> usize {
		self.inner.listener_count()
	}
}

impl HistoryBackend for RecordingHistory {
	fn location(&self) -> Location {
		self.inner.location()
	}

	fn listen(&self, listener: HistoryListener) -> HistoryListenerId {
		self.inner.listen(listener)
	}

	fn unlisten(&self, id: HistoryListenerId) -> bool {
		self.inner.unlisten(id)
	}

	fn replace_state(&self, state: Value, path: &str) {
		self.replaces.fetch_add(1, Ordering::SeqCst);
		self.inner.replace_state(state, path);
	}

	fn push_state(&self, state: Value, path: &str) {
		self.pushes.fetch_add(1, Ordering::SeqCst);
		self.inner.push_state(state, path);
	}

	fn go_back(&self) {
		self.inner.go_back();
	}

	fn go_forward(&self) {
		self.inner.go_forward();
	}
}

/// A router event, flattened for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
	Start(String),
	Success(String),
	Fail(String, String),
	NotFound(String),
}

/// Records every listener event of `router` in order.
pub fn record_events(router: &Router<Comp>) -> Arc<Mutex<Vec<Event>>> {
	let log = Arc::new(Mutex::new(Vec::new()));

	let sink = Arc::clone(&log);
	router.add_change_start_listener(move |event| {
		sink.lock().push(Event::Start(event.route.location()));
	});
	let sink = Arc::clone(&log);
	router.add_change_success_listener(move |event| {
		sink.lock().push(Event::Success(event.route.location()));
	});
	let sink = Arc::clone(&log);
	router.add_change_fail_listener(move |event| {
		sink.lock().push(Event::Fail(event.route.location(), event.error.to_string()));
	});
	let sink = Arc::clone(&log);
	router.add_not_found_listener(move |event| {
		sink.lock().push(Event::NotFound(event.path.clone()));
	});

	log
}

/// Counts events of one kind.
pub fn count(log: &Mutex<Vec<Event>>, matches: impl Fn(&Event) -> bool) -> usize {
	log.lock().iter().filter(|event| matches(event)).count()
}

/// Receives the outcome of every transition attempt, as reported by the
/// router's `on_transition` callback.
pub struct Transitions {
	receiver: mpsc::UnboundedReceiver<Option<String>>,
}

impl Transitions {
	/// Waits for the next transition attempt and returns its error message.
	pub async fn next(&mut self) -> Option<String> {
		tokio::time::timeout(Duration::from_secs(5), self.receiver.recv())
			.await
			.expect("timed out waiting for a transition")
			.expect("transition channel closed")
	}

	/// Returns whether no transition attempt is pending.
	pub fn is_idle(&mut self) -> bool {
		self.receiver.try_recv().is_err()
	}
}

/// Builds a router over `routes` and `history` reporting attempts to the
/// returned [`Transitions`].
pub fn router_with(
	routes: Vec<RouteDefinition<Comp>>,
	history: Arc<RecordingHistory>,
) -> (Router<Comp>, Transitions) {
	let (sender, receiver) = mpsc::unbounded_channel();
	let router = Router::builder(routes)
		.history(history)
		.on_transition(move |error: Option<&RouterError>| {
			let _ = sender.send(error.map(ToString::to_string));
		})
		.build()
		.expect("router should build");

	(router, Transitions { receiver })
}

/// Builds a router, starts listening and waits for the initial transition.
pub async fn listening_router(
	routes: Vec<RouteDefinition<Comp>>,
	history: Arc<RecordingHistory>,
) -> (Router<Comp>, Transitions) {
	let (router, mut transitions) = router_with(routes, history);
	router.listen().expect("listen should succeed");
	assert_eq!(transitions.next().await, None, "initial transition failed");
	(router, transitions)
}

/// Routes mirroring a small application: an index, a child page, a route
/// rejecting on enter, a route rejecting on leave and a route with
/// constrained variables.
pub fn app_routes() -> Vec<RouteDefinition<Comp>> {
	vec![
		RouteDefinition::new("/", "A"),
		RouteDefinition::new("/child", "Child"),
		RouteDefinition::new("/rejected-on-enter", "RejectedOnEnter")
			.on_enter(|_| async { Err::<(), HookError>("rejected".into()) }),
		RouteDefinition::new("/rejected-on-leave", "RejectedOnLeave")
			.on_leave(|_| async { Err::<(), HookError>("rejected".into()) }),
		RouteDefinition::new("/with-variables/:user/:id{\\d+}", "WithVariables"),
	]
}

/// Shared log of hook calls, e.g. `"enter:users"` or `"leave:/"`.
pub type HookLog = Arc<Mutex<Vec<String>>>;

pub fn hook_log() -> HookLog {
	Arc::new(Mutex::new(Vec::new()))
}

/// A route logging its enter and leave hooks to `log` under `name`.
pub fn logged(pattern: &str, component: Comp, name: &'static str, log: &HookLog) -> RouteDefinition<Comp> {
	let enter_log = Arc::clone(log);
	let leave_log = Arc::clone(log);
	RouteDefinition::new(pattern, component)
		.on_enter(move |_| {
			enter_log.lock().push(format!("enter:{name}"));
			async { Ok(()) }
		})
		.on_leave(move |_| {
			leave_log.lock().push(format!("leave:{name}"));
			async { Ok(()) }
		})
}

/// Like [`logged`], but the `rejects` hook fails after logging.
pub fn rejecting(
	pattern: &str,
	component: Comp,
	name: &'static str,
	rejects: HookKind,
	log: &HookLog,
) -> RouteDefinition<Comp> {
	let enter_log = Arc::clone(log);
	let leave_log = Arc::clone(log);
	let outcome = move |kind: HookKind| -> Result<(), HookError> {
		if kind == rejects {
			Err(format!("{kind} refused by {name}").into())
		} else {
			Ok(())
		}
	};
	RouteDefinition::new(pattern, component)
		.on_enter(move |_| {
			enter_log.lock().push(format!("enter:{name}"));
			futures::future::ready(outcome(HookKind::Enter))
		})
		.on_leave(move |_| {
			leave_log.lock().push(format!("leave:{name}"));
			futures::future::ready(outcome(HookKind::Leave))
		})
}
