//! The router handle and its builder.

use crate::definition::{ResolvedRoute, RouteDefinition, into_children};
use crate::error::{RouterError, RouterResult};
use crate::hooks::{HookInvocation, HookKind, HookResult, HookWrappers, box_wrapper};
use crate::listeners::{
	ChangeEvent, ChangeFailEvent, ListenerId, ListenerRegistry, NotFoundEvent,
};
use crate::settings::RouterSettings;
use crate::state::RouterState;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use routex_history::{HistoryBackend, HistoryListenerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Callback invoked after every transition attempt with its failure, if any.
pub type TransitionCallback = Arc<dyn Fn(Option<&RouterError>) + Send + Sync>;

/// Serializable snapshot of a resolved route.
///
/// Written as the state of every history entry the router creates, and
/// accepted by [`RouterBuilder::initial_route`] to rehydrate a router at a
/// known route instead of the backend's current location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteSeed {
	/// Path without query string.
	pub pathname: String,
	/// Parsed query string.
	#[serde(default)]
	pub query: IndexMap<String, String>,
	/// Path variables.
	#[serde(default)]
	pub vars: IndexMap<String, String>,
}

#[derive(Deserialize)]
struct SeedEnvelope {
	route: RouteSeed,
}

impl RouteSeed {
	/// Creates a seed for `pathname` with an empty query.
	pub fn new(pathname: impl Into<String>) -> Self {
		Self {
			pathname: pathname.into(),
			..Self::default()
		}
	}

	/// Adds a query parameter.
	pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(key.into(), value.into());
		self
	}

	/// Captures a resolved route.
	pub fn from_route<C: Clone + Send + Sync + 'static>(route: &ResolvedRoute<C>) -> Self {
		Self {
			pathname: route.pathname().to_string(),
			query: route.query().clone(),
			vars: route.vars().clone(),
		}
	}

	/// Reads a seed from a history state value.
	///
	/// Accepts a bare seed or a `{ "route": <seed> }` envelope.
	pub fn from_state(state: &Value) -> Option<Self> {
		serde_json::from_value::<Self>(state.clone())
			.or_else(|_| serde_json::from_value::<SeedEnvelope>(state.clone()).map(|e| e.route))
			.ok()
	}

	/// Returns the location to resolve: pathname plus encoded query.
	pub fn location(&self) -> String {
		if self.query.is_empty() {
			return self.pathname.clone();
		}
		let search = self
			.query
			.iter()
			.map(|(key, value)| {
				format!(
					"{}={}",
					urlencoding::encode(key),
					urlencoding::encode(value)
				)
			})
			.collect::<Vec<_>>()
			.join("&");
		format!("{}?{}", self.pathname, search)
	}

	pub(crate) fn to_state(&self) -> Value {
		serde_json::to_value(self).unwrap_or_else(|e| {
			tracing::warn!(error = %e, "failed to serialize route seed");
			Value::Null
		})
	}
}

pub(crate) struct RouterInner<C: Clone + Send + Sync + 'static> {
	pub(crate) routes: Arc<[Arc<RouteDefinition<C>>]>,
	pub(crate) history: Arc<dyn HistoryBackend>,
	pub(crate) settings: RouterSettings,
	pub(crate) state: RwLock<RouterState<C>>,
	pub(crate) listeners: ListenerRegistry<C>,
	pub(crate) wrappers: HookWrappers,
	pub(crate) on_transition: Option<TransitionCallback>,
	pub(crate) transition_lock: tokio::sync::Mutex<()>,
	pub(crate) seed: Mutex<Option<RouteSeed>>,
	pub(crate) listening: AtomicBool,
	pub(crate) subscription: Mutex<Option<HistoryListenerId>>,
}

impl<C: Clone + Send + Sync + 'static> Drop for RouterInner<C> {
	fn drop(&mut self) {
		if let Some(id) = self.subscription.get_mut().take() {
			self.history.unlisten(id);
			tracing::debug!("router dropped, history listener removed");
		}
	}
}

/// A navigation engine over a route tree and a history backend.
///
/// `Router` is a cheap, clonable handle; clones share the same state,
/// listeners and history.
pub struct Router<C: Clone + Send + Sync + 'static> {
	pub(crate) inner: Arc<RouterInner<C>>,
}

impl<C: Clone + Send + Sync + 'static> Clone for Router<C> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<C: Clone + Send + Sync + 'static> std::fmt::Debug for Router<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("routes_count", &self.inner.routes.len())
			.field("state", &*self.inner.state.read())
			.field("settings", &self.inner.settings)
			.field("listening", &self.is_listening())
			.finish()
	}
}

impl<C: Clone + Send + Sync + 'static> Router<C> {
	/// Creates a router over `routes` backed by `history`, with default settings.
	pub fn new(routes: Vec<RouteDefinition<C>>, history: Arc<dyn HistoryBackend>) -> Self {
		Self::assemble(routes, history, RouterSettings::default(), None, None)
	}

	/// Starts building a router over `routes`.
	pub fn builder(routes: Vec<RouteDefinition<C>>) -> RouterBuilder<C> {
		RouterBuilder::new(routes)
	}

	fn assemble(
		routes: Vec<RouteDefinition<C>>,
		history: Arc<dyn HistoryBackend>,
		settings: RouterSettings,
		on_transition: Option<TransitionCallback>,
		seed: Option<RouteSeed>,
	) -> Self {
		Self {
			inner: Arc::new(RouterInner {
				routes: into_children(routes),
				history,
				settings,
				state: RwLock::new(RouterState::Initial),
				listeners: ListenerRegistry::default(),
				wrappers: HookWrappers::default(),
				on_transition,
				transition_lock: tokio::sync::Mutex::new(()),
				seed: Mutex::new(seed),
				listening: AtomicBool::new(false),
				subscription: Mutex::new(None),
			}),
		}
	}

	/// Returns the root route definitions.
	pub fn routes(&self) -> &[Arc<RouteDefinition<C>>] {
		&self.inner.routes
	}

	/// Returns the history backend.
	pub fn history(&self) -> &Arc<dyn HistoryBackend> {
		&self.inner.history
	}

	/// Returns the router settings.
	pub fn settings(&self) -> &RouterSettings {
		&self.inner.settings
	}

	/// Returns a snapshot of the lifecycle state.
	pub fn state(&self) -> RouterState<C> {
		self.inner.state.read().clone()
	}

	/// Returns the last successfully committed route.
	pub fn current_route(&self) -> Option<Arc<ResolvedRoute<C>>> {
		self.inner.state.read().current_route()
	}

	/// Returns whether [`listen`](Self::listen) has been called.
	pub fn is_listening(&self) -> bool {
		self.inner.listening.load(Ordering::SeqCst)
	}

	/// Adds a listener fired when a matched `run` is about to run its hooks.
	pub fn add_change_start_listener<F>(&self, listener: F) -> ListenerId
	where
		F: Fn(&ChangeEvent<C>) + Send + Sync + 'static,
	{
		self.inner.listeners.add_change_start(Arc::new(listener))
	}

	/// Adds a listener fired after every committed transition.
	pub fn add_change_success_listener<F>(&self, listener: F) -> ListenerId
	where
		F: Fn(&ChangeEvent<C>) + Send + Sync + 'static,
	{
		self.inner.listeners.add_change_success(Arc::new(listener))
	}

	/// Adds a listener fired when a hook rejects a transition.
	pub fn add_change_fail_listener<F>(&self, listener: F) -> ListenerId
	where
		F: Fn(&ChangeFailEvent<C>) + Send + Sync + 'static,
	{
		self.inner.listeners.add_change_fail(Arc::new(listener))
	}

	/// Adds a listener fired when no route matches a location.
	pub fn add_not_found_listener<F>(&self, listener: F) -> ListenerId
	where
		F: Fn(&NotFoundEvent) + Send + Sync + 'static,
	{
		self.inner.listeners.add_not_found(Arc::new(listener))
	}

	/// Removes a listener. Returns `false` if it was not registered.
	pub fn remove_listener(&self, id: ListenerId) -> bool {
		self.inner.listeners.remove(id)
	}

	/// Returns the number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.listeners.len()
	}

	/// Installs an interceptor around every `on_enter` call, replacing any
	/// previous one.
	pub fn wrap_on_enter_handler<F, Fut>(&self, wrapper: F)
	where
		F: Fn(HookInvocation) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = HookResult> + Send + 'static,
	{
		self.inner.wrappers.set(HookKind::Enter, box_wrapper(wrapper));
	}

	/// Installs an interceptor around every `on_leave` call, replacing any
	/// previous one.
	pub fn wrap_on_leave_handler<F, Fut>(&self, wrapper: F)
	where
		F: Fn(HookInvocation) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = HookResult> + Send + 'static,
	{
		self.inner.wrappers.set(HookKind::Leave, box_wrapper(wrapper));
	}

	pub(crate) fn take_seed(&self) -> Option<RouteSeed> {
		self.inner.seed.lock().take()
	}
}

/// Builder for [`Router`].
pub struct RouterBuilder<C: Clone + Send + Sync + 'static> {
	routes: Vec<RouteDefinition<C>>,
	history: Option<Arc<dyn HistoryBackend>>,
	settings: RouterSettings,
	on_transition: Option<TransitionCallback>,
	seed: Option<RouteSeed>,
}

impl<C: Clone + Send + Sync + 'static> RouterBuilder<C> {
	fn new(routes: Vec<RouteDefinition<C>>) -> Self {
		Self {
			routes,
			history: None,
			settings: RouterSettings::default(),
			on_transition: None,
			seed: None,
		}
	}

	/// Sets the history backend.
	pub fn history(mut self, history: Arc<dyn HistoryBackend>) -> Self {
		self.history = Some(history);
		self
	}

	/// Sets the router settings.
	pub fn settings(mut self, settings: RouterSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Sets a callback invoked after every transition attempt.
	pub fn on_transition<F>(mut self, callback: F) -> Self
	where
		F: Fn(Option<&RouterError>) + Send + Sync + 'static,
	{
		self.on_transition = Some(Arc::new(callback));
		self
	}

	/// Sets the route the first history transition resolves instead of the
	/// backend's current location.
	pub fn initial_route(mut self, seed: RouteSeed) -> Self {
		self.seed = Some(seed);
		self
	}

	/// Builds the router.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Invariant`] if the settings are invalid, the
	/// seed pathname is not absolute, or no history backend is available.
	pub fn build(self) -> RouterResult<Router<C>> {
		self.settings.validate()?;

		if let Some(seed) = &self.seed {
			if !seed.pathname.starts_with('/') {
				return Err(RouterError::invariant(format!(
					"initial route pathname '{}' must start with '/'",
					seed.pathname
				)));
			}
		}

		let history = match self.history {
			Some(history) => history,
			None => default_history(&self.settings)?,
		};

		Ok(Router::assemble(
			self.routes,
			history,
			self.settings,
			self.on_transition,
			self.seed,
		))
	}
}

#[cfg(feature = "memory-history")]
fn default_history(settings: &RouterSettings) -> RouterResult<Arc<dyn HistoryBackend>> {
	Ok(Arc::new(routex_history::MemoryHistory::new(
		&settings.default_path,
	)))
}

#[cfg(not(feature = "memory-history"))]
fn default_history(_settings: &RouterSettings) -> RouterResult<Arc<dyn HistoryBackend>> {
	Err(RouterError::invariant("no history backend configured"))
}
