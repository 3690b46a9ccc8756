//! The transition pipeline.
//!
//! ```text
//! run(path, args) / history POP / first history notification
//!     │
//!     ▼
//! resolve ──no match──▶ restore state, NotFound, Err(NotFound)
//!     │    ──loader panic──▶ restore state, Err(LoaderPanicked)
//!     │
//!     ▼ (run while listening) ChangeStart
//! leave hooks, exiting nodes leaf → root
//! enter hooks, entering nodes root → leaf ──reject──▶ Failed, ChangeFail, Err(HookRejected)
//!     │                              (skipped for POP)
//!     ▼
//! commit: Transitioned, history write (push for run, replace for the
//! first transition, none for POP), ChangeSuccess
//! ```

use crate::definition::{ResolvedRoute, RouteDefinition};
use crate::error::{HookRejectionError, RouterError, RouterResult};
use crate::hooks::{
	EnterContext, HookArgs, HookFuture, HookInvocation, HookKind, LeaveContext, RawHook, dispatch,
	panic_message,
};
use crate::listeners::{ChangeEvent, ChangeFailEvent, NotFoundEvent};
use crate::router::{RouteSeed, Router};
use crate::settings::TransitionPolicy;
use crate::state::RouterState;
use futures::FutureExt;
use routex_core::resolve;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// What triggered a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
	/// The first history notification after `listen`.
	Initial,
	/// An explicit `Router::run` call.
	Run,
	/// A backend back/forward navigation.
	Pop,
}

impl<C: Clone + Send + Sync + 'static> Router<C> {
	/// Navigates to `path`, running leave and enter hooks with `args`.
	///
	/// On success the route is committed, pushed onto the history and
	/// returned.
	///
	/// # Errors
	///
	/// - [`RouterError::NotFound`] if no route matches; the current route is
	///   left untouched.
	/// - [`RouterError::HookRejected`] if a hook fails or panics; the current
	///   route is left untouched.
	///
	/// Under [`TransitionPolicy::Serialized`], a hook must not await `run` on
	/// the same router: spawn the navigation instead.
	pub async fn run(&self, path: &str, args: HookArgs) -> RouterResult<Arc<ResolvedRoute<C>>> {
		self.transition(path, args, Origin::Run).await
	}

	pub(crate) async fn transition(
		&self,
		location: &str,
		args: HookArgs,
		origin: Origin,
	) -> RouterResult<Arc<ResolvedRoute<C>>> {
		let result = {
			let _serial = match self.inner.settings.transition_policy {
				TransitionPolicy::Serialized => Some(self.inner.transition_lock.lock().await),
				TransitionPolicy::Concurrent => None,
			};
			self.perform(location, args, origin).await
		};

		if let Some(callback) = &self.inner.on_transition {
			callback(result.as_ref().err());
		}
		result
	}

	async fn perform(
		&self,
		location: &str,
		args: HookArgs,
		origin: Origin,
	) -> RouterResult<Arc<ResolvedRoute<C>>> {
		let (before, previous) = {
			let mut state = self.inner.state.write();
			let before = state.clone();
			let previous = before.current_route();
			*state = RouterState::Transitioning {
				current: previous.clone(),
			};
			(before, previous)
		};
		tracing::debug!(location, ?origin, "transition started");

		let resolved = AssertUnwindSafe(resolve(&self.inner.routes[..], location))
			.catch_unwind()
			.await;
		let route = match resolved {
			Ok(Ok(route)) => Arc::new(route),
			Err(payload) => {
				let message = panic_message(payload.as_ref())
					.unwrap_or("route loader panicked")
					.to_string();
				tracing::error!(location, ?origin, %message, "route loader panicked");
				self.restore(before);
				return Err(RouterError::LoaderPanicked {
					location: location.to_string(),
					message,
				});
			}
			Ok(Err(error)) => {
				tracing::warn!(location, ?origin, "no route matches location");
				self.restore(before);
				self.inner.listeners.not_found(&NotFoundEvent {
					path: location.to_string(),
					error: error.clone(),
				});
				return Err(error.into());
			}
		};

		if origin == Origin::Run && self.is_listening() {
			self.inner.listeners.change_start(&ChangeEvent {
				route: Arc::clone(&route),
				previous: previous.clone(),
			});
		}

		if origin != Origin::Pop {
			if let Err(error) = self.run_hooks(previous.as_ref(), &route, &args).await {
				tracing::warn!(
					location,
					kind = %error.kind(),
					route = error.route_path(),
					"transition rejected by hook"
				);
				let failure = RouterError::from(error.clone());
				{
					let mut state = self.inner.state.write();
					let current = state.current_route();
					*state = RouterState::Failed {
						route: current,
						error: failure.clone(),
					};
				}
				self.inner.listeners.change_fail(&ChangeFailEvent {
					route,
					previous,
					error,
				});
				return Err(failure);
			}
		}

		*self.inner.state.write() = RouterState::Transitioned(Arc::clone(&route));
		let target = route.location();
		tracing::info!(location = %target, ?origin, "route committed");

		match origin {
			Origin::Initial => self
				.inner
				.history
				.replace_state(RouteSeed::from_route(&route).to_state(), &target),
			Origin::Run => self
				.inner
				.history
				.push_state(RouteSeed::from_route(&route).to_state(), &target),
			Origin::Pop => {}
		}

		self.inner.listeners.change_success(&ChangeEvent {
			route: Arc::clone(&route),
			previous,
		});
		Ok(route)
	}

	/// Puts back the state saved before a transition that did not commit,
	/// unless a concurrent transition has already replaced it.
	fn restore(&self, before: RouterState<C>) {
		let mut state = self.inner.state.write();
		if state.is_transitioning() {
			*state = before;
		}
	}

	async fn run_hooks(
		&self,
		previous: Option<&Arc<ResolvedRoute<C>>>,
		current: &Arc<ResolvedRoute<C>>,
		args: &HookArgs,
	) -> Result<(), HookRejectionError> {
		let shared = shared_prefix(previous.map(|route| &**route), current);

		if let Some(previous) = previous {
			for entry in previous.chain()[shared..].iter().rev() {
				let invocation = self.leave_invocation(entry.node(), current, args.clone());
				dispatch(self.inner.wrappers.get(HookKind::Leave), invocation).await?;
			}
		}

		for entry in &current.chain()[shared..] {
			let invocation =
				self.enter_invocation(entry.node(), previous.cloned(), current, args.clone());
			dispatch(self.inner.wrappers.get(HookKind::Enter), invocation).await?;
		}

		Ok(())
	}

	fn enter_invocation(
		&self,
		node: &Arc<RouteDefinition<C>>,
		previous: Option<Arc<ResolvedRoute<C>>>,
		current: &Arc<ResolvedRoute<C>>,
		args: HookArgs,
	) -> HookInvocation {
		let hook = node.enter_hook().cloned();
		let declared = hook.is_some();
		let router = self.clone();
		let current = Arc::clone(current);
		let call: RawHook = Arc::new(move |args: HookArgs| -> HookFuture {
			match &hook {
				Some(hook) => hook(EnterContext {
					previous: previous.clone(),
					current: Arc::clone(&current),
					router: router.clone(),
					args,
				}),
				None => futures::future::ok(()).boxed(),
			}
		});

		HookInvocation::new(
			HookKind::Enter,
			node.path_pattern().display_path(),
			args,
			declared,
			call,
		)
	}

	fn leave_invocation(
		&self,
		node: &Arc<RouteDefinition<C>>,
		current: &Arc<ResolvedRoute<C>>,
		args: HookArgs,
	) -> HookInvocation {
		let hook = node.leave_hook().cloned();
		let declared = hook.is_some();
		let router = self.clone();
		let current = Arc::clone(current);
		let call: RawHook = Arc::new(move |args: HookArgs| -> HookFuture {
			match &hook {
				Some(hook) => hook(LeaveContext {
					current: Arc::clone(&current),
					router: router.clone(),
					args,
				}),
				None => futures::future::ok(()).boxed(),
			}
		});

		HookInvocation::new(
			HookKind::Leave,
			node.path_pattern().display_path(),
			args,
			declared,
			call,
		)
	}
}

/// Number of leading chain entries both routes share.
///
/// Re-resolving the current location shares nothing, so every hook of the
/// chain runs again.
fn shared_prefix<C: Clone + Send + Sync + 'static>(
	previous: Option<&ResolvedRoute<C>>,
	next: &ResolvedRoute<C>,
) -> usize {
	let Some(previous) = previous else {
		return 0;
	};
	if previous.location() == next.location() {
		return 0;
	}

	previous
		.chain()
		.iter()
		.zip(next.chain())
		.take_while(|(old, new)| old.same_as(new))
		.count()
}
