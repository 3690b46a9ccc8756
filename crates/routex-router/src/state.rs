//! Router lifecycle state.

use crate::definition::ResolvedRoute;
use crate::error::RouterError;
use std::sync::Arc;

/// Where the router stands in its transition lifecycle.
pub enum RouterState<C: Clone + Send + Sync + 'static> {
	/// Nothing has been committed yet.
	Initial,
	/// A transition is resolving or running hooks.
	Transitioning {
		/// The last committed route, if any.
		current: Option<Arc<ResolvedRoute<C>>>,
	},
	/// The last transition committed this route.
	Transitioned(Arc<ResolvedRoute<C>>),
	/// The last transition was rejected by a hook.
	Failed {
		/// The last committed route, left in place.
		route: Option<Arc<ResolvedRoute<C>>>,
		/// Why the transition failed.
		error: RouterError,
	},
}

impl<C: Clone + Send + Sync + 'static> RouterState<C> {
	/// Returns the last successfully committed route.
	pub fn current_route(&self) -> Option<Arc<ResolvedRoute<C>>> {
		match self {
			Self::Initial => None,
			Self::Transitioning { current } => current.clone(),
			Self::Transitioned(route) => Some(Arc::clone(route)),
			Self::Failed { route, .. } => route.clone(),
		}
	}

	/// Returns whether a transition is in flight.
	pub fn is_transitioning(&self) -> bool {
		matches!(self, Self::Transitioning { .. })
	}

	/// Returns the failure of the last transition, if it was rejected.
	pub fn error(&self) -> Option<&RouterError> {
		match self {
			Self::Failed { error, .. } => Some(error),
			_ => None,
		}
	}

	/// Returns the state name.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Initial => "INITIAL",
			Self::Transitioning { .. } => "TRANSITIONING",
			Self::Transitioned(_) => "TRANSITIONED",
			Self::Failed { .. } => "FAILED",
		}
	}
}

impl<C: Clone + Send + Sync + 'static> Clone for RouterState<C> {
	fn clone(&self) -> Self {
		match self {
			Self::Initial => Self::Initial,
			Self::Transitioning { current } => Self::Transitioning {
				current: current.clone(),
			},
			Self::Transitioned(route) => Self::Transitioned(Arc::clone(route)),
			Self::Failed { route, error } => Self::Failed {
				route: route.clone(),
				error: error.clone(),
			},
		}
	}
}

impl<C: Clone + Send + Sync + 'static> Default for RouterState<C> {
	fn default() -> Self {
		Self::Initial
	}
}

impl<C: Clone + Send + Sync + 'static> std::fmt::Debug for RouterState<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut state = f.debug_struct("RouterState");
		state.field("name", &self.name());
		if let Some(route) = self.current_route() {
			state.field("current", &route.location());
		}
		if let Some(error) = self.error() {
			state.field("error", error);
		}
		state.finish()
	}
}
