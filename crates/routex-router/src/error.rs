//! Router error types.

use crate::hooks::{HookError, HookKind};
use routex_core::{PatternError, RouteNotFoundError};
use std::sync::Arc;
use thiserror::Error;

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Error returned by router construction, activation and transitions.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RouterError {
	/// The router was misconfigured or misused.
	#[error("Invariant Violation: {0}")]
	Invariant(String),

	/// No route definition chain matches the requested location.
	#[error(transparent)]
	NotFound(#[from] RouteNotFoundError),

	/// A lifecycle hook rejected the transition.
	#[error(transparent)]
	HookRejected(#[from] HookRejectionError),

	/// A component or children loader panicked while resolving a location.
	#[error("Route loading for {location} panicked: {message}")]
	LoaderPanicked {
		/// The location being resolved.
		location: String,
		/// The panic message.
		message: String,
	},
}

impl RouterError {
	/// Creates an [`RouterError::Invariant`] error.
	pub fn invariant(message: impl Into<String>) -> Self {
		Self::Invariant(message.into())
	}

	/// Returns whether this is a not-found error.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound(_))
	}

	/// Returns whether this is a hook rejection.
	pub fn is_hook_rejection(&self) -> bool {
		matches!(self, Self::HookRejected(_))
	}

	/// Returns whether a route loader panicked.
	pub fn is_loader_panic(&self) -> bool {
		matches!(self, Self::LoaderPanicked { .. })
	}
}

impl From<PatternError> for RouterError {
	fn from(err: PatternError) -> Self {
		Self::Invariant(err.to_string())
	}
}

/// A lifecycle hook failed or panicked.
#[derive(Debug, Clone, Error)]
#[error("{kind} handlers on route {route_path} are not resolved.")]
pub struct HookRejectionError {
	kind: HookKind,
	route_path: String,
	#[source]
	source: Arc<dyn std::error::Error + Send + Sync>,
}

impl HookRejectionError {
	pub(crate) fn new(kind: HookKind, route_path: impl Into<String>, source: HookError) -> Self {
		Self {
			kind,
			route_path: route_path.into(),
			source: Arc::from(source),
		}
	}

	/// Returns which hook rejected.
	pub fn kind(&self) -> HookKind {
		self.kind
	}

	/// Returns the display path of the rejecting route.
	pub fn route_path(&self) -> &str {
		&self.route_path
	}

	/// Returns the error reported by the hook.
	pub fn hook_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
		self.source.as_ref()
	}
}
