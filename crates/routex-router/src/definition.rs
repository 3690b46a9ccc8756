//! Route definitions.
//!
//! A [`RouteDefinition`] pairs a path pattern with a component, optional
//! lifecycle hooks and an optional children source. Components and children
//! may be plain values, synchronous factories or async loaders; each is
//! evaluated at most once per definition and cached.

use crate::hooks::{EnterContext, EnterHook, HookResult, LeaveContext, LeaveHook};
use futures::FutureExt;
use futures::future::BoxFuture;
use routex_core::{Lazy, PathPattern, RouteMatch, RouteNode};
use std::future::Future;
use std::sync::Arc;

/// A route resolved against a tree of [`RouteDefinition`]s.
pub type ResolvedRoute<C> = RouteMatch<RouteDefinition<C>>;

type Children<C> = Arc<[Arc<RouteDefinition<C>>]>;

/// A node of the route tree.
pub struct RouteDefinition<C: Clone + Send + Sync + 'static> {
	pattern: PathPattern,
	component: Lazy<C>,
	children: Option<Lazy<Children<C>>>,
	on_enter: Option<EnterHook<C>>,
	on_leave: Option<LeaveHook<C>>,
}

impl<C: Clone + Send + Sync + 'static> RouteDefinition<C> {
	/// Creates a route rendering `component`.
	///
	/// # Panics
	///
	/// Panics if the pattern is invalid (exceeds length/segment limits or invalid regex).
	/// Use [`RouteDefinition::from_parts`] with [`PathPattern::new`] for fallible construction.
	pub fn new(pattern: &str, component: C) -> Self {
		Self::from_parts(compile(pattern), Lazy::ready(component))
	}

	/// Creates a route whose component is produced by `factory` on first match.
	///
	/// # Panics
	///
	/// Panics if the pattern is invalid.
	pub fn lazy<F>(pattern: &str, factory: F) -> Self
	where
		F: Fn() -> C + Send + Sync + 'static,
	{
		Self::from_parts(compile(pattern), Lazy::from_fn(factory))
	}

	/// Creates a route whose component is loaded asynchronously on first match.
	///
	/// # Panics
	///
	/// Panics if the pattern is invalid.
	pub fn suspended<F, Fut>(pattern: &str, loader: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = C> + Send + 'static,
	{
		Self::from_parts(compile(pattern), Lazy::from_future_fn(loader))
	}

	/// Creates a route from a compiled pattern and a component slot.
	pub fn from_parts(pattern: PathPattern, component: Lazy<C>) -> Self {
		Self {
			pattern,
			component,
			children: None,
			on_enter: None,
			on_leave: None,
		}
	}

	/// Sets the child routes.
	pub fn with_children(mut self, children: Vec<RouteDefinition<C>>) -> Self {
		self.children = Some(Lazy::ready(into_children(children)));
		self
	}

	/// Sets a factory producing the child routes on first descent.
	pub fn with_children_fn<F>(mut self, factory: F) -> Self
	where
		F: Fn() -> Vec<RouteDefinition<C>> + Send + Sync + 'static,
	{
		self.children = Some(Lazy::from_fn(move || into_children(factory())));
		self
	}

	/// Sets an async loader producing the child routes on first descent.
	pub fn with_children_async<F, Fut>(mut self, loader: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Vec<RouteDefinition<C>>> + Send + 'static,
	{
		self.children = Some(Lazy::from_future_fn(move || loader().map(into_children)));
		self
	}

	/// Sets the hook run when this route enters the matched chain.
	pub fn on_enter<F, Fut>(mut self, hook: F) -> Self
	where
		F: Fn(EnterContext<C>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = HookResult> + Send + 'static,
	{
		self.on_enter = Some(Arc::new(move |ctx| hook(ctx).boxed()));
		self
	}

	/// Sets the hook run when this route exits the matched chain.
	pub fn on_leave<F, Fut>(mut self, hook: F) -> Self
	where
		F: Fn(LeaveContext<C>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = HookResult> + Send + 'static,
	{
		self.on_leave = Some(Arc::new(move |ctx| hook(ctx).boxed()));
		self
	}

	/// Returns the compiled path pattern.
	pub fn path_pattern(&self) -> &PathPattern {
		&self.pattern
	}

	/// Returns the component if it has already been resolved.
	pub fn resolved_component(&self) -> Option<C> {
		self.component.peek()
	}

	/// Returns whether the children source has already been resolved.
	pub fn children_resolved(&self) -> bool {
		self.children.as_ref().is_some_and(Lazy::is_resolved)
	}

	pub(crate) fn enter_hook(&self) -> Option<&EnterHook<C>> {
		self.on_enter.as_ref()
	}

	pub(crate) fn leave_hook(&self) -> Option<&LeaveHook<C>> {
		self.on_leave.as_ref()
	}
}

fn compile(pattern: &str) -> PathPattern {
	PathPattern::new(pattern)
		.unwrap_or_else(|e| panic!("Invalid route pattern '{}': {}", pattern, e))
}

pub(crate) fn into_children<C: Clone + Send + Sync + 'static>(
	routes: Vec<RouteDefinition<C>>,
) -> Children<C> {
	routes.into_iter().map(Arc::new).collect()
}

impl<C: Clone + Send + Sync + 'static> RouteNode for RouteDefinition<C> {
	type Component = C;

	fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	fn has_children(&self) -> bool {
		self.children.is_some()
	}

	fn component(&self) -> BoxFuture<'static, C> {
		self.component.get()
	}

	fn children(&self) -> BoxFuture<'static, Children<C>> {
		match &self.children {
			Some(children) => children.get(),
			None => futures::future::ready(Children::<C>::from(Vec::new())).boxed(),
		}
	}
}

impl<C: Clone + Send + Sync + 'static> std::fmt::Debug for RouteDefinition<C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteDefinition")
			.field("pattern", &self.pattern.pattern())
			.field("component", &self.component)
			.field("children", &self.children)
			.field("has_on_enter", &self.on_enter.is_some())
			.field("has_on_leave", &self.on_leave.is_some())
			.finish()
	}
}
