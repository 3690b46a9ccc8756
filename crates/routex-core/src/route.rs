//! Route nodes and resolved routes.

use crate::pattern::PathPattern;
use crate::query::Query;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::sync::Arc;

/// A node of a route tree as seen by the resolver.
///
/// Implementations cache their component and children, so repeated
/// resolutions of the same node instance never re-run a loader.
pub trait RouteNode: Send + Sync + Sized + 'static {
	/// The component type attached to each node.
	type Component: Clone + Send + Sync + 'static;

	/// Returns the compiled path pattern.
	fn pattern(&self) -> &PathPattern;

	/// Returns whether the node declares a children source.
	///
	/// Nodes without one are leaves and must consume the rest of the path.
	fn has_children(&self) -> bool;

	/// Resolves the node's component.
	fn component(&self) -> BoxFuture<'static, Self::Component>;

	/// Resolves the node's children.
	fn children(&self) -> BoxFuture<'static, Arc<[Arc<Self>]>>;
}

/// One matched node of a route chain with the variables it bound.
pub struct ChainEntry<N> {
	node: Arc<N>,
	vars: IndexMap<String, String>,
}

impl<N> ChainEntry<N> {
	pub(crate) fn new(node: Arc<N>, vars: IndexMap<String, String>) -> Self {
		Self { node, vars }
	}

	/// Returns the matched node.
	pub fn node(&self) -> &Arc<N> {
		&self.node
	}

	/// Returns the variables bound by this node alone.
	pub fn vars(&self) -> &IndexMap<String, String> {
		&self.vars
	}

	/// Returns whether both entries refer to the same node instance bound to
	/// the same variables.
	pub fn same_as(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.node, &other.node) && self.vars == other.vars
	}
}

impl<N> Clone for ChainEntry<N> {
	fn clone(&self) -> Self {
		Self {
			node: Arc::clone(&self.node),
			vars: self.vars.clone(),
		}
	}
}

impl<N: RouteNode> std::fmt::Debug for ChainEntry<N> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ChainEntry")
			.field("pattern", &self.node.pattern().pattern())
			.field("vars", &self.vars)
			.finish()
	}
}

/// A fully resolved route: the outcome of matching a location against a tree.
///
/// Immutable once built; the router shares it behind an `Arc`.
pub struct RouteMatch<N: RouteNode> {
	pathname: String,
	search: String,
	query: Query,
	vars: IndexMap<String, String>,
	components: Vec<N::Component>,
	chain: Vec<ChainEntry<N>>,
}

impl<N: RouteNode> RouteMatch<N> {
	pub(crate) fn new(
		pathname: String,
		search: String,
		query: Query,
		components: Vec<N::Component>,
		chain: Vec<ChainEntry<N>>,
	) -> Self {
		let mut vars = IndexMap::new();
		for entry in &chain {
			for (name, value) in entry.vars() {
				vars.insert(name.clone(), value.clone());
			}
		}

		Self {
			pathname,
			search,
			query,
			vars,
			components,
			chain,
		}
	}

	/// Returns the matched path, without query string.
	pub fn pathname(&self) -> &str {
		&self.pathname
	}

	/// Returns the parsed query string.
	pub fn query(&self) -> &Query {
		&self.query
	}

	/// Returns the path variables captured along the chain, root to leaf.
	pub fn vars(&self) -> &IndexMap<String, String> {
		&self.vars
	}

	/// Returns the resolved components, root to leaf.
	pub fn components(&self) -> &[N::Component] {
		&self.components
	}

	/// Returns the matched chain, root to leaf.
	pub fn chain(&self) -> &[ChainEntry<N>] {
		&self.chain
	}

	/// Returns the location (pathname plus query string) this route was
	/// resolved from.
	pub fn location(&self) -> String {
		if self.search.is_empty() {
			self.pathname.clone()
		} else {
			format!("{}?{}", self.pathname, self.search)
		}
	}
}

impl<N: RouteNode> std::fmt::Debug for RouteMatch<N>
where
	N::Component: std::fmt::Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouteMatch")
			.field("pathname", &self.pathname)
			.field("query", &self.query)
			.field("vars", &self.vars)
			.field("components", &self.components)
			.field("chain", &self.chain)
			.finish()
	}
}
