//! Route tree resolution.
//!
//! # Algorithm
//!
//! ```text
//! location ──split──▶ pathname segments + query
//!     level = root definitions
//!     loop:
//!         first node in level whose pattern matches the head of the
//!         remaining segments (leaves must consume everything)
//!             → resolve component, bind vars, push onto chain
//!             → leaf?            done
//!             → resolve children, continue with them
//!         no node matches:
//!             → remaining path empty and a parent matched: done
//!             → otherwise: not found
//! ```
//!
//! Siblings are tried in declaration order and the first match is committed
//! to: a sibling whose subtree fails further down is not retried.

use crate::error::RouteNotFoundError;
use crate::pattern::{PatternMatch, split_path};
use crate::query::{parse_query, split_location};
use crate::route::{ChainEntry, RouteMatch, RouteNode};
use std::sync::Arc;

/// Resolves `location` against a route tree.
///
/// # Errors
///
/// Returns [`RouteNotFoundError`] if no chain of definitions consumes the
/// whole pathname.
pub async fn resolve<N: RouteNode>(
	routes: &[Arc<N>],
	location: &str,
) -> Result<RouteMatch<N>, RouteNotFoundError> {
	let (pathname, search) = split_location(location);
	let query = parse_query(search);
	let segments = split_path(pathname);

	let mut level: Arc<[Arc<N>]> = routes.iter().cloned().collect();
	let mut rest: &[&str] = &segments;
	let mut components = Vec::new();
	let mut chain = Vec::new();

	loop {
		let Some((node, matched)) = select(&level, rest) else {
			if !chain.is_empty() && rest.is_empty() {
				break;
			}
			tracing::debug!(location, remaining = ?rest, "no route definition matches");
			return Err(RouteNotFoundError::new(location));
		};

		tracing::trace!(
			pattern = node.pattern().pattern(),
			consumed = matched.consumed,
			"route definition matched"
		);

		components.push(node.component().await);
		rest = &rest[matched.consumed..];

		let children = if node.has_children() {
			Some(node.children().await)
		} else {
			None
		};
		chain.push(ChainEntry::new(node, matched.vars));

		match children {
			Some(children) => level = children,
			None => break,
		}
	}

	Ok(RouteMatch::new(
		pathname.to_string(),
		search.to_string(),
		query,
		components,
		chain,
	))
}

/// Picks the first node of `level` matching the head of `rest`.
fn select<N: RouteNode>(level: &[Arc<N>], rest: &[&str]) -> Option<(Arc<N>, PatternMatch)> {
	level.iter().find_map(|node| {
		let matched = node.pattern().match_prefix(rest)?;
		if !node.has_children() && matched.consumed != rest.len() {
			return None;
		}
		Some((Arc::clone(node), matched))
	})
}
