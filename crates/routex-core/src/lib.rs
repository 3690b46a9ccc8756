//! Routex Core - route matching primitives
//!
//! Everything the navigation engine needs to turn a location string into a
//! resolved route chain, independent of history backends and transitions.
//!
//! ## Modules
//!
//! - [`pattern`]: path patterns with `:name` and `:name{regex}` variables
//! - [`query`]: location splitting and flat query-string parsing
//! - [`lazy`]: cached values produced by plain values, factories or async loaders
//! - [`route`]: the [`RouteNode`] abstraction and resolved [`RouteMatch`]es
//! - [`resolver`]: level-by-level resolution of a location against a route tree
//!
//! ## Example
//!
//! ```ignore
//! use routex_core::{PathPattern, split_path};
//!
//! let pattern = PathPattern::new("users/:id{\\d+}")?;
//! let matched = pattern.match_prefix(&split_path("/users/42/posts")).unwrap();
//!
//! assert_eq!(matched.vars.get("id"), Some(&"42".to_string()));
//! assert_eq!(matched.consumed, 2);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod lazy;
pub mod pattern;
pub mod query;
pub mod resolver;
pub mod route;

pub use error::{PatternError, PatternResult, RouteNotFoundError};
pub use lazy::{Lazy, Loader};
pub use pattern::{MAX_PATH_SEGMENTS, MAX_PATTERN_LENGTH, PathPattern, PatternMatch, split_path};
pub use query::{Query, parse_query, split_location};
pub use resolver::resolve;
pub use route::{ChainEntry, RouteMatch, RouteNode};
