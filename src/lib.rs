//! # Routex
//!
//! A client-side navigation engine: route trees with lazily loaded
//! components and children, async lifecycle hooks, transition events and
//! two-way synchronization with a session history.
//!
//! This crate is a unified interface over the following internal crates:
//!
//! - [`core`] (`routex-core`): path patterns, route nodes and the resolver
//! - [`history`] (`routex-history`): the history backend contract and the
//!   in-memory backend
//! - [`router`] (`routex-router`): the router, its transition pipeline and
//!   history synchronization
//!
//! ## Feature Flags
//!
//! - `memory-history` (default): [`MemoryHistory`](history::MemoryHistory),
//!   also used by [`RouterBuilder`](router::RouterBuilder) when no backend is
//!   supplied
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use routex::prelude::*;
//!
//! let routes = vec![RouteDefinition::new("/", "layout").with_children(vec![
//!     RouteDefinition::new("", "home"),
//!     RouteDefinition::suspended("settings", || async { "settings" }),
//! ])];
//!
//! let router = Router::builder(routes)
//!     .on_transition(|error| {
//!         if let Some(error) = error {
//!             eprintln!("navigation failed: {error}");
//!         }
//!     })
//!     .build()?;
//! router.listen()?;
//!
//! let route = router.run("/settings", vec![]).await?;
//! assert_eq!(route.components(), &["layout", "settings"]);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use routex_core as core;
pub use routex_history as history;
pub use routex_router as router;

/// Commonly used types.
pub mod prelude {
	pub use routex_core::{PathPattern, PatternError, Query, RouteNotFoundError};
	#[cfg(feature = "memory-history")]
	#[cfg_attr(docsrs, doc(cfg(feature = "memory-history")))]
	pub use routex_history::MemoryHistory;
	pub use routex_history::{HistoryBackend, Location, NavigationType};
	pub use routex_router::{
		ChangeEvent, ChangeFailEvent, EnterContext, HookArgs, HookError, HookInvocation,
		HookKind, HookRejectionError, HookResult, LeaveContext, ListenerId, NotFoundEvent,
		ResolvedRoute, RouteDefinition, RouteSeed, Router, RouterBuilder, RouterError,
		RouterResult, RouterSettings, RouterState, TransitionPolicy,
	};
}
