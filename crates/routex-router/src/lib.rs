//! Routex Router - transitions, lifecycle hooks and history synchronization
//!
//! A [`Router`] resolves locations against a tree of [`RouteDefinition`]s,
//! runs `on_leave`/`on_enter` hooks for the part of the route chain that
//! changes, commits the new route and keeps a [`HistoryBackend`] in sync.
//!
//! ## Architecture
//!
//! - [`definition`]: route definitions with lazy components and children
//! - [`hooks`]: hook contexts, results and the hook interception API
//! - [`pipeline`]: the transition pipeline behind [`Router::run`]
//! - [`sync`]: [`Router::listen`] and the history driver task
//! - [`listeners`]: ChangeStart/ChangeSuccess/ChangeFail/NotFound listeners
//! - [`state`]: [`RouterState`]
//! - [`settings`]: [`RouterSettings`]
//!
//! ## Example
//!
//! ```ignore
//! use routex_router::{RouteDefinition, Router};
//! use routex_history::MemoryHistory;
//! use std::sync::Arc;
//!
//! let routes = vec![
//!     RouteDefinition::new("/", "layout").with_children(vec![
//!         RouteDefinition::new("", "home"),
//!         RouteDefinition::new("users/:id{\\d+}", "user").on_enter(|ctx| async move {
//!             println!("entering user {}", ctx.current.vars()["id"]);
//!             Ok(())
//!         }),
//!     ]),
//! ];
//!
//! let router = Router::new(routes, Arc::new(MemoryHistory::default()));
//! router.listen()?;
//!
//! let route = router.run("/users/42", vec![]).await?;
//! assert_eq!(route.components(), &["layout", "user"]);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod definition;
pub mod error;
pub mod hooks;
pub mod listeners;
pub mod pipeline;
pub mod router;
pub mod settings;
pub mod state;
pub mod sync;

pub use definition::{ResolvedRoute, RouteDefinition};
pub use error::{HookRejectionError, RouterError, RouterResult};
pub use hooks::{
	EnterContext, HookArgs, HookError, HookFuture, HookInvocation, HookKind, HookResult,
	HookWrapper, LeaveContext, RawHook,
};
pub use listeners::{ChangeEvent, ChangeFailEvent, Listener, ListenerId, NotFoundEvent};
pub use router::{RouteSeed, Router, RouterBuilder, TransitionCallback};
pub use routex_history::HistoryBackend;
pub use settings::{RouterSettings, TransitionPolicy};
pub use state::RouterState;
