//! Routex History - session history backends
//!
//! The router never talks to a platform history directly. It goes through the
//! object-safe [`HistoryBackend`] trait, which exposes the current
//! [`Location`], a listener subscription and the push/replace/back/forward
//! operations.
//!
//! ## Features
//!
//! - `memory` (default): [`MemoryHistory`], an entry list with a cursor

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backend;
pub mod location;
#[cfg(feature = "memory")]
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
pub mod memory;

pub use backend::{HistoryBackend, HistoryListener, HistoryListenerId};
pub use location::{Location, NavigationType};
#[cfg(feature = "memory")]
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
pub use memory::MemoryHistory;
