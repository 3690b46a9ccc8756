//! History locations and navigation kinds.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of navigation that produced a history notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationType {
	/// A new entry was pushed.
	Push,
	/// The current entry was replaced.
	Replace,
	/// The cursor moved (back/forward), or the listener was just attached.
	Pop,
}

impl std::fmt::Display for NavigationType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Push => "PUSH",
			Self::Replace => "REPLACE",
			Self::Pop => "POP",
		};
		f.write_str(name)
	}
}

/// A single history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
	/// Path without query string.
	pub pathname: String,
	/// Query string including the leading `?`, or empty.
	pub search: String,
	/// State value attached to the entry.
	pub state: Value,
}

impl Location {
	/// Creates a location from a path that may carry a query string.
	///
	/// A `#fragment` is dropped, and an empty pathname becomes `/`.
	pub fn new(path: &str) -> Self {
		let path = path.split('#').next().unwrap_or_default();
		let (pathname, search) = match path.split_once('?') {
			Some((pathname, "")) => (pathname, String::new()),
			Some((pathname, query)) => (pathname, format!("?{query}")),
			None => (path, String::new()),
		};
		let pathname = if pathname.is_empty() { "/" } else { pathname };

		Self {
			pathname: pathname.to_string(),
			search,
			state: Value::Null,
		}
	}

	/// Attaches a state value.
	pub fn with_state(mut self, state: Value) -> Self {
		self.state = state;
		self
	}

	/// Returns the pathname followed by the query string.
	pub fn path(&self) -> String {
		format!("{}{}", self.pathname, self.search)
	}
}

impl Default for Location {
	fn default() -> Self {
		Self::new("/")
	}
}
