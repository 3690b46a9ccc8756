//! Router settings
//!
//! Settings can be built in code or loaded from TOML/JSON documents, and are
//! validated when the router is built.

use crate::error::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};

/// How overlapping transitions are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
	/// One transition at a time, in request order.
	#[default]
	Serialized,
	/// Transitions race; the last one to commit becomes current.
	Concurrent,
}

/// Router configuration
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterSettings {
	/// Scheduling of overlapping transitions
	#[serde(default)]
	pub transition_policy: TransitionPolicy,

	/// Initial location of the default in-memory history
	#[serde(default = "default_path")]
	pub default_path: String,
}

fn default_path() -> String {
	"/".to_string()
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			transition_policy: TransitionPolicy::default(),
			default_path: default_path(),
		}
	}
}

impl RouterSettings {
	/// Sets the transition policy.
	pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
		self.transition_policy = policy;
		self
	}

	/// Sets the initial location of the default history.
	pub fn with_default_path(mut self, path: impl Into<String>) -> Self {
		self.default_path = path.into();
		self
	}

	/// Parses settings from a TOML document.
	pub fn from_toml_str(contents: &str) -> RouterResult<Self> {
		toml::from_str(contents)
			.map_err(|e| RouterError::invariant(format!("TOML parse error: {}", e)))
	}

	/// Parses settings from a JSON document.
	pub fn from_json_str(contents: &str) -> RouterResult<Self> {
		serde_json::from_str(contents)
			.map_err(|e| RouterError::invariant(format!("JSON parse error: {}", e)))
	}

	/// Validate settings
	pub fn validate(&self) -> RouterResult<()> {
		if !self.default_path.starts_with('/') {
			return Err(RouterError::invariant(format!(
				"default path '{}' must start with '/'",
				self.default_path
			)));
		}

		Ok(())
	}
}
