//! Error types for pattern compilation and route resolution.

use thiserror::Error;

/// Result type for pattern compilation.
pub type PatternResult<T> = Result<T, PatternError>;

/// Error raised while compiling a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PatternError {
	/// Pattern string is longer than the compiler accepts.
	#[error("Pattern length {length} exceeds maximum allowed length of {max} bytes")]
	TooLong {
		/// Length of the rejected pattern.
		length: usize,
		/// Maximum accepted length.
		max: usize,
	},

	/// Pattern has more path segments than the compiler accepts.
	#[error("Pattern has {count} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Number of segments in the rejected pattern.
		count: usize,
		/// Maximum accepted segment count.
		max: usize,
	},

	/// A `:` variable marker without a name.
	#[error("Pattern '{pattern}' declares a variable without a name")]
	EmptyVariableName {
		/// The offending pattern.
		pattern: String,
	},

	/// A `{` constraint that is never closed.
	#[error("Pattern '{pattern}' has an unterminated variable constraint")]
	UnterminatedConstraint {
		/// The offending pattern.
		pattern: String,
	},

	/// A variable constraint that is not a valid regex.
	#[error("Failed to compile constraint for variable '{variable}': {message}")]
	InvalidConstraint {
		/// Variable carrying the constraint.
		variable: String,
		/// Message reported by the regex compiler.
		message: String,
	},
}

/// No chain of route definitions consumes the requested path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Route not found: {path}")]
pub struct RouteNotFoundError {
	path: String,
}

impl RouteNotFoundError {
	/// Creates a not-found error for `path`.
	pub fn new(path: impl Into<String>) -> Self {
		Self { path: path.into() }
	}

	/// Returns the location that failed to resolve.
	pub fn path(&self) -> &str {
		&self.path
	}
}
