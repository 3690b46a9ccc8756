//! Path pattern matching for route definitions.
//!
//! Patterns are compiled segment by segment so that a parent route can match
//! a prefix of the requested path and hand the remainder to its children.

use crate::error::{PatternError, PatternResult};
use indexmap::IndexMap;
use std::borrow::Cow;

/// Maximum allowed length for a route pattern string in bytes.
pub const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a route pattern.
pub const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled variable constraint (in bytes).
const MAX_CONSTRAINT_SIZE: usize = 1 << 20; // 1 MiB

/// A single compiled pattern segment.
#[derive(Debug, Clone)]
enum Segment {
	/// Matched verbatim.
	Literal(String),
	/// Binds any non-empty token, optionally restricted by an anchored regex.
	Variable {
		name: String,
		constraint: Option<regex::Regex>,
	},
}

/// Result of matching a pattern against the head of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
	/// Variables bound by the pattern, in declaration order.
	pub vars: IndexMap<String, String>,
	/// Number of path segments consumed.
	pub consumed: usize,
}

/// Represents a compiled route pattern.
///
/// Supports patterns like:
/// - `/` or `` - Matches without consuming anything
/// - `users` - Exact segment match
/// - `users/:id` - Binds any non-empty segment to `id`
/// - `users/:id{\d+}` - Binds `id` only when the whole segment matches `\d+`
///
/// Leading, trailing and repeated slashes are insignificant, both in the
/// pattern and in matched paths.
#[derive(Debug, Clone)]
pub struct PathPattern {
	/// The original pattern string.
	pattern: String,
	/// Compiled segments in order.
	segments: Vec<Segment>,
	/// Variable names in order.
	var_names: Vec<String>,
}

impl PathPattern {
	/// Compiles a pattern string.
	///
	/// # Errors
	///
	/// Returns [`PatternError`] if:
	/// - Pattern exceeds maximum length (1024 bytes)
	/// - Pattern has too many path segments (>32)
	/// - A variable has no name or an unterminated `{` constraint
	/// - A constraint is not a valid regex
	pub fn new(pattern: &str) -> PatternResult<Self> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(PatternError::TooLong {
				length: pattern.len(),
				max: MAX_PATTERN_LENGTH,
			});
		}

		let raw_segments = Self::split_pattern(pattern)?;
		if raw_segments.len() > MAX_PATH_SEGMENTS {
			return Err(PatternError::TooManySegments {
				count: raw_segments.len(),
				max: MAX_PATH_SEGMENTS,
			});
		}

		let mut segments = Vec::with_capacity(raw_segments.len());
		let mut var_names = Vec::new();
		for raw in raw_segments {
			let segment = Self::compile_segment(pattern, raw)?;
			if let Segment::Variable { name, .. } = &segment {
				var_names.push(name.clone());
			}
			segments.push(segment);
		}

		Ok(Self {
			pattern: pattern.to_string(),
			segments,
			var_names,
		})
	}

	/// Splits a pattern on `/`, ignoring slashes inside `{...}` constraints.
	fn split_pattern(pattern: &str) -> PatternResult<Vec<&str>> {
		let mut segments = Vec::new();
		let mut depth = 0usize;
		let mut start = 0usize;

		for (idx, c) in pattern.char_indices() {
			match c {
				'{' => depth += 1,
				'}' => depth = depth.saturating_sub(1),
				'/' if depth == 0 => {
					if idx > start {
						segments.push(&pattern[start..idx]);
					}
					start = idx + 1;
				}
				_ => {}
			}
		}

		if depth != 0 {
			return Err(PatternError::UnterminatedConstraint {
				pattern: pattern.to_string(),
			});
		}
		if start < pattern.len() {
			segments.push(&pattern[start..]);
		}

		Ok(segments)
	}

	/// Compiles one raw segment into a literal or a variable.
	fn compile_segment(pattern: &str, raw: &str) -> PatternResult<Segment> {
		let Some(spec) = raw.strip_prefix(':') else {
			return Ok(Segment::Literal(raw.to_string()));
		};

		let (name, constraint) = match spec.find('{') {
			Some(open) => {
				let body = spec[open + 1..].strip_suffix('}').ok_or_else(|| {
					PatternError::UnterminatedConstraint {
						pattern: pattern.to_string(),
					}
				})?;
				(&spec[..open], Some(body))
			}
			None => (spec, None),
		};

		if name.is_empty() {
			return Err(PatternError::EmptyVariableName {
				pattern: pattern.to_string(),
			});
		}

		let constraint = constraint
			.map(|body| {
				// Use RegexBuilder with size limits to prevent memory exhaustion
				regex::RegexBuilder::new(&format!("^(?:{})$", body))
					.size_limit(MAX_CONSTRAINT_SIZE)
					.build()
					.map_err(|e| PatternError::InvalidConstraint {
						variable: name.to_string(),
						message: e.to_string(),
					})
			})
			.transpose()?;

		Ok(Segment::Variable {
			name: name.to_string(),
			constraint,
		})
	}

	/// Returns the original pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the pattern as it appears in diagnostics: without surrounding
	/// slashes, or `/` for the root pattern.
	pub fn display_path(&self) -> &str {
		match self.pattern.trim_matches('/') {
			"" => "/",
			trimmed => trimmed,
		}
	}

	/// Returns the variable names in declaration order.
	pub fn var_names(&self) -> &[String] {
		&self.var_names
	}

	/// Returns the number of segments this pattern consumes on a match.
	pub fn segment_count(&self) -> usize {
		self.segments.len()
	}

	/// Returns whether this is an exact match pattern (no variables).
	pub fn is_exact(&self) -> bool {
		self.var_names.is_empty()
	}

	/// Matches the pattern against the head of `segments`.
	///
	/// Returns the bound variables and the number of consumed segments, or
	/// `None` if any pattern segment fails to match.
	pub fn match_prefix(&self, segments: &[&str]) -> Option<PatternMatch> {
		if segments.len() < self.segments.len() {
			return None;
		}

		let mut vars = IndexMap::with_capacity(self.var_names.len());
		for (segment, token) in self.segments.iter().zip(segments) {
			let token = decode_segment(token);
			match segment {
				Segment::Literal(literal) => {
					if literal.as_str() != token.as_ref() {
						return None;
					}
				}
				Segment::Variable { name, constraint } => {
					if token.is_empty() {
						return None;
					}
					if constraint.as_ref().is_some_and(|re| !re.is_match(&token)) {
						return None;
					}
					vars.insert(name.clone(), token.into_owned());
				}
			}
		}

		Some(PatternMatch {
			vars,
			consumed: self.segments.len(),
		})
	}

	/// Matches the pattern against a whole path.
	///
	/// Returns the bound variables if every path segment is consumed.
	pub fn matches(&self, path: &str) -> Option<IndexMap<String, String>> {
		let segments = split_path(path);
		self.match_prefix(&segments)
			.filter(|m| m.consumed == segments.len())
			.map(|m| m.vars)
	}

	/// Checks if this pattern would match the whole path.
	pub fn is_match(&self, path: &str) -> bool {
		self.matches(path).is_some()
	}
}

/// Splits a path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
	path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Percent-decodes a path segment, keeping the raw text if it is not UTF-8.
fn decode_segment(token: &str) -> Cow<'_, str> {
	urlencoding::decode(token).unwrap_or(Cow::Borrowed(token))
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for PathPattern {}

impl std::fmt::Display for PathPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pattern)
	}
}
