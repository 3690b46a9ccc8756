//! Location splitting and flat query-string parsing.

use indexmap::IndexMap;

/// Flat key/value view of a query string.
pub type Query = IndexMap<String, String>;

/// Splits a location into its pathname and raw query string (without `?`).
///
/// Any `#fragment` is dropped.
pub fn split_location(location: &str) -> (&str, &str) {
	let location = location.split('#').next().unwrap_or_default();
	match location.split_once('?') {
		Some((pathname, search)) => (pathname, search),
		None => (location, ""),
	}
}

/// Parses a raw query string into a flat mapping.
///
/// Repeated keys keep the last value. Malformed input yields an empty map.
pub fn parse_query(search: &str) -> Query {
	let search = search.trim_start_matches('?');
	if search.is_empty() {
		return Query::new();
	}

	match serde_urlencoded::from_str::<Vec<(String, String)>>(search) {
		Ok(pairs) => pairs.into_iter().collect(),
		Err(err) => {
			tracing::debug!(search, error = %err, "ignoring malformed query string");
			Query::new()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/test", ("/test", ""))]
	#[case("/test?page=2", ("/test", "page=2"))]
	#[case("/test?page=2#top", ("/test", "page=2"))]
	#[case("/?", ("/", ""))]
	fn test_split_location(#[case] location: &str, #[case] expected: (&str, &str)) {
		assert_eq!(split_location(location), expected);
	}

	#[rstest]
	fn test_parse_query_flat_pairs() {
		let query = parse_query("page=2&sort=name&q=hello%20world");

		let pairs: Vec<_> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
		assert_eq!(
			pairs,
			vec![("page", "2"), ("sort", "name"), ("q", "hello world")]
		);
	}

	#[rstest]
	fn test_parse_query_last_value_wins() {
		let query = parse_query("?a=1&a=2");
		assert_eq!(query.get("a"), Some(&"2".to_string()));
		assert_eq!(query.len(), 1);
	}

	#[rstest]
	fn test_parse_query_empty() {
		assert!(parse_query("").is_empty());
		assert!(parse_query("?").is_empty());
	}
}
