//! Ordered query variables and the hand-built query string the API expects.

// self
use crate::_prelude::*;

/// Query variables kept in insertion order.
///
/// Re-setting a key replaces its value in place, so a paginator bumping `page` does not move
/// the pair to the end of the string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryVars(Vec<(String, String)>);
impl QueryVars {
	/// Parses a `key=value&key=value` string.
	///
	/// Pairs are kept exactly as written, escapes included, since [`Self::to_query_string`]
	/// emits them verbatim.
	pub fn parse(query: &str) -> Self {
		query
			.trim_start_matches('?')
			.split('&')
			.filter(|pair| !pair.is_empty())
			.map(|pair| pair.split_once('=').unwrap_or((pair, "")))
			.collect()
	}

	/// Sets `key`, keeping the original position when it already exists.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let key = key.into();
		let value = value.into();

		match self.0.iter_mut().find(|(k, _)| *k == key) {
			Some((_, slot)) => *slot = value,
			None => self.0.push((key, value)),
		}
	}

	/// Removes `key`, returning its value.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		let index = self.0.iter().position(|(k, _)| k == key)?;

		Some(self.0.remove(index).1)
	}

	/// Returns the value stored for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Reports whether `key` holds a non-empty value.
	pub fn has(&self, key: &str) -> bool {
		self.get(key).is_some_and(|value| !value.is_empty())
	}

	/// Number of variables.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether no variables are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Joins the pairs as `key=value&...`.
	///
	/// Values are emitted verbatim; filter expressions such as `$q=a==1;b=lt=2` must reach the
	/// server unescaped.
	pub fn to_query_string(&self) -> String {
		self.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
	}
}
impl<K, V> FromIterator<(K, V)> for QueryVars
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut vars = Self::default();

		for (key, value) in iter {
			vars.insert(key, value);
		}

		vars
	}
}
impl Display for QueryVars {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.to_query_string())
	}
}

/// Column or name lists accepted either pre-joined or as separate items.
pub trait ColumnList {
	/// Joins the items with commas.
	fn to_column_list(&self) -> String;
}
impl ColumnList for str {
	fn to_column_list(&self) -> String {
		self.to_owned()
	}
}
impl ColumnList for String {
	fn to_column_list(&self) -> String {
		self.clone()
	}
}
impl<T> ColumnList for [T]
where
	T: AsRef<str>,
{
	fn to_column_list(&self) -> String {
		self.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
	}
}
impl<T, const N: usize> ColumnList for [T; N]
where
	T: AsRef<str>,
{
	fn to_column_list(&self) -> String {
		self.as_slice().to_column_list()
	}
}
impl<T> ColumnList for Vec<T>
where
	T: AsRef<str>,
{
	fn to_column_list(&self) -> String {
		self.as_slice().to_column_list()
	}
}
impl<T> ColumnList for &T
where
	T: ?Sized + ColumnList,
{
	fn to_column_list(&self) -> String {
		(**self).to_column_list()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn reinsert_keeps_position() {
		let mut vars = QueryVars::default();

		vars.insert("pagesize", "10");
		vars.insert("page", "1");
		vars.insert("$q", "a==1");
		vars.insert("page", "2");

		assert_eq!(vars.to_query_string(), "pagesize=10&page=2&$q=a==1");
	}

	#[test]
	fn parse_keeps_pairs_in_order() {
		let vars = QueryVars::parse("?b=2&a=hello%20world&&flag&b=3");

		assert_eq!(
			vars.iter().collect::<Vec<_>>(),
			vec![("b", "3"), ("a", "hello%20world"), ("flag", "")]
		);
	}

	#[test]
	fn escaped_reserved_characters_survive_a_round_trip() {
		let raw = "q=name==A%26B&$q=a=lt=1%23x&order=n%2Bm&pagesize=5";
		let vars = QueryVars::parse(raw);

		assert_eq!(vars.len(), 4);
		assert_eq!(vars.get("q"), Some("name==A%26B"));
		assert_eq!(vars.get("$q"), Some("a=lt=1%23x"));
		assert_eq!(vars.to_query_string(), raw);
	}

	#[test]
	fn empty_values_do_not_count_as_present() {
		let vars: QueryVars = [("projection", ""), ("q", "x")].into_iter().collect();

		assert!(!vars.has("projection"));
		assert!(vars.has("q"));
		assert!(!vars.has("missing"));
	}

	#[test]
	fn column_lists_join_with_commas() {
		assert_eq!(["id", "name"].to_column_list(), "id,name");
		assert_eq!(vec!["a".to_owned()].to_column_list(), "a");
		assert_eq!("x,y".to_column_list(), "x,y");
	}
}
