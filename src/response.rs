//! Shape-normalized view over an API reply.
//!
//! [`Response`] keeps the original payload, the inferred data, and the metadata found next to
//! it. Records are exposed uniformly: a list yields its items, a single object yields itself,
//! and a table record nested as `tables.<table>` is unwrapped on the way out.

pub mod infer;

pub use infer::*;

// self
use crate::_prelude::*;

/// Normalized API reply.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
	data: Value,
	table_name: Option<String>,
	expansions: Vec<String>,
	extensions: Vec<String>,
	#[serde(skip)]
	meta: Map<String, Value>,
	#[serde(skip)]
	original: Value,
}
impl Response {
	/// Normalizes `raw`, looking for the data under `record_key` first.
	///
	/// The table name is taken from the payload's top-level `name` when present.
	pub fn new(raw: Value, record_key: &str) -> Self {
		let Inferred { data, meta, expansions, extensions } = infer(&raw, record_key);
		let table_name = raw
			.get("name")
			.and_then(Value::as_str)
			.filter(|name| !name.is_empty())
			.map(str::to_lowercase);

		Self { data, table_name, expansions, extensions, meta, original: raw }
	}

	/// Sets the table name when the payload did not carry one.
	pub fn with_table_name(mut self, table: &str) -> Self {
		if self.table_name.is_none() && !table.starts_with('/') {
			self.table_name = Some(table.to_lowercase());
		}

		self
	}

	/// Inferred data: an array of records or a single record.
	pub fn data(&self) -> &Value {
		&self.data
	}

	/// Replaces the data.
	pub fn set_data(&mut self, data: Value) {
		self.data = data;
	}

	/// Payload exactly as decoded.
	pub fn original(&self) -> &Value {
		&self.original
	}

	/// Keyed metadata found next to the data.
	pub fn meta(&self) -> &Map<String, Value> {
		&self.meta
	}

	/// One metadata value, e.g. `count` from a `/count` call.
	pub fn meta_value(&self, key: &str) -> Option<&Value> {
		self.meta.get(key)
	}

	/// Expansions reported by the service.
	pub fn expansions(&self) -> &[String] {
		&self.expansions
	}

	/// Extensions reported by the service.
	pub fn extensions(&self) -> &[String] {
		&self.extensions
	}

	/// Lowercase table name, when known.
	pub fn table_name(&self) -> Option<&str> {
		self.table_name.as_deref()
	}

	/// Iterates over the records.
	pub fn records(&self) -> Records<'_> {
		let items: Vec<&Value> = match &self.data {
			Value::Array(items) => items.iter().collect(),
			Value::Object(object) if object.is_empty() => Vec::new(),
			Value::Null => Vec::new(),
			single => vec![single],
		};

		Records { items: items.into_iter(), table_name: self.table_name.as_deref() }
	}

	/// Number of records.
	pub fn count(&self) -> usize {
		self.records().len()
	}

	/// Whether there are no records.
	pub fn is_empty(&self) -> bool {
		self.count() == 0
	}

	/// Record at `index`.
	pub fn get(&self, index: usize) -> Option<&Value> {
		self.records().nth(index)
	}

	/// Top-level field of the data.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.data.get(name)
	}

	/// Walks the data along a dotted path; numeric segments index arrays.
	pub fn get_path(&self, path: &str) -> Option<&Value> {
		path.split('.').filter(|segment| !segment.is_empty()).try_fold(&self.data, |value, segment| {
			match value {
				Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
				other => other.get(segment),
			}
		})
	}

	/// Wraps a single-object payload into a one-element list.
	pub fn wrap_single_record(&mut self) {
		if matches!(&self.data, Value::Object(object) if !object.is_empty()) {
			self.data = Value::Array(vec![self.data.take()]);
		}
	}

	/// Replaces every record with its `tables.<table>` content.
	pub fn squash_table_response(&mut self) {
		let Some(table) = self.table_name.clone() else {
			return;
		};

		match &mut self.data {
			Value::Array(items) => items.iter_mut().for_each(|item| squash(item, &table)),
			single => squash(single, &table),
		}
	}

	/// Consumes the response, returning the unwrapped records.
	pub fn into_records(self) -> Vec<Value> {
		self.records().cloned().collect()
	}

	/// Clone of the data.
	pub fn to_value(&self) -> Value {
		self.data.clone()
	}

	/// Data serialized as JSON text.
	pub fn to_json(&self) -> String {
		self.data.to_string()
	}
}
impl<'a> IntoIterator for &'a Response {
	type IntoIter = Records<'a>;
	type Item = &'a Value;

	fn into_iter(self) -> Self::IntoIter {
		self.records()
	}
}
impl From<Response> for Value {
	fn from(response: Response) -> Self {
		response.data
	}
}

/// Iterator over the records of a [`Response`].
#[derive(Clone, Debug)]
pub struct Records<'a> {
	items: std::vec::IntoIter<&'a Value>,
	table_name: Option<&'a str>,
}
impl<'a> Iterator for Records<'a> {
	type Item = &'a Value;

	fn next(&mut self) -> Option<Self::Item> {
		self.items.next().map(|record| unwrap_table(record, self.table_name))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.items.size_hint()
	}
}
impl ExactSizeIterator for Records<'_> {}

fn unwrap_table<'a>(record: &'a Value, table_name: Option<&str>) -> &'a Value {
	table_name.and_then(|table| record.get("tables")?.get(table)).unwrap_or(record)
}

fn squash(record: &mut Value, table: &str) {
	if let Some(inner) = record.get_mut("tables").and_then(|tables| tables.get_mut(table)) {
		*record = inner.take();
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn table_page() -> Value {
		json!({
			"name": "U_CustomTable",
			"record": [
				{ "id": 1, "tables": { "u_customtable": { "column1": "a" } } },
				{ "id": 2, "tables": { "u_customtable": { "column1": "b" } } },
			],
		})
	}

	#[test]
	fn table_records_are_unwrapped() {
		let response = Response::new(table_page(), "record");
		let columns = response.records().map(|r| r["column1"].clone()).collect::<Vec<_>>();

		assert_eq!(response.table_name(), Some("u_customtable"));
		assert_eq!(response.count(), 2);
		assert_eq!(columns, vec![json!("a"), json!("b")]);
		assert_eq!(response.get_path("1.tables.u_customtable.column1"), Some(&json!("b")));
		assert_eq!(response.original(), &table_page());
	}

	#[test]
	fn single_record_counts_as_one() {
		let raw = json!({
			"id": 3,
			"name": "u_customtable",
			"tables": { "u_customtable": { "column1": "c" } },
		});
		let mut response = Response::new(raw, "record");

		assert_eq!(response.count(), 1);
		assert_eq!(response.get(0), Some(&json!({ "column1": "c" })));

		response.wrap_single_record();

		assert!(response.data().is_array());
		assert_eq!(response.count(), 1);
	}

	#[test]
	fn builder_table_name_fills_gaps_only() {
		let response = Response::new(json!({ "record": [] }), "record").with_table_name("Students");

		assert_eq!(response.table_name(), Some("students"));
		assert!(response.is_empty());

		let response = Response::new(table_page(), "record").with_table_name("other");

		assert_eq!(response.table_name(), Some("u_customtable"));
	}

	#[test]
	fn squash_replaces_data_with_inner_fields() {
		let mut response = Response::new(table_page(), "record");

		response.squash_table_response();

		assert_eq!(response.data(), &json!([{ "column1": "a" }, { "column1": "b" }]));
	}

	#[test]
	fn flat_record_under_record_key_counts_as_one() {
		let response = Response::new(json!({ "id": 10, "name": "x" }), "record");

		assert_eq!(response.count(), 1);
		assert_eq!(response.get(0), Some(&json!({ "id": 10, "name": "x" })));
		assert!(response.meta().is_empty());
	}

	#[test]
	fn count_call_exposes_meta() {
		let response = Response::new(json!({ "count": 42 }), "record");

		assert!(response.is_empty());
		assert_eq!(response.meta_value("count"), Some(&json!(42)));
	}

	#[test]
	fn serializes_public_view_only() {
		let response = Response::new(
			json!({ "student": { "@expansions": "demographics", "id": 9 } }),
			"",
		);
		let value = serde_json::to_value(&response).expect("Response should serialize.");

		assert_eq!(
			value,
			json!({
				"data": { "id": 9 },
				"table_name": null,
				"expansions": ["demographics"],
				"extensions": [],
			})
		);
		assert_eq!(response.field("id"), Some(&json!(9)));
		assert_eq!(response.to_json(), r#"{"id":9}"#);
	}
}
