//! Schema-less location of the data inside an API payload.
//!
//! The API wraps records differently per endpoint: a table read nests them under `record`, a
//! resource read under a plural entity key (`students.student`), a single record comes back
//! flat, and marker-prefixed keys such as `@expansions` list optional sections. [`infer`]
//! walks the payload with a target key and splits it into the data, keyed metadata, and the
//! expansion/extension lists.

// self
use crate::_prelude::*;

const EXPANSIONS: &str = "expansions";
const EXTENSIONS: &str = "extensions";

/// Result of [`infer`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inferred {
	/// Records (an array) or a single record (an object).
	pub data: Value,
	/// Sibling keys of the data, with names reduced to `[A-Za-z0-9_]`.
	pub meta: Map<String, Value>,
	/// Expansions reported by the service.
	pub expansions: Vec<String>,
	/// Extensions reported by the service.
	pub extensions: Vec<String>,
}

/// Splits `raw` into data and metadata, preferring the value stored under `target`.
///
/// An empty `target` means the caller has no expectation, so single-key wrappers are
/// unwrapped and whatever remains is returned as the data.
pub fn infer(raw: &Value, target: &str) -> Inferred {
	let mut inferred = Inferred::default();
	let target = target.to_lowercase();

	inferred.data = match raw {
		Value::Object(object) => infer_object(object.clone(), &target, &mut inferred),
		Value::Null => Value::Array(Vec::new()),
		other => other.clone(),
	};

	inferred
}

/// Reduces a key to `[A-Za-z0-9_]`.
pub fn clean_key(key: &str) -> String {
	key.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect()
}

fn infer_object(mut object: Map<String, Value>, target: &str, out: &mut Inferred) -> Value {
	strip_list_markers(&mut object, out);

	if object.is_empty() {
		return Value::Array(Vec::new());
	}
	if !target.is_empty() {
		if let Some(data) = object.remove(target) {
			absorb_meta(object, out);

			return data;
		}

		let plural = format!("{target}s");

		if matches!(object.get(&plural), Some(Value::Object(_)))
			&& let Some(Value::Object(nested)) = object.remove(&plural)
		{
			absorb_meta(object, out);

			return infer_object(nested, target, out);
		}
	}
	if object.len() == 1 {
		let key = object.keys().next().cloned().unwrap_or_default();

		match object.remove(&key) {
			Some(Value::Object(nested)) => return infer_object(nested, "", out),
			Some(Value::Array(items)) => return Value::Array(items),
			// A lone scalar where a keyed list was expected: an empty page carrying metadata.
			Some(other) if !target.is_empty() => {
				record(out, clean_key(&key), other);

				return Value::Array(Vec::new());
			},
			Some(other) => {
				object.insert(key, other);
			},
			None => {},
		}
	}

	Value::Object(object)
}

fn is_list_marker(key: &str) -> bool {
	key.chars().next().is_some_and(|c| !c.is_ascii_alphanumeric())
		&& matches!(clean_key(key).as_str(), EXPANSIONS | EXTENSIONS)
}

fn strip_list_markers(object: &mut Map<String, Value>, out: &mut Inferred) {
	let markers = object.keys().filter(|key| is_list_marker(key)).cloned().collect::<Vec<_>>();

	for key in markers {
		if let Some(value) = object.remove(&key) {
			record(out, clean_key(&key), value);
		}
	}
}

fn absorb_meta(object: Map<String, Value>, out: &mut Inferred) {
	for (key, value) in object {
		record(out, clean_key(&key), value);
	}
}

fn record(out: &mut Inferred, key: String, value: Value) {
	match key.as_str() {
		EXPANSIONS => out.expansions.extend(split_list(&value)),
		EXTENSIONS => out.extensions.extend(split_list(&value)),
		_ => {
			out.meta.insert(key, value);
		},
	}
}

fn split_list(value: &Value) -> Vec<String> {
	match value {
		Value::String(list) => list
			.split(',')
			.map(str::trim)
			.filter(|item| !item.is_empty())
			.map(str::to_owned)
			.collect(),
		Value::Array(items) => items
			.iter()
			.filter_map(Value::as_str)
			.map(str::trim)
			.filter(|item| !item.is_empty())
			.map(str::to_owned)
			.collect(),
		_ => Vec::new(),
	}
}
