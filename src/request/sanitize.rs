//! Body value coercion.
//!
//! The API rejects typed JSON scalars in table and named-query bodies, so every leaf is sent as
//! a string: `null` becomes `""`, booleans become `"1"`/`"0"`, and numbers use their canonical
//! decimal form. Objects and arrays keep their shape.

// self
use crate::_prelude::*;

/// Recursively coerces every scalar leaf of `value` into a string.
pub fn sanitize(value: Value) -> Value {
	match value {
		Value::Null => Value::String(String::new()),
		Value::Bool(flag) => Value::String(if flag { "1" } else { "0" }.to_owned()),
		Value::Number(number) => Value::String(number.to_string()),
		Value::String(_) => value,
		Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
		Value::Object(fields) =>
			Value::Object(fields.into_iter().map(|(key, value)| (key, sanitize(value))).collect()),
	}
}

/// Renders a scalar the way it appears in a URL path or plain-string field.
pub fn plain_string(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scalars_become_strings_and_shape_is_kept() {
		let sanitized = sanitize(json!({
			"string": "value1",
			"number": 1,
			"float": 1.5,
			"boolean": false,
			"truthy": true,
			"null": null,
			"nested": { "list": [0, null, { "deep": true }] },
		}));

		assert_eq!(
			sanitized,
			json!({
				"string": "value1",
				"number": "1",
				"float": "1.5",
				"boolean": "0",
				"truthy": "1",
				"null": "",
				"nested": { "list": ["0", "", { "deep": "1" }] },
			})
		);
	}

	#[test]
	fn sanitizing_twice_changes_nothing() {
		let once = sanitize(json!({ "a": [true, 2, null] }));

		assert_eq!(sanitize(once.clone()), once);
	}

	#[test]
	fn plain_string_drops_quotes() {
		assert_eq!(plain_string(&json!("abc")), "abc");
		assert_eq!(plain_string(&json!(42)), "42");
	}
}
