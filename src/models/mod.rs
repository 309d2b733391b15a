//! MobSF API model types.
//!
//! Each submodule holds the record decoded from one endpoint together with
//! the [`MobsfClient`](crate::MobsfClient) operation that calls it.

mod delete;
mod report;
mod scan;
mod scans;
mod source;
mod upload;

pub use delete::*;
pub use report::*;
pub use scan::*;
pub use scans::*;
pub use source::*;
pub use upload::*;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{MobsfError, Result};

/// Decode a JSON payload into a response record.
///
/// Missing required fields and mistyped values (a string where a number is
/// expected, for instance) are reported as `InvalidResponse`; nothing is
/// coerced.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        MobsfError::invalid_response(format!(
            "Failed to decode {}: {e}",
            short_type_name::<T>()
        ))
    })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Look up the first present, non-null key from `aliases`.
pub(crate) fn lookup<'a>(map: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

/// String field by alias list; absent means empty, any other type is an error.
pub(crate) fn lookup_string(
    map: &Map<String, Value>,
    aliases: &[&str],
) -> core::result::Result<String, String> {
    match lookup(map, aliases) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!(
            "field `{}` must be a string, got {}",
            aliases.last().copied().unwrap_or_default(),
            json_kind(other)
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_lookup_prefers_first_alias() {
        let map = as_map(json!({"MD5": "upper", "md5": "lower"}));
        assert_eq!(lookup(&map, &["MD5", "md5"]), Some(&json!("upper")));
    }

    #[test]
    fn test_lookup_skips_null() {
        let map = as_map(json!({"MD5": null, "md5": "lower"}));
        assert_eq!(lookup(&map, &["MD5", "md5"]), Some(&json!("lower")));
    }

    #[test]
    fn test_lookup_string_defaults_to_empty() {
        let map = as_map(json!({}));
        assert_eq!(lookup_string(&map, &["MD5", "md5"]).unwrap(), "");
    }

    #[test]
    fn test_lookup_string_rejects_numbers() {
        let map = as_map(json!({"md5": 42}));
        let err = lookup_string(&map, &["MD5", "md5"]).unwrap_err();
        assert!(err.contains("md5"));
        assert!(err.contains("number"));
    }

    #[test]
    fn test_decode_names_the_record() {
        let err = decode::<UploadResult>(json!({"status": "success"})).unwrap_err();
        assert_eq!(err.cause, crate::ErrorCause::InvalidResponse);
        assert!(err.message.contains("UploadResult"));
    }
}
