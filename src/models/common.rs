//! Shapes shared by both services.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object, as used for row data, filters and metadata.
pub type JsonObject = Map<String, Value>;

/// Generic acknowledgement returned by delete and skill-update endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusResponse {
    pub success: bool,
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Body for endpoints that only identify a table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableNameBody<'a> {
    pub table_name: &'a str,
}

/// Body for skill-update endpoints.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SkillBody<'a, S: Serialize> {
    pub skill: &'a S,
}

pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

pub(crate) fn is_empty_list<T>(value: &Option<Vec<T>>) -> bool {
    value.as_ref().map_or(true, Vec::is_empty)
}

/// Convert any serializable value into a JSON object.
///
/// Fails with a validation error when the value is not an object, which keeps
/// arrays and scalars from being sent where the API expects column/value pairs.
pub fn to_object<T: Serialize>(value: &T) -> crate::ArcaResult<JsonObject> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(crate::ArcaError::Validation(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_object_accepts_structs_and_maps() {
        #[derive(Serialize)]
        struct Meal {
            food: &'static str,
            calories: u32,
        }

        let map = to_object(&Meal { food: "Pizza", calories: 800 }).unwrap();
        assert_eq!(map["food"], json!("Pizza"));
        assert_eq!(map["calories"], json!(800));
    }

    #[test]
    fn to_object_rejects_non_objects() {
        let err = to_object(&vec![1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn status_response_keeps_unknown_keys() {
        let resp: StatusResponse =
            serde_json::from_value(json!({"success": true, "message": "deleted", "tableName": "meals"}))
                .unwrap();
        assert!(resp.success);
        assert_eq!(resp.message.as_deref(), Some("deleted"));
        assert_eq!(resp.extra["tableName"], json!("meals"));
    }
}
