//! Query-string coercion for `ApiClient::get`.
//!
//! Parameters are given as any `Serialize` value that serializes to a JSON
//! object. Each member becomes one `key=value` pair:
//!
//! - `null` members are dropped
//! - strings are sent verbatim
//! - booleans and numbers use their JSON text (`true`, `42`, `2.5`)
//! - arrays and objects are sent as compact JSON

use serde::Serialize;
use serde_json::Value;

use super::ApiError;

pub fn to_query_pairs<P: Serialize + ?Sized>(params: &P) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(params)
        .map_err(|e| ApiError::InvalidRequest(format!("Query parameters not serializable: {}", e)))?;

    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(ApiError::InvalidRequest(format!(
                "Query parameters must be an object, got {}",
                kind(&other)
            )))
        }
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| coerce(value).map(|v| (key, v)))
        .collect())
}

fn coerce(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => Some(nested.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
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
    fn test_nulls_are_dropped() {
        let pairs = to_query_pairs(&json!({ "mes": 3, "pessoaId": null })).unwrap();
        assert_eq!(pairs, vec![("mes".to_string(), "3".to_string())]);
    }

    #[test]
    fn test_scalars_are_stringified() {
        let pairs = to_query_pairs(&json!({
            "ano": 2024,
            "ativo": false,
            "fator": 2.5,
            "nome": "Ana Maria",
        }))
        .unwrap();

        assert!(pairs.contains(&("ano".to_string(), "2024".to_string())));
        assert!(pairs.contains(&("ativo".to_string(), "false".to_string())));
        assert!(pairs.contains(&("fator".to_string(), "2.5".to_string())));
        assert!(pairs.contains(&("nome".to_string(), "Ana Maria".to_string())));
    }

    #[test]
    fn test_nested_values_become_json() {
        let pairs = to_query_pairs(&json!({ "ids": [1, 2] })).unwrap();
        assert_eq!(pairs, vec![("ids".to_string(), "[1,2]".to_string())]);
    }

    #[test]
    fn test_option_fields_on_structs() {
        #[derive(Serialize)]
        struct Filtro {
            mes: Option<u32>,
            categoria: Option<String>,
        }

        let pairs = to_query_pairs(&Filtro {
            mes: Some(1),
            categoria: None,
        })
        .unwrap();
        assert_eq!(pairs, vec![("mes".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_absent_params() {
        assert!(to_query_pairs(&Option::<Value>::None).unwrap().is_empty());
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = to_query_pairs(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
