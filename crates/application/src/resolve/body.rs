//! Body resolution: YAML-to-JSON conversion and type-preserving
//! reference substitution over a JSON tree.

use quiver_domain::{BodyDef, BodyEncoding, Scalar};
use serde_json::Value;
use thiserror::Error;

use crate::resolve::reference::ReferenceError;

/// Errors from body resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BodyError {
    /// The `y2j` body text is not valid YAML (or uses non-string keys).
    #[error("invalid body: {0}")]
    InvalidYaml(String),

    /// The substituted tree could not be encoded as JSON.
    #[error("encode body: {0}")]
    Encode(String),

    /// A reference inside the body failed to resolve.
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Walks a JSON value and replaces every string leaf beginning with `@`
/// using the supplied resolver, preserving structure and all other
/// scalar types.
///
/// Arrays keep element order; object keys are never substituted; the
/// first failing element aborts the walk. The resolver's typed scalar is
/// substituted **as that JSON type** — a cached integer becomes a JSON
/// number, not a quoted string.
///
/// # Errors
///
/// Propagates the first resolver failure.
pub fn resolve_json_tree(
    value: &Value,
    resolve: &mut dyn FnMut(&str) -> Result<Scalar, ReferenceError>,
) -> Result<Value, ReferenceError> {
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(resolve_json_tree(item, resolve)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), resolve_json_tree(item, resolve)?);
            }
            Ok(Value::Object(out))
        }
        Value::String(s) if s.starts_with('@') => Ok(resolve(s)?.into_json()),
        other => Ok(other.clone()),
    }
}

/// Resolves a definition body into outbound bytes.
///
/// `Passthrough` bodies are the raw lines joined with newlines, sent
/// untouched and never JSON-walked. `YamlToJson` bodies are decoded from
/// YAML (flow or block style), substituted via [`resolve_json_tree`],
/// and re-encoded as compact JSON.
///
/// # Errors
///
/// `InvalidYaml` when a `y2j` body fails to decode, `Reference` when a
/// substitution fails, `Encode` when the result cannot be serialized.
pub fn resolve_body(
    def: &BodyDef,
    resolve: &mut dyn FnMut(&str) -> Result<Scalar, ReferenceError>,
) -> Result<Vec<u8>, BodyError> {
    match def.encoding {
        BodyEncoding::Passthrough => Ok(def.text().into_bytes()),
        BodyEncoding::YamlToJson => {
            let tree: Value = serde_yaml::from_str(&def.text())
                .map_err(|e| BodyError::InvalidYaml(e.to_string()))?;
            let resolved = resolve_json_tree(&tree, resolve)?;
            serde_json::to_vec(&resolved).map_err(|e| BodyError::Encode(e.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn body(encoding: BodyEncoding, text: &str) -> BodyDef {
        BodyDef {
            encoding,
            lines: text.lines().map(String::from).collect(),
        }
    }

    fn no_refs(token: &str) -> Result<Scalar, ReferenceError> {
        panic!("unexpected reference: {token}")
    }

    #[test]
    fn substitution_preserves_types() {
        let tree = json!({"id": "@1", "tag": "@2", "fixed": "plain"});
        let resolved = resolve_json_tree(&tree, &mut |token| match token {
            "@1" => Ok(Scalar::Integer(42)),
            "@2" => Ok(Scalar::Boolean(false)),
            other => panic!("unexpected reference: {other}"),
        })
        .unwrap();
        assert_eq!(resolved, json!({"id": 42, "tag": false, "fixed": "plain"}));
    }

    #[test]
    fn arrays_resolve_in_order() {
        let tree = json!(["@1", "two", 3]);
        let resolved = resolve_json_tree(&tree, &mut |_| Ok(Scalar::Integer(1))).unwrap();
        assert_eq!(resolved, json!([1, "two", 3]));
    }

    #[test]
    fn nested_structures_and_untouched_scalars() {
        let tree = json!({"outer": {"inner": ["@1", null, 2.5, true]}});
        let resolved =
            resolve_json_tree(&tree, &mut |_| Ok(Scalar::String("x".to_string()))).unwrap();
        assert_eq!(resolved, json!({"outer": {"inner": ["x", null, 2.5, true]}}));
    }

    #[test]
    fn first_error_aborts() {
        let tree = json!({"a": "@1", "b": "@2"});
        let mut calls = 0;
        let err = resolve_json_tree(&tree, &mut |_| {
            calls += 1;
            Err(ReferenceError::ZeroPositionalArg)
        })
        .unwrap_err();
        assert_eq!(err, ReferenceError::ZeroPositionalArg);
        assert_eq!(calls, 1);
    }

    #[test]
    fn keys_are_never_substituted() {
        let tree = json!({"@1": "literal"});
        let resolved = resolve_json_tree(&tree, &mut no_refs).unwrap();
        assert_eq!(resolved, json!({"@1": "literal"}));
    }

    #[test]
    fn passthrough_bytes_are_untouched() {
        let def = body(BodyEncoding::Passthrough, "raw text\nwith @1 inside");
        let bytes = resolve_body(&def, &mut no_refs).unwrap();
        assert_eq!(bytes, b"raw text\nwith @1 inside".to_vec());
    }

    #[test]
    fn yaml_block_style_becomes_json() {
        // serde_json maps are key-sorted, so the encoding is canonical.
        let def = body(BodyEncoding::YamlToJson, "name: alice\ncount: 2");
        let bytes = resolve_body(&def, &mut no_refs).unwrap();
        assert_eq!(bytes, br#"{"count":2,"name":"alice"}"#.to_vec());
    }

    #[test]
    fn yaml_flow_style_with_reference() {
        let def = body(BodyEncoding::YamlToJson, r#"{"id": "@1"}"#);
        let bytes = resolve_body(&def, &mut |_| Ok(Scalar::Integer(7))).unwrap();
        assert_eq!(bytes, br#"{"id":7}"#.to_vec());
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let def = body(BodyEncoding::YamlToJson, "{unclosed: [");
        assert!(matches!(
            resolve_body(&def, &mut no_refs),
            Err(BodyError::InvalidYaml(_))
        ));
    }
}
