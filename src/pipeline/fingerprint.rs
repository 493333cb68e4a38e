// src/pipeline/fingerprint.rs

//! Content hash of a task's run-relevant configuration.
//!
//! Only the task kind, the parameter bag and the three resource lists
//! contribute. Map keys are sorted at every depth before hashing and list
//! order is preserved, so the digest is stable across processes and
//! platforms.

use std::fmt;

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::resource::Resource;
use crate::pipeline::task::Params;

/// Hex-encoded blake3 digest identifying a task configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(
        kind: &str,
        params: &Params,
        inputs: &[Resource],
        outputs: &[Resource],
        removes: &[Resource],
    ) -> Self {
        let canonical = canonical_document(kind, params, inputs, outputs, removes);

        let mut hasher = Hasher::new();
        hasher.update(canonical.as_bytes());
        Fingerprint(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Fingerprint(s.to_string())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The hashed text: compact JSON of the contributing fields, keys sorted.
fn canonical_document(
    kind: &str,
    params: &Params,
    inputs: &[Resource],
    outputs: &[Resource],
    removes: &[Resource],
) -> String {
    let ids = |list: &[Resource]| -> Value {
        Value::Array(list.iter().map(|r| Value::String(r.id().to_string())).collect())
    };

    let mut contributing = serde_json::Map::new();
    contributing.insert("task".to_string(), Value::String(kind.to_string()));
    contributing.insert("params".to_string(), Value::Object(params.clone()));
    contributing.insert("inputs".to_string(), ids(inputs));
    contributing.insert("outputs".to_string(), ids(outputs));
    contributing.insert("removes".to_string(), ids(removes));

    let mut canonical = String::new();
    write_canonical(&Value::Object(contributing), &mut canonical);
    canonical
}

/// Serialize `value` as compact JSON with object keys sorted at every level.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn res(spec: &str) -> Resource {
        Resource::parse(spec).unwrap()
    }

    #[test]
    fn canonical_document_is_stable_text() {
        let p = params(json!({"region": {"res": 10, "n": 5}, "cmd": ["r.slope", "dem"]}));
        let text = canonical_document("grass", &p, &[res("raster/dem@PERMANENT")], &[], &[]);

        assert_eq!(
            text,
            r#"{"inputs":["raster/dem@PERMANENT"],"outputs":[],"params":{"cmd":["r.slope","dem"],"region":{"n":5,"res":10}},"removes":[],"task":"grass"}"#
        );
    }

    #[test]
    fn every_contributing_field_changes_the_digest() {
        let p = params(json!({"cmd": ["echo", "hi"]}));
        let inputs = [res("file/a.txt")];
        let outputs = [res("vector/out")];
        let base = Fingerprint::compute("script", &p, &inputs, &outputs, &[]);

        assert_ne!(base, Fingerprint::compute("grass", &p, &inputs, &outputs, &[]));
        assert_ne!(
            base,
            Fingerprint::compute("script", &params(json!({"cmd": ["echo"]})), &inputs, &outputs, &[])
        );
        assert_ne!(base, Fingerprint::compute("script", &p, &[], &outputs, &[]));
        assert_ne!(base, Fingerprint::compute("script", &p, &inputs, &[], &[]));
        assert_ne!(
            base,
            Fingerprint::compute("script", &p, &inputs, &outputs, &[res("vector/out")])
        );
    }

    #[test]
    fn list_order_is_significant() {
        let ab = [res("file/a"), res("file/b")];
        let ba = [res("file/b"), res("file/a")];
        assert_ne!(
            Fingerprint::compute("script", &Params::new(), &ab, &[], &[]),
            Fingerprint::compute("script", &Params::new(), &ba, &[], &[]),
        );
    }

    #[test]
    fn canonical_form_sorts_nested_keys() {
        let mut out = String::new();
        write_canonical(&json!({"b": [1, {"d": true, "c": null}], "a": "x"}), &mut out);
        assert_eq!(out, r#"{"a":"x","b":[1,{"c":null,"d":true}]}"#);
    }
}
