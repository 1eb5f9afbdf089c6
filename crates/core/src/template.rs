//! Parameter template types and resolution.
//!
//! An effect carries a declarative template mapping remote input slots to
//! submission-supplied values. Resolution substitutes the current
//! submission's uploaded file handles and user parameters into the template
//! and produces the fully string-valued payload sent to an engine's start
//! call. Resolution is pure: it performs no I/O and returns every
//! validation failure at once so the caller can render them together.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One slot of an effect's parameter template.
///
/// `slot_id` and `field_name` identify a remote input location; the binding
/// says which submission value fills it. Entries are immutable once the
/// effect is defined; only the values they resolve to change per submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEntry {
    /// Remote node/slot identifier, e.g. `"39"`.
    pub slot_id: String,
    /// Field within the slot, e.g. `"image"`.
    pub field_name: String,
    /// Where the value comes from at submission time.
    #[serde(flatten)]
    pub binding: SlotBinding,
}

/// Source of a template slot's value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SlotBinding {
    /// A fixed value baked into the effect definition.
    #[serde(rename_all = "camelCase")]
    Literal { value: Value },
    /// An uploaded file, referenced by its submission key. Always required.
    #[serde(rename_all = "camelCase")]
    File { source_key: String },
    /// A user-supplied parameter, referenced by key.
    #[serde(rename_all = "camelCase")]
    Param {
        source_key: String,
        #[serde(default = "default_required")]
        required: bool,
    },
}

fn default_required() -> bool {
    true
}

/// One fully-substituted field of a resolved invocation.
///
/// Serializes directly into the engines' `nodeInfoList` wire shape. The
/// value is always a string: the remote engines reject native numbers and
/// booleans, so coercion happens here, not at the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField {
    #[serde(rename = "nodeId")]
    pub slot_id: String,
    pub field_name: String,
    pub field_value: String,
}

/// Validation failures from template resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// One or more required inputs were absent. Carries every missing
    /// source key, not just the first.
    #[error("missing required input(s): {}", .0.join(", "))]
    Missing(Vec<String>),

    /// A parameter or literal value has a JSON shape that cannot be
    /// coerced to a string (array or object).
    #[error("value for '{key}' cannot be represented as a string")]
    Unrepresentable { key: String },
}

/// Resolve a template against a submission's parameters and file handles.
///
/// - File bindings require a matching uploaded file handle.
/// - Required param bindings require a present, non-empty value.
/// - Absent optional params are omitted from the invocation.
/// - All values are coerced to strings; numbers and booleans are
///   stringified, arrays and objects are rejected.
///
/// Never returns a partially-resolved invocation: any missing required key
/// fails the whole resolution, with all missing keys listed.
pub fn resolve(
    template: &[TemplateEntry],
    parameters: &HashMap<String, Value>,
    files: &HashMap<String, String>,
) -> Result<Vec<ResolvedField>, ResolveError> {
    let mut resolved = Vec::with_capacity(template.len());
    let mut missing = Vec::new();

    for entry in template {
        match &entry.binding {
            SlotBinding::Literal { value } => match coerce(value) {
                Some(v) => resolved.push(field(entry, v)),
                None => {
                    return Err(ResolveError::Unrepresentable {
                        key: entry.field_name.clone(),
                    })
                }
            },
            SlotBinding::File { source_key } => match files.get(source_key) {
                Some(handle) if !handle.is_empty() => {
                    resolved.push(field(entry, handle.clone()));
                }
                _ => missing.push(source_key.clone()),
            },
            SlotBinding::Param {
                source_key,
                required,
            } => match parameters.get(source_key) {
                Some(Value::Null) | None => {
                    if *required {
                        missing.push(source_key.clone());
                    }
                }
                Some(value) => match coerce(value) {
                    Some(v) if !v.is_empty() => resolved.push(field(entry, v)),
                    Some(_) => {
                        // Empty string counts as absent.
                        if *required {
                            missing.push(source_key.clone());
                        }
                    }
                    None => {
                        return Err(ResolveError::Unrepresentable {
                            key: source_key.clone(),
                        })
                    }
                },
            },
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(ResolveError::Missing(missing))
    }
}

fn field(entry: &TemplateEntry, value: String) -> ResolvedField {
    ResolvedField {
        slot_id: entry.slot_id.clone(),
        field_name: entry.field_name.clone(),
        field_value: value,
    }
}

/// Coerce a JSON value to its string wire representation.
///
/// Strings pass through; numbers and booleans stringify. Arrays and
/// objects have no defined wire form and return `None`.
fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn file_entry(slot: &str, field: &str, key: &str) -> TemplateEntry {
        TemplateEntry {
            slot_id: slot.into(),
            field_name: field.into(),
            binding: SlotBinding::File {
                source_key: key.into(),
            },
        }
    }

    fn param_entry(slot: &str, field: &str, key: &str, required: bool) -> TemplateEntry {
        TemplateEntry {
            slot_id: slot.into(),
            field_name: field.into(),
            binding: SlotBinding::Param {
                source_key: key.into(),
                required,
            },
        }
    }

    #[test]
    fn resolves_file_slot_to_uploaded_handle() {
        let template = vec![file_entry("39", "image", "file1")];
        let files = HashMap::from([("file1".to_string(), "fh-8812".to_string())]);

        let out = resolve(&template, &HashMap::new(), &files).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].slot_id, "39");
        assert_eq!(out[0].field_name, "image");
        assert_eq!(out[0].field_value, "fh-8812");
    }

    #[test]
    fn missing_file_fails_with_source_key() {
        let template = vec![file_entry("39", "image", "file1")];

        let err = resolve(&template, &HashMap::new(), &HashMap::new()).unwrap_err();

        assert_eq!(err, ResolveError::Missing(vec!["file1".to_string()]));
    }

    #[test]
    fn collects_every_missing_key() {
        let template = vec![
            file_entry("1", "image", "file1"),
            param_entry("2", "prompt", "prompt", true),
            param_entry("3", "style", "style", false),
        ];

        let err = resolve(&template, &HashMap::new(), &HashMap::new()).unwrap_err();

        assert_eq!(
            err,
            ResolveError::Missing(vec!["file1".to_string(), "prompt".to_string()])
        );
    }

    #[test]
    fn never_returns_partial_invocation() {
        // One resolvable entry plus one missing: the whole resolution fails.
        let template = vec![
            file_entry("1", "image", "file1"),
            param_entry("2", "prompt", "prompt", true),
        ];
        let files = HashMap::from([("file1".to_string(), "fh-1".to_string())]);

        assert_matches!(
            resolve(&template, &HashMap::new(), &files),
            Err(ResolveError::Missing(_))
        );
    }

    #[test]
    fn numbers_and_bools_are_stringified() {
        let template = vec![
            param_entry("1", "strength", "strength", true),
            param_entry("2", "hires", "hires", true),
        ];
        let params = HashMap::from([
            ("strength".to_string(), json!(0.85)),
            ("hires".to_string(), json!(true)),
        ]);

        let out = resolve(&template, &params, &HashMap::new()).unwrap();

        assert_eq!(out[0].field_value, "0.85");
        assert_eq!(out[1].field_value, "true");
    }

    #[test]
    fn optional_absent_param_is_omitted() {
        let template = vec![
            param_entry("1", "prompt", "prompt", true),
            param_entry("2", "negative", "negative", false),
        ];
        let params = HashMap::from([("prompt".to_string(), json!("a cat"))]);

        let out = resolve(&template, &params, &HashMap::new()).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].field_value, "a cat");
    }

    #[test]
    fn null_param_counts_as_absent() {
        let template = vec![param_entry("1", "prompt", "prompt", true)];
        let params = HashMap::from([("prompt".to_string(), Value::Null)]);

        assert_matches!(
            resolve(&template, &params, &HashMap::new()),
            Err(ResolveError::Missing(keys)) if keys == vec!["prompt".to_string()]
        );
    }

    #[test]
    fn empty_string_required_param_is_missing() {
        let template = vec![param_entry("1", "prompt", "prompt", true)];
        let params = HashMap::from([("prompt".to_string(), json!(""))]);

        assert_matches!(
            resolve(&template, &params, &HashMap::new()),
            Err(ResolveError::Missing(_))
        );
    }

    #[test]
    fn array_param_is_unrepresentable() {
        let template = vec![param_entry("1", "tags", "tags", true)];
        let params = HashMap::from([("tags".to_string(), json!(["a", "b"]))]);

        assert_matches!(
            resolve(&template, &params, &HashMap::new()),
            Err(ResolveError::Unrepresentable { key }) if key == "tags"
        );
    }

    #[test]
    fn literal_binding_passes_through() {
        let template = vec![TemplateEntry {
            slot_id: "7".into(),
            field_name: "sampler".into(),
            binding: SlotBinding::Literal {
                value: json!("euler_a"),
            },
        }];

        let out = resolve(&template, &HashMap::new(), &HashMap::new()).unwrap();

        assert_eq!(out[0].field_value, "euler_a");
    }

    #[test]
    fn template_entry_wire_shape() {
        let json = r#"{"slotId":"39","fieldName":"image","kind":"file","sourceKey":"file1"}"#;
        let entry: TemplateEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.slot_id, "39");
        assert_matches!(entry.binding, SlotBinding::File { source_key } if source_key == "file1");
    }

    #[test]
    fn resolved_field_serializes_to_node_info() {
        let field = ResolvedField {
            slot_id: "39".into(),
            field_name: "image".into(),
            field_value: "fh-1".into(),
        };
        let json = serde_json::to_value(&field).unwrap();

        assert_eq!(
            json,
            json!({"nodeId": "39", "fieldName": "image", "fieldValue": "fh-1"})
        );
    }
}
