//! Object and open-map synthesis.
//!
//! Properties are enumerated in lexicographic name order so output is
//! reproducible regardless of document order. Optional properties that were
//! not explicitly overridden synthesize to `Undefined`; that keeps optional
//! back-references in recursive object graphs from expanding forever.

use indexmap::IndexMap;

use crate::options::MockOptions;
use crate::schema::{CompositionKind, SchemaNode};
use crate::value::{Resolved, ValueDescriptor};

use super::{ANY_KEY_EXPR, Combine, ResolutionContext, ResolveError, Scope, resolve};

pub(crate) fn synthesize_object(
    properties: &IndexMap<String, SchemaNode>,
    required: &[String],
    path: &str,
    opts: &MockOptions,
    scope: &Scope,
    combine: Option<&Combine>,
    ctx: &mut ResolutionContext,
) -> Result<Resolved, ResolveError> {
    let mut keys: Vec<&String> = properties.keys().collect();
    keys.sort();

    let mut fields: Vec<(String, ValueDescriptor)> = Vec::with_capacity(keys.len());
    let mut included: Vec<String> = Vec::with_capacity(keys.len());

    for key in keys {
        // Already emitted by an earlier allOf branch; oneOf/anyOf branches
        // each keep their own field list.
        if combine.is_some_and(|c| {
            c.separator == CompositionKind::AllOf && c.included.contains(key)
        }) {
            continue;
        }

        let prop = &properties[key];

        // Cycle short-circuit: a direct reference to a name already being
        // expanded on this path stops here instead of recursing.
        if let Some(target) = prop.reference_target() {
            if ctx.expanded_refs.contains(target) {
                fields.push((key.clone(), ValueDescriptor::Undefined));
                included.push(key.clone());
                continue;
            }
        }

        let child_path = format!("{path}.{key}");
        let resolved = resolve(prop, key, &child_path, opts, scope, None, ctx)?;
        included.push(key.clone());

        let is_required = opts.required || required.iter().any(|r| r == key);
        let value = if !is_required && !resolved.overridden {
            // Optional and not overridden: default to absent.
            ValueDescriptor::Undefined
        } else {
            resolved.value
        };
        fields.push((key.clone(), value));
    }

    Ok(Resolved {
        value: ValueDescriptor::Object { fields, spread: true },
        overridden: false,
        included,
    })
}

/// One representative entry is sufficient to characterize an open map; the
/// engine never synthesizes multiple arbitrary keys.
pub(crate) fn synthesize_open_map(
    value_schema: &SchemaNode,
    name: &str,
    path: &str,
    opts: &MockOptions,
    scope: &Scope,
    ctx: &mut ResolutionContext,
) -> Result<Resolved, ResolveError> {
    let entry_path = format!("{path}.#");
    let resolved = resolve(value_schema, name, &entry_path, opts, scope, None, ctx)?;
    Ok(Resolved {
        value: ValueDescriptor::OpenMap {
            key: ANY_KEY_EXPR.to_string(),
            value: Box::new(resolved.value),
        },
        overridden: resolved.overridden,
        included: resolved.included,
    })
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::options::MockOptions;
    use crate::resolve::tests::{doc_with, synth};
    use crate::value::ValueDescriptor;

    fn fields(value: ValueDescriptor) -> Vec<(String, ValueDescriptor)> {
        match value {
            ValueDescriptor::Object { fields, spread } => {
                assert!(spread, "object synthesis always appends the override spread");
                fields
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn required_gets_literal_optional_gets_undefined() {
        let doc = doc_with(&[]);
        let out = synth(
            &doc,
            json!({
                "type": "object",
                "properties": {"id": {"type": "string"}, "name": {"type": "string"}},
                "required": ["id"]
            }),
            &MockOptions::default(),
        )
        .unwrap();

        assert_eq!(
            fields(out.value),
            vec![
                ("id".to_string(), ValueDescriptor::Literal("faker.string.alpha(20)".into())),
                ("name".to_string(), ValueDescriptor::Undefined),
            ]
        );
        assert_eq!(out.included, vec!["id", "name"]);
    }

    #[test]
    fn global_required_flag_forces_everything_present() {
        let doc = doc_with(&[]);
        let opts = MockOptions { required: true, ..Default::default() };
        let out = synth(
            &doc,
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}}
            }),
            &opts,
        )
        .unwrap();
        for (key, value) in fields(out.value) {
            assert_ne!(value, ValueDescriptor::Undefined, "{key} must be populated");
        }
    }

    #[test]
    fn properties_come_out_in_lexicographic_order() {
        let doc = doc_with(&[]);
        let out = synth(
            &doc,
            json!({
                "type": "object",
                "properties": {
                    "zebra": {"type": "string"},
                    "alpha": {"type": "string"},
                    "mid": {"type": "string"}
                },
                "required": ["zebra", "alpha", "mid"]
            }),
            &MockOptions::default(),
        )
        .unwrap();
        let names: Vec<String> = fields(out.value).into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["alpha", "mid", "zebra"]);
    }

    #[test]
    fn self_reference_terminates_with_undefined_at_second_level() {
        let doc = doc_with(&[(
            "Node",
            json!({
                "type": "object",
                "properties": {"next": {"$ref": "#/components/schemas/Node"}, "id": {"type": "integer"}},
                "required": ["next", "id"]
            }),
        )]);
        let out = synth(&doc, json!({"$ref": "#/components/schemas/Node"}), &MockOptions::default())
            .unwrap();

        let outer = fields(out.value);
        // First level: `next` degrades immediately because the top-level
        // entry itself went through the Node reference.
        assert_eq!(outer[1], ("next".to_string(), ValueDescriptor::Undefined));
        assert!(matches!(outer[0].1, ValueDescriptor::Literal(_)));
    }

    #[test]
    fn direct_self_reference_expands_once_then_degrades() {
        let doc = doc_with(&[(
            "SelfType",
            json!({
                "type": "object",
                "properties": {"self": {"$ref": "#/components/schemas/SelfType"}},
                "required": ["self"]
            }),
        )]);
        // Top-level entry is the shape itself, not a reference to it.
        let out = synth(
            &doc,
            json!({
                "type": "object",
                "properties": {"self": {"$ref": "#/components/schemas/SelfType"}},
                "required": ["self"]
            }),
            &MockOptions::default(),
        )
        .unwrap();

        let first = fields(out.value).remove(0).1;
        let nested = fields(first);
        assert_eq!(nested[0], ("self".to_string(), ValueDescriptor::Undefined));
    }

    #[test]
    fn mutual_references_expand_each_name_once() {
        let doc = doc_with(&[
            (
                "A",
                json!({
                    "type": "object",
                    "properties": {"b": {"$ref": "#/components/schemas/B"}},
                    "required": ["b"]
                }),
            ),
            (
                "B",
                json!({
                    "type": "object",
                    "properties": {"a": {"$ref": "#/components/schemas/A"}},
                    "required": ["a"]
                }),
            ),
        ]);
        let out = synth(
            &doc,
            json!({
                "type": "object",
                "properties": {"root": {"$ref": "#/components/schemas/A"}},
                "required": ["root"]
            }),
            &MockOptions::default(),
        )
        .unwrap();

        // root → A → b: B → a: Undefined (A already in flight).
        let root = fields(out.value).remove(0).1;
        let a = fields(root);
        let b = fields(a[0].1.clone());
        assert_eq!(b[0], ("a".to_string(), ValueDescriptor::Undefined));
    }

    #[test]
    fn open_map_wraps_one_entry_under_computed_key() {
        let doc = doc_with(&[]);
        let out = synth(
            &doc,
            json!({"additionalProperties": {"type": "integer"}}),
            &MockOptions::default(),
        )
        .unwrap();
        match out.value {
            ValueDescriptor::OpenMap { key, value } => {
                assert_eq!(key, "faker.string.alphanumeric(5)");
                assert_eq!(*value, ValueDescriptor::Literal("faker.number.int()".into()));
            }
            other => panic!("expected open map, got {other:?}"),
        }
    }

    #[test]
    fn empty_properties_still_get_the_spread() {
        let doc = doc_with(&[]);
        let out = synth(
            &doc,
            json!({"type": "object", "properties": {}}),
            &MockOptions::default(),
        )
        .unwrap();
        assert_eq!(fields(out.value), vec![]);
    }
}
