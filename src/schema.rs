//! Schema model: a closed sum type over the OpenAPI/JSON-Schema shapes the
//! mock engine understands, plus the parser that walks a raw
//! `serde_json::Value` schema object into it.
//!
//! Shape priority mirrors the resolver's dispatch order: `$ref` >
//! composition (allOf > oneOf > anyOf) > `properties` >
//! `additionalProperties` > array > primitive. Anything else parses to
//! `Shape::Unspecified`, which synthesizes to an empty object rather than
//! failing; mock generation never blocks on partially-specified schemas.

use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Property or component name at this position.
    pub name: String,
    /// Diagnostic address in dot/hash notation (`#.components.schemas.Pet`).
    /// Used for override addressing, never for identity.
    pub path: String,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// `$ref` to a named schema elsewhere in the same document.
    Reference { target: String },
    Object {
        properties: IndexMap<String, SchemaNode>,
        required: Vec<String>,
    },
    Composition {
        kind: CompositionKind,
        branches: Vec<SchemaNode>,
    },
    /// `additionalProperties: { ...schema }`
    OpenMap { value: Box<SchemaNode> },
    /// `additionalProperties: true`, any shape goes.
    AnyMap,
    Array {
        items: Box<SchemaNode>,
        min_items: Option<u32>,
        max_items: Option<u32>,
    },
    Primitive(Primitive),
    /// None of the recognized keywords. Explicit fallback, not an error.
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionKind {
    AllOf,
    OneOf,
    AnyOf,
}

impl CompositionKind {
    pub fn keyword(self) -> &'static str {
        match self {
            CompositionKind::AllOf => "allOf",
            CompositionKind::OneOf => "oneOf",
            CompositionKind::AnyOf => "anyOf",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub format: Option<String>,
    pub enum_values: Vec<Value>,
    pub pattern: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl SchemaNode {
    /// Direct-reference target, if this node is a plain `$ref`.
    pub fn reference_target(&self) -> Option<&str> {
        match &self.shape {
            Shape::Reference { target } => Some(target),
            _ => None,
        }
    }
}

/// Last segment of a `$ref` URI (`#/components/schemas/Pet` → `Pet`).
pub fn ref_target_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Walk one raw schema object into a `SchemaNode`.
pub fn parse_schema(raw: &Value, name: &str, path: &str) -> SchemaNode {
    let shape = parse_shape(raw, path);
    SchemaNode { name: name.to_string(), path: path.to_string(), shape }
}

fn parse_shape(raw: &Value, path: &str) -> Shape {
    let Some(obj) = raw.as_object() else {
        return Shape::Unspecified;
    };

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        return Shape::Reference { target: ref_target_name(reference).to_string() };
    }

    // allOf wins when a node carries more than one composition keyword.
    for kind in [CompositionKind::AllOf, CompositionKind::OneOf, CompositionKind::AnyOf] {
        if let Some(branches) = obj.get(kind.keyword()).and_then(Value::as_array) {
            let branches = branches
                .iter()
                .enumerate()
                .map(|(i, branch)| {
                    let branch_path = format!("{path}.{}.{i}", kind.keyword());
                    parse_schema(branch, &i.to_string(), &branch_path)
                })
                .collect();
            return Shape::Composition { kind, branches };
        }
    }

    if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
        let required = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|xs| {
                xs.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let properties = properties
            .iter()
            .map(|(key, prop)| {
                let prop_path = format!("{path}.{key}");
                (key.clone(), parse_schema(prop, key, &prop_path))
            })
            .collect();
        return Shape::Object { properties, required };
    }

    match obj.get("additionalProperties") {
        Some(Value::Bool(true)) => return Shape::AnyMap,
        Some(additional @ Value::Object(_)) => {
            let value_path = format!("{path}.#");
            return Shape::OpenMap {
                value: Box::new(parse_schema(additional, "#", &value_path)),
            };
        }
        _ => {}
    }

    let type_ = obj.get("type").and_then(Value::as_str);

    if type_ == Some("array") {
        let items = obj
            .get("items")
            .map(|items| parse_schema(items, "items", &format!("{path}.items")))
            .unwrap_or_else(|| SchemaNode {
                name: "items".to_string(),
                path: format!("{path}.items"),
                shape: Shape::Unspecified,
            });
        return Shape::Array {
            items: Box::new(items),
            min_items: obj.get("minItems").and_then(Value::as_u64).map(|n| n as u32),
            max_items: obj.get("maxItems").and_then(Value::as_u64).map(|n| n as u32),
        };
    }

    let kind = match type_ {
        Some("string") => Some(PrimitiveKind::String),
        Some("number") => Some(PrimitiveKind::Number),
        Some("integer") => Some(PrimitiveKind::Integer),
        Some("boolean") => Some(PrimitiveKind::Boolean),
        Some("null") => Some(PrimitiveKind::Null),
        // A bare enum with no declared type still synthesizes as one.
        None if obj.contains_key("enum") => Some(PrimitiveKind::String),
        _ => None,
    };

    match kind {
        Some(kind) => Shape::Primitive(Primitive {
            kind,
            format: obj.get("format").and_then(Value::as_str).map(str::to_string),
            enum_values: obj
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            pattern: obj.get("pattern").and_then(Value::as_str).map(str::to_string),
            minimum: obj.get("minimum").and_then(Value::as_f64),
            maximum: obj.get("maximum").and_then(Value::as_f64),
            min_length: obj.get("minLength").and_then(Value::as_u64).map(|n| n as u32),
            max_length: obj.get("maxLength").and_then(Value::as_u64).map(|n| n as u32),
        }),
        None => Shape::Unspecified,
    }
}

// ------------------------------- Tests ------------------------------------ //
