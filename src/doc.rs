//! OpenAPI document loading.
//!
//! Parses the typed top level of an OpenAPI 3.x JSON document (paths,
//! operations, components) and walks every `components.schemas` entry into a
//! `SchemaNode`. Reference lookup is a plain in-memory map lookup; the
//! resolver never touches the raw document again.

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::schema::{SchemaNode, parse_schema};

const HTTP_VERBS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("invalid OpenAPI document: {0}")]
    Invalid(String),
}

/// Deserialize with JSON-path context in error messages.
pub fn from_value_with_path<T: DeserializeOwned>(value: &Value) -> Result<T, DocError> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(DocError::Invalid(format!("at JSON path {path}: {}", err.into_inner())))
        }
    }
}

// -------------------------- Raw (wire) document --------------------------- //

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    paths: IndexMap<String, Value>,
    #[serde(default)]
    components: RawComponents,
}

#[derive(Debug, Default, Deserialize)]
struct RawComponents {
    #[serde(default)]
    schemas: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawOperation {
    #[serde(rename = "operationId")]
    operation_id: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    responses: IndexMap<String, RawResponse>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    content: IndexMap<String, RawMediaType>,
}

#[derive(Debug, Deserialize)]
struct RawMediaType {
    schema: Option<Value>,
}

// ------------------------------ Loaded view -------------------------------- //

/// One HTTP operation to synthesize a mock response for.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: String,
    pub verb: String,
    pub route: String,
    pub tags: Vec<String>,
    /// Numeric status of the chosen success response (default → 200).
    pub status: u16,
    /// JSON success-response schema, if the operation declares one.
    pub response: Option<SchemaNode>,
}

/// In-memory document: named schemas plus the operations that use them.
#[derive(Debug, Default)]
pub struct Document {
    pub schemas: IndexMap<String, SchemaNode>,
    pub operations: Vec<Operation>,
}

impl Document {
    /// `$ref` target lookup by component name.
    pub fn lookup(&self, target: &str) -> Option<&SchemaNode> {
        self.schemas.get(target)
    }

    pub fn from_value(value: &Value) -> Result<Self, DocError> {
        let raw: RawDocument = from_value_with_path(value)?;

        let schemas = raw
            .components
            .schemas
            .iter()
            .map(|(name, schema)| {
                let path = format!("#.components.schemas.{name}");
                (name.clone(), parse_schema(schema, name, &path))
            })
            .collect();

        let mut operations = Vec::new();
        for (route, item) in &raw.paths {
            let Some(item) = item.as_object() else { continue };
            for verb in HTTP_VERBS {
                let Some(op_value) = item.get(verb) else { continue };
                let op: RawOperation = from_value_with_path(op_value)?;
                operations.push(build_operation(route, verb, op));
            }
        }

        Ok(Self { schemas, operations })
    }

    pub fn from_str(src: &str) -> Result<Self, DocError> {
        let value: Value = serde_json::from_str(src)
            .map_err(|err| DocError::Invalid(err.to_string()))?;
        Self::from_value(&value)
    }
}

fn build_operation(route: &str, verb: &str, raw: RawOperation) -> Operation {
    let id = raw
        .operation_id
        .clone()
        .unwrap_or_else(|| fallback_operation_id(verb, route));

    // Prefer the lowest 2xx status, then `default` (treated as 200).
    let mut chosen: Option<(u16, &RawResponse)> = None;
    for (status, response) in &raw.responses {
        let parsed = match status.as_str() {
            "default" => Some(200),
            s if s.starts_with('2') => s.replace("XX", "00").parse::<u16>().ok(),
            _ => None,
        };
        if let Some(code) = parsed {
            if chosen.is_none() || code < chosen.as_ref().map(|(c, _)| *c).unwrap_or(u16::MAX) {
                chosen = Some((code, response));
            }
        }
    }

    let (status, response) = match chosen {
        Some((code, response)) => (code, Some(response)),
        None => (200, None),
    };

    let response = response.and_then(|r| {
        r.content
            .iter()
            .find(|(media, _)| media.starts_with("application/json"))
            .and_then(|(_, media)| media.schema.as_ref())
            .map(|schema| {
                let path = format!("#.paths.{route}.{verb}");
                parse_schema(schema, &id, &path)
            })
    });

    Operation {
        id,
        verb: verb.to_string(),
        route: route.to_string(),
        tags: raw.tags,
        status,
        response,
    }
}

/// `get /pets/{petId}` → `getPetsPetId` when no operationId is declared.
fn fallback_operation_id(verb: &str, route: &str) -> String {
    let mut id = verb.to_string();
    for segment in route.split(['/', '{', '}', '-', '_']) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            id.push(first.to_ascii_uppercase());
            id.extend(chars);
        }
    }
    id
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "get": {
                        "operationId": "listPets",
                        "tags": ["pets"],
                        "responses": {
                            "200": {
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Pet"}
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "responses": {"201": {"content": {}}}
                    }
                }
            },
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}},
                        "required": ["name"]
                    }
                }
            }
        })
    }

    #[test]
    fn loads_schemas_and_operations() {
        let doc = Document::from_value(&sample()).unwrap();
        assert!(doc.lookup("Pet").is_some());
        assert!(doc.lookup("Missing").is_none());
        assert_eq!(doc.operations.len(), 2);

        let list = &doc.operations[0];
        assert_eq!(list.id, "listPets");
        assert_eq!(list.verb, "get");
        assert_eq!(list.status, 200);
        assert_eq!(list.response.as_ref().unwrap().reference_target(), Some("Pet"));
    }

    #[test]
    fn missing_operation_id_gets_derived_one() {
        let doc = Document::from_value(&sample()).unwrap();
        let post = &doc.operations[1];
        assert_eq!(post.id, "postPets");
        assert!(post.response.is_none());
    }

    #[test]
    fn default_status_maps_to_200() {
        let value = json!({
            "paths": {
                "/x": {"get": {"operationId": "x", "responses": {
                    "default": {"content": {"application/json": {"schema": {"type": "string"}}}}
                }}}
            }
        });
        let doc = Document::from_value(&value).unwrap();
        assert_eq!(doc.operations[0].status, 200);
        assert!(doc.operations[0].response.is_some());
    }

    #[test]
    fn parse_error_carries_json_path() {
        let value = json!({"paths": {"/x": {"get": {"tags": "oops"}}}});
        let err = Document::from_value(&value).unwrap_err();
        assert!(err.to_string().contains("tags"), "{err}");
    }
}
