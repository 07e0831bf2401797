use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::Schema;

/// HTTP verbs an operation can live under, in OpenAPI declaration order.
pub const HTTP_VERBS: [&str; 8] = [
    "get", "post", "put", "delete", "patch", "head", "options", "trace",
];

/// Media type name the pipeline cares about for request bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// An API operation. `Clone` is the deep copy used by `oneOf` fan-out:
/// a cloned operation shares no mutable state with the original.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Operation {
    pub fn is_deprecated(&self) -> bool {
        self.deprecated == Some(true)
    }

    /// The JSON request body schema, if declared.
    pub fn json_body_schema(&self) -> Option<&Schema> {
        self.request_body
            .as_ref()?
            .content
            .get(JSON_MEDIA_TYPE)?
            .schema
            .as_ref()
    }

    pub fn json_body_schema_mut(&mut self) -> Option<&mut Schema> {
        self.request_body
            .as_mut()?
            .content
            .get_mut(JSON_MEDIA_TYPE)?
            .schema
            .as_mut()
    }
}

/// A request body definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// A media type entry under a request body's `content`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// A path item, containing operations keyed by HTTP method.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl PathItem {
    fn slot(&self, verb: &str) -> Option<&Option<Operation>> {
        match verb {
            "get" => Some(&self.get),
            "post" => Some(&self.post),
            "put" => Some(&self.put),
            "delete" => Some(&self.delete),
            "patch" => Some(&self.patch),
            "head" => Some(&self.head),
            "options" => Some(&self.options),
            "trace" => Some(&self.trace),
            _ => None,
        }
    }

    fn slot_mut(&mut self, verb: &str) -> Option<&mut Option<Operation>> {
        match verb {
            "get" => Some(&mut self.get),
            "post" => Some(&mut self.post),
            "put" => Some(&mut self.put),
            "delete" => Some(&mut self.delete),
            "patch" => Some(&mut self.patch),
            "head" => Some(&mut self.head),
            "options" => Some(&mut self.options),
            "trace" => Some(&mut self.trace),
            _ => None,
        }
    }

    pub fn verb(&self, verb: &str) -> Option<&Operation> {
        self.slot(verb)?.as_ref()
    }

    pub fn take_verb(&mut self, verb: &str) -> Option<Operation> {
        self.slot_mut(verb)?.take()
    }

    pub fn set_verb(&mut self, verb: &str, op: Operation) {
        if let Some(slot) = self.slot_mut(verb) {
            *slot = Some(op);
        }
    }

    /// Iterate declared operations as `(verb, operation)` pairs.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        HTTP_VERBS
            .iter()
            .filter_map(move |v| self.verb(v).map(|op| (*v, op)))
    }

    pub fn has_operations(&self) -> bool {
        self.operations().next().is_some()
    }
}
