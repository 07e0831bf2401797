use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A schema node, typed only for the fields the pipeline touches.
/// Everything else round-trips through `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Kept as a raw value: descriptions are usually strings, but the
    /// sanitizer must leave non-string values untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<serde_json::Value>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Prefix every component schema reference must carry.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

impl Schema {
    /// The schema's description when it is a plain string.
    pub fn description_str(&self) -> Option<&str> {
        self.description.as_ref().and_then(|v| v.as_str())
    }

    /// The referenced component schema name, if this node is a direct
    /// `#/components/schemas/{Name}` pointer.
    pub fn component_name(&self) -> Option<&str> {
        self.reference.as_deref()?.strip_prefix(SCHEMA_REF_PREFIX)
    }
}
