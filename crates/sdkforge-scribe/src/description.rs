use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ScribeError;

/// The side-channel description document (`scribe.yml`): fragment path to
/// the data rendered at that path. Read once per build, never mutated.
pub type ScribeDescription = IndexMap<String, FragmentEntry>;

/// Default description file name inside a generator's template directory.
pub const DESCRIPTION_FILE: &str = "scribe.yml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FragmentEntry {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<ClassSpec>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassSpec {
    #[serde(rename = "className")]
    pub class_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodSpec>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MethodSpec {
    #[serde(rename = "methodName", default)]
    pub method_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "methodArgs", default, skip_serializing_if = "Vec::is_empty")]
    pub method_args: Vec<ArgSpec>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArgSpec {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "argType", default, skip_serializing_if = "Option::is_none")]
    pub arg_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Load the description document. A missing file is an empty description
/// (soft); a file that exists but does not parse is fatal.
pub fn load(path: &Path) -> Result<ScribeDescription, ScribeError> {
    if !path.exists() {
        return Ok(ScribeDescription::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml_ng::from_str(&content)?)
}
