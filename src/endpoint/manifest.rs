//! Serde model of the JSON manifest.
//!
//! ```json
//! [{ "method": "GET", "path": "/users/{id}",
//!    "scope": [["admin"], ["user[ID]"]],
//!    "info": "fetch one user",
//!    "in":  { "{id}": { "info": "user id", "type": "uint", "name": "ID" } },
//!    "out": { "name": { "info": "display name", "type": "string" } } }]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One endpoint entry, exactly as written in the manifest.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEndpoint {
    pub method: String,

    pub path: String,

    /// OR of AND-groups of role templates.
    #[serde(default)]
    pub scope: Vec<Vec<String>>,

    #[serde(default)]
    pub info: String,

    #[serde(default, rename = "in")]
    pub input: BTreeMap<String, ManifestParam>,

    #[serde(default, rename = "out")]
    pub output: BTreeMap<String, ManifestParam>,
}

/// One parameter entry of an `in` or `out` map.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestParam {
    #[serde(default)]
    pub info: String,

    #[serde(rename = "type")]
    pub type_name: String,

    /// External name the parameter is exposed as.
    #[serde(default)]
    pub name: Option<String>,
}
