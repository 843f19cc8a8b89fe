use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A ticket category. Tickets reference categories by name, not by id, so
/// renaming or deleting a category leaves existing tickets untouched.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
