//! Declared value shapes for variables and tool parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Closed set of value types a schema can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Boolean,
    Object,
    File,
}

impl SchemaType {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Object => "object",
            SchemaType::File => "file",
        }
    }
}

/// Shape of a value flowing through the tree.
///
/// `fields` is present iff `schema_type == Object`; `content_types` is
/// meaningful only for `File`. Both constraints are enforced by the
/// invariant validator, not by construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Schema {
    /// A non-array schema of the given primitive type.
    pub fn scalar(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            is_array: false,
            fields: None,
            content_types: None,
            format: None,
        }
    }

    /// An array schema of the given primitive type.
    pub fn array_of(schema_type: SchemaType) -> Self {
        Self {
            is_array: true,
            ..Self::scalar(schema_type)
        }
    }

    /// An object schema with the given named fields.
    pub fn object(fields: BTreeMap<String, Schema>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::scalar(SchemaType::Object)
        }
    }

    /// A file schema restricted to the given content types.
    pub fn file(content_types: Vec<String>) -> Self {
        Self {
            content_types: Some(content_types),
            ..Self::scalar(SchemaType::File)
        }
    }
}
