use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Saved sources keyed by view id, in the order the host saved them.
pub type SavedSources = IndexMap<String, Source>;

/// Type of a field as reported by the platform.
///
/// Only the types the connectors branch on get their own variant; any other
/// platform type is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Primary,
    Relation,
    Number,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Primary => "primary",
            FieldType::Relation => "relation",
            FieldType::Number => "number",
            FieldType::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "primary" => FieldType::Primary,
            "relation" => FieldType::Relation,
            "number" => FieldType::Number,
            _ => FieldType::Other(value),
        }
    }
}

impl From<&str> for FieldType {
    fn from(value: &str) -> Self {
        FieldType::from(value.to_string())
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Other(String::new())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field exposed by a source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub multi_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_path: Option<String>,
    /// Internal record field id backing this view field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field_id: Option<String>,
    /// Key the host uses for this field in write payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_name: Option<String>,
}

/// Field list of a source plus the name of its identifier field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SchemaRepr")]
pub struct SourceSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

// Saved internal sources store a bare field list, external ones an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaRepr {
    Fields(Vec<FieldDescriptor>),
    Object {
        #[serde(default)]
        identifier: Option<String>,
        #[serde(default)]
        fields: Vec<FieldDescriptor>,
    },
}

impl From<SchemaRepr> for SourceSchema {
    fn from(repr: SchemaRepr) -> Self {
        match repr {
            SchemaRepr::Fields(fields) => SourceSchema {
                identifier: None,
                fields,
            },
            SchemaRepr::Object { identifier, fields } => SourceSchema { identifier, fields },
        }
    }
}

impl SourceSchema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            identifier: None,
            fields,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Find the field the host addresses as `map_name` in payloads.
    pub fn field_by_map_name(&self, map_name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.map_name.as_deref() == Some(map_name))
    }

    pub fn field_ids(&self) -> Vec<String> {
        self.fields.iter().map(|field| field.id.clone()).collect()
    }
}

/// A previously known schema version of a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaVersionSnapshot {
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_tag: Option<String>,
}

/// Location of a source's view inside the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMeta {
    #[serde(default)]
    pub data_package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_package_name: Option<String>,
    #[serde(default)]
    pub record: String,
    #[serde(default)]
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema_versions: Vec<SchemaVersionSnapshot>,
}

impl SourceMeta {
    /// Snapshot of the version this meta currently points at.
    pub fn snapshot(&self) -> SchemaVersionSnapshot {
        SchemaVersionSnapshot {
            schema_version: self.schema_version.clone(),
            schema_tag: self.schema_tag.clone(),
        }
    }
}

/// A named reference to a remote view, as saved by the host component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub schema: SourceSchema,
    #[serde(default)]
    pub meta: SourceMeta,
    /// The view no longer exists upstream.
    #[serde(default)]
    pub disabled: bool,
    /// `None` until a sync has verified the source's schema version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<serde_json::Value>,
}

impl Source {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_schema(mut self, schema: SourceSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_meta(mut self, meta: SourceMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn is_installed(&self) -> bool {
        self.installed.unwrap_or(false)
    }
}

/// A view currently available in a space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub id: String,
    pub name: String,
    pub model: String,
    pub meta: SourceMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_keeps_unknown_names() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "id": "f1",
            "name": "Created",
            "type": "datetime"
        }))
        .unwrap();

        assert_eq!(field.field_type, FieldType::Other("datetime".to_string()));
        assert_eq!(serde_json::to_value(&field).unwrap()["type"], "datetime");
    }

    #[test]
    fn test_schema_accepts_bare_field_list() {
        let source: Source = serde_json::from_value(json!({
            "id": "view-1",
            "name": "players",
            "schema": [{ "id": "f1", "name": "Name", "type": "text", "mapName": "name" }],
            "meta": { "dataPackage": "dp", "record": "r1", "schemaVersion": "v1" }
        }))
        .unwrap();

        assert_eq!(source.schema.identifier, None);
        assert_eq!(source.schema.fields.len(), 1);
        assert_eq!(source.schema.field_by_map_name("name").unwrap().id, "f1");
        assert_eq!(source.installed, None);
    }

    #[test]
    fn test_schema_accepts_object_with_identifier() {
        let source: Source = serde_json::from_value(json!({
            "id": "users",
            "name": "users",
            "schema": { "identifier": "userId", "fields": [] }
        }))
        .unwrap();

        assert_eq!(source.schema.identifier.as_deref(), Some("userId"));
        assert!(source.meta.schema_versions.is_empty());
    }
}
