//! Ride Core schema payloads and field-list construction.

use chameleon_models::{FieldDescriptor, FieldType};
use serde::Deserialize;

use crate::error::{ConnectorError, ConnectorResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Canonical field schema of a record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSchema {
    pub id: String,
    #[serde(default)]
    pub fields: Vec<RecordField>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewField {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub display_field_id: Option<String>,
    #[serde(default)]
    pub dependency_path: Option<String>,
    #[serde(default)]
    pub multi_value: bool,
    #[serde(default)]
    pub map_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSchema {
    pub id: String,
    #[serde(default)]
    pub fields: Vec<ViewField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageSchema {
    #[serde(default)]
    pub records: Vec<RecordSchema>,
    #[serde(default)]
    pub views: Vec<ViewSchema>,
}

impl PackageSchema {
    pub fn view(&self, id: &str) -> Option<&ViewSchema> {
        self.views.iter().find(|view| view.id == id)
    }

    pub fn record(&self, id: &str) -> Option<&RecordSchema> {
        self.records.iter().find(|record| record.id == id)
    }
}

/// One schema version of a data package.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaVersion {
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub version_tag: Option<String>,
    pub schema: PackageSchema,
}

/// An entry as returned by the schema endpoints: installed versions nest
/// the version under `schemaVersion`, uncommitted ones return it bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaVersionEntry {
    Installed {
        #[serde(rename = "schemaVersion")]
        schema_version: SchemaVersion,
    },
    Bare(SchemaVersion),
}

impl SchemaVersionEntry {
    pub fn into_schema_version(self) -> SchemaVersion {
        match self {
            SchemaVersionEntry::Installed { schema_version } => schema_version,
            SchemaVersionEntry::Bare(version) => version,
        }
    }
}

/// Any schema response, possibly wrapped in a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaVersionPayload {
    List(Vec<SchemaVersionEntry>),
    Single(SchemaVersionEntry),
}

impl SchemaVersionPayload {
    /// The version the payload describes; the first one for lists.
    pub fn into_schema_version(self) -> Option<SchemaVersion> {
        match self {
            SchemaVersionPayload::List(entries) => entries
                .into_iter()
                .next()
                .map(SchemaVersionEntry::into_schema_version),
            SchemaVersionPayload::Single(entry) => Some(entry.into_schema_version()),
        }
    }
}

/// `{ data: [...] }` envelope of the installed-schema-versions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct InstalledVersions {
    #[serde(default)]
    pub data: Vec<SchemaVersionEntry>,
}

impl InstalledVersions {
    pub fn into_versions(self) -> Vec<SchemaVersion> {
        self.data
            .into_iter()
            .map(SchemaVersionEntry::into_schema_version)
            .collect()
    }
}

/// Field descriptors exposed by `view`, typed from `record`.
///
/// Relation fields (those with a dependency path) are always typed
/// `relation`; primary fields are dropped.
pub fn build_fields(record: &RecordSchema, view: &ViewSchema) -> ConnectorResult<Vec<FieldDescriptor>> {
    let mut fields = Vec::with_capacity(view.fields.len());

    for field in &view.fields {
        let field_type = if field.dependency_path.is_some() {
            FieldType::Relation
        } else {
            let backing_id = field.display_field_id.as_deref().unwrap_or_default();
            record
                .fields
                .iter()
                .find(|candidate| candidate.id == backing_id)
                .map(|candidate| candidate.field_type.clone())
                .ok_or_else(|| {
                    ConnectorError::SchemaMismatch(format!(
                        "Field '{}' of view '{}' has no backing field '{}' in record '{}'",
                        field.id, view.id, backing_id, record.id
                    ))
                })?
        };

        if field_type == FieldType::Primary {
            continue;
        }

        fields.push(FieldDescriptor {
            id: field.id.clone(),
            name: field.display_name.clone(),
            display_name: Some(field.display_name.clone()),
            field_type,
            multi_value: field.multi_value,
            dependency_path: field.dependency_path.clone(),
            display_field_id: field.display_field_id.clone(),
            map_name: field.map_name.clone(),
        });
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn package() -> serde_json::Value {
        json!({
            "records": [{
                "id": "r1",
                "fields": [
                    { "id": "rf0", "type": "primary" },
                    { "id": "rf1", "type": "text" },
                    { "id": "rf2", "type": "number" }
                ]
            }],
            "views": [{
                "id": "view-1",
                "fields": [
                    { "id": "vf0", "displayName": "Id", "displayFieldId": "rf0" },
                    { "id": "vf1", "displayName": "Name", "displayFieldId": "rf1" },
                    { "id": "vf2", "displayName": "Score", "displayFieldId": "rf2" },
                    { "id": "vf3", "displayName": "Team", "displayFieldId": "rf1", "dependencyPath": "team" }
                ]
            }]
        })
    }

    #[test]
    fn test_payload_shapes_normalize_to_one_version() {
        let bare = json!({ "versionId": "v1", "versionTag": "1.0", "schema": package() });
        let wrapped = json!({ "schemaVersion": bare.clone() });

        for value in [bare.clone(), wrapped.clone(), json!([wrapped]), json!([bare])] {
            let payload: SchemaVersionPayload = serde_json::from_value(value).unwrap();
            let version = payload.into_schema_version().unwrap();
            assert_eq!(version.version_id, "v1");
            assert_eq!(version.schema.views.len(), 1);
        }

        let empty: SchemaVersionPayload = serde_json::from_value(json!([])).unwrap();
        assert!(empty.into_schema_version().is_none());
    }

    #[test]
    fn test_build_fields_types_and_filters() {
        let schema: PackageSchema = serde_json::from_value(package()).unwrap();
        let fields = build_fields(schema.record("r1").unwrap(), schema.view("view-1").unwrap()).unwrap();

        let summary: Vec<(&str, &str, &str)> = fields
            .iter()
            .map(|f| (f.id.as_str(), f.name.as_str(), f.field_type.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("vf1", "Name", "text"),
                ("vf2", "Score", "number"),
                ("vf3", "Team", "relation"),
            ]
        );
    }

    #[test]
    fn test_build_fields_missing_backing_field() {
        let record: RecordSchema = serde_json::from_value(json!({ "id": "r1", "fields": [] })).unwrap();
        let view: ViewSchema = serde_json::from_value(json!({
            "id": "view-1",
            "fields": [{ "id": "vf1", "displayName": "Name", "displayFieldId": "rf9" }]
        }))
        .unwrap();

        assert!(matches!(
            build_fields(&record, &view),
            Err(ConnectorError::SchemaMismatch(_))
        ));
    }
}
