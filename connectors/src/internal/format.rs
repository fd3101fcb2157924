//! Reshaping between Ride Core payloads and the toolkit's field names.

use chameleon_models::{is_present, FieldType, SourceMeta, SourcePage, SourceSchema, ViewModel};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{ConnectorError, ConnectorResult};

/// A view as listed by `available-view-models`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformView {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data_package_id: String,
    #[serde(default)]
    pub data_package_name: Option<String>,
    #[serde(default)]
    pub root_record_id: String,
    #[serde(default)]
    pub version_id: String,
    #[serde(default)]
    pub version_tag: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableViewModels {
    #[serde(default)]
    pub data: Vec<PlatformView>,
    #[serde(default)]
    pub pagination: Option<Value>,
}

/// Rows of a record read, keyed by internal field id, plus field metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformRows {
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub pagination: Option<Value>,
}

/// Catalog of view models keyed by view id.
pub fn format_view_models(views: Vec<PlatformView>) -> IndexMap<String, ViewModel> {
    views
        .into_iter()
        .map(|view| {
            let model = ViewModel {
                id: view.id.clone(),
                name: view.name.clone(),
                model: view.name,
                meta: SourceMeta {
                    data_package: view.data_package_id,
                    data_package_name: view.data_package_name,
                    record: view.root_record_id,
                    schema_version: view.version_id,
                    schema_tag: view.version_tag,
                    schema_versions: Vec::new(),
                },
            };
            (view.id, model)
        })
        .collect()
}

/// Relabel row keys from internal field ids to display names.
///
/// The mapping comes from the response's own `metadata.schema.fields`;
/// keys it does not describe are dropped, and the `schema` block itself is
/// not passed on.
pub fn format_response(rows: PlatformRows) -> SourcePage {
    let PlatformRows {
        data,
        mut metadata,
        pagination,
    } = rows;

    let labels: Map<String, Value> = match metadata.remove("schema") {
        Some(Value::Object(mut schema)) => match schema.remove("fields") {
            Some(Value::Object(fields)) => fields,
            _ => Map::new(),
        },
        _ => Map::new(),
    };

    let items = data
        .into_iter()
        .map(|row| {
            let relabelled: Map<String, Value> = row
                .into_iter()
                .filter_map(|(key, value)| {
                    let label = labels.get(&key)?.get("displayName")?.as_str()?;
                    Some((label.to_string(), value))
                })
                .collect();
            Value::Object(relabelled)
        })
        .collect();

    SourcePage {
        items,
        metadata: Some(Value::Object(metadata)),
        pagination,
    }
}

/// Translate a component payload into internal field ids.
///
/// Keys without a schema field are skipped; number fields given as
/// non-empty strings are parsed.
pub fn translate_payload(
    payload: &Map<String, Value>,
    schema: &SourceSchema,
) -> ConnectorResult<Map<String, Value>> {
    let mut change = Map::new();

    for (key, value) in payload {
        let Some(field) = schema.field_by_map_name(key) else {
            debug!(key = %key, "Payload key has no schema field, skipping");
            continue;
        };

        let target = field
            .display_field_id
            .clone()
            .unwrap_or_else(|| field.id.clone());

        let translated = match value {
            Value::String(text) if field.field_type == FieldType::Number && is_present(value) => {
                parse_number(key, text)?
            }
            other => other.clone(),
        };

        change.insert(target, translated);
    }

    Ok(change)
}

// Integers stay integers on the wire; only fractional input becomes a float.
fn parse_number(key: &str, text: &str) -> ConnectorResult<Value> {
    let text = text.trim();
    text.parse::<i64>()
        .map(Number::from)
        .or_else(|_| text.parse::<u64>().map(Number::from))
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(Number::from_f64))
        .map(Value::Number)
        .ok_or_else(|| {
            ConnectorError::InvalidPayload(format!("Field '{}' expects a number, got '{}'", key, text))
        })
}

/// `schema` parameter of a seed request.
pub fn seed_schema(schema: &SourceSchema) -> Value {
    let fields: Vec<Value> = schema
        .fields
        .iter()
        .map(|field| {
            serde_json::json!({
                "name": field.name,
                "type": field.field_type.as_str(),
                "multiValue": field.multi_value,
            })
        })
        .collect();

    serde_json::json!({ "name": "test", "schema": fields })
}

/// Seed responses already use display names; only the page shape changes.
pub fn seed_page(body: Value) -> SourcePage {
    match body {
        Value::Object(mut object) => SourcePage {
            items: match object.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            metadata: object.remove("metadata"),
            pagination: object.remove("pagination"),
        },
        Value::Array(items) => SourcePage {
            items,
            ..Default::default()
        },
        _ => SourcePage::default(),
    }
}

/// Copy of the caller's payload with the generated instance id merged in.
pub fn merge_instance_id(payload: &Map<String, Value>, response: &Value) -> Map<String, Value> {
    let mut result = payload.clone();
    if let Some(id) = response.get("recordInstanceId").filter(|id| !id.is_null()) {
        result.insert("id".to_string(), id.clone());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chameleon_models::FieldDescriptor;
    use serde_json::json;

    fn rows(value: Value) -> PlatformRows {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_format_response_relabels_keys() {
        let page = format_response(rows(json!({
            "data": [{ "f1": "Alice", "f9": "hidden" }],
            "metadata": {
                "schema": { "fields": { "f1": { "displayName": "Name" } } },
                "total": 1
            },
            "pagination": { "page": 1, "size": 10 }
        })));

        assert_eq!(page.items, vec![json!({ "Name": "Alice" })]);
        assert_eq!(page.metadata, Some(json!({ "total": 1 })));
        assert_eq!(page.pagination, Some(json!({ "page": 1, "size": 10 })));
    }

    #[test]
    fn test_format_response_without_field_metadata_drops_everything() {
        let page = format_response(rows(json!({ "data": [{ "f1": "Alice" }] })));
        assert_eq!(page.items, vec![json!({})]);
        assert!(page.pagination.is_none());
    }

    #[test]
    fn test_format_view_models_keys_by_id() {
        let views: AvailableViewModels = serde_json::from_value(json!({
            "data": [{
                "id": "view-1",
                "name": "Players",
                "dataPackageId": "dp1",
                "dataPackageName": "League",
                "rootRecordId": "r1",
                "versionId": "v2",
                "versionTag": "2.0"
            }]
        }))
        .unwrap();

        let catalog = format_view_models(views.data);
        let model = &catalog["view-1"];
        assert_eq!(model.model, "Players");
        assert_eq!(model.meta.record, "r1");
        assert_eq!(model.meta.schema_version, "v2");
        assert_eq!(model.meta.schema_tag.as_deref(), Some("2.0"));
    }

    fn schema() -> SourceSchema {
        SourceSchema::new(vec![
            FieldDescriptor {
                id: "vf1".to_string(),
                name: "Name".to_string(),
                field_type: "text".into(),
                display_field_id: Some("rf1".to_string()),
                map_name: Some("name".to_string()),
                ..Default::default()
            },
            FieldDescriptor {
                id: "vf2".to_string(),
                name: "Score".to_string(),
                field_type: FieldType::Number,
                display_field_id: Some("rf2".to_string()),
                map_name: Some("score".to_string()),
                ..Default::default()
            },
        ])
    }

    #[test]
    fn test_translate_payload_maps_and_parses() {
        let payload = json!({ "name": "Alice", "score": "12.5", "unknown": true });
        let change = translate_payload(payload.as_object().unwrap(), &schema()).unwrap();

        assert_eq!(Value::Object(change), json!({ "rf1": "Alice", "rf2": 12.5 }));
    }

    #[test]
    fn test_translate_payload_keeps_integers_integral() {
        let payload = json!({ "score": "12" });
        let change = translate_payload(payload.as_object().unwrap(), &schema()).unwrap();

        assert_eq!(Value::Object(change.clone()), json!({ "rf2": 12 }));
        assert_eq!(serde_json::to_string(&change).unwrap(), r#"{"rf2":12}"#);

        let payload = json!({ "score": " -3 " });
        let change = translate_payload(payload.as_object().unwrap(), &schema()).unwrap();
        assert_eq!(Value::Object(change), json!({ "rf2": -3 }));
    }

    #[test]
    fn test_translate_payload_keeps_empty_number_values() {
        let payload = json!({ "score": "" });
        let change = translate_payload(payload.as_object().unwrap(), &schema()).unwrap();
        assert_eq!(Value::Object(change), json!({ "rf2": "" }));
    }

    #[test]
    fn test_translate_payload_rejects_bad_numbers() {
        let payload = json!({ "score": "lots" });
        assert!(matches!(
            translate_payload(payload.as_object().unwrap(), &schema()),
            Err(ConnectorError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_merge_instance_id() {
        let payload = json!({ "name": "Alice" });
        let merged = merge_instance_id(payload.as_object().unwrap(), &json!({ "recordInstanceId": "i-1" }));
        assert_eq!(Value::Object(merged), json!({ "name": "Alice", "id": "i-1" }));

        let merged = merge_instance_id(payload.as_object().unwrap(), &Value::Null);
        assert_eq!(Value::Object(merged), json!({ "name": "Alice" }));
    }

    #[test]
    fn test_seed_schema() {
        assert_eq!(
            seed_schema(&schema()),
            json!({
                "name": "test",
                "schema": [
                    { "name": "Name", "type": "text", "multiValue": false },
                    { "name": "Score", "type": "number", "multiValue": false }
                ]
            })
        );
    }
}
