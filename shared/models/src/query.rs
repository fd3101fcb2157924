use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Page window requested from a source catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

/// Options for listing sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesQuery {
    /// Only report on the sources the host already saved.
    #[serde(default)]
    pub saved_only: bool,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl SourcesQuery {
    pub fn saved() -> Self {
        Self {
            saved_only: true,
            ..Default::default()
        }
    }

    pub fn catalog(page: u32, size: u32) -> Self {
        Self {
            saved_only: false,
            pagination: Pagination {
                page: Some(page),
                size: Some(size),
            },
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Search term, if one was given and is not blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|term| !term.is_empty())
    }
}

/// Field to sort by: components send either a bare name or a field object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortField {
    Name(String),
    Field { id: String },
}

impl SortField {
    pub fn id(&self) -> &str {
        match self {
            SortField::Name(name) => name,
            SortField::Field { id } => id,
        }
    }
}

/// Paging, sorting and search state of a data-bound component.
///
/// Components are inconsistent about naming, so both spellings of page and
/// size are accepted and resolved by the connectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Sort order, `asc` or `desc` in any case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ClientPagination {
    pub fn resolved_page(&self) -> Option<u32> {
        self.page.or(self.current_page)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<ClientPagination>,
    /// Number of generated rows for seed requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_records: Option<u32>,
}

/// Options for reading a page of source data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuery {
    #[serde(default)]
    pub params: DataParams,
    /// Ask for generated sample rows instead of stored data.
    #[serde(default)]
    pub seed: bool,
}

impl DataQuery {
    pub fn page(pagination: ClientPagination) -> Self {
        Self {
            params: DataParams {
                pagination: Some(pagination),
                num_records: None,
            },
            seed: false,
        }
    }

    pub fn seed(num_records: Option<u32>) -> Self {
        Self {
            params: DataParams {
                pagination: None,
                num_records,
            },
            seed: true,
        }
    }
}

/// Mutation applied through `change_source_data`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    #[default]
    Create,
    Update,
    Delete,
}

impl ChangeAction {
    /// Parse an action keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_lowercase().as_str() {
            "create" => Some(ChangeAction::Create),
            "update" => Some(ChangeAction::Update),
            "delete" => Some(ChangeAction::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Create => "create",
            ChangeAction::Update => "update",
            ChangeAction::Delete => "delete",
        }
    }

    /// Update and delete address an existing row.
    pub fn requires_identifier(&self) -> bool {
        matches!(self, ChangeAction::Update | ChangeAction::Delete)
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write request from a component.
///
/// `action` is kept as the raw keyword the component sent; each connector
/// decides how strictly to interpret it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Map<String, Value>>,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ChangeRequest {
    pub fn new(action: ChangeAction) -> Self {
        Self::with_keyword(action.as_str())
    }

    pub fn with_keyword(keyword: impl Into<String>) -> Self {
        Self {
            action: Some(keyword.into()),
            ..Default::default()
        }
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// A param value, treating null, `false` and empty strings as absent.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key).filter(|value| is_present(value))
    }
}

/// Whether a payload value counts as set.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}
