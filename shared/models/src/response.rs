use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::source::{Source, SourceMeta, SourceSchema, ViewModel};

/// One page of rows for a source, in the toolkit's canonical shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcePage {
    pub items: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Value>,
}

/// Source data keyed by source name.
pub type SourceData = HashMap<String, SourcePage>;

/// Views available in a space, keyed by view id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCatalog {
    pub data: IndexMap<String, ViewModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Value>,
}

/// Result of `get_sources`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SourceListing {
    /// Saved sources, reconciled against the backend where the connector
    /// supports it.
    Saved(Vec<Source>),
    /// Internal platform catalog of available views.
    Catalog(SourceCatalog),
    /// Source descriptions as returned by a generic REST backend.
    Remote(Vec<Value>),
}

impl SourceListing {
    pub fn saved(&self) -> Option<&[Source]> {
        match self {
            SourceListing::Saved(sources) => Some(sources),
            _ => None,
        }
    }

    pub fn into_saved(self) -> Option<Vec<Source>> {
        match self {
            SourceListing::Saved(sources) => Some(sources),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SourceListing::Saved(sources) => sources.len(),
            SourceListing::Catalog(catalog) => catalog.data.len(),
            SourceListing::Remote(sources) => sources.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Schema of a source as resolved by its connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSchema {
    pub id: String,
    pub schema: SourceSchema,
    pub meta: SourceMeta,
}
