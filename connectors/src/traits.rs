use async_trait::async_trait;
use chameleon_models::{
    ChangeRequest, DataQuery, ResolvedSchema, SavedSources, Source, SourceData, SourceListing,
    SourcesQuery,
};
use serde_json::Value;

use super::error::ConnectorResult;
use super::types::ConnectorType;

/// Surface every data connector exposes to a hosting component.
///
/// Implementations are interchangeable: a component holding a
/// `Box<dyn Connector>` does not care which backend answers.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the name of the connector
    fn name(&self) -> &str;

    fn connector_type(&self) -> ConnectorType;

    /// Sources the host saved for this connector, keyed by id.
    fn saved_sources(&self) -> &SavedSources;

    /// Lists sources: either the saved ones (reconciled against the
    /// backend where supported) or the backend's catalog.
    async fn get_sources(&self, query: &SourcesQuery) -> ConnectorResult<SourceListing>;

    /// Resolves the field schema of a source.
    async fn get_source_schema(&self, source: &Source) -> ConnectorResult<ResolvedSchema>;

    /// Reads a page of rows, keyed by the source's name.
    async fn get_source_data(&self, source: &Source, query: &DataQuery) -> ConnectorResult<SourceData>;

    /// Creates, updates or deletes a row.
    async fn change_source_data(
        &self,
        source: &Source,
        request: &ChangeRequest,
    ) -> ConnectorResult<Value>;
}
