//! Connector for the Ride Core metadata platform.
//!
//! Ride Core organizes data by space, data package, schema version and
//! view. Rows come back keyed by internal field ids, so reads are relabelled
//! with display names and writes are translated the other way.

pub mod format;
pub mod reconcile;
pub mod schema;

use async_trait::async_trait;
use chameleon_config::{RideCoreOptions, Service};
use chameleon_models::{
    is_present, ChangeAction, ChangeRequest, ClientPagination, DataQuery, ResolvedSchema,
    SavedSources, Source, SourceCatalog, SourceData, SourceListing, SourceSchema, SourcesQuery,
};
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use crate::error::{ConnectorError, ConnectorResult};
use crate::http::{segment, ApiClient, QueryParams};
use crate::params::sort_param;
use crate::traits::Connector;
use crate::types::ConnectorType;

use self::format::{
    format_response, format_view_models, merge_instance_id, seed_page, seed_schema,
    translate_payload, AvailableViewModels, PlatformRows,
};
use self::reconcile::reconcile;
use self::schema::{
    build_fields, InstalledVersions, SchemaVersion, SchemaVersionEntry, SchemaVersionPayload,
};

const VIEW_MODEL_TYPES: &str = "uncommitted,foreign";
const DEFAULT_SEED_RECORDS: u32 = 10;

/// Schema-aware connector for Ride Core spaces.
pub struct RideCoreConnector {
    name: String,
    options: RideCoreOptions,
    sources: SavedSources,
    client: ApiClient,
}

impl std::fmt::Debug for RideCoreConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RideCoreConnector")
            .field("options", &self.options)
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl RideCoreConnector {
    pub fn new(options: RideCoreOptions) -> ConnectorResult<Self> {
        options.validate()?;
        let client = ApiClient::new(&options.auth)?;

        Ok(Self {
            name: format!("Ride Core: {}", options.space),
            options,
            sources: SavedSources::new(),
            client,
        })
    }

    pub fn with_sources(mut self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.sources = sources
            .into_iter()
            .map(|source| (source.id.clone(), source))
            .collect();
        self
    }

    fn space_url(&self, service: Service, path: &str) -> String {
        format!("{}{}", self.options.space_url(service), path)
    }

    fn instances_url(&self, service: Service, source: &Source) -> String {
        self.space_url(
            service,
            &format!(
                "/schema-versions/{}/records/{}/instances",
                segment(&source.meta.schema_version),
                segment(&source.meta.record)
            ),
        )
    }

    /// One batched lookup of installed schema versions.
    async fn installed_versions(&self, versions: &[String]) -> ConnectorResult<Vec<SchemaVersion>> {
        let url = self.space_url(Service::Blueprint, "/installed-schema-versions");
        let query = vec![("versionIds".to_string(), versions.join(","))];
        let body: InstalledVersions = self.client.get_json(&url, &query).await?;
        Ok(body.into_versions())
    }

    async fn latest_schema(&self, data_package: &str) -> ConnectorResult<SchemaVersionPayload> {
        let url = self.space_url(
            Service::Blueprint,
            &format!(
                "/data-packages/{}/schema-versions/uncommitted",
                segment(data_package)
            ),
        );
        self.client.get_json(&url, &QueryParams::new()).await
    }

    async fn saved_view_models(&self, catalog: &SourceCatalog) -> ConnectorResult<Vec<Source>> {
        let reconciliation = reconcile(&self.sources, &catalog.data);
        if !reconciliation.needs_lookup() {
            return Ok(reconciliation.into_sources());
        }

        let missing = reconciliation.missing_versions();
        info!(versions = ?missing, "Looking up installed schema versions");
        let installed = self.installed_versions(&missing).await?;
        Ok(reconciliation.apply_installed(&installed))
    }

    async fn read_page(&self, source: &Source, query: &DataQuery) -> ConnectorResult<Value> {
        let url = self.instances_url(Service::Read, source);
        let mut params = vec![
            ("viewId".to_string(), source.id.clone()),
            ("fields".to_string(), serde_json::to_string(&source.schema.field_ids())?),
            ("includeFieldMetadata".to_string(), "true".to_string()),
        ];
        if let Some(pagination) = &query.params.pagination {
            params.extend(client_params(pagination));
        }
        if !source.filters.is_empty() {
            params.push(("filters".to_string(), serde_json::to_string(&source.filters)?));
        }

        self.client
            .send(self.client.request(Method::GET, &url).query(&params))
            .await
    }

    async fn read_seed(&self, source: &Source, query: &DataQuery) -> ConnectorResult<Value> {
        let url = format!(
            "{}/misc/seed",
            self.options.service_url(Service::Read).trim_end_matches('/')
        );
        let params = vec![
            (
                "numRecords".to_string(),
                query
                    .params
                    .num_records
                    .unwrap_or(DEFAULT_SEED_RECORDS)
                    .to_string(),
            ),
            ("schema".to_string(), seed_schema(&source.schema).to_string()),
        ];

        self.client
            .send(self.client.request(Method::GET, &url).query(&params))
            .await
    }
}

/// Query parameters for the catalog listing.
///
/// Saved-only listings ask for exactly the saved view ids in one page.
pub fn sources_request_params(sources: &SavedSources, query: &SourcesQuery) -> QueryParams {
    let mut params = vec![("types".to_string(), VIEW_MODEL_TYPES.to_string())];

    if query.saved_only {
        params.push(("page".to_string(), "1".to_string()));
        params.push(("size".to_string(), sources.len().to_string()));
        if !sources.is_empty() {
            let ids: Vec<&str> = sources.keys().map(String::as_str).collect();
            params.push(("viewModelIds".to_string(), ids.join(",")));
        }
    } else {
        if let Some(page) = query.pagination.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = query.pagination.size {
            params.push(("size".to_string(), size.to_string()));
        }
    }

    if let Some(search) = query.search_term() {
        params.push(("viewModelNames".to_string(), search.to_string()));
    }

    params
}

/// Paging and sorting of a record read.
pub fn client_params(pagination: &ClientPagination) -> QueryParams {
    let mut params = QueryParams::new();

    if let Some(size) = pagination.size.or(pagination.page_size) {
        params.push(("size".to_string(), size.to_string()));
    }
    if let Some(page) = pagination.resolved_page() {
        params.push(("page".to_string(), page.to_string()));
    }
    if let Some(sort_by) = &pagination.sort_by {
        params.push((
            "sort".to_string(),
            sort_param(pagination.sort.as_deref(), sort_by.id()),
        ));
    }

    params
}

/// Resolve the action keyword; absent or unknown keywords mean create.
pub fn change_action(request: &ChangeRequest) -> ChangeAction {
    match request.action.as_deref() {
        None => ChangeAction::Create,
        Some(keyword) => ChangeAction::from_keyword(keyword).unwrap_or_else(|| {
            warn!(action = %keyword, "Unknown change action, treating as create");
            ChangeAction::Create
        }),
    }
}

/// Row addressed by an update or delete.
fn instance_id(request: &ChangeRequest, payload: &Map<String, Value>) -> Option<String> {
    let value = request
        .param("recordInstanceId")
        .or_else(|| payload.get("recordInstanceId").filter(|v| is_present(v)))
        .or_else(|| payload.get("id").filter(|v| is_present(v)))?;

    Some(match value {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    })
}

#[async_trait]
impl Connector for RideCoreConnector {
    fn name(&self) -> &str {
        &self.name
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::RideCore
    }

    fn saved_sources(&self) -> &SavedSources {
        &self.sources
    }

    #[instrument(skip(self), fields(connector = "ride_core"))]
    async fn get_sources(&self, query: &SourcesQuery) -> ConnectorResult<SourceListing> {
        let url = self.space_url(Service::Blueprint, "/available-view-models");
        let params = sources_request_params(&self.sources, query);
        let body: AvailableViewModels = self.client.get_json(&url, &params).await?;

        let catalog = SourceCatalog {
            data: format_view_models(body.data),
            pagination: body.pagination,
        };
        info!(
            space = %self.options.space,
            views = catalog.data.len(),
            saved_only = query.saved_only,
            "Fetched view models"
        );

        if query.saved_only {
            return Ok(SourceListing::Saved(self.saved_view_models(&catalog).await?));
        }
        Ok(SourceListing::Catalog(catalog))
    }

    #[instrument(skip(self, source), fields(connector = "ride_core", source = %source.id))]
    async fn get_source_schema(&self, source: &Source) -> ConnectorResult<ResolvedSchema> {
        // Disabled but installed views only exist in their installed version.
        let payload = if source.is_installed() && source.disabled {
            let versions = self
                .installed_versions(std::slice::from_ref(&source.meta.schema_version))
                .await?;
            SchemaVersionPayload::List(
                versions
                    .into_iter()
                    .map(SchemaVersionEntry::Bare)
                    .collect(),
            )
        } else {
            self.latest_schema(&source.meta.data_package).await?
        };

        let version = payload.into_schema_version().ok_or_else(|| {
            ConnectorError::SchemaMismatch(format!(
                "No schema version returned for source '{}'",
                source.id
            ))
        })?;

        let view = version.schema.view(&source.id).ok_or_else(|| {
            ConnectorError::SchemaMismatch(format!("View '{}' not found in schema", source.id))
        })?;
        let record = version.schema.record(&source.meta.record).ok_or_else(|| {
            ConnectorError::SchemaMismatch(format!(
                "Record '{}' not found in schema",
                source.meta.record
            ))
        })?;

        Ok(ResolvedSchema {
            id: source.id.clone(),
            schema: SourceSchema::new(build_fields(record, view)?),
            meta: source.meta.clone(),
        })
    }

    #[instrument(skip(self, source, query), fields(connector = "ride_core", source = %source.name, seed = query.seed))]
    async fn get_source_data(&self, source: &Source, query: &DataQuery) -> ConnectorResult<SourceData> {
        let page = if query.seed {
            seed_page(self.read_seed(source, query).await?)
        } else {
            let rows: PlatformRows = serde_json::from_value(self.read_page(source, query).await?)?;
            format_response(rows)
        };

        let mut data = SourceData::new();
        data.insert(source.name.clone(), page);
        Ok(data)
    }

    #[instrument(skip(self, source, request), fields(connector = "ride_core", source = %source.name))]
    async fn change_source_data(
        &self,
        source: &Source,
        request: &ChangeRequest,
    ) -> ConnectorResult<Value> {
        let action = change_action(request);
        let payload = request.payload.clone().unwrap_or_default();
        let change = translate_payload(&payload, &source.schema).map_err(|err| {
            error!(action = %action, error = %err, "Payload does not match the source schema");
            err
        })?;

        let mut url = self.instances_url(Service::Write, source);
        if action.requires_identifier() {
            let id = instance_id(request, &payload).ok_or_else(|| {
                error!(action = %action, "Record instance id not found in params or payload");
                ConnectorError::MissingIdentifier("recordInstanceId".to_string())
            })?;
            url = format!("{}/{}", url, segment(&id));
        }

        info!(action = %action, "Changing source data");
        let builder = match action {
            ChangeAction::Create => self.client.request(Method::POST, &url).json(&change),
            ChangeAction::Update => self.client.request(Method::PATCH, &url).json(&change),
            ChangeAction::Delete => self.client.request(Method::DELETE, &url),
        };
        let response = self.client.send(builder).await?;

        Ok(Value::Object(merge_instance_id(&payload, &response)))
    }
}
