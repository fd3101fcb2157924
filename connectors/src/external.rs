//! Connector for generic REST backends.
//!
//! Sources map onto a conventional resource layout:
//! `GET/POST {endpoint}/sources/:name`, `PUT/DELETE {endpoint}/sources/:name/:id`
//! and `GET {endpoint}/sources/:name/schema`.

use async_trait::async_trait;
use chameleon_config::RestOptions;
use chameleon_models::{
    ChangeAction, ChangeRequest, ClientPagination, DataQuery, ResolvedSchema, SavedSources,
    Source, SourceData, SourceListing, SourcePage, SourceSchema, SourcesQuery,
};
use reqwest::Method;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::error::{ConnectorError, ConnectorResult};
use crate::http::{join_url, segment, ApiClient, QueryParams};
use crate::params::sort_param;
use crate::traits::Connector;
use crate::types::ConnectorType;

/// Stateless CRUD connector against a `/sources` REST API.
pub struct RestConnector {
    name: String,
    options: RestOptions,
    sources: SavedSources,
    client: ApiClient,
}

impl std::fmt::Debug for RestConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConnector")
            .field("options", &self.options)
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl RestConnector {
    pub fn new(options: RestOptions) -> ConnectorResult<Self> {
        options.validate()?;
        let client = ApiClient::new(&options.auth)?;

        Ok(Self {
            name: format!("REST: {}", options.endpoint),
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

    fn url(&self, path: &str) -> String {
        join_url(&self.options.endpoint, path)
    }

    fn source_url(&self, source: &Source) -> String {
        self.url(&format!("/sources/{}", segment(&source.name)))
    }

    /// Value of the source's identifier field in the request params.
    fn identifier(source: &Source, request: &ChangeRequest) -> ConnectorResult<String> {
        let name = source.schema.identifier.as_deref().unwrap_or_default();
        let value = if name.is_empty() { None } else { request.param(name) };

        match value {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(other) => Ok(other.to_string()),
            None => {
                error!(source = %source.name, identifier = %name, "Identifier field not found in params");
                Err(ConnectorError::MissingIdentifier(name.to_string()))
            }
        }
    }

    async fn create(&self, source: &Source, request: &ChangeRequest) -> ConnectorResult<Value> {
        let builder = self
            .client
            .request(Method::POST, &self.source_url(source))
            .json(&request.payload);
        self.client.send(builder).await
    }

    async fn update(&self, source: &Source, request: &ChangeRequest) -> ConnectorResult<Value> {
        let identifier = Self::identifier(source, request)?;
        let url = format!("{}/{}", self.source_url(source), segment(&identifier));
        let builder = self
            .client
            .request(Method::PUT, &url)
            .json(&request.payload);
        self.client.send(builder).await
    }

    async fn delete(&self, source: &Source, request: &ChangeRequest) -> ConnectorResult<Value> {
        let identifier = Self::identifier(source, request)?;
        let url = format!("{}/{}", self.source_url(source), segment(&identifier));
        self.client
            .send(self.client.request(Method::DELETE, &url))
            .await
    }
}

/// Query parameters understood by REST backends.
pub fn api_params(pagination: &ClientPagination) -> QueryParams {
    let mut params = QueryParams::new();

    if let Some(sort_by) = &pagination.sort_by {
        params.push((
            "sort".to_string(),
            sort_param(pagination.sort.as_deref(), sort_by.id()),
        ));
    }
    if let Some(limit) = pagination.limit.or(pagination.page_size) {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(page) = pagination.resolved_page() {
        params.push(("page".to_string(), page.to_string()));
    }
    if let Some(search) = pagination.search.as_deref().filter(|s| !s.is_empty()) {
        params.push(("search".to_string(), search.to_string()));
    }

    params
}

/// Bring a REST data response into the canonical page shape.
///
/// A bare array is the row list; an object carries its rows under `data`
/// or `items` next to optional `metadata` and `pagination`.
pub fn page_from_body(body: Value) -> SourcePage {
    match body {
        Value::Array(items) => SourcePage {
            items,
            ..Default::default()
        },
        Value::Object(mut object) => {
            let items = match object.remove("data").or_else(|| object.remove("items")) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            SourcePage {
                items,
                metadata: object.remove("metadata"),
                pagination: object.remove("pagination"),
            }
        }
        _ => SourcePage::default(),
    }
}

#[async_trait]
impl Connector for RestConnector {
    fn name(&self) -> &str {
        &self.name
    }

    fn connector_type(&self) -> ConnectorType {
        ConnectorType::Rest
    }

    fn saved_sources(&self) -> &SavedSources {
        &self.sources
    }

    #[instrument(skip(self), fields(connector = "rest"))]
    async fn get_sources(&self, query: &SourcesQuery) -> ConnectorResult<SourceListing> {
        if query.saved_only {
            return Ok(SourceListing::Saved(self.sources.values().cloned().collect()));
        }

        let body = self
            .client
            .send(self.client.request(Method::GET, &self.url("/sources")))
            .await?;

        match body {
            Value::Object(mut object) => match object.remove("sources") {
                Some(Value::Array(sources)) => {
                    info!(count = sources.len(), "Fetched REST sources");
                    Ok(SourceListing::Remote(sources))
                }
                _ => Err(ConnectorError::SerializationError(
                    "Response has no 'sources' array".to_string(),
                )),
            },
            _ => Err(ConnectorError::SerializationError(
                "Expected an object with a 'sources' array".to_string(),
            )),
        }
    }

    #[instrument(skip(self, source), fields(connector = "rest", source = %source.name))]
    async fn get_source_schema(&self, source: &Source) -> ConnectorResult<ResolvedSchema> {
        let url = format!("{}/schema", self.source_url(source));
        let schema: SourceSchema = self.client.get_json(&url, &QueryParams::new()).await?;

        Ok(ResolvedSchema {
            id: source.id.clone(),
            schema,
            meta: source.meta.clone(),
        })
    }

    #[instrument(skip(self, source, query), fields(connector = "rest", source = %source.name))]
    async fn get_source_data(&self, source: &Source, query: &DataQuery) -> ConnectorResult<SourceData> {
        let params = query
            .params
            .pagination
            .as_ref()
            .map(api_params)
            .unwrap_or_default();

        let body = self
            .client
            .send(
                self.client
                    .request(Method::GET, &self.source_url(source))
                    .query(&params),
            )
            .await?;

        let mut data = SourceData::new();
        data.insert(source.name.clone(), page_from_body(body));
        Ok(data)
    }

    #[instrument(skip(self, source, request), fields(connector = "rest", source = %source.name))]
    async fn change_source_data(
        &self,
        source: &Source,
        request: &ChangeRequest,
    ) -> ConnectorResult<Value> {
        let keyword = request.action.as_deref().unwrap_or_default();
        let action = ChangeAction::from_keyword(keyword).ok_or_else(|| {
            error!(action = %keyword, "Undefined REST change action");
            ConnectorError::UnsupportedAction(keyword.to_string())
        })?;

        info!(action = %action, "Changing source data");
        match action {
            ChangeAction::Create => self.create(source, request).await,
            ChangeAction::Update => self.update(source, request).await,
            ChangeAction::Delete => self.delete(source, request).await,
        }
    }
}
