//! HTTP plumbing shared by the connectors.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chameleon_config::BasicAuth;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ConnectorError, ConnectorResult};

/// Query string pairs; list values are already comma-joined.
pub type QueryParams = Vec<(String, String)>;

/// `Authorization` header value, only when both username and password are set.
pub fn basic_auth_header(auth: &BasicAuth) -> Option<String> {
    auth.credentials().map(|(username, password)| {
        let encoded = STANDARD.encode(format!("{}:{}", username, password));
        format!("Basic {}", encoded)
    })
}

/// Join a base URL and a path without doubling or dropping slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Percent-encode a single path segment.
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// reqwest client carrying the connector's credentials.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    authorization: Option<String>,
}

impl ApiClient {
    pub fn new(auth: &BasicAuth) -> ConnectorResult<Self> {
        let client = Client::builder().build().map_err(|e| {
            ConnectorError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            authorization: basic_auth_header(auth),
        })
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(method = %method, url = %url, "Sending request");
        let builder = self.client.request(method, url);
        match &self.authorization {
            Some(value) => builder.header(header::AUTHORIZATION, value),
            None => builder,
        }
    }

    /// Send a request and decode its JSON body; an empty body decodes as null.
    pub async fn send(&self, builder: RequestBuilder) -> ConnectorResult<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().to_string();

        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, "Request failed");
            return Err(ConnectorError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &QueryParams) -> ConnectorResult<T> {
        let body = self.send(self.request(Method::GET, url).query(query)).await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        // admin:secret
        assert_eq!(
            basic_auth_header(&BasicAuth::new("admin", "secret")).as_deref(),
            Some("Basic YWRtaW46c2VjcmV0")
        );
        assert_eq!(basic_auth_header(&BasicAuth::default()), None);
        assert_eq!(
            basic_auth_header(&BasicAuth {
                username: Some("admin".to_string()),
                password: None,
            }),
            None
        );
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://api.local/", "/sources"), "http://api.local/sources");
        assert_eq!(join_url("http://api.local/v1", "sources/users"), "http://api.local/v1/sources/users");
    }

    #[test]
    fn test_segment_encodes_spaces() {
        assert_eq!(segment("my source"), "my%20source");
    }
}
