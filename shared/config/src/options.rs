use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Optional basic-auth credentials for a backend.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Username and password, only when both are configured and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((username, password))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Options of the generic REST connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestOptions {
    /// Base URL; sources live under `{endpoint}/sources`.
    pub endpoint: String,
    #[serde(default)]
    pub auth: BasicAuth,
}

impl RestOptions {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth: BasicAuth::default(),
        }
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = BasicAuth::new(username, password);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("rest.endpoint", &self.endpoint)
    }
}

/// Service endpoints of the Ride Core platform, one per purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideCoreEndpoints {
    pub read: String,
    pub write: String,
    pub blueprint: String,
}

/// Which Ride Core service a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Read,
    Write,
    Blueprint,
}

/// Options of the Ride Core connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideCoreOptions {
    pub endpoint: RideCoreEndpoints,
    pub space: String,
    #[serde(default)]
    pub auth: BasicAuth,
}

impl RideCoreOptions {
    pub fn new(endpoint: RideCoreEndpoints, space: impl Into<String>) -> Self {
        Self {
            endpoint,
            space: space.into(),
            auth: BasicAuth::default(),
        }
    }

    /// All three services behind one base URL; handy for local setups.
    pub fn single_host(base: &str, space: impl Into<String>) -> Self {
        Self::new(
            RideCoreEndpoints {
                read: base.to_string(),
                write: base.to_string(),
                blueprint: base.to_string(),
            },
            space,
        )
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = BasicAuth::new(username, password);
        self
    }

    pub fn service_url(&self, service: Service) -> &str {
        match service {
            Service::Read => &self.endpoint.read,
            Service::Write => &self.endpoint.write,
            Service::Blueprint => &self.endpoint.blueprint,
        }
    }

    /// `{service}/spaces/{space}`, the root of every space-scoped call.
    pub fn space_url(&self, service: Service) -> String {
        format!(
            "{}/spaces/{}",
            self.service_url(service).trim_end_matches('/'),
            urlencoding::encode(&self.space)
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("ride_core.endpoint.read", &self.endpoint.read)?;
        validate_url("ride_core.endpoint.write", &self.endpoint.write)?;
        validate_url("ride_core.endpoint.blueprint", &self.endpoint.blueprint)?;
        if self.space.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "ride_core.space".to_string(),
                reason: "space must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Settings of the dependency loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Bundle name the dependency flags are namespaced under.
    #[serde(default = "default_bundle")]
    pub bundle: String,
    /// Interval between checks for a dependency's global symbol.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_bundle() -> String {
    "material".to_string()
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            bundle: default_bundle(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_both_parts() {
        assert!(BasicAuth::default().credentials().is_none());
        assert!(BasicAuth {
            username: Some("admin".to_string()),
            password: None,
        }
        .credentials()
        .is_none());
        assert!(BasicAuth::new("admin", "").credentials().is_none());
        assert_eq!(BasicAuth::new("admin", "secret").credentials(), Some(("admin", "secret")));
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", BasicAuth::new("admin", "secret"));
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_space_url_trims_trailing_slash() {
        let options = RideCoreOptions::single_host("http://ride.local/api/", "space-1");
        assert_eq!(
            options.space_url(Service::Blueprint),
            "http://ride.local/api/spaces/space-1"
        );
    }

    #[test]
    fn test_space_url_encodes_space() {
        let options = RideCoreOptions::single_host("http://ride.local", "team space/1");
        assert_eq!(
            options.space_url(Service::Read),
            "http://ride.local/spaces/team%20space%2F1"
        );
    }

    #[test]
    fn test_validate_rejects_bad_urls_and_blank_space() {
        assert!(RestOptions::new("not a url").validate().is_err());
        assert!(RestOptions::new("http://localhost:8080").validate().is_ok());
        assert!(RideCoreOptions::single_host("http://ride.local", " ").validate().is_err());
    }
}
