pub mod error;
pub mod options;

pub use error::ConfigError;
pub use options::*;

use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, info};

/// Configuration of every connector and the dependency loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChameleonConfig {
    #[serde(default)]
    pub rest: Option<RestOptions>,
    #[serde(default)]
    pub ride_core: Option<RideCoreOptions>,
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl ChameleonConfig {
    /// Load from `CHAMELEON_CONFIG_PATH` when it is set, otherwise from the
    /// environment (after reading `.env`).
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        match env::var("CHAMELEON_CONFIG_PATH") {
            Ok(path) if !path.trim().is_empty() => Self::from_path(&path),
            _ => Self::from_env(),
        }
    }

    /// Read a JSON config file.
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;

        config.validate()?;
        info!(path = %path, "Loaded connector configuration from file");
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let rest = var("CHAMELEON_REST_ENDPOINT").map(|endpoint| RestOptions {
            endpoint,
            auth: BasicAuth {
                username: var("CHAMELEON_REST_USERNAME"),
                password: var("CHAMELEON_REST_PASSWORD"),
            },
        });

        let ride_core = Self::ride_core_from_env()?;

        let mut loader = LoaderConfig::default();
        if let Some(bundle) = var("CHAMELEON_BUNDLE") {
            loader.bundle = bundle;
        }
        if let Some(interval) = var("CHAMELEON_DEPENDENCY_POLL_MS") {
            loader.poll_interval_ms = interval.parse().map_err(|_| ConfigError::Invalid {
                field: "CHAMELEON_DEPENDENCY_POLL_MS".to_string(),
                reason: format!("'{}' is not a number of milliseconds", interval),
            })?;
        }

        let config = Self {
            rest,
            ride_core,
            loader,
        };
        config.validate()?;

        debug!(
            rest = config.rest.is_some(),
            ride_core = config.ride_core.is_some(),
            bundle = %config.loader.bundle,
            "Loaded connector configuration from environment"
        );
        Ok(config)
    }

    // Ride Core is optional, but once any of its variables is set all of
    // the endpoints and the space are required.
    fn ride_core_from_env() -> Result<Option<RideCoreOptions>, ConfigError> {
        const REQUIRED: [&str; 4] = [
            "CHAMELEON_RIDE_CORE_READ_URL",
            "CHAMELEON_RIDE_CORE_WRITE_URL",
            "CHAMELEON_RIDE_CORE_BLUEPRINT_URL",
            "CHAMELEON_RIDE_CORE_SPACE",
        ];

        if REQUIRED.iter().all(|name| var(name).is_none()) {
            return Ok(None);
        }

        let required = |name: &str| var(name).ok_or_else(|| ConfigError::Missing(name.to_string()));
        let endpoint = RideCoreEndpoints {
            read: required("CHAMELEON_RIDE_CORE_READ_URL")?,
            write: required("CHAMELEON_RIDE_CORE_WRITE_URL")?,
            blueprint: required("CHAMELEON_RIDE_CORE_BLUEPRINT_URL")?,
        };
        let space = required("CHAMELEON_RIDE_CORE_SPACE")?;

        Ok(Some(RideCoreOptions {
            endpoint,
            space,
            auth: BasicAuth {
                username: var("CHAMELEON_RIDE_CORE_USERNAME"),
                password: var("CHAMELEON_RIDE_CORE_PASSWORD"),
            },
        }))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rest) = &self.rest {
            rest.validate()?;
        }
        if let Some(ride_core) = &self.ride_core {
            ride_core.validate()?;
        }
        if self.loader.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "loader.poll_interval_ms".to_string(),
                reason: "interval must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ALL_VARS: [&str; 11] = [
        "CHAMELEON_REST_ENDPOINT",
        "CHAMELEON_REST_USERNAME",
        "CHAMELEON_REST_PASSWORD",
        "CHAMELEON_RIDE_CORE_READ_URL",
        "CHAMELEON_RIDE_CORE_WRITE_URL",
        "CHAMELEON_RIDE_CORE_BLUEPRINT_URL",
        "CHAMELEON_RIDE_CORE_SPACE",
        "CHAMELEON_RIDE_CORE_USERNAME",
        "CHAMELEON_RIDE_CORE_PASSWORD",
        "CHAMELEON_BUNDLE",
        "CHAMELEON_DEPENDENCY_POLL_MS",
    ];

    fn clear_env() {
        for name in ALL_VARS {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();

        let config = ChameleonConfig::from_env().unwrap();
        assert!(config.rest.is_none());
        assert!(config.ride_core.is_none());
        assert_eq!(config.loader, LoaderConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_both_connectors() {
        clear_env();
        env::set_var("CHAMELEON_REST_ENDPOINT", "http://rest.local");
        env::set_var("CHAMELEON_REST_USERNAME", "admin");
        env::set_var("CHAMELEON_REST_PASSWORD", "secret");
        env::set_var("CHAMELEON_RIDE_CORE_READ_URL", "http://read.local");
        env::set_var("CHAMELEON_RIDE_CORE_WRITE_URL", "http://write.local");
        env::set_var("CHAMELEON_RIDE_CORE_BLUEPRINT_URL", "http://blueprint.local");
        env::set_var("CHAMELEON_RIDE_CORE_SPACE", "space-1");
        env::set_var("CHAMELEON_DEPENDENCY_POLL_MS", "50");

        let config = ChameleonConfig::from_env().unwrap();
        clear_env();

        let rest = config.rest.unwrap();
        assert_eq!(rest.auth.credentials(), Some(("admin", "secret")));

        let ride_core = config.ride_core.unwrap();
        assert_eq!(ride_core.endpoint.write, "http://write.local");
        assert_eq!(ride_core.space, "space-1");
        assert!(ride_core.auth.credentials().is_none());
        assert_eq!(config.loader.poll_interval_ms, 50);
    }

    #[test]
    #[serial]
    fn test_partial_ride_core_env_is_an_error() {
        clear_env();
        env::set_var("CHAMELEON_RIDE_CORE_READ_URL", "http://read.local");

        let result = ChameleonConfig::from_env();
        clear_env();

        assert!(matches!(result, Err(ConfigError::Missing(name)) if name == "CHAMELEON_RIDE_CORE_WRITE_URL"));
    }

    #[test]
    fn test_from_path_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "ride_core": {{
                    "endpoint": {{
                        "read": "http://ride.local",
                        "write": "http://ride.local",
                        "blueprint": "http://ride.local"
                    }},
                    "space": "space-1"
                }},
                "loader": {{ "bundle": "vue" }}
            }}"#
        )
        .unwrap();

        let config = ChameleonConfig::from_path(file.path().to_str().unwrap()).unwrap();
        assert!(config.rest.is_none());
        assert_eq!(config.ride_core.unwrap().space, "space-1");
        assert_eq!(config.loader.bundle, "vue");
        assert_eq!(config.loader.poll_interval_ms, 100);
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = ChameleonConfig::from_path("/nonexistent/chameleon.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
