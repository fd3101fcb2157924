use chameleon_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Identifier field '{0}' not found in params")]
    MissingIdentifier(String),

    #[error("Unsupported change action: {0}")]
    UnsupportedAction(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ConnectorError {
    /// Errors raised locally, before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConnectorError::MissingIdentifier(_)
                | ConnectorError::UnsupportedAction(_)
                | ConnectorError::InvalidPayload(_)
        )
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        ConnectorError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::SerializationError(err.to_string())
    }
}

impl From<ConfigError> for ConnectorError {
    fn from(err: ConfigError) -> Self {
        ConnectorError::InvalidConfiguration(err.to_string())
    }
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;
