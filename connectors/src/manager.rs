use chameleon_config::ChameleonConfig;
use chameleon_models::Source;
use tracing::info;

use super::error::{ConnectorError, ConnectorResult};
use super::external::RestConnector;
use super::internal::RideCoreConnector;
use super::traits::Connector;
use super::types::ConnectorType;

/// Builds connectors from configuration so a host can pick one by type.
pub struct ConnectorManager {
    config: ChameleonConfig,
}

impl ConnectorManager {
    pub fn new(config: ChameleonConfig) -> Self {
        Self { config }
    }

    /// Connector types with configuration present.
    pub fn available_connectors(&self) -> Vec<ConnectorType> {
        let mut available = Vec::new();
        if self.config.rest.is_some() {
            available.push(ConnectorType::Rest);
        }
        if self.config.ride_core.is_some() {
            available.push(ConnectorType::RideCore);
        }
        available
    }

    /// Create a connector of the given type holding `sources` as its saved
    /// sources.
    pub fn build_connector(
        &self,
        connector_type: ConnectorType,
        sources: Vec<Source>,
    ) -> ConnectorResult<Box<dyn Connector>> {
        let not_configured = || {
            ConnectorError::InvalidConfiguration(format!(
                "Connector type {} is not configured",
                connector_type
            ))
        };

        let connector: Box<dyn Connector> = match connector_type {
            ConnectorType::Rest => {
                let options = self.config.rest.clone().ok_or_else(not_configured)?;
                Box::new(RestConnector::new(options)?.with_sources(sources))
            }
            ConnectorType::RideCore => {
                let options = self.config.ride_core.clone().ok_or_else(not_configured)?;
                Box::new(RideCoreConnector::new(options)?.with_sources(sources))
            }
        };

        info!(
            connector = %connector.name(),
            saved = connector.saved_sources().len(),
            "Built connector"
        );
        Ok(connector)
    }
}
