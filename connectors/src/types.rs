use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ConnectorError;

/// Represents the type of connector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorType {
    /// Generic REST backend exposing `/sources`.
    Rest,
    /// Ride Core metadata platform.
    RideCore,
}

impl ConnectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorType::Rest => "rest",
            ConnectorType::RideCore => "ride_core",
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectorType {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "rest" => Ok(ConnectorType::Rest),
            "ride_core" | "ridecore" => Ok(ConnectorType::RideCore),
            other => Err(ConnectorError::InvalidConfiguration(format!(
                "Unknown connector type '{}'",
                other
            ))),
        }
    }
}
