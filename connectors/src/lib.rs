//! # Chameleon connectors
//!
//! Data connectors behind the toolkit's data-bound components. Each
//! connector maps the generic source/query model onto one backend:
//!
//! - [`RestConnector`]: plain CRUD against a `/sources/:name` REST API.
//! - [`RideCoreConnector`]: the Ride Core metadata platform, including
//!   reconciliation of saved sources against the platform's current views.
//!
//! ## Example
//!
//! ```ignore
//! use chameleon_connectors::{Connector, RideCoreConnector};
//! use chameleon_config::RideCoreOptions;
//! use chameleon_models::SourcesQuery;
//!
//! let connector = RideCoreConnector::new(RideCoreOptions::single_host(base, "space-1"))?
//!     .with_sources(saved);
//! let listing = connector.get_sources(&SourcesQuery::saved()).await?;
//! ```

pub mod error;
pub mod external;
pub mod http;
pub mod internal;
pub mod manager;
pub mod params;
pub mod traits;
pub mod types;

pub use error::{ConnectorError, ConnectorResult};
pub use external::RestConnector;
pub use internal::RideCoreConnector;
pub use manager::ConnectorManager;
pub use params::sort_prefix;
pub use traits::Connector;
pub use types::ConnectorType;
