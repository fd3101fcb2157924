use async_trait::async_trait;

use crate::error::LoaderResult;
use crate::resource::{GlobalSymbol, Resource};

/// The page environment resources are injected into.
#[async_trait]
pub trait ResourceHost: Send + Sync {
    /// Inject a resource and wait for its load or error event.
    async fn inject(&self, resource: &Resource) -> LoaderResult<()>;

    /// Whether the global symbol is defined right now.
    fn has_global(&self, symbol: &GlobalSymbol) -> bool;
}
