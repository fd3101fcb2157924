use chameleon_config::LoaderConfig;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{LoaderError, LoaderResult};
use crate::host::ResourceHost;
use crate::registry::DependencyRegistry;
use crate::resource::{GlobalSymbol, Resource};

/// Loads dependency groups through a [`ResourceHost`], once per registry.
#[derive(Clone)]
pub struct DependencyLoader {
    host: Arc<dyn ResourceHost>,
    registry: DependencyRegistry,
    poll_interval: Duration,
}

impl DependencyLoader {
    pub fn new(host: Arc<dyn ResourceHost>, registry: DependencyRegistry) -> Self {
        Self {
            host,
            registry,
            poll_interval: Duration::from_millis(100),
        }
    }

    pub fn from_config(host: Arc<dyn ResourceHost>, config: &LoaderConfig) -> Self {
        Self::new(host, DependencyRegistry::for_bundle(&config.bundle))
            .with_poll_interval(Duration::from_millis(config.poll_interval_ms))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn registry(&self) -> &DependencyRegistry {
        &self.registry
    }

    /// Resolve once every resource is loaded and the group's global symbol
    /// is defined. `group` names that symbol (`name` or `root.member`).
    ///
    /// The first caller for a group injects its resources; later callers
    /// wait for the symbol. Waiting has no timeout.
    pub async fn load_dependencies(&self, sources: &[Resource], group: &str) -> LoaderResult<()> {
        let symbol = GlobalSymbol::parse(group);

        if self.registry.begin(group) {
            info!(
                namespace = %self.registry.namespace(),
                group = %group,
                resources = sources.len(),
                "Loading dependency group"
            );
            try_join_all(
                sources
                    .iter()
                    .map(|resource| self.load_resource(resource, &symbol, group)),
            )
            .await?;
            self.registry.set_loading(group, false);
            return Ok(());
        }

        if self.host.has_global(&symbol) {
            self.registry.set_loading(group, false);
            return Ok(());
        }

        debug!(group = %group, "Dependency group already requested, waiting for its global");
        self.wait_for_global(&symbol, group).await
    }

    async fn load_resource(&self, resource: &Resource, symbol: &GlobalSymbol, group: &str) -> LoaderResult<()> {
        if let Err(err) = self.host.inject(resource).await {
            warn!(group = %group, src = %resource.src, error = %err, "Dependency rejected");
            self.registry.reject(group);
            return Err(LoaderError::Rejected {
                group: group.to_string(),
            });
        }

        if !resource.is_script() || self.host.has_global(symbol) {
            return Ok(());
        }
        // Loaded scripts may register their global later.
        self.wait_for_global(symbol, group).await
    }

    async fn wait_for_global(&self, symbol: &GlobalSymbol, group: &str) -> LoaderResult<()> {
        let mut interval = tokio::time::interval(self.poll_interval);

        loop {
            interval.tick().await;

            if self.host.has_global(symbol) {
                self.registry.set_loading(group, false);
                return Ok(());
            }
            if self.registry.is_rejected(group) {
                return Err(LoaderError::Rejected {
                    group: group.to_string(),
                });
            }
        }
    }
}
