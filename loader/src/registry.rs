use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Load state of one dependency group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyState {
    pub loading: bool,
    pub rejected: bool,
}

/// Per-bundle record of dependency groups that have been requested.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct DependencyRegistry {
    namespace: String,
    groups: Arc<RwLock<HashMap<String, DependencyState>>>,
}

impl DependencyRegistry {
    pub fn for_bundle(bundle: &str) -> Self {
        Self {
            namespace: format!("__CHAMELEON_{}_DEPS__", bundle.to_uppercase()),
            groups: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn state(&self, group: &str) -> Option<DependencyState> {
        self.groups.read().get(group).copied()
    }

    /// Claim a group for loading. Returns false when the group was already
    /// requested.
    pub fn begin(&self, group: &str) -> bool {
        let mut groups = self.groups.write();
        if groups.contains_key(group) {
            return false;
        }
        groups.insert(
            group.to_string(),
            DependencyState {
                loading: true,
                rejected: false,
            },
        );
        true
    }

    pub fn set_loading(&self, group: &str, loading: bool) {
        self.groups.write().entry(group.to_string()).or_default().loading = loading;
    }

    pub fn reject(&self, group: &str) {
        self.groups.write().entry(group.to_string()).or_default().rejected = true;
    }

    pub fn is_rejected(&self, group: &str) -> bool {
        self.state(group).map(|state| state.rejected).unwrap_or(false)
    }
}

impl Default for DependencyRegistry {
    fn default() -> Self {
        Self::for_bundle("material")
    }
}
