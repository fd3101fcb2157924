//! Reconciliation of saved sources against the platform's current views.
//!
//! A saved source whose view vanished is disabled, never dropped. Sources
//! that vanished or whose schema version drifted are checked against the
//! installed schema versions in one batched lookup; everything else is
//! left as it was.

use chameleon_models::{SavedSources, Source, ViewModel};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::schema::SchemaVersion;

/// Saved sources with their availability flags refreshed, waiting for the
/// installed-version lookup of the stale ones.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    sources: Vec<Source>,
    /// Indices into `sources` that need the installed-version lookup.
    stale: Vec<usize>,
    missing_versions: IndexSet<String>,
}

/// Compare saved sources with the freshly fetched catalog.
pub fn reconcile(saved: &SavedSources, catalog: &IndexMap<String, ViewModel>) -> Reconciliation {
    let mut sources = Vec::with_capacity(saved.len());
    let mut stale = Vec::new();
    let mut missing_versions = IndexSet::new();

    for saved_source in saved.values() {
        let mut source = saved_source.clone();
        let current = catalog.get(&source.id);
        let version_changed = current
            .map(|view| view.meta.schema_version != source.meta.schema_version)
            .unwrap_or(true);

        source.disabled = current.is_none();

        if version_changed && current.is_some() {
            source.meta.schema_versions = vec![saved_source.meta.snapshot()];
        }

        if version_changed {
            debug!(
                source = %source.id,
                version = %source.meta.schema_version,
                disabled = source.disabled,
                "Source needs installed version check"
            );
            missing_versions.insert(source.meta.schema_version.clone());
            stale.push(sources.len());
        }

        sources.push(source);
    }

    Reconciliation {
        sources,
        stale,
        missing_versions,
    }
}

impl Reconciliation {
    /// Deduplicated schema versions to look up, in first-seen order.
    pub fn missing_versions(&self) -> Vec<String> {
        self.missing_versions.iter().cloned().collect()
    }

    pub fn needs_lookup(&self) -> bool {
        !self.missing_versions.is_empty()
    }

    /// Sources as they stand without the lookup.
    pub fn into_sources(self) -> Vec<Source> {
        self.sources
    }

    /// Mark each stale source installed when its schema version is
    /// installed and still contains its view, taking the installed tag.
    pub fn apply_installed(self, installed: &[SchemaVersion]) -> Vec<Source> {
        let Reconciliation {
            mut sources, stale, ..
        } = self;

        for index in stale {
            let Some(source) = sources.get_mut(index) else {
                continue;
            };

            let version = installed
                .iter()
                .find(|version| version.version_id == source.meta.schema_version);
            let has_view = version
                .map(|version| version.schema.view(&source.id).is_some())
                .unwrap_or(false);

            source.installed = Some(has_view);
            if let (true, Some(version)) = (has_view, version) {
                source.meta.schema_tag = version.version_tag.clone();
            }
        }

        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chameleon_models::{SchemaVersionSnapshot, SourceMeta};
    use serde_json::json;

    fn source(id: &str, version: &str) -> Source {
        Source::new(id, id).with_meta(SourceMeta {
            data_package: "dp1".to_string(),
            record: "r1".to_string(),
            schema_version: version.to_string(),
            schema_tag: Some(format!("tag-{}", version)),
            ..Default::default()
        })
    }

    fn view(id: &str, version: &str) -> ViewModel {
        ViewModel {
            id: id.to_string(),
            name: id.to_string(),
            model: id.to_string(),
            meta: SourceMeta {
                schema_version: version.to_string(),
                schema_tag: Some(format!("tag-{}", version)),
                ..Default::default()
            },
        }
    }

    fn saved(sources: Vec<Source>) -> SavedSources {
        sources.into_iter().map(|s| (s.id.clone(), s)).collect()
    }

    fn catalog(views: Vec<ViewModel>) -> IndexMap<String, ViewModel> {
        views.into_iter().map(|v| (v.id.clone(), v)).collect()
    }

    fn installed(version: &str, tag: &str, views: &[&str]) -> SchemaVersion {
        let views: Vec<_> = views.iter().map(|id| json!({ "id": id, "fields": [] })).collect();
        serde_json::from_value(json!({
            "versionId": version,
            "versionTag": tag,
            "schema": { "records": [], "views": views }
        }))
        .unwrap()
    }

    #[test]
    fn test_unchanged_sources_need_no_lookup() {
        let result = reconcile(
            &saved(vec![source("a", "v1"), source("b", "v1")]),
            &catalog(vec![view("a", "v1"), view("b", "v1")]),
        );

        assert!(!result.needs_lookup());
        let sources = result.into_sources();
        assert!(sources.iter().all(|s| !s.disabled && s.installed.is_none()));
        assert!(sources.iter().all(|s| s.meta.schema_versions.is_empty()));
    }

    #[test]
    fn test_vanished_sources_are_disabled_and_versions_deduplicated() {
        let result = reconcile(
            &saved(vec![source("a", "v1"), source("b", "v1"), source("c", "v2")]),
            &catalog(vec![]),
        );

        assert_eq!(result.missing_versions(), vec!["v1".to_string(), "v2".to_string()]);
        let sources = result.into_sources();
        assert_eq!(sources.len(), 3);
        assert!(sources.iter().all(|s| s.disabled));
        assert!(sources.iter().all(|s| s.meta.schema_versions.is_empty()));
    }

    #[test]
    fn test_changed_version_records_single_prior_snapshot() {
        let mut old = source("a", "v1");
        old.meta.schema_versions = vec![
            SchemaVersionSnapshot {
                schema_version: "v0".to_string(),
                schema_tag: None,
            },
            SchemaVersionSnapshot {
                schema_version: "v00".to_string(),
                schema_tag: None,
            },
        ];

        let result = reconcile(&saved(vec![old]), &catalog(vec![view("a", "v2")]));
        assert_eq!(result.missing_versions(), vec!["v1".to_string()]);

        let sources = result.into_sources();
        assert!(!sources[0].disabled);
        assert_eq!(
            sources[0].meta.schema_versions,
            vec![SchemaVersionSnapshot {
                schema_version: "v1".to_string(),
                schema_tag: Some("tag-v1".to_string()),
            }]
        );
    }

    #[test]
    fn test_apply_installed_only_touches_stale_sources() {
        let mut fresh = source("fresh", "v1");
        fresh.installed = Some(false);

        let result = reconcile(
            &saved(vec![fresh, source("gone", "v1"), source("moved", "v3"), source("lost", "v4")]),
            &catalog(vec![view("fresh", "v1"), view("moved", "v5")]),
        );

        let sources = result.apply_installed(&[
            installed("v1", "1.0-final", &["gone"]),
            installed("v3", "3.0", &["other"]),
        ]);

        assert_eq!(sources[0].installed, Some(false));
        assert_eq!(sources[0].meta.schema_tag.as_deref(), Some("tag-v1"));

        assert!(sources[1].disabled);
        assert_eq!(sources[1].installed, Some(true));
        assert_eq!(sources[1].meta.schema_tag.as_deref(), Some("1.0-final"));

        assert!(!sources[2].disabled);
        assert_eq!(sources[2].installed, Some(false));
        assert_eq!(sources[2].meta.schema_tag.as_deref(), Some("tag-v3"));

        assert_eq!(sources[3].installed, Some(false));
    }

    #[test]
    fn test_saved_map_is_not_mutated() {
        let saved_sources = saved(vec![source("a", "v1")]);
        let _ = reconcile(&saved_sources, &catalog(vec![]));
        assert!(!saved_sources["a"].disabled);
    }
}
