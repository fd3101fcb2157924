use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Script,
    /// A stylesheet `<link>`.
    Link,
}

/// A script or stylesheet to inject.
///
/// Accepts a bare URL (a script) or `{ "src": .., "type": "script" | "link" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ResourceRepr")]
pub struct Resource {
    pub src: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResourceRepr {
    Url(String),
    Object {
        src: String,
        #[serde(default, rename = "type")]
        kind: ResourceKind,
    },
}

impl From<ResourceRepr> for Resource {
    fn from(repr: ResourceRepr) -> Self {
        match repr {
            ResourceRepr::Url(src) => Resource::script(src),
            ResourceRepr::Object { src, kind } => Resource { src, kind },
        }
    }
}

impl Resource {
    pub fn script(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            kind: ResourceKind::Script,
        }
    }

    pub fn stylesheet(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            kind: ResourceKind::Link,
        }
    }

    pub fn is_script(&self) -> bool {
        self.kind == ResourceKind::Script
    }
}

/// Global a dependency group registers once loaded: `name` or
/// `root.member`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalSymbol {
    pub root: String,
    pub member: Option<String>,
}

impl GlobalSymbol {
    pub fn parse(name: &str) -> Self {
        match name.split_once('.') {
            Some((root, member)) => Self {
                root: root.to_string(),
                member: Some(member.to_string()),
            },
            None => Self {
                root: name.to_string(),
                member: None,
            },
        }
    }
}

impl fmt::Display for GlobalSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}.{}", self.root, member),
            None => f.write_str(&self.root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_from_url_is_script() {
        let resource: Resource = serde_json::from_value(json!("https://cdn.local/sdk.js")).unwrap();
        assert_eq!(resource, Resource::script("https://cdn.local/sdk.js"));
    }

    #[test]
    fn test_resource_object_forms() {
        let resources: Vec<Resource> = serde_json::from_value(json!([
            { "src": "https://cdn.local/a.js" },
            { "src": "https://cdn.local/b.js", "type": "script" },
            { "src": "https://cdn.local/c.css", "type": "link" }
        ]))
        .unwrap();

        assert!(resources[0].is_script());
        assert!(resources[1].is_script());
        assert_eq!(resources[2], Resource::stylesheet("https://cdn.local/c.css"));
    }

    #[test]
    fn test_global_symbol_parse() {
        let symbol = GlobalSymbol::parse("google.maps");
        assert_eq!(symbol.root, "google");
        assert_eq!(symbol.member.as_deref(), Some("maps"));
        assert_eq!(symbol.to_string(), "google.maps");

        assert_eq!(GlobalSymbol::parse("YT").member, None);
    }
}
