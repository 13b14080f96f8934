use serde::{Deserialize, Deserializer, Serialize};

/// One recorded operation, `from` -> `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeLog {
    entries: Vec<ChangeEntry>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let entry = ChangeEntry {
            from: from.into(),
            to: to.into(),
        };
        tracing::debug!("{} -> {}", entry.from, entry.to);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A table of contents loaded from the data directory.
///
/// ```yaml
/// bigheader: "Concepts"
/// abstract: "Detailed explanations of Kubernetes system concepts and abstractions."
/// toc:
/// - docs/concepts/index.md
/// - title: Overview
///   section:
///   - docs/concepts/overview/what-is-kubernetes.md
///   - title: Working with Kubernetes Objects
///     section:
///     - docs/concepts/overview/working-with-objects/kubernetes-objects.md
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Outline {
    #[serde(default)]
    pub bigheader: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub landing_page: String,
    #[serde(default)]
    pub toc: Vec<TocEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TocEntry {
    Page(String),
    Group(TocGroup),
    /// Anything else found in the outline; reported and skipped.
    Other(serde_yaml::Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TocGroup {
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub title: String,
    #[serde(default)]
    pub landing_page: String,
    #[serde(default)]
    pub section: Vec<TocEntry>,
}

/// Hand-written outlines use bare years or numbers as titles (`title: 2015`).
fn scalar_to_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("title must be a scalar, got {:?}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_outline() {
        let yaml = r#"
bigheader: "Concepts"
abstract: "Detailed explanations."
landing_page: "/docs/concepts/overview/what-is-kubernetes/"
toc:
- docs/concepts/index.md
- title: Overview
  landing_page: /docs/concepts/overview/
  section:
  - docs/concepts/overview/what-is-kubernetes.md
  - title: Objects
    section:
    - docs/concepts/overview/working-with-objects/labels.md
- 42
"#;
        let outline: Outline = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(outline.bigheader, "Concepts");
        assert_eq!(outline.abstract_text, "Detailed explanations.");
        assert_eq!(outline.toc.len(), 3);

        assert!(matches!(&outline.toc[0], TocEntry::Page(p) if p == "docs/concepts/index.md"));
        match &outline.toc[1] {
            TocEntry::Group(group) => {
                assert_eq!(group.title, "Overview");
                assert_eq!(group.section.len(), 2);
                assert!(matches!(&group.section[1], TocEntry::Group(g) if g.title == "Objects"));
            }
            other => panic!("expected group, got {:?}", other),
        }
        assert!(matches!(&outline.toc[2], TocEntry::Other(_)));
    }

    #[test]
    fn test_scalar_group_titles() {
        let yaml = r#"
toc:
- title: 2015
  section:
  - docs/v1/a.md
- title: true
- title:
  section: []
- title: [nested]
"#;
        let outline: Outline = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(&outline.toc[0], TocEntry::Group(g) if g.title == "2015" && g.section.len() == 1));
        assert!(matches!(&outline.toc[1], TocEntry::Group(g) if g.title == "true"));
        assert!(matches!(&outline.toc[2], TocEntry::Group(g) if g.title.is_empty()));
        assert!(matches!(&outline.toc[3], TocEntry::Other(_)));
    }

    #[test]
    fn test_change_log_keeps_order() {
        let mut log = ChangeLog::new();
        log.record("/a", "/b");
        log.record("/c", "/d");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[1].from, "/c");
    }
}
