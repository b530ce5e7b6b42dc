//! Dotted-path lookup with ordered fallbacks.

use std::fmt;

use super::SettingsNode;

/// A dotted path such as `settings.index.mapping.total_fields.limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPath {
    raw: String,
    segments: Vec<String>,
}

impl SettingsPath {
    pub fn new(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = raw.split('.').map(str::to_string).collect();
        Self { raw, segments }
    }

    /// `field` nested under the top-level subtree `root`.
    pub fn under(root: &str, field: &str) -> Self {
        Self::new(format!("{root}.{field}"))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Walks `doc` segment by segment; every intermediate node must be a map.
    pub fn lookup<'a>(&self, doc: &'a SettingsNode) -> Option<&'a SettingsNode> {
        self.segments
            .iter()
            .try_fold(doc, |node, segment| match node {
                SettingsNode::Map(children) => children.get(segment),
                _ => None,
            })
    }
}

impl fmt::Display for SettingsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A value found by [`resolve`] and the candidate that matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a> {
    pub path: &'a SettingsPath,
    pub value: &'a SettingsNode,
}

/// Returns the value at the first candidate path that resolves in `doc`.
///
/// `None` means the field is absent for this document, which is not an error.
pub fn resolve<'a>(doc: &'a SettingsNode, candidates: &'a [SettingsPath]) -> Option<Resolved<'a>> {
    candidates.iter().find_map(|path| {
        path.lookup(doc).map(|value| Resolved { path, value })
    })
}
