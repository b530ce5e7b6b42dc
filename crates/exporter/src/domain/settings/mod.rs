//! Untyped index settings documents.
//!
//! The cluster returns settings as loosely-typed nested JSON. It is converted
//! once into [`SettingsNode`] so lookups are exhaustive matches instead of
//! runtime type probing.

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;

pub mod coerce;
pub mod path;

pub use coerce::coerce;
pub use coerce::CoercionError;
pub use path::resolve;
pub use path::Resolved;
pub use path::SettingsPath;

/// One node of a settings document.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsNode {
    Map(BTreeMap<String, SettingsNode>),
    List(Vec<SettingsNode>),
    String(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl SettingsNode {
    /// Child node under `key`, if this is a map containing it.
    pub fn get(&self, key: &str) -> Option<&SettingsNode> {
        match self {
            SettingsNode::Map(children) => children.get(key),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, SettingsNode::Map(_))
    }

    /// Short type name used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SettingsNode::Map(_) => "map",
            SettingsNode::List(_) => "list",
            SettingsNode::String(_) => "string",
            SettingsNode::Number(_) => "number",
            SettingsNode::Bool(_) => "bool",
            SettingsNode::Null => "null",
        }
    }
}

impl From<Value> for SettingsNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => SettingsNode::Map(
                map.into_iter()
                    .map(|(key, child)| (key, SettingsNode::from(child)))
                    .collect(),
            ),
            Value::Array(items) => {
                SettingsNode::List(items.into_iter().map(SettingsNode::from).collect())
            }
            Value::String(s) => SettingsNode::String(s),
            Value::Number(n) => n.as_f64().map_or(SettingsNode::Null, SettingsNode::Number),
            Value::Bool(b) => SettingsNode::Bool(b),
            Value::Null => SettingsNode::Null,
        }
    }
}

/// Settings documents of one scrape, keyed by index name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsCorpus(BTreeMap<String, SettingsNode>);

impl SettingsCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: impl Into<String>, document: SettingsNode) {
        self.0.insert(index.into(), document);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingsNode)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for SettingsCorpus {
    fn from(raw: Map<String, Value>) -> Self {
        raw.into_iter()
            .map(|(index, document)| (index, SettingsNode::from(document)))
            .collect()
    }
}

impl FromIterator<(String, SettingsNode)> for SettingsCorpus {
    fn from_iter<I: IntoIterator<Item = (String, SettingsNode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
