//! Layered configuration property bags.
//!
//! A [`Configuration`] holds properties grouped by config type (`core-site`,
//! `hdfs-site`, ...) plus optional per-property attributes. Blueprints carry
//! one at blueprint level and one per host group; the effective view for a
//! host group is [`Configuration::merged_with`] applied on demand, never
//! during decode or encode.
//!
//! Wire form is a list of single-entry objects:
//!
//! ```json
//! [{"core-site": {"properties": {"fs.defaultFS": "hdfs://nn:8020"},
//!                 "properties_attributes": {"final": {"fs.defaultFS": "true"}}}}]
//! ```
//!
//! Note that `properties_attributes` is keyed by attribute name first on the
//! wire, while the in-memory form is keyed by property first.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type PropertyMap = IndexMap<String, String>;
/// property key -> (attribute name -> attribute value)
pub type AttributeMap = IndexMap<String, IndexMap<String, String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    properties: IndexMap<String, PropertyMap>,
    attributes: IndexMap<String, AttributeMap>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.attributes.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyMap> {
        &self.properties
    }

    pub fn attributes(&self) -> &IndexMap<String, AttributeMap> {
        &self.attributes
    }

    pub fn group(&self, group: &str) -> Option<&PropertyMap> {
        self.properties.get(group)
    }

    pub fn property(&self, group: &str, key: &str) -> Option<&str> {
        self.properties.get(group)?.get(key).map(String::as_str)
    }

    pub fn attribute(&self, group: &str, key: &str, attribute: &str) -> Option<&str> {
        self.attributes
            .get(group)?
            .get(key)?
            .get(attribute)
            .map(String::as_str)
    }

    pub fn set_property(
        &mut self,
        group: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.properties
            .entry(group.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn set_attribute(
        &mut self,
        group: impl Into<String>,
        key: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) {
        let group = group.into();
        // every attributed group also owns a (possibly empty) property bag
        self.properties.entry(group.clone()).or_default();
        self.attributes
            .entry(group)
            .or_default()
            .entry(key.into())
            .or_default()
            .insert(attribute.into(), value.into());
    }

    /// Layers `overrides` on top of `self`.
    ///
    /// For every (group, key) the override value wins when present, otherwise
    /// the value from `self` is kept. Attributes merge at (group, key,
    /// attribute) granularity.
    pub fn merged_with(&self, overrides: &Configuration) -> Configuration {
        let mut merged = self.clone();
        for (group, props) in &overrides.properties {
            let target = merged.properties.entry(group.clone()).or_default();
            for (key, value) in props {
                target.insert(key.clone(), value.clone());
            }
        }
        for (group, attrs) in &overrides.attributes {
            let target = merged.attributes.entry(group.clone()).or_default();
            for (key, by_name) in attrs {
                let slot = target.entry(key.clone()).or_default();
                for (name, value) in by_name {
                    slot.insert(name.clone(), value.clone());
                }
            }
        }
        merged
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigTypeEntry {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, PropertyValue>,
    /// attribute name -> (property key -> value)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties_attributes: IndexMap<String, IndexMap<String, PropertyValue>>,
}

/// Property values are strings, but documents written by hand often carry
/// bare numbers or booleans; those are accepted and kept in string form.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PropertyValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl PropertyValue {
    fn into_string(self) -> String {
        match self {
            PropertyValue::Text(s) => s,
            PropertyValue::Number(n) => n.to_string(),
            PropertyValue::Bool(b) => b.to_string(),
        }
    }
}

impl Serialize for Configuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut entries: Vec<IndexMap<&str, ConfigTypeEntry>> =
            Vec::with_capacity(self.properties.len());
        for (group, props) in &self.properties {
            let mut entry = ConfigTypeEntry {
                properties: props
                    .iter()
                    .map(|(k, v)| (k.clone(), PropertyValue::Text(v.clone())))
                    .collect(),
                properties_attributes: IndexMap::new(),
            };
            if let Some(attrs) = self.attributes.get(group) {
                for (key, by_name) in attrs {
                    for (name, value) in by_name {
                        entry
                            .properties_attributes
                            .entry(name.clone())
                            .or_default()
                            .insert(key.clone(), PropertyValue::Text(value.clone()));
                    }
                }
            }
            entries.push(IndexMap::from([(group.as_str(), entry)]));
        }
        entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Configuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<IndexMap<String, ConfigTypeEntry>>::deserialize(deserializer)?;
        let mut config = Configuration::default();
        for entry in entries {
            for (group, body) in entry {
                let props = config.properties.entry(group.clone()).or_default();
                for (key, value) in body.properties {
                    props.insert(key, value.into_string());
                }
                for (name, by_key) in body.properties_attributes {
                    for (key, value) in by_key {
                        config
                            .attributes
                            .entry(group.clone())
                            .or_default()
                            .entry(key)
                            .or_default()
                            .insert(name.clone(), value.into_string());
                    }
                }
            }
        }
        Ok(config)
    }
}
