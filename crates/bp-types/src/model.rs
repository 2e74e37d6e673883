use crate::{Configuration, StackId};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type Name = String;
/// Opaque pass-through `settings` entry.
pub type SettingsEntry = IndexMap<String, serde_json::Value>;

/// Host-group kind selected when a document does not name one.
pub const STANDARD_HOST_GROUP_KIND: &str = "standard";
/// Cardinality assigned by normalization when a host group omits it.
pub const DEFAULT_CARDINALITY: &str = "1+";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisionAction {
    InstallOnly,
    StartOnly,
    #[default]
    InstallAndStart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provision_action: Option<ProvisionAction>,
}

impl Component {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            provision_action: None,
        }
    }

    pub fn with_action(mut self, action: ProvisionAction) -> Self {
        self.provision_action = Some(action);
        self
    }

    /// Effective provision action; unset means install and start.
    pub fn provision_action(&self) -> ProvisionAction {
        self.provision_action.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroup {
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Host-count constraint such as `1` or `3+`. Kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    #[serde(
        default,
        rename = "configurations",
        skip_serializing_if = "Configuration::is_empty"
    )]
    pub configuration: Configuration,
}

impl HostGroup {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            cardinality: None,
            components: Vec::new(),
            configuration: Configuration::default(),
        }
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_cardinality(mut self, cardinality: impl Into<String>) -> Self {
        self.cardinality = Some(cardinality.into());
        self
    }

    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(STANDARD_HOST_GROUP_KIND)
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityType {
    #[default]
    None,
    Kerberos,
    Custom,
}

impl SecurityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityType::None => "NONE",
            SecurityType::Kerberos => "KERBEROS",
            SecurityType::Custom => "CUSTOM",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfiguration {
    #[serde(rename = "type", default)]
    pub security_type: SecurityType,
    #[serde(
        default,
        rename = "security_descriptor_reference",
        skip_serializing_if = "Option::is_none"
    )]
    pub descriptor_reference: Option<String>,
}

impl SecurityConfiguration {
    pub fn new(security_type: SecurityType, descriptor_reference: Option<String>) -> Self {
        Self {
            security_type,
            descriptor_reference,
        }
    }

    pub fn kerberos(descriptor_reference: impl Into<String>) -> Self {
        Self::new(SecurityType::Kerberos, Some(descriptor_reference.into()))
    }
}

/// Declarative cluster topology.
///
/// Stack references are held by value only; resolved stack metadata lives in
/// a separate resolved view and is never part of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    #[serde(rename = "blueprint_name", default, deserialize_with = "null_as_empty")]
    pub name: Name,
    #[serde(default, with = "stack_id_list")]
    pub stack_ids: IndexMap<String, StackId>,
    #[serde(default)]
    pub host_groups: Vec<HostGroup>,
    #[serde(
        default,
        rename = "configurations",
        skip_serializing_if = "Configuration::is_empty"
    )]
    pub configuration: Configuration,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub settings: Vec<SettingsEntry>,
    #[serde(default)]
    pub security: SecurityConfiguration,
}

impl Blueprint {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_stack(mut self, stack: StackId) -> Self {
        self.stack_ids.insert(stack.to_string(), stack);
        self
    }

    pub fn with_host_group(mut self, group: HostGroup) -> Self {
        self.host_groups.push(group);
        self
    }

    pub fn stack_ids(&self) -> impl Iterator<Item = &StackId> {
        self.stack_ids.values()
    }

    pub fn host_group(&self, name: &str) -> Option<&HostGroup> {
        self.host_groups.iter().find(|g| g.name == name)
    }

    /// Blueprint-level configuration overlaid with the named host group's own.
    pub fn effective_configuration(&self, host_group: &str) -> Option<Configuration> {
        let group = self.host_group(host_group)?;
        Some(self.configuration.merged_with(&group.configuration))
    }

    /// Attaches an externally produced security configuration. Only valid
    /// while the blueprint is still being constructed.
    pub fn set_security(&mut self, security: SecurityConfiguration) {
        self.security = security;
    }
}

/// A `null` name is treated like an absent one so normalization reports it.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Name, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Name>::deserialize(deserializer)?.unwrap_or_default())
}

mod stack_id_list {
    use super::*;

    pub fn serialize<S>(ids: &IndexMap<String, StackId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(ids.values())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<IndexMap<String, StackId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ids = Vec::<StackId>::deserialize(deserializer)?;
        Ok(ids.into_iter().map(|id| (id.to_string(), id)).collect())
    }
}
