use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    #[error("invalid stack id '{value}': expected <name>-<version>")]
    InvalidStackId { value: String },
}

/// Identifies a software stack by name and version (`HDP-3.0`).
///
/// The wire form is split at the first `-`, so versions may themselves
/// contain dashes (`HDP-3.0-beta` is name `HDP`, version `3.0-beta`) while
/// names may not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackId {
    name: String,
    version: String,
}

impl StackId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self, RefError> {
        let name = name.into();
        let version = version.into();
        if is_valid_part(&name) && !name.contains('-') && is_valid_part(&version) {
            Ok(StackId { name, version })
        } else {
            Err(RefError::InvalidStackId {
                value: format!("{name}-{version}"),
            })
        }
    }

    pub fn parse(value: &str) -> Result<Self, RefError> {
        let (name, version) = value.split_once('-').ok_or_else(|| RefError::InvalidStackId {
            value: value.to_string(),
        })?;
        if !is_valid_part(name) || !is_valid_part(version) {
            return Err(RefError::InvalidStackId {
                value: value.to_string(),
            });
        }
        Ok(StackId {
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

impl Serialize for StackId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StackId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        StackId::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for StackId {
    type Err = RefError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StackId::parse(s)
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && !part.chars().any(char::is_whitespace)
}
