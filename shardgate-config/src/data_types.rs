use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Algorithm property value.
///
/// Properties come from free-form `props` tables, so any TOML scalar is accepted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum Property {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl Property {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::String(s) => s.trim().parse().ok(),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Property {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Property {
    fn from(value: i32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<bool> for Property {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Property {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Algorithm properties, e.g. `props = { sharding-count = 4 }`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, Property>);

impl Properties {
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.0.get(key)
    }

    /// Property rendered as a string.
    pub fn string(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|p| p.to_string())
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(|p| p.as_i64())
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(|p| p.as_bool())
    }

    pub fn insert(&mut self, key: impl ToString, value: impl Into<Property>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Property)> {
        self.0.iter()
    }
}

impl<K: ToString, V: Into<Property>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}
