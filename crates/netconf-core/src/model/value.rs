use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed value of a YANG leaf
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum LeafValue {
    String(String),
    Int(i64),
    Uint(u64),
    Boolean(bool),
    /// decimal64 kept in its canonical lexical form
    Decimal(String),
    /// `type empty`
    Empty,
    /// identityref with the identity's own namespace
    IdentityRef { namespace: String, identity: String },
}

impl LeafValue {
    pub fn string(value: impl Into<String>) -> Self {
        LeafValue::String(value.into())
    }

    /// Short YANG type label used in outward notifications
    pub fn type_name(&self) -> &'static str {
        match self {
            LeafValue::String(_) => "string",
            LeafValue::Int(_) => "int64",
            LeafValue::Uint(_) => "uint64",
            LeafValue::Boolean(_) => "boolean",
            LeafValue::Decimal(_) => "decimal64",
            LeafValue::Empty => "empty",
            LeafValue::IdentityRef { .. } => "identityref",
        }
    }

    /// Lexical form as it appears in element text
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafValue::String(s) | LeafValue::Decimal(s) => write!(f, "{}", s),
            LeafValue::Int(i) => write!(f, "{}", i),
            LeafValue::Uint(u) => write!(f, "{}", u),
            LeafValue::Boolean(b) => write!(f, "{}", b),
            LeafValue::Empty => Ok(()),
            LeafValue::IdentityRef { identity, .. } => write!(f, "{}", identity),
        }
    }
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        LeafValue::String(value.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(value: String) -> Self {
        LeafValue::String(value)
    }
}

impl From<i64> for LeafValue {
    fn from(value: i64) -> Self {
        LeafValue::Int(value)
    }
}

impl From<u64> for LeafValue {
    fn from(value: u64) -> Self {
        LeafValue::Uint(value)
    }
}

impl From<bool> for LeafValue {
    fn from(value: bool) -> Self {
        LeafValue::Boolean(value)
    }
}
