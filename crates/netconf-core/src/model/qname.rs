use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace-qualified YANG node name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QName {
    pub namespace: String,
    pub name: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Check name and namespace against a raw (name, namespace) pair
    ///
    /// An empty namespace on either side matches any namespace, the way a
    /// filter element without `xmlns` does.
    pub fn matches(&self, namespace: &str, name: &str) -> bool {
        self.name == name
            && (self.namespace.is_empty() || namespace.is_empty() || self.namespace == namespace)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}", self.namespace, self.name)
    }
}

/// Schema location of a node: the container names from the root, without
/// list key values
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaPath(Vec<QName>);

impl SchemaPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_qnames(qnames: Vec<QName>) -> Self {
        Self(qnames)
    }

    /// Path one level deeper
    pub fn child(&self, qname: QName) -> Self {
        let mut steps = self.0.clone();
        steps.push(qname);
        Self(steps)
    }

    pub fn parent(&self) -> Option<SchemaPath> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn steps(&self) -> &[QName] {
        &self.0
    }

    pub fn last(&self) -> Option<&QName> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `prefix` is an ancestor-or-self of this path
    pub fn begins_with(&self, prefix: &SchemaPath) -> bool {
        prefix.0.len() <= self.0.len() && self.0.iter().zip(prefix.0.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for step in &self.0 {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}
