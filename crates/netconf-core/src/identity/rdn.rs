use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::QName;

/// Rdn name marking a structural hop; the Rdn value is the container name
pub const CONTAINER: &str = "container";

/// Relative distinguished name: one addressing segment of a [`ModelNodeId`]
///
/// Ordering is by name, then namespace, then value, all lexical.
///
/// [`ModelNodeId`]: super::ModelNodeId
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rdn {
    name: String,
    namespace: String,
    value: String,
}

impl Rdn {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            value: value.into(),
        }
    }

    /// Hop into the container or list named `container_name`
    pub fn container(namespace: impl Into<String>, container_name: impl Into<String>) -> Self {
        Self::new(CONTAINER, namespace, container_name)
    }

    /// One key of a list entry
    pub fn key(
        namespace: impl Into<String>,
        key_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(key_name, namespace, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_container(&self) -> bool {
        self.name == CONTAINER
    }

    /// Same name and namespace, value ignored
    pub fn same_kind(&self, other: &Rdn) -> bool {
        self.name == other.name && self.namespace == other.namespace
    }

    /// QName of the node this Rdn names: the container for a structural hop,
    /// the key leaf otherwise
    pub fn qname(&self) -> QName {
        if self.is_container() {
            QName::new(self.namespace.clone(), self.value.clone())
        } else {
            QName::new(self.namespace.clone(), self.name.clone())
        }
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
