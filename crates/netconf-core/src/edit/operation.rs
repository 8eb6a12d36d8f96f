use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{NetconfError, Result};
use crate::model::{LeafValue, QName};

/// `operation` attribute of an edit-config node (RFC 6241 §7.2)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOperation {
    #[default]
    Merge,
    Replace,
    Create,
    Delete,
    Remove,
}

impl EditOperation {
    /// # Errors
    ///
    /// Returns `InvalidEditRequest` for anything but the five RFC values.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "merge" => Ok(EditOperation::Merge),
            "replace" => Ok(EditOperation::Replace),
            "create" => Ok(EditOperation::Create),
            "delete" => Ok(EditOperation::Delete),
            "remove" => Ok(EditOperation::Remove),
            other => Err(NetconfError::InvalidEditRequest {
                reason: format!("unknown operation '{}'", other),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EditOperation::Merge => "merge",
            EditOperation::Replace => "replace",
            EditOperation::Create => "create",
            EditOperation::Delete => "delete",
            EditOperation::Remove => "remove",
        }
    }

    /// Operations whose effect hides the node's previous content
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            EditOperation::Delete | EditOperation::Remove | EditOperation::Replace
        )
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `insert` attribute for ordered-by-user leaf-lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertDirective {
    First,
    Last,
    Before(String),
    After(String),
}

/// Origin of a leaf change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeSource {
    /// Sent by the client
    #[default]
    User,
    /// Added by the server, e.g. default population
    System,
}

/// Leaf change inside an edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditChangeNode {
    pub qname: QName,
    pub value: LeafValue,
    pub operation: EditOperation,
    pub insert: Option<InsertDirective>,
    pub provenance: ChangeSource,
}

impl EditChangeNode {
    /// User-sourced merge of `value` into the leaf `qname`
    pub fn new(qname: QName, value: impl Into<LeafValue>) -> Self {
        Self {
            qname,
            value: value.into(),
            operation: EditOperation::Merge,
            insert: None,
            provenance: ChangeSource::User,
        }
    }

    pub fn with_operation(mut self, operation: EditOperation) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_insert(mut self, insert: InsertDirective) -> Self {
        self.insert = Some(insert);
        self
    }

    pub fn with_provenance(mut self, provenance: ChangeSource) -> Self {
        self.provenance = provenance;
        self
    }

    pub fn is_user_change(&self) -> bool {
        self.provenance == ChangeSource::User
    }
}

/// Key leaf selecting one list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditMatchNode {
    pub qname: QName,
    pub value: LeafValue,
}

impl EditMatchNode {
    pub fn new(qname: QName, value: impl Into<LeafValue>) -> Self {
        Self {
            qname,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operations() {
        for op in ["merge", "replace", "create", "delete", "remove"] {
            assert_eq!(EditOperation::parse(op).unwrap().as_str(), op);
        }
        assert!(EditOperation::parse("patch").is_err());
    }

    #[test]
    fn test_destructive_operations() {
        assert!(EditOperation::Delete.is_destructive());
        assert!(EditOperation::Replace.is_destructive());
        assert!(!EditOperation::Create.is_destructive());
        assert!(!EditOperation::Merge.is_destructive());
    }
}
