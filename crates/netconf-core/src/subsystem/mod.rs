//! Subsystems: the business-logic owners of schema subtrees
//!
//! A subsystem is told about configuration changes below the schema
//! locations it is registered for, and answers state-attribute queries for
//! them.

pub mod registry;

pub use registry::SubSystemRegistry;

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::filter::FilterNode;
use crate::identity::ModelNodeId;
use crate::model::{ConfigElement, QName, QueryParams};
use crate::notification::ChangeNotification;

/// State data asked of a subsystem for one node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateAttributeRequest {
    /// State leaves wanted; empty means all of them
    pub leaves: Vec<QName>,
    /// Filters for nested state containers
    pub filters: Vec<FilterNode>,
}

/// Owner of one or more schema subtrees
pub trait SubSystem: Send + Sync {
    /// Stable identifier, used to group notifications
    fn id(&self) -> &str;

    /// Veto point before the transaction commits
    ///
    /// # Errors
    ///
    /// An error rejects the whole edit. Return `Validation` errors to report
    /// a veto; anything else is treated as an infrastructure failure.
    fn notify_pre_commit_change(&self, _changes: &[ChangeNotification]) -> Result<()> {
        Ok(())
    }

    /// Delivery after commit
    ///
    /// # Errors
    ///
    /// Errors are logged by the caller and otherwise ignored.
    fn notify_changed(&self, _changes: &[ChangeNotification]) -> Result<()> {
        Ok(())
    }

    /// State elements to append under each requested node
    ///
    /// # Errors
    ///
    /// An error fails the enclosing `get`.
    fn retrieve_state_attributes(
        &self,
        _requests: &BTreeMap<ModelNodeId, StateAttributeRequest>,
        _params: &QueryParams,
    ) -> Result<BTreeMap<ModelNodeId, Vec<ConfigElement>>> {
        Ok(BTreeMap::new())
    }
}
