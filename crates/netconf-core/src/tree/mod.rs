//! The model tree a datastore edits
//!
//! [`ModelTree`] is the storage-side collaborator of
//! [`DataStore`](crate::datastore::DataStore). [`InMemoryModelTree`] is a
//! plain in-process implementation with checkpoint/rollback transactions.

pub mod memory;

pub use memory::InMemoryModelTree;

use std::sync::Arc;

use crate::edit::{EditConfigRequest, EditTree};
use crate::errors::Result;
use crate::filter::FilterNode;
use crate::identity::ModelNodeId;
use crate::model::{ClientInfo, ConfigElement, QueryParams, SchemaPath};
use crate::notification::NotificationContext;
use crate::subsystem::{StateAttributeRequest, SubSystem};

/// Result of applying one edit-config request
#[derive(Debug, Clone, Default)]
pub struct EditOutcome {
    /// One materialized diff per edited root, based at the root's parent
    pub diffs: Vec<EditTree>,
    /// Every touched node, child-first
    pub context: NotificationContext,
}

/// Node whose state attributes a `get` must fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLocation {
    pub node_id: ModelNodeId,
    pub request: StateAttributeRequest,
}

pub trait ModelTree: Send {
    /// Apply `request`, returning what actually changed
    ///
    /// # Errors
    ///
    /// `Validation` errors (`data-exists`, `data-missing`) for operations
    /// the current content does not allow. The tree may be partially
    /// modified; callers run this inside a transaction.
    fn edit_config(
        &mut self,
        request: &EditConfigRequest,
        client: &ClientInfo,
    ) -> Result<EditOutcome>;

    /// Configuration, filtered and depth-limited
    ///
    /// # Errors
    ///
    /// Storage failures.
    fn get_config(
        &self,
        filter: Option<&FilterNode>,
        params: &QueryParams,
    ) -> Result<Vec<ConfigElement>>;

    /// Replace the whole configuration, returning the new root identities
    ///
    /// # Errors
    ///
    /// Storage failures or elements that cannot be stored.
    fn copy_config(&mut self, elements: &[ConfigElement]) -> Result<Vec<ModelNodeId>>;

    fn subsystem_for(&self, path: &SchemaPath) -> Option<Arc<dyn SubSystem>>;

    /// Nodes carrying state attributes that `filter` asks for
    fn state_locations(&self, filter: Option<&FilterNode>) -> Vec<StateLocation>;

    /// # Errors
    ///
    /// Fails if a transaction is already open.
    fn begin_transaction(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// Fails if no transaction is open.
    fn commit_transaction(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// Fails if no transaction is open.
    fn rollback_transaction(&mut self) -> Result<()>;
}
