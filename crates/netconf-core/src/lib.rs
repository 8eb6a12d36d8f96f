//! NETCONF Core - configuration datastore kernel
//!
//! This crate provides the datastore side of a NETCONF server:
//! - Node identities (`ModelNodeId`) with natural ordering and prefix tests
//! - Edit trees and edit-config requests
//! - RFC 6241 subtree filters: normalization and evaluation
//! - The `DataStore` orchestrator: locking, recursive edit with derived
//!   edits, pre/post-commit subsystem notifications, get and copy-config
//! - Notification refinement per subsystem
//! - RFC 6470 config-change projection for northbound clients
//!
//! Parsing requests off the wire and schema handling live elsewhere; this
//! crate works on already-built trees.

pub mod config;
pub mod datastore;
pub mod edit;
pub mod errors;
pub mod filter;
pub mod identity;
pub mod logging_facility;
pub mod model;
pub mod nbi;
pub mod notification;
pub mod subsystem;
pub mod tree;

// Re-export commonly used types
pub use config::DataStoreConfig;
pub use datastore::{CopySource, DataStore, EditValidator, LockState, TransactionService};
pub use edit::{EditConfigRequest, EditOperation, EditTree};
pub use errors::{ErrorKind, ErrorTag, NetconfError, Result, RpcError};
pub use filter::FilterNode;
pub use identity::{ModelNodeId, Rdn, RequestScope};
pub use model::{ClientInfo, ConfigElement, DatastoreName, QName, SchemaPath};
pub use nbi::NetconfConfigChange;
pub use notification::ChangeNotification;
pub use subsystem::SubSystem;
pub use tree::{InMemoryModelTree, ModelTree};
