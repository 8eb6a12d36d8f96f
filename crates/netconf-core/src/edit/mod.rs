//! Edit trees and edit-config requests

pub mod operation;
pub mod request;
pub mod tree;

pub use operation::{
    ChangeSource, EditChangeNode, EditMatchNode, EditOperation, InsertDirective,
};
pub use request::{DefaultOperation, EditConfigRequest, ErrorOption, TestOption};
pub use tree::{EditContainmentNode, EditNodeId, EditTree};
