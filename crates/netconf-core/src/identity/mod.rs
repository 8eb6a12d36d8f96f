//! Node addressing
//!
//! [`ModelNodeId`] is the canonical key of every configuration node. It is
//! built from [`Rdn`] segments and ordered with [`natural_cmp`] on values.

pub mod natural;
pub mod node_id;
pub mod rdn;
pub mod scope;

pub use natural::natural_cmp;
pub use node_id::ModelNodeId;
pub use rdn::{Rdn, CONTAINER};
pub use scope::RequestScope;
