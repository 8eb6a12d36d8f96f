//! Subtree filters: construction, normalization and evaluation

pub mod algorithm;
pub mod eval;
pub mod node;

pub use algorithm::{build_filter, merge_into, node_id_to_filter, process_filter, reduce_filter};
pub use eval::apply_filter;
pub use node::{FilterMatchNode, FilterNode};
