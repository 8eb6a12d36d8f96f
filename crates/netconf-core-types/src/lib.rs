//! Core types shared across the NETCONF configuration facilities
//!
//! - **Correlation types**: RequestId, TraceId, SessionId, RequestContext
//! - **Schema constants**: canonical log field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, SessionId, TraceId};
