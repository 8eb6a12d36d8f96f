//! Canonical schema constants for structured logging
//!
//! These constants keep field names identical across every log site.

// Canonical field keys
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_MESSAGE_ID: &str = "message_id";

// NETCONF identifiers
pub const FIELD_SESSION_ID: &str = "session_id";
pub const FIELD_DATASTORE: &str = "datastore";
pub const FIELD_SUBSYSTEM: &str = "subsystem";
pub const FIELD_NODE_ID: &str = "node_id";

// Collection sizes
pub const FIELD_NOTIFICATION_COUNT: &str = "notification_count";
pub const FIELD_DERIVED_DEPTH: &str = "derived_depth";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";
pub const FIELD_ERR_TAG: &str = "err.tag";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
