//! Structured logging for datastore operations
//!
//! - One initialization point via `init(profile)`
//! - Boundary macros (`log_op_start!`, `log_op_end!`, `log_op_error!`) used
//!   only by public datastore operations; lower layers log at debug/warn
//! - Test capture mode for deterministic assertions
//!
//! ```rust
//! use netconf_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{default_directive, init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
