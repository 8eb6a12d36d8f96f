//! Canonical logging macros
//!
//! Every public datastore operation logs exactly one start event and one
//! end (or end_error) event through these macros.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use netconf_core::log_op_start;
/// log_op_start!("lock");
/// log_op_start!("edit_config", datastore = "running");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = netconf_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = netconf_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use netconf_core::log_op_end;
/// log_op_end!("lock", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = netconf_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = netconf_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// The error tag is the one of the first `<rpc-error>` the failure renders to.
///
/// # Example
///
/// ```
/// # use netconf_core::{log_op_error, errors::NetconfError};
/// let err = NetconfError::InvalidEditRequest { reason: "empty".to_string() };
/// log_op_error!("edit_config", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let nc_err: $crate::errors::NetconfError = $err.into();
        let err_tag = $crate::errors::RpcError::from(nc_err.clone()).error_tag();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = netconf_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?nc_err.kind(),
            err.code = nc_err.code(),
            err.tag = err_tag.as_str(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let nc_err: $crate::errors::NetconfError = $err.into();
        let err_tag = $crate::errors::RpcError::from(nc_err.clone()).error_tag();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = netconf_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?nc_err.kind(),
            err.code = nc_err.code(),
            err.tag = err_tag.as_str(),
            $($field)*
        );
    }};
}
