//! Northbound (client-facing) config-change notifications

pub mod helper;
pub mod types;

pub use helper::{fallback_prefix, NbiNotificationHelper, PrefixResolver, StaticPrefixResolver};
pub use types::{ChangedBy, ChangedLeafInfo, EditInfo, NetconfConfigChange};
