use netconf_core_types::SessionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::NetconfError;

/// Who issued a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub session_id: SessionId,
    pub username: String,
    /// Peer address, when the transport knows it
    pub source_host: Option<String>,
}

impl ClientInfo {
    pub fn new(session_id: SessionId, username: impl Into<String>) -> Self {
        Self {
            session_id,
            username: username.into(),
            source_host: None,
        }
    }

    pub fn with_source_host(mut self, host: impl Into<String>) -> Self {
        self.source_host = Some(host.into());
        self
    }

    /// The server acting on its own behalf
    pub fn system() -> Self {
        Self::new(SessionId::SYSTEM, "system")
    }
}

/// Configuration datastores (RFC 6241 §5.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatastoreName {
    Running,
    Candidate,
    Startup,
}

impl DatastoreName {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatastoreName::Running => "running",
            DatastoreName::Candidate => "candidate",
            DatastoreName::Startup => "startup",
        }
    }
}

impl fmt::Display for DatastoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatastoreName {
    type Err = NetconfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(DatastoreName::Running),
            "candidate" => Ok(DatastoreName::Candidate),
            "startup" => Ok(DatastoreName::Startup),
            other => Err(NetconfError::InvalidEditRequest {
                reason: format!("unknown datastore '{}'", other),
            }),
        }
    }
}

/// Retrieval options shared by `get` and `get-config`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// Maximum element depth returned; `None` means unbounded
    pub depth: Option<usize>,
}

impl QueryParams {
    pub fn with_depth(depth: usize) -> Self {
        Self { depth: Some(depth) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datastore_name_parse() {
        assert_eq!("candidate".parse::<DatastoreName>().unwrap(), DatastoreName::Candidate);
        assert!("scratch".parse::<DatastoreName>().is_err());
        assert_eq!(DatastoreName::Running.to_string(), "running");
    }

    #[test]
    fn test_system_client() {
        assert!(ClientInfo::system().session_id.is_system());
    }
}
