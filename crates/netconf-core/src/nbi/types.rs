use chrono::{DateTime, Utc};
use netconf_core_types::SessionId;
use serde::{Deserialize, Serialize};

use crate::edit::EditOperation;
use crate::errors::Result;
use crate::model::{ClientInfo, DatastoreName};

/// `changed-by` of a config-change notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChangedBy {
    pub session_id: SessionId,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_host: Option<String>,
}

impl From<&ClientInfo> for ChangedBy {
    fn from(client: &ClientInfo) -> Self {
        Self {
            session_id: client.session_id,
            username: client.username.clone(),
            source_host: client.source_host.clone(),
        }
    }
}

/// Leaf changed as part of one edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedLeafInfo {
    pub name: String,
    pub value: String,
    pub namespace: String,
    pub prefix: String,
}

/// One `edit` entry: a target path and what happened there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EditInfo {
    /// Prefixed instance identifier, e.g. `/jbox:jukebox/jbox:library`
    pub target: String,
    pub operation: EditOperation,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changed_leaves: Vec<ChangedLeafInfo>,
}

/// `netconf-config-change` (RFC 6470)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetconfConfigChange {
    pub changed_by: ChangedBy,
    pub datastore: DatastoreName,
    #[serde(rename = "edit")]
    pub edits: Vec<EditInfo>,
    pub event_time: DateTime<Utc>,
}

impl NetconfConfigChange {
    /// Render as RFC 6470 JSON
    ///
    /// # Errors
    ///
    /// `Serialization` if serde_json fails to render the notification.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
