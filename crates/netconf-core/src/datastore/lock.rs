use netconf_core_types::SessionId;

/// Datastore lock (RFC 6241 §7.5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    #[default]
    Unlocked,
    LockedBy(SessionId),
}

impl LockState {
    pub fn owner(&self) -> Option<SessionId> {
        match self {
            LockState::Unlocked => None,
            LockState::LockedBy(owner) => Some(*owner),
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::LockedBy(_))
    }

    /// Owner other than `session`, if any
    pub fn held_by_other(&self, session: SessionId) -> Option<SessionId> {
        self.owner().filter(|owner| *owner != session)
    }
}
