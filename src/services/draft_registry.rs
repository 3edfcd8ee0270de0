use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::internal::draft::UserDraft;

/// Keyed in-flight edit state: one draft per target user id.
///
/// Entries are created lazily when an edit begins and discarded on commit or
/// cancel, so edit panels open against different rows can never share (or
/// corrupt) each other's draft.
#[derive(Debug, Default)]
pub struct DraftRegistry {
    drafts: RwLock<HashMap<String, UserDraft>>,
}

impl DraftRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the draft for a target user, replacing any earlier one.
    pub fn insert(&self, user_id: &str, draft: UserDraft) {
        self.write().insert(user_id.to_string(), draft);
    }

    /// Current draft for a target user, if an edit is in flight.
    pub fn get(&self, user_id: &str) -> Option<UserDraft> {
        self.read().get(user_id).cloned()
    }

    /// Discard the draft for a target user. Returns the draft if one existed;
    /// discarding an absent draft is a harmless no-op.
    pub fn remove(&self, user_id: &str) -> Option<UserDraft> {
        self.write().remove(user_id)
    }

    pub fn is_editing(&self, user_id: &str) -> bool {
        self.read().contains_key(user_id)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, UserDraft>> {
        match self.drafts.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, UserDraft>> {
        match self.drafts.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
