//! Element Variable Store
//!
//! Short-lived association between an editable element (by its generated
//! stable key) and the variable bindings last inserted into it, so a
//! deferred submit interception can still resolve them. Entries expire
//! after one hour; the sweep runs on every insert and lookup.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::VariableBinding;

/// Default entry lifetime
const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

struct StoreEntry {
    bindings: Vec<VariableBinding>,
    stored_at: Instant,
}

/// Page-session-scoped bindings cache
pub struct VariableStore {
    entries: Mutex<HashMap<String, StoreEntry>>,
    ttl: Duration,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Remember the bindings last inserted into an element
    pub fn remember(&self, element_key: &str, bindings: Vec<VariableBinding>) {
        let mut entries = self.entries.lock().unwrap();
        Self::sweep_expired(&mut entries, self.ttl);
        entries.insert(
            element_key.to_string(),
            StoreEntry {
                bindings,
                stored_at: Instant::now(),
            },
        );
    }

    /// Look up the bindings for an element, if still fresh
    pub fn recall(&self, element_key: &str) -> Option<Vec<VariableBinding>> {
        let mut entries = self.entries.lock().unwrap();
        Self::sweep_expired(&mut entries, self.ttl);
        entries.get(element_key).map(|e| e.bindings.clone())
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let mut entries = self.entries.lock().unwrap();
        Self::sweep_expired(&mut entries, self.ttl);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything, expired or not
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    fn sweep_expired(entries: &mut HashMap<String, StoreEntry>, ttl: Duration) {
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}
