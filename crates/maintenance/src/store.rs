//! Set of maintenances currently suppressing alerts.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use silencer_core::MaintenanceIdentity;

/// Capability the orchestrator uses to record which windows are active.
///
/// Every call is atomic with respect to the others; readers never observe a
/// half-applied mutation. `add` and `delete` are idempotent.
pub trait ActiveMaintenanceStore: Send + Sync {
    fn add(&self, identity: MaintenanceIdentity);
    fn delete(&self, identity: &MaintenanceIdentity);
    fn is_active(&self, identity: &MaintenanceIdentity) -> bool;
}

/// In-process store guarded by a read-write lock.
#[derive(Debug, Default)]
pub struct InMemoryActiveStore {
    items: RwLock<HashSet<MaintenanceIdentity>>,
}

impl InMemoryActiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// A poisoned lock still holds a consistent set: every mutation is a single
// insert/remove call, so recovering the guard is safe.
impl ActiveMaintenanceStore for InMemoryActiveStore {
    fn add(&self, identity: MaintenanceIdentity) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identity);
    }

    fn delete(&self, identity: &MaintenanceIdentity) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(identity);
    }

    fn is_active(&self, identity: &MaintenanceIdentity) -> bool {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(identity)
    }
}
