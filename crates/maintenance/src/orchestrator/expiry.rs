//! Activation and deferred expiry of silences.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use silencer_alertmanager::{Silence, SilenceId};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::definition::Maintenance;

use super::core::Inner;

/// What happens when a pending expiry fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExpiryAction {
    /// Delete the remote silence, then release local state.
    Delete,
    /// Only release local state; the backend expires the silence itself.
    Release,
}

/// Armed expiry timers keyed by the silence they will end.
#[derive(Debug, Default)]
pub(crate) struct PendingExpiries {
    pending: Mutex<HashMap<SilenceId, AbortHandle>>,
}

impl PendingExpiries {
    /// Timers that have neither fired nor died.
    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    fn remove(&self, id: &SilenceId) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }
}

impl Inner {
    /// Create a silence for `maintenance` starting at `anchored_at`.
    ///
    /// On success the maintenance is marked active and its expiry is armed.
    /// Failures are logged and leave all state untouched.
    pub(crate) async fn activate(
        self: &Arc<Self>,
        maintenance: &Arc<Maintenance>,
        anchored_at: DateTime<Utc>,
    ) -> Option<SilenceId> {
        let silence = Silence {
            matchers: maintenance.matchers.clone(),
            starts_at: anchored_at,
            duration: maintenance.duration,
            comment: maintenance.identity.to_string(),
            created_by: self.service_name.clone(),
        };

        let result = match silence.ends_at() {
            Ok(ends_at) => self.gateway.create(&silence).await.map(|id| (id, ends_at)),
            Err(e) => Err(e),
        };
        let (silence_id, ends_at) = match result {
            Ok(created) => created,
            Err(e) => {
                warn!(
                    maintenance = %maintenance.identity,
                    error = %e,
                    "failed to create silence"
                );
                return None;
            }
        };

        self.store.add(maintenance.identity);
        info!(
            maintenance = %maintenance.identity,
            silence_id = %silence_id,
            starts_at = %anchored_at,
            ends_at = %ends_at,
            "maintenance activated"
        );
        self.arm_expiry(maintenance.clone(), silence_id.clone(), ends_at, ExpiryAction::Delete);
        Some(silence_id)
    }

    /// Arm a one-shot timer that ends `silence_id` at `ends_at` (at once if
    /// already past). A silence already armed is left alone.
    pub(crate) fn arm_expiry(
        self: &Arc<Self>,
        maintenance: Arc<Maintenance>,
        silence_id: SilenceId,
        ends_at: DateTime<Utc>,
        action: ExpiryAction,
    ) {
        // Held across spawn and insert so the task cannot remove its entry first.
        let mut pending = self
            .expiries
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if pending.contains_key(&silence_id) {
            debug!(silence_id = %silence_id, "expiry already armed");
            return;
        }

        let inner = self.clone();
        let id = silence_id.clone();
        let task = tokio::spawn(async move {
            let wait = (ends_at - inner.clock.now()).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;
            inner.expire(&maintenance, &id, action).await;
        });

        pending.insert(silence_id, task.abort_handle());
    }

    /// End an activation. Local state is released even if the delete fails.
    pub(crate) async fn expire(
        &self,
        maintenance: &Maintenance,
        silence_id: &SilenceId,
        action: ExpiryAction,
    ) {
        if action == ExpiryAction::Delete {
            if let Err(e) = self.gateway.delete(silence_id).await {
                warn!(
                    maintenance = %maintenance.identity,
                    silence_id = %silence_id,
                    error = %e,
                    "failed to delete silence, releasing local state anyway"
                );
            }
        }

        self.store.delete(&maintenance.identity);
        self.expiries.remove(silence_id);
        info!(
            maintenance = %maintenance.identity,
            silence_id = %silence_id,
            "maintenance expired"
        );
    }
}
