//! Startup alignment of configuration, local state and remote silences.

use std::collections::BTreeMap;
use std::sync::Arc;

use silencer_alertmanager::ActiveSilence;
use silencer_core::MaintenanceIdentity;
use tracing::info;

use super::core::Inner;
use super::expiry::ExpiryAction;
use super::OrchestratorError;

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Remote silences matched to a configured maintenance.
    pub recovered: usize,
    /// Remote silences with no configured maintenance, deleted.
    pub orphans_deleted: usize,
    /// Windows open right now that had no silence, newly created.
    pub restored: usize,
}

impl Inner {
    /// Any failure to list, decode or delete aborts the pass. Creation
    /// failures while restoring open windows are logged only.
    pub(crate) async fn reconcile(self: &Arc<Self>) -> Result<ReconcileSummary, OrchestratorError> {
        let silences = self.gateway.active_silences(&self.service_name).await?;

        let mut remote: BTreeMap<MaintenanceIdentity, Vec<ActiveSilence>> = BTreeMap::new();
        for silence in silences {
            let identity = silence.comment.parse::<MaintenanceIdentity>().map_err(|_| {
                OrchestratorError::IdentityDecode {
                    silence_id: silence.id.clone(),
                    comment: silence.comment.clone(),
                }
            })?;
            remote.entry(identity).or_default().push(silence);
        }

        let mut summary = ReconcileSummary::default();
        let mut needs_evaluation = Vec::new();
        for maintenance in &self.maintenances {
            let Some(recovered) = remote.remove(&maintenance.identity) else {
                needs_evaluation.push(maintenance.clone());
                continue;
            };

            self.store.add(maintenance.identity);
            for silence in recovered {
                info!(
                    maintenance = %maintenance.identity,
                    silence_id = %silence.id,
                    ends_at = %silence.ends_at,
                    "recovered existing silence"
                );
                self.arm_expiry(
                    maintenance.clone(),
                    silence.id,
                    silence.ends_at,
                    ExpiryAction::Release,
                );
                summary.recovered += 1;
            }
        }

        for (identity, orphans) in remote {
            for silence in orphans {
                self.gateway.delete(&silence.id).await?;
                info!(
                    maintenance = %identity,
                    silence_id = %silence.id,
                    "deleted orphan silence"
                );
                summary.orphans_deleted += 1;
            }
        }

        let now = self.clock.now();
        for maintenance in needs_evaluation {
            if let (true, Some(window_start)) = maintenance.active_at(now) {
                if self.activate(&maintenance, window_start).await.is_some() {
                    summary.restored += 1;
                }
            }
        }

        info!(
            recovered = summary.recovered,
            orphans_deleted = summary.orphans_deleted,
            restored = summary.restored,
            "reconciliation complete"
        );
        Ok(summary)
    }
}
