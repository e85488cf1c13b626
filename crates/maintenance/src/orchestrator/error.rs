use std::time::Duration;

use silencer_alertmanager::{GatewayError, SilenceId};

use crate::scheduler::SchedulerError;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("alertmanager request failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("silence {silence_id} has a comment that is not a maintenance identity: '{comment}'")]
    IdentityDecode {
        silence_id: SilenceId,
        comment: String,
    },

    #[error("orchestrator already started")]
    AlreadyStarted,

    #[error("cron scheduler did not stop within {0:?}")]
    StopTimeout(Duration),

    #[error("cron scheduler: {0}")]
    Scheduler(SchedulerError),
}

impl From<SchedulerError> for OrchestratorError {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::StopTimeout(timeout) => OrchestratorError::StopTimeout(timeout),
            other => OrchestratorError::Scheduler(other),
        }
    }
}
