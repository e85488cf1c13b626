use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler is already running")]
    AlreadyRunning,

    #[error("scheduler has been stopped")]
    Stopped,

    #[error("in-flight jobs did not finish within {0:?}")]
    StopTimeout(Duration),
}
