//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Silences Alertmanager alerts during recurring maintenance windows.
#[derive(Parser, Debug, Clone)]
#[command(name = "silencer", version, about)]
pub struct Cli {
    /// Path to the maintenance YAML file.
    #[arg(long, env = "CONFIG_FILE", default_value = "silencer.yml")]
    pub config_file: PathBuf,

    /// Base URL of the Alertmanager API.
    #[arg(long, env = "ALERT_MANAGER_URL", default_value = "http://localhost:9093")]
    pub alertmanager_url: String,

    /// Address the status page listens on.
    #[arg(long, env = "SILENCER_LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: String,

    /// Author written on every silence; also used to find them on restart.
    #[arg(long, env = "SILENCER_SERVICE_NAME", default_value = "maintenance service")]
    pub service_name: String,

    /// Seconds to wait for in-flight cron fires on shutdown.
    #[arg(long, env = "SILENCER_SHUTDOWN_TIMEOUT", default_value_t = 10)]
    pub shutdown_timeout: u64,

    /// Per-request timeout for Alertmanager calls, in seconds.
    #[arg(long, env = "SILENCER_REQUEST_TIMEOUT", default_value_t = 10)]
    pub request_timeout: u64,
}

impl Cli {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
