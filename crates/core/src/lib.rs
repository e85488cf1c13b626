pub mod config;
pub mod duration;
pub mod error;
pub mod identity;
pub mod matcher;

pub use config::{MaintenanceFile, MaintenanceSpec};
pub use duration::parse_duration;
pub use error::*;
pub use identity::MaintenanceIdentity;
pub use matcher::Matcher;
