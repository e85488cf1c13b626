//! HTTP handlers.

pub mod health;
pub mod status;

pub use health::health;
pub use status::status_board;
