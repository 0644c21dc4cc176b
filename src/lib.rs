//! Resilient data-access client for the channel growth analytics backend.

pub mod analytics;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fallback;
pub mod logging;
pub mod models;
pub mod offline;
pub mod single_flight;
pub mod transport;

pub use client::{Diagnostics, GrowthClient};
pub use config::Config;
pub use error::{ApiError, FailureKind};
