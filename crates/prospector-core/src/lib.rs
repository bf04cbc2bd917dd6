//! Prospector Core Library
//!
//! Shared functionality for the license governance subsystem:
//! - Pure access evaluation (license snapshot + session fact -> decision)
//! - License domain vocabulary (statuses, plans, payment methods)
//! - Configuration resolution and hierarchy
//! - Shared `SQLite` pool helpers
//! - Common error types

pub mod access;
pub mod config;
pub mod db;
pub mod error;
pub mod license;
pub mod tracing_init;

pub use access::{
    AccessDecision, AccessEvaluator, AccessWarning, DenyReason, LicenseSnapshot, SessionFact,
};
pub use config::Config;
pub use error::{Error, Result};
