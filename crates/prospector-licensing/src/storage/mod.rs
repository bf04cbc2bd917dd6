//! `SQLite` storage for license governance.
//!
//! Provides persistence for license records and the payment-event ledger.

mod db;
mod license_queries;
mod models;
mod payment_queries;

pub use db::{Database, DatabaseError};
pub use models::*;
