//! Prospector Licensing Library
//!
//! License & subscription access governance:
//! - `SQLite` storage for license records and the payment ledger
//! - Administrative governance operations (edits, trials, renewals)
//! - Session-boundary access gate for the UI layer

pub mod gate;
pub mod governance;
pub mod storage;

pub use gate::{AccessGate, GateState, LicenseFetch};
pub use governance::LicenseGovernanceService;
