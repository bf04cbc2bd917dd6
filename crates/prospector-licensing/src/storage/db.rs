//! Database connection and initialization.

pub use prospector_core::db::DatabaseError;

prospector_core::define_database!(Database, "License database migrations complete");
