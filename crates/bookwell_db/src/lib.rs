// --- File: crates/bookwell_db/src/lib.rs ---
//! Database layer for Bookwell
//!
//! Backend-agnostic persistence over SQLx's Any driver (sqlite by default).
//! The ledger repository is the authoritative half of the conflict guard:
//! its guarded insert/update statements are where the no-overlap invariant
//! is actually enforced.

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;

pub use client::{DbClient, DbTransaction};
pub use error::DbError;
pub use factory::{DbClientFactory, Repositories};
pub use repositories::{
    AvailabilityRepository, BusyCacheRepository, LedgerRepository, NewAppointment,
    SqlAvailabilityRepository, SqlBusyCacheRepository, SqlLedgerRepository,
};
