//! Core types and trait definitions for the census household store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod household;
pub mod lifecycle;
pub mod stats;
pub mod store;

pub use error::{Error, Result, StoreError};
pub use household::{
  CensusRecord, FamilyMember, Household, HouseholdDetail, HouseholdId,
  NewFamilyMember, NewHousehold, Relationship,
};
pub use lifecycle::{StoreState, default_backup_path};
pub use stats::Statistics;
pub use store::HouseholdStore;
