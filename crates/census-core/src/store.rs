//! The `HouseholdStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `census-store-sqlite`).
//! Higher layers (`census-api`, `census-server`) depend on this abstraction,
//! not on any concrete backend.

use std::{future::Future, path::PathBuf};

use crate::{
  error::StoreError,
  household::{Household, HouseholdDetail, HouseholdId, NewFamilyMember, NewHousehold},
  stats::Statistics,
};

/// Abstraction over a census household store backend.
///
/// Multi-row writes are atomic: either every row of the operation is
/// persisted or none is. Member counts are derived on every read.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HouseholdStore: Send + Sync {
  type Error: StoreError;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a household and its members in one transaction and return the
  /// newly assigned household id.
  fn save_census_record(
    &self,
    household: NewHousehold,
    members: Vec<NewFamilyMember>,
  ) -> impl Future<Output = Result<HouseholdId, Self::Error>> + Send + '_;

  /// Rewrite a household's fields and replace its member set in one
  /// transaction. Returns the number of households changed (0 or 1).
  fn update_household(
    &self,
    id: HouseholdId,
    household: NewHousehold,
    members: Vec<NewFamilyMember>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Delete a household and, by cascade, all of its members. Returns the
  /// number of households removed (0 or 1).
  fn delete_household(
    &self,
    id: HouseholdId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All households, newest first, each with its member count.
  fn get_all_households(
    &self,
  ) -> impl Future<Output = Result<Vec<Household>, Self::Error>> + Send + '_;

  /// A household with its display-ordered members. Returns `None` if no
  /// household has this id.
  fn get_household_by_id(
    &self,
    id: HouseholdId,
  ) -> impl Future<Output = Result<Option<HouseholdDetail>, Self::Error>> + Send + '_;

  /// Case-insensitive substring search over first name, last name,
  /// barangay, town and province, ordered by last then first name.
  ///
  /// An empty `term` matches every household.
  fn search_households<'a>(
    &'a self,
    term: &'a str,
  ) -> impl Future<Output = Result<Vec<Household>, Self::Error>> + Send + 'a;

  fn get_statistics(
    &self,
  ) -> impl Future<Output = Result<Statistics, Self::Error>> + Send + '_;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Copy the live store to `path` and report the outcome.
  fn backup_to(
    &self,
    path: PathBuf,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Release the underlying storage. Every later call fails.
  fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
