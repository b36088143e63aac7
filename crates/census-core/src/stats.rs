//! Aggregate statistics over the whole store.

use serde::{Deserialize, Serialize};

/// Store-wide counts, always derived from the member rows at query time.
///
/// On an empty store every field is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
  pub total_households:     u64,
  pub total_family_members: u64,
  /// Mean member count per household, including households with none.
  pub avg_family_size:      f64,
  pub max_family_size:      u64,
}
