//! Household and family-member types.
//!
//! A household is the census unit: one respondent (the head) plus an address.
//! It exclusively owns its family members. Member counts are never stored;
//! they are derived on read from the member rows.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{Error, Result};

/// Store-assigned integer identity of a household.
pub type HouseholdId = i64;

// ─── Relationship ────────────────────────────────────────────────────────────

/// How a family member relates to the head of the household.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Relationship {
  Father,
  Mother,
  Son,
  Daughter,
  Sibling,
  Grandfather,
  Grandmother,
  Uncle,
  Aunt,
  Cousin,
  Other,
}

impl Relationship {
  /// Display rank used when listing a household's members: parents first,
  /// then children, then everyone else.
  pub fn rank(self) -> u8 {
    match self {
      Self::Father => 1,
      Self::Mother => 2,
      Self::Son => 3,
      Self::Daughter => 4,
      _ => 5,
    }
  }

  /// Parse the lowercase stored form.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownRelationship(s.to_owned()))
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Caller-supplied household fields.
///
/// `first_name` and `last_name` are expected to be non-empty; the store
/// persists whatever it is given and leaves validation to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHousehold {
  pub first_name:     String,
  #[serde(default)]
  pub middle_name:    Option<String>,
  pub last_name:      String,
  /// Name suffix (Jr., Sr., III, ...).
  #[serde(default)]
  pub extension:      Option<String>,
  #[serde(default)]
  pub house_no:       Option<String>,
  #[serde(default)]
  pub street_name:    Option<String>,
  #[serde(default)]
  pub barangay:       Option<String>,
  #[serde(default)]
  pub town:           Option<String>,
  #[serde(default)]
  pub province:       Option<String>,
  #[serde(default)]
  pub region:         Option<String>,
  #[serde(default)]
  pub zip_code:       Option<String>,
  #[serde(default)]
  pub contact_number: Option<String>,
  #[serde(default)]
  pub email_address:  Option<String>,
}

impl NewHousehold {
  pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      ..Default::default()
    }
  }

  /// True when both required name parts contain something other than
  /// whitespace.
  pub fn has_required_names(&self) -> bool {
    !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
  }
}

/// Caller-supplied family member fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFamilyMember {
  pub first_name:   String,
  pub last_name:    String,
  pub relationship: Relationship,
  #[serde(default)]
  pub age:          Option<u32>,
}

impl NewFamilyMember {
  pub fn new(
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    relationship: Relationship,
    age: Option<u32>,
  ) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      relationship,
      age,
    }
  }
}

/// A household together with its initial member set, written atomically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CensusRecord {
  #[serde(flatten)]
  pub household:      NewHousehold,
  #[serde(default)]
  pub family_members: Vec<NewFamilyMember>,
}

// ─── Stored rows ─────────────────────────────────────────────────────────────

/// A stored household row plus its derived member count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
  pub id:             HouseholdId,
  pub first_name:     String,
  pub middle_name:    Option<String>,
  pub last_name:      String,
  pub extension:      Option<String>,
  pub house_no:       Option<String>,
  pub street_name:    Option<String>,
  pub barangay:       Option<String>,
  pub town:           Option<String>,
  pub province:       Option<String>,
  pub region:         Option<String>,
  pub zip_code:       Option<String>,
  pub contact_number: Option<String>,
  pub email_address:  Option<String>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
  /// Number of family members linked to this household, computed at read
  /// time.
  pub family_count:   usize,
}

/// A stored family member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
  pub id:           i64,
  pub household_id: HouseholdId,
  pub first_name:   String,
  pub last_name:    String,
  pub relationship: Relationship,
  pub age:          Option<u32>,
  pub created_at:   DateTime<Utc>,
}

/// A household with its full, display-ordered member list.
///
/// Members are ordered by [`Relationship::rank`], then by descending age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdDetail {
  #[serde(flatten)]
  pub household:      Household,
  pub family_members: Vec<FamilyMember>,
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn relationship_stored_form_roundtrips() {
    for rel in Relationship::iter() {
      assert_eq!(Relationship::parse(rel.as_ref()).unwrap(), rel);
    }
    assert_eq!(Relationship::Grandmother.as_ref(), "grandmother");
  }

  #[test]
  fn unknown_relationship_is_rejected() {
    let err = Relationship::parse("neighbour").unwrap_err();
    assert!(matches!(err, Error::UnknownRelationship(s) if s == "neighbour"));
  }

  #[test]
  fn parents_and_children_rank_ahead_of_relatives() {
    assert!(Relationship::Father.rank() < Relationship::Mother.rank());
    assert!(Relationship::Mother.rank() < Relationship::Son.rank());
    assert!(Relationship::Son.rank() < Relationship::Daughter.rank());
    for rel in [
      Relationship::Sibling,
      Relationship::Grandfather,
      Relationship::Grandmother,
      Relationship::Uncle,
      Relationship::Aunt,
      Relationship::Cousin,
      Relationship::Other,
    ] {
      assert_eq!(rel.rank(), 5);
    }
  }

  #[test]
  fn census_record_accepts_flat_json() {
    let record: CensusRecord = serde_json::from_str(
      r#"{
        "first_name": "Juan",
        "last_name": "Dela Cruz",
        "province": "Cebu",
        "family_members": [
          {"first_name": "Maria", "last_name": "Dela Cruz", "relationship": "mother", "age": 45}
        ]
      }"#,
    )
    .unwrap();

    assert_eq!(record.household.first_name, "Juan");
    assert_eq!(record.household.province.as_deref(), Some("Cebu"));
    assert_eq!(record.household.town, None);
    assert_eq!(record.family_members.len(), 1);
    assert_eq!(record.family_members[0].relationship, Relationship::Mother);
    assert_eq!(record.family_members[0].age, Some(45));
  }

  #[test]
  fn blank_names_are_not_required_names() {
    assert!(NewHousehold::new("Juan", "Dela Cruz").has_required_names());
    assert!(!NewHousehold::new("  ", "Dela Cruz").has_required_names());
    assert!(!NewHousehold::new("Juan", "").has_required_names());
  }
}
