//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order matches chronological order.
//! Relationships are stored as their lowercase names.

use chrono::{DateTime, SecondsFormat, Utc};
use census_core::{FamilyMember, Household, Relationship, Statistics};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── Counts ──────────────────────────────────────────────────────────────────

fn decode_count(n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::Decode(format!("negative count: {n}")))
}

fn decode_age(age: Option<i64>) -> Result<Option<u32>> {
  age
    .map(|a| {
      u32::try_from(a).map_err(|_| Error::Decode(format!("age out of range: {a}")))
    })
    .transpose()
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Build an unanchored `LIKE` pattern that matches `term` literally.
///
/// Must be used with `ESCAPE '\'`.
pub fn like_pattern(term: &str) -> String {
  let mut pattern = String::with_capacity(term.len() + 2);
  pattern.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawHousehold::from_row`]. Requires the
/// `households h LEFT JOIN family_members fm` aliasing.
pub const HOUSEHOLD_COLUMNS: &str = "
  h.id, h.first_name, h.middle_name, h.last_name, h.extension,
  h.house_no, h.street_name, h.barangay, h.town, h.province, h.region,
  h.zip_code, h.contact_number, h.email_address,
  h.created_at, h.updated_at,
  COUNT(fm.id) AS family_count";

/// Raw values read directly from a `households` row plus its member count.
pub struct RawHousehold {
  pub id:             i64,
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
  pub created_at:     String,
  pub updated_at:     String,
  pub family_count:   i64,
}

impl RawHousehold {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      first_name:     row.get(1)?,
      middle_name:    row.get(2)?,
      last_name:      row.get(3)?,
      extension:      row.get(4)?,
      house_no:       row.get(5)?,
      street_name:    row.get(6)?,
      barangay:       row.get(7)?,
      town:           row.get(8)?,
      province:       row.get(9)?,
      region:         row.get(10)?,
      zip_code:       row.get(11)?,
      contact_number: row.get(12)?,
      email_address:  row.get(13)?,
      created_at:     row.get(14)?,
      updated_at:     row.get(15)?,
      family_count:   row.get(16)?,
    })
  }

  pub fn into_household(self) -> Result<Household> {
    let family_count = usize::try_from(decode_count(self.family_count)?)
      .map_err(|e| Error::Decode(e.to_string()))?;

    Ok(Household {
      id: self.id,
      first_name: self.first_name,
      middle_name: self.middle_name,
      last_name: self.last_name,
      extension: self.extension,
      house_no: self.house_no,
      street_name: self.street_name,
      barangay: self.barangay,
      town: self.town,
      province: self.province,
      region: self.region,
      zip_code: self.zip_code,
      contact_number: self.contact_number,
      email_address: self.email_address,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      family_count,
    })
  }
}

/// Column list matching [`RawFamilyMember::from_row`].
pub const MEMBER_COLUMNS: &str =
  "id, household_id, first_name, last_name, relationship, age, created_at";

/// Raw values read directly from a `family_members` row.
pub struct RawFamilyMember {
  pub id:           i64,
  pub household_id: i64,
  pub first_name:   String,
  pub last_name:    String,
  pub relationship: String,
  pub age:          Option<i64>,
  pub created_at:   String,
}

impl RawFamilyMember {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      household_id: row.get(1)?,
      first_name:   row.get(2)?,
      last_name:    row.get(3)?,
      relationship: row.get(4)?,
      age:          row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_member(self) -> Result<FamilyMember> {
    Ok(FamilyMember {
      id:           self.id,
      household_id: self.household_id,
      first_name:   self.first_name,
      last_name:    self.last_name,
      relationship: Relationship::parse(&self.relationship)?,
      age:          decode_age(self.age)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw aggregate row produced by the statistics query.
pub struct RawStatistics {
  pub total_households:     i64,
  pub total_family_members: i64,
  pub avg_family_size:      f64,
  pub max_family_size:      i64,
}

impl RawStatistics {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      total_households:     row.get(0)?,
      total_family_members: row.get(1)?,
      avg_family_size:      row.get(2)?,
      max_family_size:      row.get(3)?,
    })
  }

  pub fn into_statistics(self) -> Result<Statistics> {
    Ok(Statistics {
      total_households:     decode_count(self.total_households)?,
      total_family_members: decode_count(self.total_family_members)?,
      avg_family_size:      self.avg_family_size,
      max_family_size:      decode_count(self.max_family_size)?,
    })
  }
}
