//! [`SqliteStore`] — the SQLite implementation of [`HouseholdStore`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::Utc;
use census_core::{
  Household, HouseholdDetail, HouseholdId, HouseholdStore, NewFamilyMember,
  NewHousehold, Relationship, Statistics, StoreState,
};
use rusqlite::OptionalExtension as _;
use strum::IntoEnumIterator as _;
use tracing::{debug, error, info};

use crate::{
  Error, Result, backup,
  encode::{
    HOUSEHOLD_COLUMNS, MEMBER_COLUMNS, RawFamilyMember, RawHousehold,
    RawStatistics, encode_dt, like_pattern,
  },
  lifecycle::Lifecycle,
  schema,
};

// ─── Statements ──────────────────────────────────────────────────────────────

/// `ORDER BY` clause for a household's members, ranked by
/// [`Relationship::rank`] and then by age with unknown ages last.
fn member_order() -> String {
  let arms: String = Relationship::iter()
    .map(|rel| format!(" WHEN '{}' THEN {}", rel.as_ref(), rel.rank()))
    .collect();
  format!(
    "ORDER BY CASE relationship{arms} ELSE {} END, age DESC, id",
    Relationship::Other.rank()
  )
}

const STATISTICS_SQL: &str = "
  SELECT
    COUNT(*),
    COALESCE(SUM(member_count), 0),
    COALESCE(AVG(member_count), 0.0),
    COALESCE(MAX(member_count), 0)
  FROM (
    SELECT h.id, COUNT(fm.id) AS member_count
    FROM households h
    LEFT JOIN family_members fm ON fm.household_id = h.id
    GROUP BY h.id
  )";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A census household store backed by a single SQLite file.
///
/// Cloning is cheap — the connection and lifecycle state are shared, so
/// closing one clone closes them all.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn:      tokio_rusqlite::Connection,
  pub(crate) lifecycle: Arc<Lifecycle>,
  path:                 Option<PathBuf>,
}

impl SqliteStore {
  /// Open (or create) a store at `path`. The schema is created lazily on
  /// first use, or eagerly via [`SqliteStore::ensure_initialized`].
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    Ok(Self::with_connection(conn, Some(path)))
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self::with_connection(conn, None))
  }

  fn with_connection(conn: tokio_rusqlite::Connection, path: Option<PathBuf>) -> Self {
    Self { conn, lifecycle: Arc::new(Lifecycle::new()), path }
  }

  /// Location of the database file, or `None` for in-memory stores.
  pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

  pub fn state(&self) -> StoreState { self.lifecycle.state() }

  /// Create the schema if this store has not done so yet. Every public
  /// operation calls this first; calling it again is free.
  pub async fn ensure_initialized(&self) -> Result<()> {
    self
      .lifecycle
      .ensure_initialized(|| async {
        schema::ensure_ready(&self.conn).await.inspect_err(|e| {
          error!(error = %e, "schema initialization failed");
        })?;
        info!(path = ?self.path, "census store initialized");
        Ok(())
      })
      .await
  }
}

// ─── Row writers ─────────────────────────────────────────────────────────────

fn insert_household(
  conn:      &rusqlite::Connection,
  household: &NewHousehold,
  now:       &str,
) -> rusqlite::Result<HouseholdId> {
  conn.execute(
    "INSERT INTO households (
       first_name, middle_name, last_name, extension,
       house_no, street_name, barangay, town, province, region, zip_code,
       contact_number, email_address, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
    rusqlite::params![
      household.first_name,
      household.middle_name,
      household.last_name,
      household.extension,
      household.house_no,
      household.street_name,
      household.barangay,
      household.town,
      household.province,
      household.region,
      household.zip_code,
      household.contact_number,
      household.email_address,
      now,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

fn insert_members(
  conn:         &rusqlite::Connection,
  household_id: HouseholdId,
  members:      &[NewFamilyMember],
  now:          &str,
) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "INSERT INTO family_members (
       household_id, first_name, last_name, relationship, age, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;
  for member in members {
    stmt.execute(rusqlite::params![
      household_id,
      member.first_name,
      member.last_name,
      member.relationship.as_ref(),
      member.age,
      now,
    ])?;
  }
  Ok(())
}

// ─── HouseholdStore impl ─────────────────────────────────────────────────────

impl HouseholdStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn save_census_record(
    &self,
    household: NewHousehold,
    members:   Vec<NewFamilyMember>,
  ) -> Result<HouseholdId> {
    self.ensure_initialized().await?;

    let now = encode_dt(Utc::now());
    let member_count = members.len();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id = insert_household(&tx, &household, &now)?;
        insert_members(&tx, id, &members, &now)?;
        tx.commit()?;
        Ok(id)
      })
      .await?;

    debug!(household_id = id, members = member_count, "saved census record");
    Ok(id)
  }

  async fn update_household(
    &self,
    id:        HouseholdId,
    household: NewHousehold,
    members:   Vec<NewFamilyMember>,
  ) -> Result<usize> {
    self.ensure_initialized().await?;

    let now = encode_dt(Utc::now());
    let member_count = members.len();

    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE households SET
             first_name = ?1, middle_name = ?2, last_name = ?3, extension = ?4,
             house_no = ?5, street_name = ?6, barangay = ?7, town = ?8,
             province = ?9, region = ?10, zip_code = ?11,
             contact_number = ?12, email_address = ?13, updated_at = ?14
           WHERE id = ?15",
          rusqlite::params![
            household.first_name,
            household.middle_name,
            household.last_name,
            household.extension,
            household.house_no,
            household.street_name,
            household.barangay,
            household.town,
            household.province,
            household.region,
            household.zip_code,
            household.contact_number,
            household.email_address,
            now,
            id,
          ],
        )?;
        if changed == 0 {
          return Ok(0);
        }

        tx.execute(
          "DELETE FROM family_members WHERE household_id = ?1",
          rusqlite::params![id],
        )?;
        insert_members(&tx, id, &members, &now)?;
        tx.commit()?;
        Ok(changed)
      })
      .await?;

    debug!(household_id = id, members = member_count, changed, "updated household");
    Ok(changed)
  }

  async fn delete_household(&self, id: HouseholdId) -> Result<usize> {
    self.ensure_initialized().await?;

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Members go with it through ON DELETE CASCADE.
        let deleted = tx.execute(
          "DELETE FROM households WHERE id = ?1",
          rusqlite::params![id],
        )?;
        tx.commit()?;
        Ok(deleted)
      })
      .await?;

    debug!(household_id = id, deleted, "deleted household");
    Ok(deleted)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_all_households(&self) -> Result<Vec<Household>> {
    self.ensure_initialized().await?;

    let raws: Vec<RawHousehold> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HOUSEHOLD_COLUMNS}
           FROM households h
           LEFT JOIN family_members fm ON fm.household_id = h.id
           GROUP BY h.id
           ORDER BY h.created_at DESC, h.id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawHousehold::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHousehold::into_household).collect()
  }

  async fn get_household_by_id(&self, id: HouseholdId) -> Result<Option<HouseholdDetail>> {
    self.ensure_initialized().await?;

    let (raw, raw_members): (Option<RawHousehold>, Vec<RawFamilyMember>) = self
      .conn
      .call(move |conn| {
        // One read transaction so the count and the member list agree.
        let tx = conn.transaction()?;

        let raw = tx
          .query_row(
            &format!(
              "SELECT {HOUSEHOLD_COLUMNS}
               FROM households h
               LEFT JOIN family_members fm ON fm.household_id = h.id
               WHERE h.id = ?1
               GROUP BY h.id"
            ),
            rusqlite::params![id],
            RawHousehold::from_row,
          )
          .optional()?;

        let members = if raw.is_some() {
          let order = member_order();
          let mut stmt = tx.prepare(&format!(
            "SELECT {MEMBER_COLUMNS} FROM family_members
             WHERE household_id = ?1
             {order}"
          ))?;
          let rows = stmt
            .query_map(rusqlite::params![id], RawFamilyMember::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        } else {
          Vec::new()
        };

        tx.commit()?;
        Ok((raw, members))
      })
      .await?;

    let Some(raw) = raw else {
      return Ok(None);
    };

    Ok(Some(HouseholdDetail {
      household:      raw.into_household()?,
      family_members: raw_members
        .into_iter()
        .map(RawFamilyMember::into_member)
        .collect::<Result<_>>()?,
    }))
  }

  async fn search_households(&self, term: &str) -> Result<Vec<Household>> {
    self.ensure_initialized().await?;

    let pattern = like_pattern(term);

    let raws: Vec<RawHousehold> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HOUSEHOLD_COLUMNS}
           FROM households h
           LEFT JOIN family_members fm ON fm.household_id = h.id
           WHERE h.first_name LIKE ?1 ESCAPE '\\'
              OR h.last_name  LIKE ?1 ESCAPE '\\'
              OR h.barangay   LIKE ?1 ESCAPE '\\'
              OR h.town       LIKE ?1 ESCAPE '\\'
              OR h.province   LIKE ?1 ESCAPE '\\'
           GROUP BY h.id
           ORDER BY h.last_name, h.first_name, h.id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern], RawHousehold::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHousehold::into_household).collect()
  }

  async fn get_statistics(&self) -> Result<Statistics> {
    self.ensure_initialized().await?;

    let raw: RawStatistics = self
      .conn
      .call(|conn| Ok(conn.query_row(STATISTICS_SQL, [], RawStatistics::from_row)?))
      .await?;

    raw.into_statistics()
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  async fn backup_to(&self, path: PathBuf) -> Result<()> {
    self.ensure_initialized().await?;

    let partial = backup::partial_path(&path);
    let outcome = match &self.path {
      Some(src) => {
        let src = src.clone();
        let dest = partial.clone();
        tokio::task::spawn_blocking(move || backup::copy_file(&src, &dest))
          .await
          .map_err(|e| Error::Io(std::io::Error::other(e)))?
      }
      None => {
        let dest = partial.clone();
        self
          .conn
          .call(move |conn| Ok(backup::copy_database(conn, &dest)))
          .await?
      }
    };

    if let Err(source) = outcome {
      // Best effort; the partial file may never have been created.
      let _ = tokio::fs::remove_file(&partial).await;
      error!(path = %path.display(), error = %source, "backup failed");
      return Err(Error::Backup { path, source });
    }

    if let Err(e) = tokio::fs::rename(&partial, &path).await {
      let _ = tokio::fs::remove_file(&partial).await;
      return Err(Error::Io(e));
    }

    info!(path = %path.display(), "backup completed");
    Ok(())
  }

  async fn close(&self) -> Result<()> {
    if !self.lifecycle.mark_closed() {
      return Ok(());
    }

    match self.conn.clone().close().await {
      Ok(()) | Err(tokio_rusqlite::Error::ConnectionClosed) => {}
      Err(e) => return Err(Error::Database(e)),
    }

    info!(path = ?self.path, "census store closed");
    Ok(())
  }
}
