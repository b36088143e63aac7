//! Online backup using the SQLite backup API.
//!
//! Pages are copied in small steps with a short pause between them so the
//! source database stays available to other connections while the copy
//! runs. The copy is written next to the target as `<name>.partial` and only
//! renamed into place once it is complete.

use std::{
  ffi::OsString,
  path::{Path, PathBuf},
  time::Duration,
};

use rusqlite::{Connection, OpenFlags, backup::Backup};

const PARTIAL_SUFFIX: &str = ".partial";
const PAGES_PER_STEP: std::ffi::c_int = 64;
const STEP_PAUSE: Duration = Duration::from_millis(2);

pub(crate) fn partial_path(dest: &Path) -> PathBuf {
  let mut name: OsString = dest.as_os_str().to_owned();
  name.push(PARTIAL_SUFFIX);
  PathBuf::from(name)
}

/// Copy the main database of `src` into a fresh file at `dest`.
pub(crate) fn copy_database(src: &Connection, dest: &Path) -> rusqlite::Result<()> {
  let mut dest_conn = Connection::open(dest)?;
  {
    let backup = Backup::new(src, &mut dest_conn)?;
    backup.run_to_completion(PAGES_PER_STEP, STEP_PAUSE, None)?;
  }
  // The copy inherits WAL mode from the source header; a standalone backup
  // should be a single self-contained file.
  dest_conn.execute_batch("PRAGMA journal_mode = DELETE;")?;
  dest_conn.close().map_err(|(_, err)| err)
}

/// Copy the database file at `src` through its own read-only connection,
/// leaving the store's main connection free. Blocking; run off the runtime.
pub(crate) fn copy_file(src: &Path, dest: &Path) -> rusqlite::Result<()> {
  let src_conn = Connection::open_with_flags(
    src,
    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
  )?;
  copy_database(&src_conn, dest)?;
  src_conn.close().map_err(|(_, err)| err)
}
