//! Copy-then-read access to Chromium cookie databases.
//!
//! The live database may be locked by the owning application, so every
//! read goes through a private temporary snapshot. The snapshot is a
//! [`tempfile::NamedTempFile`], which is removed when it goes out of
//! scope on every exit path.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};

pub(crate) const SNAPSHOT_PREFIX: &str = "halo-cookies-";

/// One row of the `cookies` table, read-only.
#[derive(Debug, Clone)]
pub struct CookieRow {
    pub name: String,
    pub host_key: String,
    /// Plaintext value column; takes priority when non-empty
    pub value: Option<String>,
    /// Encrypted value blob, decrypted on demand
    pub encrypted_value: Option<Vec<u8>>,
}

/// Read the newest row for each named cookie matching the host pattern.
///
/// Cookies that have no row are simply absent from the result; a missing
/// cookie is not an error, only a failure to snapshot or query the
/// database is.
pub fn read_cookie_rows(
    db_path: &Path,
    host_pattern: &str,
    names: &[&str],
) -> Result<Vec<CookieRow>, String> {
    let snapshot = snapshot_db(db_path)?;
    let conn = Connection::open_with_flags(snapshot.path(), OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| format!("Failed to open cookie snapshot: {e}"))?;

    let mut rows = Vec::new();
    for name in names {
        if let Some(row) = query_cookie(&conn, host_pattern, name)? {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn snapshot_db(db_path: &Path) -> Result<tempfile::NamedTempFile, String> {
    let snapshot = tempfile::Builder::new()
        .prefix(SNAPSHOT_PREFIX)
        .suffix(".db")
        .tempfile()
        .map_err(|e| format!("Failed to create snapshot file: {e}"))?;

    std::fs::copy(db_path, snapshot.path())
        .map_err(|e| format!("Failed to snapshot cookie database: {e}"))?;

    Ok(snapshot)
}

fn query_cookie(
    conn: &Connection,
    host_pattern: &str,
    name: &str,
) -> Result<Option<CookieRow>, String> {
    let mut stmt = conn
        .prepare(
            "SELECT name, host_key, value, encrypted_value FROM cookies \
             WHERE host_key LIKE ?1 AND name = ?2 \
             ORDER BY creation_utc DESC LIMIT 1",
        )
        .map_err(|e| format!("Failed to prepare cookie query: {e}"))?;

    stmt.query_row(rusqlite::params![host_pattern, name], |row| {
        Ok(CookieRow {
            name: row.get(0)?,
            host_key: row.get(1)?,
            value: row.get(2)?,
            encrypted_value: row.get(3)?,
        })
    })
    .optional()
    .map_err(|e| format!("Cookie query failed: {e}"))
}

#[cfg(test)]
pub(crate) fn write_fixture_db(path: &Path, rows: &[(i64, &str, &str, &str, &[u8])]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE cookies (
            creation_utc INTEGER NOT NULL,
            host_key TEXT NOT NULL,
            name TEXT NOT NULL,
            value TEXT NOT NULL DEFAULT '',
            encrypted_value BLOB NOT NULL DEFAULT ''
        )",
    )
    .unwrap();
    for &(creation_utc, host_key, name, value, encrypted_value) in rows {
        conn.execute(
            "INSERT INTO cookies (creation_utc, host_key, name, value, encrypted_value) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![creation_utc, host_key, name, value, encrypted_value],
        )
        .unwrap();
    }
}
