//! Generic ordered-key table shared by every typed store. Each table is
//! `(key TEXT PRIMARY KEY, value BLOB)`; SQLite's B-tree keeps `key`
//! lexicographically ordered, so `scan_prefix` is the spec's "prefix
//! range-scan" secondary index, not a full scan.

use rusqlite::{params, Connection, OptionalExtension};

use nmt_core::errors::StorageError;

use crate::to_storage_err;

/// Create the backing table for one store if it does not already exist.
/// `table` must be a compile-time-trusted identifier (never user input;
/// callers always pass a literal like `"chunks"`).
pub fn ensure_table(conn: &Connection, table: &str) -> Result<(), StorageError> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            key TEXT PRIMARY KEY,
            value BLOB NOT NULL
        ) WITHOUT ROWID;"
    ))
    .map_err(to_storage_err)
}

pub fn put(conn: &Connection, table: &str, key: &str, value: &[u8]) -> Result<(), StorageError> {
    conn.execute(
        &format!("INSERT INTO {table} (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value"),
        params![key, value],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn get(conn: &Connection, table: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
    conn.query_row(
        &format!("SELECT value FROM {table} WHERE key = ?1"),
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(to_storage_err)
}

pub fn delete(conn: &Connection, table: &str, key: &str) -> Result<(), StorageError> {
    conn.execute(&format!("DELETE FROM {table} WHERE key = ?1"), params![key])
        .map_err(to_storage_err)?;
    Ok(())
}

pub fn exists(conn: &Connection, table: &str, key: &str) -> Result<bool, StorageError> {
    Ok(get(conn, table, key)?.is_some())
}

/// All entries whose key starts with `prefix`, ordered ascending by key.
/// Exploits the fact that `key < prefix_upper_bound` is a sargable range
/// predicate on the primary-key B-tree (O(log n + matches), not O(n)).
pub fn scan_prefix(
    conn: &Connection,
    table: &str,
    prefix: &str,
) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
    let upper = prefix_upper_bound(prefix);
    let mut stmt = conn
        .prepare(&format!(
            "SELECT key, value FROM {table} WHERE key >= ?1 AND key < ?2 ORDER BY key ASC"
        ))
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![prefix, upper], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

pub fn count_prefix(conn: &Connection, table: &str, prefix: &str) -> Result<usize, StorageError> {
    let upper = prefix_upper_bound(prefix);
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE key >= ?1 AND key < ?2"),
        params![prefix, upper],
        |row| row.get::<_, i64>(0),
    )
    .map(|c| c as usize)
    .map_err(to_storage_err)
}

/// Smallest string that is lexicographically greater than every string
/// with the given prefix: bump the last byte, or if it's 0xFF, append a
/// byte so the comparison still lands above every extension.
fn prefix_upper_bound(prefix: &str) -> String {
    let mut bytes = prefix.as_bytes().to_vec();
    while let Some(&last) = bytes.last() {
        if last < 0xFF {
            let new_len = bytes.len();
            let mut bumped = bytes.clone();
            bumped[new_len - 1] += 1;
            return String::from_utf8_lossy(&bumped).into_owned();
        }
        bytes.pop();
    }
    // prefix was empty or all 0xFF: everything sorts below this sentinel.
    "\u{10FFFF}".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn scan_prefix_respects_ordering_and_bounds() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn, "t").unwrap();
        put(&conn, "t", "neuron:a", b"1").unwrap();
        put(&conn, "t", "neuron:b", b"2").unwrap();
        put(&conn, "t", "root:zzz", b"3").unwrap();

        let got = scan_prefix(&conn, "t", "neuron:").unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].0, "neuron:a");
        assert_eq!(got[1].0, "neuron:b");
    }

    #[test]
    fn put_is_upsert() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn, "t").unwrap();
        put(&conn, "t", "k", b"v1").unwrap();
        put(&conn, "t", "k", b"v2").unwrap();
        assert_eq!(get(&conn, "t", "k").unwrap(), Some(b"v2".to_vec()));
    }

    #[test]
    fn delete_then_get_is_none() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn, "t").unwrap();
        put(&conn, "t", "k", b"v").unwrap();
        delete(&conn, "t", "k").unwrap();
        assert_eq!(get(&conn, "t", "k").unwrap(), None);
    }
}
