// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value row operations on `kv_store`.

use rusqlite::params;
use segoc_core::SegocError;

use crate::database::{Database, map_tr_err};

pub async fn get_value(db: &Database, key: &str) -> Result<Option<String>, SegocError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            );
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Inserts or replaces the value stored under `key`.
pub async fn put_value(db: &Database, key: &str, value: &str) -> Result<(), SegocError> {
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_value(db: &Database, key: &str) -> Result<(), SegocError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All keys, sorted. Used by diagnostics.
pub async fn list_keys(db: &Database) -> Result<Vec<String>, SegocError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete() {
        let db = Database::open_in_memory().await.unwrap();
        assert_eq!(get_value(&db, "segoc-demo-counter").await.unwrap(), None);

        put_value(&db, "segoc-demo-counter", "1").await.unwrap();
        put_value(&db, "segoc-demo-counter", "2").await.unwrap();
        assert_eq!(
            get_value(&db, "segoc-demo-counter").await.unwrap().as_deref(),
            Some("2")
        );

        delete_value(&db, "segoc-demo-counter").await.unwrap();
        delete_value(&db, "segoc-demo-counter").await.unwrap();
        assert_eq!(get_value(&db, "segoc-demo-counter").await.unwrap(), None);
    }

    #[tokio::test]
    async fn keys_are_listed_in_order() {
        let db = Database::open_in_memory().await.unwrap();
        put_value(&db, "b", "1").await.unwrap();
        put_value(&db, "a", "2").await.unwrap();
        assert_eq!(list_keys(&db).await.unwrap(), vec!["a", "b"]);
    }
}
