use rusqlite::{Connection, params};
use serde_json::Value;
use tracing::warn;

use cork_types::api::Activity;

use crate::Database;
use crate::error::StoreError;
use crate::models::parse_created_at;

/// Appends one audit record and returns it as stored.
///
/// Takes a plain connection so callers inside a transaction record through
/// the same transaction; the append then commits or rolls back with the
/// entity write it describes. Ids come from the table's AUTOINCREMENT and
/// are never reused, so the log stays strictly ordered per database.
pub fn record(
    conn: &Connection,
    actor_id: &str,
    action: &str,
    entity_type: &str,
    entry_id: &str,
    entry: &Value,
) -> Result<Activity, StoreError> {
    conn.execute(
        "INSERT INTO activity (user_id, action, type, entry_id, entry) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![actor_id, action, entity_type, entry_id, entry.to_string()],
    )?;

    let id = conn.last_insert_rowid();
    let created_at: String =
        conn.query_row("SELECT created_at FROM activity WHERE id = ?1", [id], |row| {
            row.get(0)
        })?;

    Ok(Activity {
        id,
        action: action.to_string(),
        entity_type: entity_type.to_string(),
        entry: entry.clone(),
        created_at: parse_created_at(&created_at),
    })
}

impl Database {
    /// Newest-first slice of the audit log.
    pub fn recent_activity(&self, limit: u32) -> Result<Vec<Activity>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, action, type, entry, created_at
                 FROM activity
                 ORDER BY id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit], |row| {
                    let raw_entry: String = row.get(3)?;
                    let raw_created: String = row.get(4)?;
                    Ok(Activity {
                        id: row.get(0)?,
                        action: row.get(1)?,
                        entity_type: row.get(2)?,
                        entry: serde_json::from_str(&raw_entry).unwrap_or_else(|e| {
                            warn!("Corrupt activity entry: {}", e);
                            Value::Null
                        }),
                        created_at: parse_created_at(&raw_created),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_assigns_sequential_ids_from_one() {
        let db = Database::open_in_memory().unwrap();

        let (first, second) = db
            .with_tx(|tx| {
                let entry = json!({ "title": "t", "link": "/boards/b" });
                let first = record(tx, "user", "Created", "board", "board1", &entry)?;
                let second = record(tx, "user", "Updated", "board", "board1", &entry)?;
                Ok((first, second))
            })
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn record_returns_the_stored_shape() {
        let db = Database::open_in_memory().unwrap();

        let entry = json!({ "title": "roadmap", "link": "/boards/abc" });
        let activity = db
            .with_tx(|tx| record(tx, "user", "Created", "board", "abc", &entry))
            .unwrap();

        assert_eq!(activity.action, "Created");
        assert_eq!(activity.entity_type, "board");
        assert_eq!(activity.entry, entry);
    }

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let db = Database::open_in_memory().unwrap();

        db.with_tx(|tx| {
            for i in 0..5 {
                let entry = json!({ "title": format!("board {i}") });
                record(tx, "user", "Created", "board", "b", &entry)?;
            }
            Ok(())
        })
        .unwrap();

        let feed = db.recent_activity(3).unwrap();
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].id, 5);
        assert_eq!(feed[1].id, 4);
        assert_eq!(feed[2].id, 3);
    }

    #[test]
    fn corrupt_entry_reads_as_null_instead_of_failing() {
        let db = Database::open_in_memory().unwrap();

        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO activity (user_id, action, type, entry_id, entry) VALUES ('u', 'Created', 'board', 'b', 'not json')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let feed = db.recent_activity(10).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].entry, Value::Null);
    }
}
