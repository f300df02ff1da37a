use rusqlite::Connection;

use crate::Database;
use crate::error::{OptionalExt, StoreError};
use crate::models::UserRow;

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        hash: &str,
        salt: &str,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, hash, salt) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, username, email, hash, salt],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, email, hash, salt, created_at FROM users WHERE username = ?1",
            )?;

            stmt.query_row([username], |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    hash: row.get(3)?,
                    salt: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .optional()
        })
    }
}

/// Username lookup by id, shaped for use inside an open transaction.
pub(crate) fn query_username(conn: &Connection, user_id: &str) -> Result<Option<String>, StoreError> {
    conn.query_row("SELECT username FROM users WHERE id = ?1", [user_id], |row| row.get(0))
        .optional()
}
