use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// Database row types. These map directly to SQLite rows and stay distinct
/// from the cork-types API models to keep the DB layer independent.
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub hash: String,
    pub salt: String,
    pub created_at: String,
}

/// SQLite's `datetime('now')` writes timestamps without a timezone suffix.
/// Parse those as UTC; RFC 3339 strings pass through unchanged. A corrupt
/// value logs a warning and falls back to the epoch rather than failing
/// the whole read.
pub(crate) fn parse_created_at(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|naive| naive.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at value '{}': {}", raw, e);
            DateTime::default()
        })
}
