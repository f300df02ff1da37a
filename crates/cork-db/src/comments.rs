use rusqlite::{Connection, params};
use serde_json::json;

use cork_types::api::{CommentDetails, CommentSaved, UserSummary};
use cork_types::link;

use crate::Database;
use crate::activity;
use crate::cards::query_card;
use crate::error::StoreError;
use crate::ids;
use crate::models::parse_created_at;
use crate::users::query_username;

impl Database {
    pub fn create_comment(
        &self,
        user_id: &str,
        card_id: &str,
        text: &str,
    ) -> Result<CommentSaved, StoreError> {
        self.with_tx(|tx| {
            let (_, board_id) = query_card(tx, card_id)?
                .ok_or_else(|| StoreError::not_found("card", card_id))?;
            let username = query_username(tx, user_id)?
                .ok_or_else(|| StoreError::not_found("user", user_id))?;

            let comment_id = ids::generate();
            tx.execute(
                "INSERT INTO comments (id, text) VALUES (?1, ?2)",
                params![comment_id, text],
            )?;
            tx.execute(
                "INSERT INTO cards_comments (card_id, comment_id) VALUES (?1, ?2)",
                params![card_id, comment_id],
            )?;
            tx.execute(
                "INSERT INTO users_comments (user_id, comment_id) VALUES (?1, ?2)",
                params![user_id, comment_id],
            )?;

            let created_at: String = tx.query_row(
                "SELECT created_at FROM comments WHERE id = ?1",
                [&comment_id],
                |row| row.get(0),
            )?;

            // The entry links to the card the comment landed on.
            let card_link = link::card(&board_id, card_id);
            let entry = json!({ "text": text, "link": card_link });
            let activity = activity::record(tx, user_id, "Created", "comment", &comment_id, &entry)?;

            Ok(CommentSaved {
                id: comment_id.clone(),
                text: text.to_string(),
                created_at: parse_created_at(&created_at),
                user: UserSummary {
                    id: user_id.to_string(),
                    username,
                },
                activity,
            })
        })
    }
}

/// Comments on a card in creation order, each with its author. An author
/// row can be missing once a user is deleted; the comment then reads as
/// written by "unknown".
pub(crate) fn query_card_comments(
    conn: &Connection,
    card_id: &str,
) -> Result<Vec<CommentDetails>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT cm.id, cm.text, cm.created_at, u.id, u.username
         FROM comments cm
         JOIN cards_comments cc ON cc.comment_id = cm.id
         LEFT JOIN users_comments uc ON uc.comment_id = cm.id
         LEFT JOIN users u ON u.id = uc.user_id
         WHERE cc.card_id = ?1
         ORDER BY cm.created_at, cm.rowid",
    )?;

    let rows = stmt
        .query_map([card_id], |row| {
            let raw_created: String = row.get(2)?;
            Ok(CommentDetails {
                id: row.get(0)?,
                text: row.get(1)?,
                created_at: parse_created_at(&raw_created),
                user: UserSummary {
                    id: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    username: row
                        .get::<_, Option<String>>(4)?
                        .unwrap_or_else(|| "unknown".to_string()),
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}
