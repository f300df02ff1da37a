use rusqlite::{Connection, params};
use serde_json::json;

use cork_types::api::{CardSaved, EntityId, ListSaved};
use cork_types::link;

use crate::Database;
use crate::activity;
use crate::error::{OptionalExt, StoreError};
use crate::ids;

impl Database {
    pub fn update_list(
        &self,
        user_id: &str,
        list_id: &str,
        title: &str,
    ) -> Result<ListSaved, StoreError> {
        self.with_tx(|tx| {
            let board_id = query_list_board(tx, list_id)?
                .ok_or_else(|| StoreError::not_found("list", list_id))?;

            tx.execute(
                "UPDATE lists SET title = ?2 WHERE id = ?1",
                params![list_id, title],
            )?;

            let link = link::list(&board_id, list_id);
            let entry = json!({ "title": title, "link": link });
            let activity = activity::record(tx, user_id, "Updated", "list", list_id, &entry)?;

            Ok(ListSaved {
                id: list_id.to_string(),
                title: title.to_string(),
                link,
                activity,
            })
        })
    }

    /// Removes the list with its cards and their comments. Mirrors board
    /// drop: no activity record, bare id back.
    pub fn drop_list(&self, list_id: &str) -> Result<EntityId, StoreError> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM comments WHERE id IN (
                     SELECT cc.comment_id FROM cards_comments cc
                     JOIN lists_cards lc ON lc.card_id = cc.card_id
                     WHERE lc.list_id = ?1
                 )",
                [list_id],
            )?;
            tx.execute(
                "DELETE FROM cards WHERE id IN (
                     SELECT card_id FROM lists_cards WHERE list_id = ?1
                 )",
                [list_id],
            )?;

            let changed = tx.execute("DELETE FROM lists WHERE id = ?1", [list_id])?;
            if changed == 0 {
                return Err(StoreError::not_found("list", list_id));
            }

            Ok(EntityId {
                id: list_id.to_string(),
            })
        })
    }

    pub fn create_card(
        &self,
        user_id: &str,
        list_id: &str,
        text: &str,
    ) -> Result<CardSaved, StoreError> {
        self.with_tx(|tx| {
            let board_id = query_list_board(tx, list_id)?
                .ok_or_else(|| StoreError::not_found("list", list_id))?;

            let card_id = ids::generate();
            tx.execute(
                "INSERT INTO cards (id, text) VALUES (?1, ?2)",
                params![card_id, text],
            )?;
            tx.execute(
                "INSERT INTO lists_cards (list_id, card_id) VALUES (?1, ?2)",
                params![list_id, card_id],
            )?;

            let link = link::card(&board_id, &card_id);
            let entry = json!({ "text": text, "link": link });
            let activity = activity::record(tx, user_id, "Created", "card", &card_id, &entry)?;

            Ok(CardSaved {
                id: card_id.clone(),
                text: text.to_string(),
                link,
                activity,
            })
        })
    }
}

/// The board a list hangs off, resolved through the join table.
pub(crate) fn query_list_board(
    conn: &Connection,
    list_id: &str,
) -> Result<Option<String>, StoreError> {
    conn.query_row(
        "SELECT board_id FROM boards_lists WHERE list_id = ?1",
        [list_id],
        |row| row.get(0),
    )
    .optional()
}
