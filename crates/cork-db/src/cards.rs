use rusqlite::{Connection, params};
use serde_json::json;

use cork_types::api::{CardColors, CardDetails, CardSaved, CardSummary, EntityId};
use cork_types::link;

use crate::Database;
use crate::activity;
use crate::comments::query_card_comments;
use crate::error::{OptionalExt, StoreError};

impl Database {
    /// Full card view: text, colors and comments in one shape.
    pub fn find_card(&self, card_id: &str) -> Result<CardDetails, StoreError> {
        self.with_conn(|conn| {
            let (text, board_id) = query_card(conn, card_id)?
                .ok_or_else(|| StoreError::not_found("card", card_id))?;

            Ok(CardDetails {
                id: card_id.to_string(),
                text,
                link: link::card(&board_id, card_id),
                colors: query_colors(conn, card_id)?,
                comments: query_card_comments(conn, card_id)?,
            })
        })
    }

    pub fn update_card(
        &self,
        user_id: &str,
        card_id: &str,
        text: &str,
    ) -> Result<CardSaved, StoreError> {
        self.with_tx(|tx| {
            let (_, board_id) = query_card(tx, card_id)?
                .ok_or_else(|| StoreError::not_found("card", card_id))?;

            tx.execute(
                "UPDATE cards SET text = ?2 WHERE id = ?1",
                params![card_id, text],
            )?;

            let link = link::card(&board_id, card_id);
            let entry = json!({ "text": text, "link": link });
            let activity = activity::record(tx, user_id, "Updated", "card", card_id, &entry)?;

            Ok(CardSaved {
                id: card_id.to_string(),
                text: text.to_string(),
                link,
                activity,
            })
        })
    }

    pub fn drop_card(&self, card_id: &str) -> Result<EntityId, StoreError> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM comments WHERE id IN (
                     SELECT comment_id FROM cards_comments WHERE card_id = ?1
                 )",
                [card_id],
            )?;

            let changed = tx.execute("DELETE FROM cards WHERE id = ?1", [card_id])?;
            if changed == 0 {
                return Err(StoreError::not_found("card", card_id));
            }

            Ok(EntityId {
                id: card_id.to_string(),
            })
        })
    }

    /// Adds a color label. Adding a color the card already carries keeps a
    /// single row.
    pub fn add_card_color(&self, card_id: &str, color: &str) -> Result<CardColors, StoreError> {
        self.with_tx(|tx| {
            card_exists(tx, card_id)?;

            tx.execute(
                "INSERT OR IGNORE INTO card_colors (card_id, color) VALUES (?1, ?2)",
                params![card_id, color],
            )?;

            Ok(CardColors {
                id: card_id.to_string(),
                colors: query_colors(tx, card_id)?,
            })
        })
    }

    /// Removes a color label; removing an absent color is a no-op.
    pub fn remove_card_color(&self, card_id: &str, color: &str) -> Result<CardColors, StoreError> {
        self.with_tx(|tx| {
            card_exists(tx, card_id)?;

            tx.execute(
                "DELETE FROM card_colors WHERE card_id = ?1 AND color = ?2",
                params![card_id, color],
            )?;

            Ok(CardColors {
                id: card_id.to_string(),
                colors: query_colors(tx, card_id)?,
            })
        })
    }

    /// Re-homes the card under another list. A missing card is NotFound; a
    /// missing target list surfaces as the foreign key violation it is. The
    /// returned link is re-derived, so a cross-board move changes it.
    pub fn move_card(&self, card_id: &str, target_list_id: &str) -> Result<CardSummary, StoreError> {
        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE lists_cards SET list_id = ?2 WHERE card_id = ?1",
                params![card_id, target_list_id],
            )?;
            if changed == 0 {
                return Err(StoreError::not_found("card", card_id));
            }

            let (text, board_id) = query_card(tx, card_id)?
                .ok_or_else(|| StoreError::not_found("card", card_id))?;

            Ok(CardSummary {
                id: card_id.to_string(),
                text,
                link: link::card(&board_id, card_id),
            })
        })
    }
}

/// Card text plus the board it resolves to through list membership.
pub(crate) fn query_card(
    conn: &Connection,
    card_id: &str,
) -> Result<Option<(String, String)>, StoreError> {
    conn.query_row(
        "SELECT c.text, bl.board_id
         FROM cards c
         JOIN lists_cards lc ON lc.card_id = c.id
         JOIN boards_lists bl ON bl.list_id = lc.list_id
         WHERE c.id = ?1",
        [card_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

fn query_colors(conn: &Connection, card_id: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT color FROM card_colors WHERE card_id = ?1 ORDER BY color")?;

    let rows = stmt
        .query_map([card_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn card_exists(conn: &Connection, card_id: &str) -> Result<(), StoreError> {
    conn.query_row("SELECT 1 FROM cards WHERE id = ?1", [card_id], |row| {
        row.get::<_, i64>(0)
    })
    .optional()?
    .map(|_| ())
    .ok_or_else(|| StoreError::not_found("card", card_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{count, seed};

    #[test]
    fn find_card_returns_text_colors_and_comments() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.add_card_color(&f.card_id, "red").unwrap();
        db.create_comment(&f.user_id, &f.card_id, "looks good").unwrap();

        let card = db.find_card(&f.card_id).unwrap();
        assert_eq!(card.id, f.card_id);
        assert_eq!(card.text, "test card");
        assert_eq!(card.link, format!("/boards/{}/cards/{}", f.board_id, f.card_id));
        assert_eq!(card.colors, vec!["red"]);

        assert_eq!(card.comments.len(), 1);
        assert_eq!(card.comments[0].text, "looks good");
        assert_eq!(card.comments[0].user.id, f.user_id);
        assert_eq!(card.comments[0].user.username, "test");
    }

    #[test]
    fn find_missing_card_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let err = db.find_card("nosuchcard").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "card", .. }));
    }

    #[test]
    fn update_returns_the_card_with_its_activity() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let card = db.update_card(&f.user_id, &f.card_id, "rewritten").unwrap();
        assert_eq!(card.id, f.card_id);
        assert_eq!(card.text, "rewritten");
        assert_eq!(card.link, format!("/boards/{}/cards/{}", f.board_id, f.card_id));

        assert_eq!(card.activity.id, 1);
        assert_eq!(card.activity.action, "Updated");
        assert_eq!(card.activity.entity_type, "card");
        assert_eq!(card.activity.entry, json!({ "text": "rewritten", "link": card.link }));
    }

    #[test]
    fn update_missing_card_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let err = db.update_card(&f.user_id, "nosuchcard", "x").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "card", .. }));
        assert_eq!(count(&db, "SELECT COUNT(*) FROM activity"), 0);
    }

    #[test]
    fn drop_removes_the_card_and_its_comments() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.create_comment(&f.user_id, &f.card_id, "gone soon").unwrap();

        let dropped = db.drop_card(&f.card_id).unwrap();
        assert_eq!(dropped.id, f.card_id);

        assert_eq!(count(&db, "SELECT COUNT(*) FROM cards"), 0);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM comments"), 0);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM lists_cards"), 0);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM cards_comments"), 0);

        // The list stays put.
        assert_eq!(count(&db, "SELECT COUNT(*) FROM lists"), 1);
    }

    #[test]
    fn drop_twice_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.drop_card(&f.card_id).unwrap();
        let err = db.drop_card(&f.card_id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "card", .. }));
    }

    #[test]
    fn colors_accumulate_sorted_and_deduplicated() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.add_card_color(&f.card_id, "red").unwrap();
        let colors = db.add_card_color(&f.card_id, "green").unwrap();
        assert_eq!(colors.id, f.card_id);
        assert_eq!(colors.colors, vec!["green", "red"]);

        let again = db.add_card_color(&f.card_id, "green").unwrap();
        assert_eq!(again.colors, vec!["green", "red"]);
    }

    #[test]
    fn remove_color_is_a_noop_for_absent_colors() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.add_card_color(&f.card_id, "red").unwrap();

        let colors = db.remove_card_color(&f.card_id, "red").unwrap();
        assert!(colors.colors.is_empty());

        let still_empty = db.remove_card_color(&f.card_id, "blue").unwrap();
        assert!(still_empty.colors.is_empty());
    }

    #[test]
    fn color_ops_on_missing_card_are_not_found() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let err = db.add_card_color("nosuchcard", "red").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "card", .. }));

        let err = db.remove_card_color("nosuchcard", "red").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "card", .. }));
    }

    #[test]
    fn move_to_a_sibling_list_keeps_the_link() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let target = db.create_list(&f.user_id, &f.board_id, "done").unwrap();
        let card = db.move_card(&f.card_id, &target.id).unwrap();

        assert_eq!(card.id, f.card_id);
        assert_eq!(card.text, "test card");
        assert_eq!(card.link, format!("/boards/{}/cards/{}", f.board_id, f.card_id));

        let moved = count(
            &db,
            &format!(
                "SELECT COUNT(*) FROM lists_cards WHERE card_id = '{}' AND list_id = '{}'",
                f.card_id, target.id
            ),
        );
        assert_eq!(moved, 1);
    }

    #[test]
    fn move_across_boards_rewrites_the_link() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let target = db.create_list(&f.user_id, &f.board2_id, "elsewhere").unwrap();
        let card = db.move_card(&f.card_id, &target.id).unwrap();

        assert_eq!(card.link, format!("/boards/{}/cards/{}", f.board2_id, f.card_id));
    }

    #[test]
    fn move_missing_card_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let err = db.move_card("nosuchcard", &f.list_id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "card", .. }));
    }

    #[test]
    fn move_to_a_missing_list_is_a_constraint_violation() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let err = db.move_card(&f.card_id, "nosuchlist").unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        // The card still sits in its original list.
        let unchanged = count(
            &db,
            &format!(
                "SELECT COUNT(*) FROM lists_cards WHERE card_id = '{}' AND list_id = '{}'",
                f.card_id, f.list_id
            ),
        );
        assert_eq!(unchanged, 1);
    }
}
