use std::collections::HashMap;

use rusqlite::{Connection, params};
use serde_json::json;

use cork_types::api::{
    BoardDetails, BoardSaved, BoardSummary, CardSummary, EntityId, ListDetails, ListSaved,
};
use cork_types::link;

use crate::Database;
use crate::activity;
use crate::error::{OptionalExt, StoreError};
use crate::ids;

impl Database {
    pub fn create_board(&self, user_id: &str, title: &str) -> Result<BoardSaved, StoreError> {
        let board_id = ids::generate();

        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO boards (id, title) VALUES (?1, ?2)",
                params![board_id, title],
            )?;
            tx.execute(
                "INSERT INTO users_boards (user_id, board_id) VALUES (?1, ?2)",
                params![user_id, board_id],
            )?;

            let link = link::board(&board_id);
            let entry = json!({ "title": title, "link": link });
            let activity = activity::record(tx, user_id, "Created", "board", &board_id, &entry)?;

            Ok(BoardSaved {
                id: board_id.clone(),
                title: title.to_string(),
                link,
                activity,
            })
        })
    }

    pub fn update_board(
        &self,
        user_id: &str,
        board_id: &str,
        title: &str,
    ) -> Result<BoardSaved, StoreError> {
        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE boards SET title = ?2 WHERE id = ?1",
                params![board_id, title],
            )?;
            if changed == 0 {
                return Err(StoreError::not_found("board", board_id));
            }

            let link = link::board(board_id);
            let entry = json!({ "title": title, "link": link });
            let activity = activity::record(tx, user_id, "Updated", "board", board_id, &entry)?;

            Ok(BoardSaved {
                id: board_id.to_string(),
                title: title.to_string(),
                link,
                activity,
            })
        })
    }

    /// Deletes the board and everything under it. SQLite cascades only
    /// remove join rows, so list, card and comment rows are deleted
    /// explicitly, children before parents.
    pub fn drop_board(&self, board_id: &str) -> Result<EntityId, StoreError> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM comments WHERE id IN (
                     SELECT cc.comment_id FROM cards_comments cc
                     JOIN lists_cards lc ON lc.card_id = cc.card_id
                     JOIN boards_lists bl ON bl.list_id = lc.list_id
                     WHERE bl.board_id = ?1
                 )",
                [board_id],
            )?;
            tx.execute(
                "DELETE FROM cards WHERE id IN (
                     SELECT lc.card_id FROM lists_cards lc
                     JOIN boards_lists bl ON bl.list_id = lc.list_id
                     WHERE bl.board_id = ?1
                 )",
                [board_id],
            )?;
            tx.execute(
                "DELETE FROM lists WHERE id IN (
                     SELECT list_id FROM boards_lists WHERE board_id = ?1
                 )",
                [board_id],
            )?;

            let changed = tx.execute("DELETE FROM boards WHERE id = ?1", [board_id])?;
            if changed == 0 {
                return Err(StoreError::not_found("board", board_id));
            }

            Ok(EntityId {
                id: board_id.to_string(),
            })
        })
    }

    pub fn create_list(
        &self,
        user_id: &str,
        board_id: &str,
        title: &str,
    ) -> Result<ListSaved, StoreError> {
        self.with_tx(|tx| {
            // Resolve the parent first so a bad board id reads as NotFound
            // rather than a foreign key failure.
            query_board_title(tx, board_id)?
                .ok_or_else(|| StoreError::not_found("board", board_id))?;

            let list_id = ids::generate();
            tx.execute(
                "INSERT INTO lists (id, title) VALUES (?1, ?2)",
                params![list_id, title],
            )?;
            tx.execute(
                "INSERT INTO boards_lists (board_id, list_id) VALUES (?1, ?2)",
                params![board_id, list_id],
            )?;

            let link = link::list(board_id, &list_id);
            let entry = json!({ "title": title, "link": link });
            let activity = activity::record(tx, user_id, "Created", "list", &list_id, &entry)?;

            Ok(ListSaved {
                id: list_id.clone(),
                title: title.to_string(),
                link,
                activity,
            })
        })
    }

    /// Full board view: lists in creation order, each carrying its cards.
    pub fn find_board(&self, board_id: &str) -> Result<BoardDetails, StoreError> {
        self.with_conn(|conn| {
            let title = query_board_title(conn, board_id)?
                .ok_or_else(|| StoreError::not_found("board", board_id))?;

            let lists = query_lists(conn, board_id)?;
            let cards = query_board_cards(conn, board_id)?;

            // Group cards under their list in one pass.
            let mut by_list: HashMap<String, Vec<CardSummary>> = HashMap::new();
            for (list_id, card_id, text) in cards {
                let link = link::card(board_id, &card_id);
                by_list.entry(list_id).or_default().push(CardSummary {
                    id: card_id,
                    text,
                    link,
                });
            }

            let mut out = Vec::with_capacity(lists.len());
            for (list_id, list_title) in lists {
                let cards = by_list.remove(&list_id).unwrap_or_default();
                let link = link::list(board_id, &list_id);
                out.push(ListDetails {
                    id: list_id,
                    title: list_title,
                    link,
                    cards,
                });
            }

            Ok(BoardDetails {
                id: board_id.to_string(),
                title,
                link: link::board(board_id),
                lists: out,
            })
        })
    }

    /// Overview of every non-archived board the user owns, with derived
    /// list and card counters and the caller's star flag.
    pub fn find_boards_by_user(&self, user_id: &str) -> Result<Vec<BoardSummary>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT b.id, b.title,
                        (SELECT COUNT(*) FROM boards_lists bl WHERE bl.board_id = b.id),
                        (SELECT COUNT(*) FROM boards_lists bl
                         JOIN lists_cards lc ON lc.list_id = bl.list_id
                         WHERE bl.board_id = b.id),
                        EXISTS (SELECT 1 FROM users_starred_boards sb
                                WHERE sb.board_id = b.id AND sb.user_id = ?1)
                 FROM boards b
                 JOIN users_boards ub ON ub.board_id = b.id
                 WHERE ub.user_id = ?1 AND b.archived = 0
                 ORDER BY b.created_at, b.rowid",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    let id: String = row.get(0)?;
                    let link = link::board(&id);
                    Ok(BoardSummary {
                        id,
                        title: row.get(1)?,
                        link,
                        lists_length: row.get(2)?,
                        cards_length: row.get(3)?,
                        starred: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Archive hides the board from the overview without touching its
    /// contents. Unlike drop it is reversible, and it writes no activity
    /// record.
    pub fn archive_board(&self, board_id: &str) -> Result<EntityId, StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute("UPDATE boards SET archived = 1 WHERE id = ?1", [board_id])?;
            if changed == 0 {
                return Err(StoreError::not_found("board", board_id));
            }

            Ok(EntityId {
                id: board_id.to_string(),
            })
        })
    }

    /// Stars the board for the user and returns the refreshed summary.
    /// Starring twice keeps a single star row; every call still lands in
    /// the audit log.
    pub fn star_board(&self, user_id: &str, board_id: &str) -> Result<BoardSummary, StoreError> {
        self.with_tx(|tx| {
            let title = query_board_title(tx, board_id)?
                .ok_or_else(|| StoreError::not_found("board", board_id))?;

            tx.execute(
                "INSERT OR IGNORE INTO users_starred_boards (user_id, board_id) VALUES (?1, ?2)",
                params![user_id, board_id],
            )?;

            let link = link::board(board_id);
            let entry = json!({ "title": title, "link": link });
            activity::record(tx, user_id, "Starred", "board", board_id, &entry)?;

            let (lists_length, cards_length) = query_board_counts(tx, board_id)?;

            Ok(BoardSummary {
                id: board_id.to_string(),
                title,
                link,
                lists_length,
                cards_length,
                starred: true,
            })
        })
    }
}

fn query_board_title(conn: &Connection, board_id: &str) -> Result<Option<String>, StoreError> {
    conn.query_row("SELECT title FROM boards WHERE id = ?1", [board_id], |row| row.get(0))
        .optional()
}

fn query_board_counts(conn: &Connection, board_id: &str) -> Result<(i64, i64), StoreError> {
    let counts = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM boards_lists bl WHERE bl.board_id = ?1),
                (SELECT COUNT(*) FROM boards_lists bl
                 JOIN lists_cards lc ON lc.list_id = bl.list_id
                 WHERE bl.board_id = ?1)",
        [board_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(counts)
}

fn query_lists(conn: &Connection, board_id: &str) -> Result<Vec<(String, String)>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.title
         FROM lists l
         JOIN boards_lists bl ON bl.list_id = l.id
         WHERE bl.board_id = ?1
         ORDER BY l.created_at, l.rowid",
    )?;

    let rows = stmt
        .query_map([board_id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_board_cards(
    conn: &Connection,
    board_id: &str,
) -> Result<Vec<(String, String, String)>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT lc.list_id, c.id, c.text
         FROM cards c
         JOIN lists_cards lc ON lc.card_id = c.id
         JOIN boards_lists bl ON bl.list_id = lc.list_id
         WHERE bl.board_id = ?1
         ORDER BY c.created_at, c.rowid",
    )?;

    let rows = stmt
        .query_map([board_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{count, seed};

    #[test]
    fn create_board_links_owner_and_records_activity() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let board = db.create_board(&f.user_id, "roadmap").unwrap();
        assert!(ids::is_valid(&board.id));
        assert_eq!(board.title, "roadmap");
        assert_eq!(board.link, format!("/boards/{}", board.id));
        assert_eq!(board.activity.action, "Created");
        assert_eq!(board.activity.entity_type, "board");

        let owned = count(
            &db,
            &format!(
                "SELECT COUNT(*) FROM users_boards WHERE user_id = '{}' AND board_id = '{}'",
                f.user_id, board.id
            ),
        );
        assert_eq!(owned, 1);
    }

    #[test]
    fn create_board_for_unknown_user_is_a_constraint_violation() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let err = db.create_board("ghostghost", "roadmap").unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(count(&db, "SELECT COUNT(*) FROM activity"), 0);
    }

    #[test]
    fn update_returns_the_board_with_its_activity() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let board = db
            .update_board(&f.user_id, &f.board_id, "updated title")
            .unwrap();

        assert_eq!(board.id, f.board_id);
        assert_eq!(board.title, "updated title");
        assert_eq!(board.link, format!("/boards/{}", f.board_id));

        assert_eq!(board.activity.id, 1);
        assert_eq!(board.activity.action, "Updated");
        assert_eq!(board.activity.entity_type, "board");
        assert_eq!(
            board.activity.entry,
            serde_json::json!({
                "title": "updated title",
                "link": format!("/boards/{}", f.board_id),
            })
        );
    }

    #[test]
    fn update_is_visible_to_reads() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.update_board(&f.user_id, &f.board_id, "renamed").unwrap();

        let board = db.find_board(&f.board_id).unwrap();
        assert_eq!(board.title, "renamed");
        assert_eq!(
            count(&db, "SELECT COUNT(*) FROM activity WHERE action = 'Updated' AND type = 'board'"),
            1
        );
    }

    #[test]
    fn update_missing_board_is_not_found_and_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let err = db.update_board(&f.user_id, "nosuchboard", "x").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "board", .. }));
        assert_eq!(count(&db, "SELECT COUNT(*) FROM activity"), 0);
    }

    #[test]
    fn drop_removes_the_board_and_its_children() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        // Attach a comment so the whole chain is exercised.
        db.with_conn(|conn| {
            conn.execute_batch(&format!(
                "INSERT INTO comments (id, text) VALUES ('commentaaa', 'hi');
                 INSERT INTO cards_comments (card_id, comment_id) VALUES ('{c}', 'commentaaa');
                 INSERT INTO users_comments (user_id, comment_id) VALUES ('{u}', 'commentaaa');",
                c = f.card_id,
                u = f.user_id,
            ))?;
            Ok(())
        })
        .unwrap();

        let dropped = db.drop_board(&f.board_id).unwrap();
        assert_eq!(dropped.id, f.board_id);

        for table in [
            "lists",
            "cards",
            "comments",
            "boards_lists",
            "lists_cards",
            "cards_comments",
            "users_comments",
            "users_boards",
        ] {
            let emptied = count(&db, &format!("SELECT COUNT(*) FROM {table}"));
            assert_eq!(emptied, 0, "{table} not emptied");
        }

        // The unowned second board survives.
        assert_eq!(count(&db, "SELECT COUNT(*) FROM boards"), 1);
    }

    #[test]
    fn drop_writes_no_activity() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.drop_board(&f.board_id).unwrap();
        assert_eq!(count(&db, "SELECT COUNT(*) FROM activity"), 0);
    }

    #[test]
    fn drop_twice_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.drop_board(&f.board2_id).unwrap();
        let err = db.drop_board(&f.board2_id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "board", .. }));
    }

    #[test]
    fn create_list_relates_to_its_board() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let list = db.create_list(&f.user_id, &f.board_id, "backlog").unwrap();
        assert!(ids::is_valid(&list.id));
        assert_eq!(list.title, "backlog");
        assert_eq!(list.link, format!("/boards/{}/lists/{}", f.board_id, list.id));

        assert_eq!(list.activity.action, "Created");
        assert_eq!(list.activity.entity_type, "list");
        assert_eq!(
            list.activity.entry,
            serde_json::json!({ "title": "backlog", "link": list.link })
        );

        let related = count(
            &db,
            &format!(
                "SELECT COUNT(*) FROM boards_lists WHERE board_id = '{}' AND list_id = '{}'",
                f.board_id, list.id
            ),
        );
        assert_eq!(related, 1);
    }

    #[test]
    fn create_list_on_missing_board_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let err = db.create_list(&f.user_id, "nosuchboard", "backlog").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "board", .. }));
        assert_eq!(count(&db, "SELECT COUNT(*) FROM lists"), 1);
    }

    #[test]
    fn find_board_nests_lists_and_cards() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let board = db.find_board(&f.board_id).unwrap();
        assert_eq!(board.id, f.board_id);
        assert_eq!(board.title, "test board");
        assert_eq!(board.link, format!("/boards/{}", f.board_id));

        assert_eq!(board.lists.len(), 1);
        let list = &board.lists[0];
        assert_eq!(list.id, f.list_id);
        assert_eq!(list.title, "test list");
        assert_eq!(list.link, format!("/boards/{}/lists/{}", f.board_id, f.list_id));

        assert_eq!(list.cards.len(), 1);
        let card = &list.cards[0];
        assert_eq!(card.id, f.card_id);
        assert_eq!(card.text, "test card");
        assert_eq!(card.link, format!("/boards/{}/cards/{}", f.board_id, f.card_id));
    }

    #[test]
    fn find_missing_board_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let err = db.find_board("nosuchboard").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "board", .. }));
    }

    #[test]
    fn find_all_returns_only_the_users_boards() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let boards = db.find_boards_by_user(&f.user_id).unwrap();
        assert_eq!(boards.len(), 1);

        let board = &boards[0];
        assert_eq!(board.id, f.board_id);
        assert_eq!(board.title, "test board");
        assert_eq!(board.link, format!("/boards/{}", f.board_id));
        assert_eq!(board.lists_length, 1);
        assert_eq!(board.cards_length, 1);
        assert!(!board.starred);
    }

    #[test]
    fn find_all_counters_track_new_children() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let list = db.create_list(&f.user_id, &f.board_id, "doing").unwrap();
        db.create_card(&f.user_id, &list.id, "task one").unwrap();
        db.create_card(&f.user_id, &list.id, "task two").unwrap();

        let boards = db.find_boards_by_user(&f.user_id).unwrap();
        let board = boards.iter().find(|b| b.id == f.board_id).unwrap();
        assert_eq!(board.lists_length, 2);
        assert_eq!(board.cards_length, 3);
    }

    #[test]
    fn find_all_excludes_archived_boards() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.archive_board(&f.board_id).unwrap();
        let boards = db.find_boards_by_user(&f.user_id).unwrap();
        assert!(boards.is_empty());
    }

    #[test]
    fn archive_returns_only_the_id_and_writes_no_activity() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let archived = db.archive_board(&f.board_id).unwrap();
        assert_eq!(archived.id, f.board_id);

        let flag = count(
            &db,
            &format!("SELECT archived FROM boards WHERE id = '{}'", f.board_id),
        );
        assert_eq!(flag, 1);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM activity"), 0);
    }

    #[test]
    fn archive_missing_board_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let err = db.archive_board("nosuchboard").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "board", .. }));
    }

    #[test]
    fn star_returns_the_summary_with_starred_set() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let board = db.star_board(&f.user_id, &f.board_id).unwrap();
        assert_eq!(board.id, f.board_id);
        assert_eq!(board.title, "test board");
        assert_eq!(board.link, format!("/boards/{}", f.board_id));
        assert_eq!(board.lists_length, 1);
        assert_eq!(board.cards_length, 1);
        assert!(board.starred);
    }

    #[test]
    fn star_records_activity_keyed_to_the_board() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.star_board(&f.user_id, &f.board_id).unwrap();

        let starred = count(
            &db,
            &format!(
                "SELECT COUNT(*) FROM activity WHERE action = 'Starred' AND entry_id = '{}'",
                f.board_id
            ),
        );
        assert_eq!(starred, 1);
    }

    #[test]
    fn star_twice_keeps_one_star_row() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.star_board(&f.user_id, &f.board_id).unwrap();
        let board = db.star_board(&f.user_id, &f.board_id).unwrap();
        assert!(board.starred);

        assert_eq!(count(&db, "SELECT COUNT(*) FROM users_starred_boards"), 1);
        // The audit log still sees both calls.
        assert_eq!(count(&db, "SELECT COUNT(*) FROM activity WHERE action = 'Starred'"), 2);
    }

    #[test]
    fn star_shows_up_in_the_overview() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        db.star_board(&f.user_id, &f.board_id).unwrap();
        let boards = db.find_boards_by_user(&f.user_id).unwrap();
        assert!(boards[0].starred);
    }

    #[test]
    fn star_missing_board_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let f = seed(&db);

        let err = db.star_board(&f.user_id, "nosuchboard").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "board", .. }));
        assert_eq!(count(&db, "SELECT COUNT(*) FROM activity"), 0);
    }
}
