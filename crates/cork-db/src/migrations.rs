use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;

pub fn run(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL UNIQUE,
            hash        TEXT NOT NULL,
            salt        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS boards (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            archived    INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS lists (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS cards (
            id          TEXT PRIMARY KEY,
            text        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            text        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Ownership is many-to-many; a board can be shared later without a
        -- schema change.
        CREATE TABLE IF NOT EXISTS users_boards (
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            board_id    TEXT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, board_id)
        );

        CREATE TABLE IF NOT EXISTS users_starred_boards (
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            board_id    TEXT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, board_id)
        );

        -- A list hangs off exactly one board: the list id is the key.
        CREATE TABLE IF NOT EXISTS boards_lists (
            board_id    TEXT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            list_id     TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
            PRIMARY KEY (list_id)
        );

        CREATE INDEX IF NOT EXISTS idx_boards_lists_board
            ON boards_lists(board_id);

        -- Same shape for cards: one list per card.
        CREATE TABLE IF NOT EXISTS lists_cards (
            list_id     TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
            card_id     TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
            PRIMARY KEY (card_id)
        );

        CREATE INDEX IF NOT EXISTS idx_lists_cards_list
            ON lists_cards(list_id);

        CREATE TABLE IF NOT EXISTS cards_comments (
            card_id     TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
            comment_id  TEXT NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
            PRIMARY KEY (comment_id)
        );

        CREATE INDEX IF NOT EXISTS idx_cards_comments_card
            ON cards_comments(card_id);

        CREATE TABLE IF NOT EXISTS users_comments (
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            comment_id  TEXT NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
            PRIMARY KEY (comment_id)
        );

        CREATE TABLE IF NOT EXISTS card_colors (
            card_id     TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
            color       TEXT NOT NULL,
            PRIMARY KEY (card_id, color)
        );

        -- Audit rows carry no foreign keys: the log must keep records for
        -- users and entities that have since been deleted.
        CREATE TABLE IF NOT EXISTS activity (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT NOT NULL,
            action      TEXT NOT NULL,
            type        TEXT NOT NULL,
            entry_id    TEXT NOT NULL,
            entry       TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
