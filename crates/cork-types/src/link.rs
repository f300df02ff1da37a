//! Canonical client-facing paths for board entities.
//!
//! Links are derived at read time from the entity's ids, never stored, so a
//! renamed or moved entity can never carry a stale path.

/// `/boards/{board_id}`
pub fn board(board_id: &str) -> String {
    format!("/boards/{board_id}")
}

/// `/boards/{board_id}/lists/{list_id}`
pub fn list(board_id: &str, list_id: &str) -> String {
    format!("/boards/{board_id}/lists/{list_id}")
}

/// `/boards/{board_id}/cards/{card_id}`
///
/// Cards address through their board rather than their list, so moving a
/// card between lists of one board keeps its link stable.
pub fn card(board_id: &str, card_id: &str) -> String {
    format!("/boards/{board_id}/cards/{card_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_link_shape() {
        assert_eq!(board("b1a2c3d4e5"), "/boards/b1a2c3d4e5");
    }

    #[test]
    fn list_link_nests_under_board() {
        assert_eq!(list("b1a2c3d4e5", "l1a2c3d4e5"), "/boards/b1a2c3d4e5/lists/l1a2c3d4e5");
    }

    #[test]
    fn card_link_skips_the_list_segment() {
        assert_eq!(card("b1a2c3d4e5", "c1a2c3d4e5"), "/boards/b1a2c3d4e5/cards/c1a2c3d4e5");
    }
}
