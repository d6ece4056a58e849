//! Read-only `GetTable`/`ListTables` query projections (SPEC_FULL.md
//! supplement to spec.md §6, which names these queries without detailing
//! their shape). Never exposes a seat's private `pkPlayer` or another
//! player's unrevealed hole cards.

use crate::config::{MAX_SEATS, SENTINEL_U8};
use crate::poker::types::{Phase, Street, Table};
use crate::store::keys;
use crate::store::kv::Store;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatView {
    pub occupied: bool,
    pub player: String,
    pub stack: u64,
    pub bond: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableView {
    pub table_id: u64,
    pub label: String,
    pub small_blind: u64,
    pub big_blind: u64,
    pub seats: [SeatView; MAX_SEATS],
    pub button_seat: i8,
    pub next_hand_id: u64,
    pub active_hand_id: Option<u64>,
    pub phase: Option<Phase>,
    pub street: Option<Street>,
    pub board: Vec<u8>,
}

impl TableView {
    pub fn from_table(t: &Table) -> Self {
        let seats = std::array::from_fn(|i| {
            let seat = &t.seats[i];
            SeatView { occupied: !seat.is_empty(), player: seat.player.clone(), stack: seat.stack, bond: seat.bond }
        });
        TableView {
            table_id: t.table_id,
            label: t.params.label.clone(),
            small_blind: t.params.small_blind,
            big_blind: t.params.big_blind,
            seats,
            button_seat: t.button_seat,
            next_hand_id: t.next_hand_id,
            active_hand_id: t.hand.as_ref().map(|h| h.hand_id),
            phase: t.hand.as_ref().map(|h| h.phase),
            street: t.hand.as_ref().map(|h| h.street),
            board: t.hand.as_ref().map(|h| h.board.clone()).unwrap_or_default(),
        }
    }
}

pub struct ListTablesPage {
    pub tables: Vec<TableView>,
    /// `Some(tableId)` to pass as `after_table_id` on the next call, if more
    /// tables remain past this page.
    pub next_cursor: Option<u64>,
}

pub fn get_table(store: &dyn Store, table_id: u64) -> Option<TableView> {
    let bytes = store.get(&keys::table_key(table_id))?;
    Table::from_bytes(&bytes).ok().map(|t| TableView::from_table(&t))
}

/// Paginates by `tableId` ascending, since a long-running chain can
/// accumulate many tables (SPEC_FULL.md supplement).
pub fn list_tables(store: &dyn Store, after_table_id: Option<u64>, limit: usize) -> ListTablesPage {
    let entries = store.prefix_scan(&keys::table_prefix());
    let mut tables = Vec::new();
    let mut next_cursor = None;

    for (key, value) in entries {
        let Some(id) = keys::table_id_from_key(&key) else { continue };
        if let Some(after) = after_table_id {
            if id <= after {
                continue;
            }
        }
        if tables.len() == limit {
            next_cursor = Some(id);
            break;
        }
        if let Ok(t) = Table::from_bytes(&value) {
            tables.push(TableView::from_table(&t));
        }
    }

    ListTablesPage { tables, next_cursor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poker::table;
    use crate::poker::types::TableParams;
    use crate::store::kv::InMemoryStore;

    fn params() -> TableParams {
        TableParams {
            max_players: 9,
            small_blind: 1,
            big_blind: 2,
            min_buy_in: 40,
            max_buy_in: 200,
            action_timeout_secs: 30,
            dealer_timeout_secs: 30,
            player_bond: 0,
            rake_bps: 0,
            label: "main".to_string(),
            password_hash: None,
        }
    }

    #[test]
    fn list_tables_paginates_in_table_id_order() {
        let mut store = InMemoryStore::new();
        for id in 1..=3u64 {
            let (t, _) = table::create_table(id, "alice".to_string(), params()).unwrap();
            store.set(&keys::table_key(id), t.to_bytes());
        }

        let page = list_tables(&store, None, 2);
        assert_eq!(page.tables.iter().map(|t| t.table_id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(page.next_cursor, Some(2));

        let page2 = list_tables(&store, page.next_cursor, 2);
        assert_eq!(page2.tables.iter().map(|t| t.table_id).collect::<Vec<_>>(), vec![3]);
        assert_eq!(page2.next_cursor, None);
    }

    #[test]
    fn get_table_returns_none_for_missing_id() {
        let store = InMemoryStore::new();
        assert!(get_table(&store, 42).is_none());
    }

    #[test]
    fn seat_view_never_exposes_pk_player() {
        let mut store = InMemoryStore::new();
        let (t, _) = table::create_table(1, "alice".to_string(), params()).unwrap();
        store.set(&keys::table_key(1), t.to_bytes());
        let view = get_table(&store, 1).unwrap();
        assert_eq!(view.seats.len(), MAX_SEATS);
        let _ = SENTINEL_U8;
    }
}
