//! Well-known store keys (spec §4.6).
//!
//! Composite keys encode numeric components as big-endian so lexicographic
//! key order matches numeric order, which keepers rely on for range scans
//! (e.g. `ListTables`'s pagination cursor, SPEC_FULL.md's query supplement).

const TABLE_PREFIX: u8 = 0x01;
const NEXT_TABLE_ID_KEY: u8 = 0x02;
const DEALER_EPOCH_KEY: u8 = 0x03;
const DEALER_HAND_PREFIX: u8 = 0x05;

pub fn table_key(table_id: u64) -> Vec<u8> {
    let mut key = vec![TABLE_PREFIX];
    key.extend_from_slice(&table_id.to_be_bytes());
    key
}

pub fn table_prefix() -> Vec<u8> {
    vec![TABLE_PREFIX]
}

pub fn next_table_id_key() -> Vec<u8> {
    vec![NEXT_TABLE_ID_KEY]
}

pub fn dealer_epoch_key() -> Vec<u8> {
    vec![DEALER_EPOCH_KEY]
}

pub fn dealer_hand_key(table_id: u64, hand_id: u64) -> Vec<u8> {
    let mut key = vec![DEALER_HAND_PREFIX];
    key.extend_from_slice(&table_id.to_be_bytes());
    key.extend_from_slice(&hand_id.to_be_bytes());
    key
}

/// Recovers `tableId` from a key produced by [`table_key`]. Used by range
/// scans over the table prefix (`ListTables`).
pub fn table_id_from_key(key: &[u8]) -> Option<u64> {
    if key.len() != 9 || key[0] != TABLE_PREFIX {
        return None;
    }
    Some(u64::from_be_bytes(key[1..9].try_into().unwrap()))
}
