//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical paste rows keyed by internal row id (`PasteRecord`, bincode-encoded).
pub const PASTES: TableDefinition<u64, &[u8]> = TableDefinition::new("pastes");
/// Unique index from public paste id to internal row id.
pub const PASTE_IDS: TableDefinition<&str, u64> = TableDefinition::new("paste_ids");
/// Expiry index ordered by creation millis then row id.
pub const PASTES_BY_CREATED: TableDefinition<(u64, u64), ()> =
    TableDefinition::new("pastes_by_created");
/// Named monotonic counters.
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Counter holding the last issued paste row id.
pub const PASTE_ROW_SEQUENCE: &str = "paste_row";
