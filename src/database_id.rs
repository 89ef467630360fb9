//! Database ID type definition.

/// Alias for the integer type used for mapping to database IDs.
///
/// SQLite row IDs are 64-bit signed integers, so every table in the ledger
/// uses this type for its primary and foreign keys.
pub type DatabaseId = i64;
