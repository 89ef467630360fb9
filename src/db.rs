/*! Bootstraps the application's SQLite database. */

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{cash_flow::create_cash_flow_table, taxonomy::create_taxonomy_tables};

/// Create the tables for the taxonomies and cash flows if they do not exist.
///
/// Foreign key enforcement is turned on for `connection` as well, since
/// SQLite leaves it off by default and the referential rules for cash flows
/// depend on it.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_taxonomy_tables(&transaction)?;
    create_cash_flow_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
