//! Defines the cash flow model and its database queries.

use rusqlite::{Connection, Row, params, types::Type};
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    cash_flow::Amount,
    database_id::DatabaseId,
    taxonomy::{CategoryId, FlowTypeId, StatusId, SubCategoryId},
};

/// The ID of a cash flow.
pub type CashFlowId = DatabaseId;

/// How timestamps are written to and read from the database.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

// ============================================================================
// MODELS
// ============================================================================

/// A recorded financial transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashFlow {
    /// The ID of the cash flow.
    pub id: CashFlowId,
    /// When the money moved, in the server's local time.
    pub created_at: PrimitiveDateTime,
    /// The status of the cash flow, e.g. "Paid".
    pub status_id: StatusId,
    /// The type of the cash flow, e.g. "Expense".
    pub type_id: FlowTypeId,
    /// The category of the cash flow, which belongs to its type.
    pub category_id: CategoryId,
    /// The subcategory of the cash flow, which belongs to its category.
    pub subcategory_id: SubCategoryId,
    /// How much money moved.
    pub amount: Amount,
    /// An optional note, at most 500 characters.
    pub comment: Option<String>,
}

/// A validated cash flow that is ready to be inserted or to replace an
/// existing cash flow.
///
/// Use [crate::cash_flow::validate_cash_flow] to build one from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCashFlow {
    /// When the money moved.
    pub created_at: PrimitiveDateTime,
    /// The status ID.
    pub status_id: StatusId,
    /// The type ID.
    pub type_id: FlowTypeId,
    /// The category ID.
    pub category_id: CategoryId,
    /// The subcategory ID.
    pub subcategory_id: SubCategoryId,
    /// How much money moved.
    pub amount: Amount,
    /// An optional, already trimmed note.
    pub comment: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the cash flow table.
///
/// The taxonomy tables must be created first.
///
/// # Errors
/// Returns an error if the table could not be created.
pub fn create_cash_flow_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS cash_flow (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            status_id INTEGER NOT NULL REFERENCES status(id) ON DELETE RESTRICT,
            type_id INTEGER NOT NULL REFERENCES flow_type(id) ON DELETE RESTRICT,
            category_id INTEGER NOT NULL REFERENCES category(id) ON DELETE RESTRICT,
            subcategory_id INTEGER NOT NULL REFERENCES subcategory(id) ON DELETE RESTRICT,
            amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
            comment TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_cash_flow_created_at ON cash_flow(created_at);
        CREATE INDEX IF NOT EXISTS idx_cash_flow_status ON cash_flow(status_id);
        CREATE INDEX IF NOT EXISTS idx_cash_flow_type ON cash_flow(type_id);
        CREATE INDEX IF NOT EXISTS idx_cash_flow_category ON cash_flow(category_id);
        CREATE INDEX IF NOT EXISTS idx_cash_flow_subcategory ON cash_flow(subcategory_id);",
    )
}

/// Format `timestamp` the way it is stored in the database.
///
/// # Errors
/// Returns [Error::InvalidTimestamp] if the timestamp cannot be formatted,
/// e.g. the year has more than four digits.
pub fn format_timestamp(timestamp: PrimitiveDateTime) -> Result<String, Error> {
    timestamp
        .format(TIMESTAMP_FORMAT)
        .map_err(|error| Error::InvalidTimestamp(error.to_string()))
}

/// Create a new cash flow in the database.
///
/// # Errors
/// Returns [Error::SqlError] if a referenced taxonomy entry does not exist or
/// there is some other SQL error.
pub fn create_cash_flow(cash_flow: &NewCashFlow, connection: &Connection) -> Result<CashFlow, Error> {
    let created_at = format_timestamp(cash_flow.created_at)?;

    let cash_flow = connection
        .prepare(
            "INSERT INTO cash_flow
                (created_at, status_id, type_id, category_id, subcategory_id, amount_cents, comment)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, created_at, status_id, type_id, category_id, subcategory_id, amount_cents, comment",
        )?
        .query_row(
            params![
                created_at,
                cash_flow.status_id,
                cash_flow.type_id,
                cash_flow.category_id,
                cash_flow.subcategory_id,
                cash_flow.amount.cents(),
                cash_flow.comment,
            ],
            map_cash_flow_row,
        )?;

    Ok(cash_flow)
}

/// Retrieve a cash flow by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no cash flow with `id`.
pub fn get_cash_flow(id: CashFlowId, connection: &Connection) -> Result<CashFlow, Error> {
    let cash_flow = connection
        .prepare(
            "SELECT id, created_at, status_id, type_id, category_id, subcategory_id, amount_cents, comment
             FROM cash_flow WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_cash_flow_row)?;

    Ok(cash_flow)
}

/// Replace every field of the cash flow `id` with `cash_flow`.
///
/// # Errors
/// Returns [Error::UpdateMissingCashFlow] if there is no cash flow with `id`.
pub fn update_cash_flow(
    id: CashFlowId,
    cash_flow: &NewCashFlow,
    connection: &Connection,
) -> Result<(), Error> {
    let created_at = format_timestamp(cash_flow.created_at)?;

    let rows_affected = connection.execute(
        "UPDATE cash_flow
         SET created_at = ?1,
             status_id = ?2,
             type_id = ?3,
             category_id = ?4,
             subcategory_id = ?5,
             amount_cents = ?6,
             comment = ?7
         WHERE id = ?8",
        params![
            created_at,
            cash_flow.status_id,
            cash_flow.type_id,
            cash_flow.category_id,
            cash_flow.subcategory_id,
            cash_flow.amount.cents(),
            cash_flow.comment,
            id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCashFlow);
    }

    Ok(())
}

/// Delete the cash flow `id`.
///
/// # Errors
/// Returns [Error::DeleteMissingCashFlow] if there is no cash flow with `id`.
pub fn delete_cash_flow(id: CashFlowId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM cash_flow WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCashFlow);
    }

    Ok(())
}

/// Map a row selected as `id, created_at, status_id, type_id, category_id,
/// subcategory_id, amount_cents, comment` (in that order, starting at
/// `offset`) to a [CashFlow].
pub(crate) fn map_cash_flow_columns(row: &Row, offset: usize) -> Result<CashFlow, rusqlite::Error> {
    let raw_created_at: String = row.get(offset + 1)?;
    let created_at = PrimitiveDateTime::parse(&raw_created_at, TIMESTAMP_FORMAT)
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(offset + 1, Type::Text, Box::new(error))
        })?;

    Ok(CashFlow {
        id: row.get(offset)?,
        created_at,
        status_id: row.get(offset + 2)?,
        type_id: row.get(offset + 3)?,
        category_id: row.get(offset + 4)?,
        subcategory_id: row.get(offset + 5)?,
        amount: Amount::from_cents(row.get(offset + 6)?),
        comment: row.get(offset + 7)?,
    })
}

fn map_cash_flow_row(row: &Row) -> Result<CashFlow, rusqlite::Error> {
    map_cash_flow_columns(row, 0)
}
