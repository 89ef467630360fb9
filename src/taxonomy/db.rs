//! Database operations for statuses, types, categories and subcategories.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, Row, ffi};

use crate::{
    Error,
    database_id::DatabaseId,
    taxonomy::{
        Category, CategoryId, FlowType, FlowTypeId, Status, StatusId, SubCategory, SubCategoryId,
        TaxonomyKind, TaxonomyName,
    },
};

/// Initialize the taxonomy tables and indexes.
///
/// Categories and subcategories are removed along with their parent.
/// Whether a parent may be deleted at all is decided by the references from
/// the `cash_flow` table.
pub fn create_taxonomy_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS status (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE
        );

        CREATE TABLE IF NOT EXISTS flow_type (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE
        );

        CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE,
            type_id INTEGER NOT NULL REFERENCES flow_type(id) ON DELETE CASCADE,
            UNIQUE(type_id, name)
        );

        CREATE TABLE IF NOT EXISTS subcategory (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE,
            category_id INTEGER NOT NULL REFERENCES category(id) ON DELETE CASCADE,
            UNIQUE(category_id, name)
        );

        CREATE INDEX IF NOT EXISTS idx_category_type_id ON category(type_id);
        CREATE INDEX IF NOT EXISTS idx_subcategory_category_id ON subcategory(category_id);",
    )?;

    Ok(())
}

fn table_name(kind: TaxonomyKind) -> &'static str {
    match kind {
        TaxonomyKind::Status => "status",
        TaxonomyKind::Type => "flow_type",
        TaxonomyKind::Category => "category",
        TaxonomyKind::SubCategory => "subcategory",
    }
}

fn parent_column(kind: TaxonomyKind) -> Option<&'static str> {
    match kind {
        TaxonomyKind::Status | TaxonomyKind::Type => None,
        TaxonomyKind::Category => Some("type_id"),
        TaxonomyKind::SubCategory => Some("category_id"),
    }
}

/// Counts the cash flows that use an entry, including through its children.
fn reference_count_query(kind: TaxonomyKind) -> &'static str {
    match kind {
        TaxonomyKind::Status => "SELECT COUNT(1) FROM cash_flow WHERE status_id = ?1",
        TaxonomyKind::Type => {
            "SELECT COUNT(1) FROM cash_flow
            WHERE type_id = ?1
                OR category_id IN (SELECT id FROM category WHERE type_id = ?1)
                OR subcategory_id IN (
                    SELECT subcategory.id FROM subcategory
                    INNER JOIN category ON subcategory.category_id = category.id
                    WHERE category.type_id = ?1
                )"
        }
        TaxonomyKind::Category => {
            "SELECT COUNT(1) FROM cash_flow
            WHERE category_id = ?1
                OR subcategory_id IN (SELECT id FROM subcategory WHERE category_id = ?1)"
        }
        TaxonomyKind::SubCategory => "SELECT COUNT(1) FROM cash_flow WHERE subcategory_id = ?1",
    }
}

fn is_constraint_violation(error: &rusqlite::Error, extended_code: i32) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == extended_code
    )
}

/// Translate constraint violations on insert/update into domain errors.
fn map_write_error(
    kind: TaxonomyKind,
    name: &TaxonomyName,
    parent_id: Option<DatabaseId>,
    error: rusqlite::Error,
) -> Error {
    if is_constraint_violation(&error, ffi::SQLITE_CONSTRAINT_UNIQUE) {
        Error::DuplicateName {
            kind,
            name: name.to_string(),
        }
    } else if is_constraint_violation(&error, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
        Error::InvalidParent(kind, parent_id.unwrap_or_default())
    } else {
        error.into()
    }
}

fn insert_entry(
    kind: TaxonomyKind,
    name: &TaxonomyName,
    parent_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<DatabaseId, Error> {
    let table = table_name(kind);
    let result = match parent_column(kind) {
        Some(column) => connection.execute(
            &format!("INSERT INTO {table} (name, {column}) VALUES (?1, ?2);"),
            (name.as_ref(), parent_id),
        ),
        None => connection.execute(
            &format!("INSERT INTO {table} (name) VALUES (?1);"),
            (name.as_ref(),),
        ),
    };

    result.map_err(|error| map_write_error(kind, name, parent_id, error))?;

    Ok(connection.last_insert_rowid())
}

fn update_entry(
    kind: TaxonomyKind,
    id: DatabaseId,
    name: &TaxonomyName,
    parent_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<(), Error> {
    let table = table_name(kind);
    let result = match parent_column(kind) {
        Some(column) => connection.execute(
            &format!("UPDATE {table} SET name = ?1, {column} = ?2 WHERE id = ?3"),
            (name.as_ref(), parent_id, id),
        ),
        None => connection.execute(
            &format!("UPDATE {table} SET name = ?1 WHERE id = ?2"),
            (name.as_ref(), id),
        ),
    };

    let rows_affected = result.map_err(|error| map_write_error(kind, name, parent_id, error))?;

    if rows_affected == 0 {
        return Err(Error::TaxonomyNotFound(kind, id));
    }

    Ok(())
}

/// Delete an entry by ID, along with any children.
///
/// # Errors
/// Returns [Error::TaxonomyNotFound] if there is no such entry, or
/// [Error::ReferencedTaxonomy] if a cash flow still uses it or one of its
/// children.
pub fn delete_entry(
    kind: TaxonomyKind,
    id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let result = connection.execute(
        &format!("DELETE FROM {} WHERE id = ?1", table_name(kind)),
        [id],
    );

    let rows_affected = match result {
        Ok(rows_affected) => rows_affected,
        Err(error) if is_constraint_violation(&error, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
            let reference_count = count_references(kind, id, connection)?;
            return Err(Error::ReferencedTaxonomy(kind, reference_count));
        }
        Err(error) => return Err(error.into()),
    };

    if rows_affected == 0 {
        return Err(Error::TaxonomyNotFound(kind, id));
    }

    Ok(())
}

/// Whether an entry of `kind` with `id` exists.
pub fn entry_exists(
    kind: TaxonomyKind,
    id: DatabaseId,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .prepare(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)",
            table_name(kind)
        ))?
        .query_row([id], |row| row.get(0))
        .map_err(Error::from)
}

/// Get the parent ID of a category or subcategory.
///
/// Returns `Ok(None)` for statuses and types, which have no parent.
///
/// # Errors
/// Returns [Error::TaxonomyNotFound] if there is no such entry.
pub fn get_parent_id(
    kind: TaxonomyKind,
    id: DatabaseId,
    connection: &Connection,
) -> Result<Option<DatabaseId>, Error> {
    let Some(column) = parent_column(kind) else {
        return if entry_exists(kind, id, connection)? {
            Ok(None)
        } else {
            Err(Error::TaxonomyNotFound(kind, id))
        };
    };

    connection
        .prepare(&format!(
            "SELECT {column} FROM {} WHERE id = ?1",
            table_name(kind)
        ))?
        .query_row([id], |row| row.get::<_, DatabaseId>(0))
        .optional()?
        .map(Some)
        .ok_or(Error::TaxonomyNotFound(kind, id))
}

/// Get the ID and name of every entry of `kind` that shares the parent `parent_id`.
///
/// `parent_id` is ignored for statuses and types, whose names are unique
/// across the whole table.
pub fn get_names_in_scope(
    kind: TaxonomyKind,
    parent_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<Vec<(DatabaseId, String)>, Error> {
    let table = table_name(kind);
    let map_row = |row: &Row| -> Result<(DatabaseId, String), rusqlite::Error> {
        Ok((row.get(0)?, row.get(1)?))
    };

    let rows: Result<Vec<_>, rusqlite::Error> = match parent_column(kind) {
        Some(column) => connection
            .prepare(&format!("SELECT id, name FROM {table} WHERE {column} = ?1"))?
            .query_map([parent_id], map_row)?
            .collect(),
        None => connection
            .prepare(&format!("SELECT id, name FROM {table}"))?
            .query_map([], map_row)?
            .collect(),
    };

    rows.map_err(Error::from)
}

/// Count the cash flows that use the entry directly, or through one of its children.
pub fn count_references(
    kind: TaxonomyKind,
    id: DatabaseId,
    connection: &Connection,
) -> Result<u32, Error> {
    connection
        .prepare(reference_count_query(kind))?
        .query_row([id], |row| row.get(0))
        .map_err(Error::from)
}

/// Count the cash flows that use each entry of `kind`.
///
/// Entries that no cash flow uses are mapped to zero.
pub fn count_references_per_entry(
    kind: TaxonomyKind,
    connection: &Connection,
) -> Result<HashMap<DatabaseId, u32>, Error> {
    let ids: Result<Vec<DatabaseId>, rusqlite::Error> = connection
        .prepare(&format!("SELECT id FROM {}", table_name(kind)))?
        .query_map([], |row| row.get(0))?
        .collect();

    let mut statement = connection.prepare(reference_count_query(kind))?;

    ids?.into_iter()
        .map(|id| -> Result<(DatabaseId, u32), Error> {
            let count = statement.query_row([id], |row| row.get(0))?;
            Ok((id, count))
        })
        .collect()
}

/// Create a status and return it with its generated ID.
pub fn create_status(name: TaxonomyName, connection: &Connection) -> Result<Status, Error> {
    let id = insert_entry(TaxonomyKind::Status, &name, None, connection)?;

    Ok(Status { id, name })
}

/// Retrieve a single status by ID.
pub fn get_status(status_id: StatusId, connection: &Connection) -> Result<Status, Error> {
    connection
        .prepare("SELECT id, name FROM status WHERE id = :id;")?
        .query_row(&[(":id", &status_id)], map_status_row)
        .map_err(|error| error.into())
}

/// Retrieve all statuses ordered alphabetically by name.
pub fn get_all_statuses(connection: &Connection) -> Result<Vec<Status>, Error> {
    connection
        .prepare("SELECT id, name FROM status ORDER BY name ASC, id ASC;")?
        .query_map([], map_status_row)?
        .map(|maybe_status| maybe_status.map_err(|error| error.into()))
        .collect()
}

/// Rename a status.
pub fn update_status(
    status_id: StatusId,
    name: &TaxonomyName,
    connection: &Connection,
) -> Result<(), Error> {
    update_entry(TaxonomyKind::Status, status_id, name, None, connection)
}

fn map_status_row(row: &Row) -> Result<Status, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Status {
        id: row.get(0)?,
        name: TaxonomyName::new_unchecked(&raw_name),
    })
}

/// Create a type and return it with its generated ID.
pub fn create_flow_type(name: TaxonomyName, connection: &Connection) -> Result<FlowType, Error> {
    let id = insert_entry(TaxonomyKind::Type, &name, None, connection)?;

    Ok(FlowType { id, name })
}

/// Retrieve a single type by ID.
pub fn get_flow_type(type_id: FlowTypeId, connection: &Connection) -> Result<FlowType, Error> {
    connection
        .prepare("SELECT id, name FROM flow_type WHERE id = :id;")?
        .query_row(&[(":id", &type_id)], map_flow_type_row)
        .map_err(|error| error.into())
}

/// Retrieve all types ordered alphabetically by name.
pub fn get_all_flow_types(connection: &Connection) -> Result<Vec<FlowType>, Error> {
    connection
        .prepare("SELECT id, name FROM flow_type ORDER BY name ASC, id ASC;")?
        .query_map([], map_flow_type_row)?
        .map(|maybe_type| maybe_type.map_err(|error| error.into()))
        .collect()
}

/// Rename a type.
pub fn update_flow_type(
    type_id: FlowTypeId,
    name: &TaxonomyName,
    connection: &Connection,
) -> Result<(), Error> {
    update_entry(TaxonomyKind::Type, type_id, name, None, connection)
}

fn map_flow_type_row(row: &Row) -> Result<FlowType, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(FlowType {
        id: row.get(0)?,
        name: TaxonomyName::new_unchecked(&raw_name),
    })
}

/// Create a category under the type `type_id`.
pub fn create_category(
    name: TaxonomyName,
    type_id: FlowTypeId,
    connection: &Connection,
) -> Result<Category, Error> {
    let id = insert_entry(TaxonomyKind::Category, &name, Some(type_id), connection)?;

    Ok(Category { id, name, type_id })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, type_id FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, type_id FROM category ORDER BY name ASC, id ASC;")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Rename a category and/or move it to the type `type_id`.
pub fn update_category(
    category_id: CategoryId,
    name: &TaxonomyName,
    type_id: FlowTypeId,
    connection: &Connection,
) -> Result<(), Error> {
    update_entry(
        TaxonomyKind::Category,
        category_id,
        name,
        Some(type_id),
        connection,
    )
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Category {
        id: row.get(0)?,
        name: TaxonomyName::new_unchecked(&raw_name),
        type_id: row.get(2)?,
    })
}

/// Create a subcategory under the category `category_id`.
pub fn create_subcategory(
    name: TaxonomyName,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<SubCategory, Error> {
    let id = insert_entry(
        TaxonomyKind::SubCategory,
        &name,
        Some(category_id),
        connection,
    )?;

    Ok(SubCategory {
        id,
        name,
        category_id,
    })
}

/// Retrieve a single subcategory by ID.
pub fn get_subcategory(
    subcategory_id: SubCategoryId,
    connection: &Connection,
) -> Result<SubCategory, Error> {
    connection
        .prepare("SELECT id, name, category_id FROM subcategory WHERE id = :id;")?
        .query_row(&[(":id", &subcategory_id)], map_subcategory_row)
        .map_err(|error| error.into())
}

/// Retrieve all subcategories ordered alphabetically by name.
pub fn get_all_subcategories(connection: &Connection) -> Result<Vec<SubCategory>, Error> {
    connection
        .prepare("SELECT id, name, category_id FROM subcategory ORDER BY name ASC, id ASC;")?
        .query_map([], map_subcategory_row)?
        .map(|maybe_subcategory| maybe_subcategory.map_err(|error| error.into()))
        .collect()
}

/// Rename a subcategory and/or move it to the category `category_id`.
pub fn update_subcategory(
    subcategory_id: SubCategoryId,
    name: &TaxonomyName,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    update_entry(
        TaxonomyKind::SubCategory,
        subcategory_id,
        name,
        Some(category_id),
        connection,
    )
}

fn map_subcategory_row(row: &Row) -> Result<SubCategory, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(SubCategory {
        id: row.get(0)?,
        name: TaxonomyName::new_unchecked(&raw_name),
        category_id: row.get(2)?,
    })
}
