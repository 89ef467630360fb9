//! Decoding of taxonomy management requests into a single typed operation.

use std::collections::HashMap;

use crate::{
    Error,
    database_id::DatabaseId,
    taxonomy::{CategoryId, FlowTypeId, TaxonomyKind},
};

/// The fields of a status, type, category or subcategory as submitted by the user.
///
/// Names are kept raw here and validated when the operation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyEntry {
    /// A status and its name.
    Status {
        /// The submitted name.
        name: String,
    },
    /// A type and its name.
    Type {
        /// The submitted name.
        name: String,
    },
    /// A category, its name and the type it belongs to.
    Category {
        /// The submitted name.
        name: String,
        /// The type the category belongs to.
        type_id: FlowTypeId,
    },
    /// A subcategory, its name and the category it belongs to.
    SubCategory {
        /// The submitted name.
        name: String,
        /// The category the subcategory belongs to.
        category_id: CategoryId,
    },
}

impl TaxonomyEntry {
    /// The kind of entry.
    pub fn kind(&self) -> TaxonomyKind {
        match self {
            TaxonomyEntry::Status { .. } => TaxonomyKind::Status,
            TaxonomyEntry::Type { .. } => TaxonomyKind::Type,
            TaxonomyEntry::Category { .. } => TaxonomyKind::Category,
            TaxonomyEntry::SubCategory { .. } => TaxonomyKind::SubCategory,
        }
    }

    /// The submitted name, before trimming.
    pub fn name(&self) -> &str {
        match self {
            TaxonomyEntry::Status { name }
            | TaxonomyEntry::Type { name }
            | TaxonomyEntry::Category { name, .. }
            | TaxonomyEntry::SubCategory { name, .. } => name,
        }
    }

    /// The ID of the parent type or category, if the entry has one.
    pub fn parent_id(&self) -> Option<DatabaseId> {
        match self {
            TaxonomyEntry::Status { .. } | TaxonomyEntry::Type { .. } => None,
            TaxonomyEntry::Category { type_id, .. } => Some(*type_id),
            TaxonomyEntry::SubCategory { category_id, .. } => Some(*category_id),
        }
    }
}

/// A single change to the taxonomies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyOperation {
    /// Create a new entry.
    Add(TaxonomyEntry),
    /// Replace the name (and parent) of the existing entry `id`.
    Edit {
        /// The entry to change.
        id: DatabaseId,
        /// The new values.
        entry: TaxonomyEntry,
    },
    /// Remove the entry `id` of the given kind.
    Delete {
        /// The kind of entry to remove.
        kind: TaxonomyKind,
        /// The entry to remove.
        id: DatabaseId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Edit,
    Delete,
}

impl Action {
    const ALL: [Action; 3] = [Action::Add, Action::Edit, Action::Delete];

    fn prefix(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

impl TaxonomyOperation {
    /// Decode the submitted form `fields` into an operation.
    ///
    /// The operation is selected by the presence of exactly one tag field such
    /// as `add_status` or `delete_subcategory`; the tag's value is ignored.
    /// Edits and deletes read the target from `id`, categories read their
    /// parent from `type_id` and subcategories from `category_id`.
    ///
    /// Returns `Ok(None)` if no tag is present.
    ///
    /// # Errors
    /// Returns [Error::InvalidOperation] if more than one tag is present, or
    /// an ID that the operation needs is missing or not an integer.
    pub fn decode(fields: &HashMap<String, String>) -> Result<Option<Self>, Error> {
        let tags: Vec<(Action, TaxonomyKind)> = Action::ALL
            .into_iter()
            .flat_map(|action| TaxonomyKind::ALL.map(|kind| (action, kind)))
            .filter(|(action, kind)| {
                fields.contains_key(&format!("{}_{}", action.prefix(), kind.tag()))
            })
            .collect();

        let (action, kind) = match tags.as_slice() {
            [] => return Ok(None),
            [tag] => *tag,
            _ => {
                let tag_names: Vec<String> = tags
                    .iter()
                    .map(|(action, kind)| format!("{}_{}", action.prefix(), kind.tag()))
                    .collect();

                return Err(Error::InvalidOperation(format!(
                    "expected a single operation but got {}",
                    tag_names.join(", ")
                )));
            }
        };

        let operation = match action {
            Action::Add => TaxonomyOperation::Add(decode_entry(kind, fields)?),
            Action::Edit => TaxonomyOperation::Edit {
                id: parse_id(fields, "id")?,
                entry: decode_entry(kind, fields)?,
            },
            Action::Delete => TaxonomyOperation::Delete {
                kind,
                id: parse_id(fields, "id")?,
            },
        };

        Ok(Some(operation))
    }

    /// The kind of entry the operation changes.
    pub fn kind(&self) -> TaxonomyKind {
        match self {
            TaxonomyOperation::Add(entry) | TaxonomyOperation::Edit { entry, .. } => entry.kind(),
            TaxonomyOperation::Delete { kind, .. } => *kind,
        }
    }
}

fn decode_entry(
    kind: TaxonomyKind,
    fields: &HashMap<String, String>,
) -> Result<TaxonomyEntry, Error> {
    let name = fields.get("name").cloned().unwrap_or_default();

    let entry = match kind {
        TaxonomyKind::Status => TaxonomyEntry::Status { name },
        TaxonomyKind::Type => TaxonomyEntry::Type { name },
        TaxonomyKind::Category => TaxonomyEntry::Category {
            name,
            type_id: parse_id(fields, "type_id")?,
        },
        TaxonomyKind::SubCategory => TaxonomyEntry::SubCategory {
            name,
            category_id: parse_id(fields, "category_id")?,
        },
    };

    Ok(entry)
}

fn parse_id(fields: &HashMap<String, String>, field: &str) -> Result<DatabaseId, Error> {
    let raw_id = fields
        .get(field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::InvalidOperation(format!("missing {field}")))?;

    raw_id
        .parse()
        .map_err(|_| Error::InvalidOperation(format!("{field} \"{raw_id}\" is not a valid ID")))
}
