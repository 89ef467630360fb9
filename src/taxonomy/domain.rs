//! Core taxonomy domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId};

/// The maximum number of characters in a taxonomy name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Database identifier for a status.
pub type StatusId = DatabaseId;
/// Database identifier for a type.
pub type FlowTypeId = DatabaseId;
/// Database identifier for a category.
pub type CategoryId = DatabaseId;
/// Database identifier for a subcategory.
pub type SubCategoryId = DatabaseId;

/// A validated, trimmed, non-empty name for a status, type, category or subcategory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TaxonomyName(String);

impl TaxonomyName {
    /// Create a taxonomy name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is empty
    /// after trimming, or an [Error::NameTooLong] if it is longer than
    /// [MAX_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else if name.chars().count() > MAX_NAME_LENGTH {
            Err(Error::NameTooLong(MAX_NAME_LENGTH))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a taxonomy name without validation.
    ///
    /// The caller should ensure that the string is trimmed, not empty and not too long.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Whether `other` names the same entry, ignoring case and surrounding whitespace.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }
}

impl AsRef<str> for TaxonomyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TaxonomyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four kinds of reference data that classify a cash flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxonomyKind {
    /// An independent label, e.g. "Paid" or "Pending".
    Status,
    /// The top of the hierarchy, e.g. "Income" or "Expense".
    Type,
    /// Belongs to exactly one type.
    Category,
    /// Belongs to exactly one category.
    SubCategory,
}

impl TaxonomyKind {
    /// All kinds, parents before children.
    pub const ALL: [TaxonomyKind; 4] = [
        TaxonomyKind::Status,
        TaxonomyKind::Type,
        TaxonomyKind::Category,
        TaxonomyKind::SubCategory,
    ];

    /// The lowercase identifier used in operation tags, e.g. "subcategory" in "add_subcategory".
    pub fn tag(&self) -> &'static str {
        match self {
            TaxonomyKind::Status => "status",
            TaxonomyKind::Type => "type",
            TaxonomyKind::Category => "category",
            TaxonomyKind::SubCategory => "subcategory",
        }
    }

    /// The kind of this kind's parent, if it has one.
    pub fn parent(&self) -> Option<TaxonomyKind> {
        match self {
            TaxonomyKind::Status | TaxonomyKind::Type => None,
            TaxonomyKind::Category => Some(TaxonomyKind::Type),
            TaxonomyKind::SubCategory => Some(TaxonomyKind::Category),
        }
    }
}

impl Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// The settlement state of a cash flow (e.g., 'Paid', 'Planned').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Status {
    /// The ID of the status.
    pub id: StatusId,
    /// The display name, unique among statuses.
    pub name: TaxonomyName,
}

/// The direction of a cash flow (e.g., 'Income', 'Expense').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct FlowType {
    /// The ID of the type.
    pub id: FlowTypeId,
    /// The display name, unique among types.
    pub name: TaxonomyName,
}

/// A grouping of cash flows within a type (e.g., 'Groceries' for 'Expense').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name, unique among the categories of the same type.
    pub name: TaxonomyName,
    /// The type the category belongs to.
    pub type_id: FlowTypeId,
}

/// A finer grouping within a category (e.g., 'Vegetables' for 'Groceries').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct SubCategory {
    /// The ID of the subcategory.
    pub id: SubCategoryId,
    /// The display name, unique among the subcategories of the same category.
    pub name: TaxonomyName,
    /// The category the subcategory belongs to.
    pub category_id: CategoryId,
}
