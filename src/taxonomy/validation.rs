//! Name and parent checks shared by taxonomy creation and editing.

use rusqlite::Connection;

use crate::{
    Error,
    database_id::DatabaseId,
    taxonomy::{
        TaxonomyKind, TaxonomyName,
        db::{entry_exists, get_names_in_scope},
    },
};

/// Validate `raw_name` for an entry of `kind` under `parent_id`.
///
/// The name is trimmed and compared case-insensitively against its siblings:
/// every status or type, or the categories of the same type, or the
/// subcategories of the same category. `exclude_id` is the entry being
/// edited, which may keep its own name.
///
/// # Errors
/// Returns [Error::EmptyName] or [Error::NameTooLong] for a malformed name
/// and [Error::DuplicateName] if a sibling already uses it.
pub fn validate_name(
    kind: TaxonomyKind,
    raw_name: &str,
    parent_id: Option<DatabaseId>,
    exclude_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<TaxonomyName, Error> {
    let name = TaxonomyName::new(raw_name)?;

    let is_duplicate = get_names_in_scope(kind, parent_id, connection)?
        .into_iter()
        .filter(|(id, _)| Some(*id) != exclude_id)
        .any(|(_, existing_name)| name.matches(&existing_name));

    if is_duplicate {
        return Err(Error::DuplicateName {
            kind,
            name: name.to_string(),
        });
    }

    Ok(name)
}

/// Check that the parent of a category or subcategory exists.
///
/// # Errors
/// Returns [Error::InvalidParent] if there is no type (for a category) or
/// category (for a subcategory) with `parent_id`.
pub fn ensure_parent_exists(
    kind: TaxonomyKind,
    parent_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(parent_kind) = kind.parent() else {
        return Ok(());
    };

    if entry_exists(parent_kind, parent_id, connection)? {
        Ok(())
    } else {
        Err(Error::InvalidParent(kind, parent_id))
    }
}

#[cfg(test)]
mod validation_tests {
    use crate::{
        Error,
        taxonomy::{TaxonomyKind, TaxonomyName, create_category, create_flow_type, create_status},
        test_utils::get_test_connection,
    };

    use super::{ensure_parent_exists, validate_name};

    #[test]
    fn rejects_duplicate_status_ignoring_case_and_whitespace() {
        let connection = get_test_connection();
        create_status(TaxonomyName::new_unchecked("Paid"), &connection).unwrap();

        let result = validate_name(TaxonomyKind::Status, "  pAiD ", None, None, &connection);

        assert_eq!(
            result,
            Err(Error::DuplicateName {
                kind: TaxonomyKind::Status,
                name: "pAiD".to_owned()
            })
        );
    }

    #[test]
    fn accepts_own_name_when_editing() {
        let connection = get_test_connection();
        let status = create_status(TaxonomyName::new_unchecked("Paid"), &connection).unwrap();

        let result = validate_name(
            TaxonomyKind::Status,
            "PAID",
            None,
            Some(status.id),
            &connection,
        );

        assert_eq!(result, Ok(TaxonomyName::new_unchecked("PAID")));
    }

    #[test]
    fn category_names_are_scoped_to_type() {
        let connection = get_test_connection();
        let income = create_flow_type(TaxonomyName::new_unchecked("Income"), &connection).unwrap();
        let expense =
            create_flow_type(TaxonomyName::new_unchecked("Expense"), &connection).unwrap();
        create_category(TaxonomyName::new_unchecked("Other"), income.id, &connection).unwrap();

        let same_type = validate_name(
            TaxonomyKind::Category,
            "other",
            Some(income.id),
            None,
            &connection,
        );
        let other_type = validate_name(
            TaxonomyKind::Category,
            "other",
            Some(expense.id),
            None,
            &connection,
        );

        assert!(matches!(same_type, Err(Error::DuplicateName { .. })));
        assert_eq!(other_type, Ok(TaxonomyName::new_unchecked("other")));
    }

    #[test]
    fn rejects_empty_name() {
        let connection = get_test_connection();

        let result = validate_name(TaxonomyKind::Type, "   ", None, None, &connection);

        assert_eq!(result, Err(Error::EmptyName));
    }

    #[test]
    fn missing_parent_is_invalid() {
        let connection = get_test_connection();

        assert_eq!(
            ensure_parent_exists(TaxonomyKind::SubCategory, 12, &connection),
            Err(Error::InvalidParent(TaxonomyKind::SubCategory, 12))
        );
    }

    #[test]
    fn kinds_without_parent_always_pass() {
        let connection = get_test_connection();

        assert_eq!(ensure_parent_exists(TaxonomyKind::Status, 12, &connection), Ok(()));
    }
}
