//! Applies taxonomy operations to the database.

use rusqlite::Connection;

use crate::{
    Error,
    database_id::DatabaseId,
    taxonomy::{
        TaxonomyEntry, TaxonomyOperation,
        db::{
            count_references, create_category, create_flow_type, create_status,
            create_subcategory, delete_entry, get_parent_id, update_category, update_flow_type,
            update_status, update_subcategory,
        },
        validation::{ensure_parent_exists, validate_name},
    },
};

/// Apply `operation` in a single transaction.
///
/// Nothing is written unless every check passes.
///
/// # Errors
/// - [Error::EmptyName], [Error::NameTooLong] or [Error::DuplicateName] if
///   the submitted name is not valid in its scope.
/// - [Error::InvalidParent] if the parent type or category does not exist.
/// - [Error::TaxonomyNotFound] if the entry to edit or delete does not exist.
/// - [Error::ParentChangeConflict] if a referenced entry would be moved to
///   another parent.
/// - [Error::ReferencedTaxonomy] if a referenced entry would be deleted.
pub fn apply_operation(
    operation: &TaxonomyOperation,
    connection: &mut Connection,
) -> Result<(), Error> {
    let transaction = connection.transaction()?;

    match operation {
        TaxonomyOperation::Add(entry) => add_entry(entry, &transaction)?,
        TaxonomyOperation::Edit { id, entry } => edit_entry(*id, entry, &transaction)?,
        TaxonomyOperation::Delete { kind, id } => {
            let reference_count = count_references(*kind, *id, &transaction)?;

            if reference_count > 0 {
                return Err(Error::ReferencedTaxonomy(*kind, reference_count));
            }

            delete_entry(*kind, *id, &transaction)?;
        }
    }

    transaction.commit()?;

    Ok(())
}

fn add_entry(entry: &TaxonomyEntry, connection: &Connection) -> Result<(), Error> {
    let kind = entry.kind();
    let parent_id = entry.parent_id();

    if let Some(parent_id) = parent_id {
        ensure_parent_exists(kind, parent_id, connection)?;
    }

    let name = validate_name(kind, entry.name(), parent_id, None, connection)?;

    match entry {
        TaxonomyEntry::Status { .. } => {
            create_status(name, connection)?;
        }
        TaxonomyEntry::Type { .. } => {
            create_flow_type(name, connection)?;
        }
        TaxonomyEntry::Category { type_id, .. } => {
            create_category(name, *type_id, connection)?;
        }
        TaxonomyEntry::SubCategory { category_id, .. } => {
            create_subcategory(name, *category_id, connection)?;
        }
    }

    Ok(())
}

fn edit_entry(
    id: DatabaseId,
    entry: &TaxonomyEntry,
    connection: &Connection,
) -> Result<(), Error> {
    let kind = entry.kind();
    let current_parent_id = get_parent_id(kind, id, connection)?;
    let parent_id = entry.parent_id();

    if let Some(parent_id) = parent_id {
        ensure_parent_exists(kind, parent_id, connection)?;
    }

    let name = validate_name(kind, entry.name(), parent_id, Some(id), connection)?;

    if parent_id != current_parent_id {
        let reference_count = count_references(kind, id, connection)?;

        if reference_count > 0 {
            return Err(Error::ParentChangeConflict(kind, reference_count));
        }
    }

    match entry {
        TaxonomyEntry::Status { .. } => update_status(id, &name, connection),
        TaxonomyEntry::Type { .. } => update_flow_type(id, &name, connection),
        TaxonomyEntry::Category { type_id, .. } => {
            update_category(id, &name, *type_id, connection)
        }
        TaxonomyEntry::SubCategory { category_id, .. } => {
            update_subcategory(id, &name, *category_id, connection)
        }
    }
}

#[cfg(test)]
mod apply_operation_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        cash_flow::create_cash_flow,
        taxonomy::{
            TaxonomyEntry, TaxonomyKind, TaxonomyName, TaxonomyOperation, apply_operation,
            create_category, create_flow_type, create_status, get_all_statuses, get_category,
            get_flow_type, get_status, get_subcategory,
        },
        test_utils::{TestTaxonomies, create_test_taxonomies, get_test_connection},
    };

    fn record_cash_flow(taxonomies: &TestTaxonomies, connection: &Connection) {
        create_cash_flow(
            &taxonomies.new_cash_flow(datetime!(2024-01-15 12:00:00), 1_050),
            connection,
        )
        .expect("Could not create cash flow");
    }

    #[test]
    fn add_status_trims_name() {
        let mut connection = get_test_connection();
        let operation = TaxonomyOperation::Add(TaxonomyEntry::Status {
            name: "  Pending  ".to_owned(),
        });

        apply_operation(&operation, &mut connection).expect("Could not add status");

        let statuses = get_all_statuses(&connection).unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].name.as_ref(), "Pending");
    }

    #[test]
    fn add_duplicate_status_leaves_store_unchanged() {
        let mut connection = get_test_connection();
        create_status(TaxonomyName::new_unchecked("Paid"), &connection).unwrap();
        let operation = TaxonomyOperation::Add(TaxonomyEntry::Status {
            name: " paid".to_owned(),
        });

        let result = apply_operation(&operation, &mut connection);

        assert!(matches!(result, Err(Error::DuplicateName { .. })));
        assert_eq!(get_all_statuses(&connection).unwrap().len(), 1);
    }

    #[test]
    fn add_subcategory_with_missing_category_is_invalid_parent() {
        let mut connection = get_test_connection();
        let operation = TaxonomyOperation::Add(TaxonomyEntry::SubCategory {
            name: "Fruit".to_owned(),
            category_id: 99,
        });

        let result = apply_operation(&operation, &mut connection);

        assert_eq!(
            result,
            Err(Error::InvalidParent(TaxonomyKind::SubCategory, 99))
        );
    }

    #[test]
    fn edit_missing_entry_is_not_found() {
        let mut connection = get_test_connection();
        let operation = TaxonomyOperation::Edit {
            id: 5,
            entry: TaxonomyEntry::Type {
                name: "Income".to_owned(),
            },
        };

        let result = apply_operation(&operation, &mut connection);

        assert_eq!(result, Err(Error::TaxonomyNotFound(TaxonomyKind::Type, 5)));
    }

    #[test]
    fn edit_can_change_case_of_own_name() {
        let mut connection = get_test_connection();
        let taxonomies = create_test_taxonomies(&connection);
        let operation = TaxonomyOperation::Edit {
            id: taxonomies.status.id,
            entry: TaxonomyEntry::Status {
                name: "PAID".to_owned(),
            },
        };

        apply_operation(&operation, &mut connection).expect("Could not rename status");

        let status = get_status(taxonomies.status.id, &connection).unwrap();
        assert_eq!(status.name.as_ref(), "PAID");
    }

    #[test]
    fn edit_type_uses_own_id() {
        let mut connection = get_test_connection();
        let taxonomies = create_test_taxonomies(&connection);
        let income = create_flow_type(TaxonomyName::new_unchecked("Income"), &connection).unwrap();
        let operation = TaxonomyOperation::Edit {
            id: income.id,
            entry: TaxonomyEntry::Type {
                name: "Revenue".to_owned(),
            },
        };

        apply_operation(&operation, &mut connection).expect("Could not rename type");

        assert_eq!(
            get_flow_type(income.id, &connection).unwrap().name.as_ref(),
            "Revenue"
        );
        assert_eq!(
            get_flow_type(taxonomies.flow_type.id, &connection)
                .unwrap()
                .name
                .as_ref(),
            "Expense"
        );
    }

    #[test]
    fn moving_unreferenced_category_succeeds() {
        let mut connection = get_test_connection();
        let taxonomies = create_test_taxonomies(&connection);
        let income = create_flow_type(TaxonomyName::new_unchecked("Income"), &connection).unwrap();
        let operation = TaxonomyOperation::Edit {
            id: taxonomies.category.id,
            entry: TaxonomyEntry::Category {
                name: "Food".to_owned(),
                type_id: income.id,
            },
        };

        apply_operation(&operation, &mut connection).expect("Could not move category");

        assert_eq!(
            get_category(taxonomies.category.id, &connection)
                .unwrap()
                .type_id,
            income.id
        );
    }

    #[test]
    fn moving_referenced_subcategory_is_rejected() {
        let mut connection = get_test_connection();
        let taxonomies = create_test_taxonomies(&connection);
        record_cash_flow(&taxonomies, &connection);
        let other_category = create_category(
            TaxonomyName::new_unchecked("Drinks"),
            taxonomies.flow_type.id,
            &connection,
        )
        .unwrap();
        let operation = TaxonomyOperation::Edit {
            id: taxonomies.subcategory.id,
            entry: TaxonomyEntry::SubCategory {
                name: "Fruit".to_owned(),
                category_id: other_category.id,
            },
        };

        let result = apply_operation(&operation, &mut connection);

        assert_eq!(
            result,
            Err(Error::ParentChangeConflict(TaxonomyKind::SubCategory, 1))
        );
        assert_eq!(
            get_subcategory(taxonomies.subcategory.id, &connection)
                .unwrap()
                .category_id,
            taxonomies.category.id
        );
    }

    #[test]
    fn deleting_referenced_entries_is_rejected() {
        let mut connection = get_test_connection();
        let taxonomies = create_test_taxonomies(&connection);
        record_cash_flow(&taxonomies, &connection);

        let cases = [
            (TaxonomyKind::Status, taxonomies.status.id),
            (TaxonomyKind::Type, taxonomies.flow_type.id),
            (TaxonomyKind::Category, taxonomies.category.id),
            (TaxonomyKind::SubCategory, taxonomies.subcategory.id),
        ];

        for (kind, id) in cases {
            let result = apply_operation(&TaxonomyOperation::Delete { kind, id }, &mut connection);

            assert_eq!(
                result,
                Err(Error::ReferencedTaxonomy(kind, 1)),
                "deleting the {kind} should have been rejected"
            );
        }
    }

    #[test]
    fn deleting_unreferenced_status_succeeds() {
        let mut connection = get_test_connection();
        let taxonomies = create_test_taxonomies(&connection);

        apply_operation(
            &TaxonomyOperation::Delete {
                kind: TaxonomyKind::Status,
                id: taxonomies.status.id,
            },
            &mut connection,
        )
        .expect("Could not delete status");

        assert_eq!(
            get_status(taxonomies.status.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn deleting_missing_entry_is_not_found() {
        let mut connection = get_test_connection();

        let result = apply_operation(
            &TaxonomyOperation::Delete {
                kind: TaxonomyKind::Category,
                id: 3,
            },
            &mut connection,
        );

        assert_eq!(
            result,
            Err(Error::TaxonomyNotFound(TaxonomyKind::Category, 3))
        );
    }
}
