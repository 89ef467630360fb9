use rusqlite::Connection;
use time::PrimitiveDateTime;

use crate::{
    Amount, Category, FlowType, NewCashFlow, Status, SubCategory, TaxonomyName,
    db::initialize,
    taxonomy::{create_category, create_flow_type, create_status, create_subcategory},
};

/// An in-memory database with all tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

/// One entry of each taxonomy kind, forming a valid hierarchy.
pub(crate) struct TestTaxonomies {
    pub(crate) status: Status,
    pub(crate) flow_type: FlowType,
    pub(crate) category: Category,
    pub(crate) subcategory: SubCategory,
}

impl TestTaxonomies {
    /// A cash flow classified by these taxonomies.
    pub(crate) fn new_cash_flow(&self, created_at: PrimitiveDateTime, cents: i64) -> NewCashFlow {
        NewCashFlow {
            created_at,
            status_id: self.status.id,
            type_id: self.flow_type.id,
            category_id: self.category.id,
            subcategory_id: self.subcategory.id,
            amount: Amount::from_cents(cents),
            comment: None,
        }
    }
}

/// Create the status "Paid" and the hierarchy "Expense" > "Food" > "Fruit".
#[track_caller]
pub(crate) fn create_test_taxonomies(connection: &Connection) -> TestTaxonomies {
    let status = create_status(TaxonomyName::new_unchecked("Paid"), connection)
        .expect("Could not create status");
    let flow_type = create_flow_type(TaxonomyName::new_unchecked("Expense"), connection)
        .expect("Could not create type");
    let category = create_category(TaxonomyName::new_unchecked("Food"), flow_type.id, connection)
        .expect("Could not create category");
    let subcategory =
        create_subcategory(TaxonomyName::new_unchecked("Fruit"), category.id, connection)
            .expect("Could not create subcategory");

    TestTaxonomies {
        status,
        flow_type,
        category,
        subcategory,
    }
}
