//! Filtered, paginated retrieval of cash flows for the listing page.

use rusqlite::{Connection, Row, params};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    cash_flow::{CashFlow, core::map_cash_flow_columns},
    pagination::{PAGE_SIZE, page_count, page_offset},
    taxonomy::{CategoryId, FlowTypeId, StatusId, SubCategoryId},
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Each condition is skipped when its parameter is NULL.
const FILTER_CLAUSE: &str = "(?1 IS NULL OR date(cf.created_at) >= ?1)
    AND (?2 IS NULL OR date(cf.created_at) <= ?2)
    AND (?3 IS NULL OR cf.status_id = ?3)
    AND (?4 IS NULL OR cf.type_id = ?4)
    AND (?5 IS NULL OR cf.category_id = ?5)
    AND (?6 IS NULL OR cf.subcategory_id = ?6)";

/// Optional conditions that cash flows must all meet to be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CashFlowFilter {
    /// Only include cash flows on or after this date.
    pub date_from: Option<Date>,
    /// Only include cash flows on or before this date.
    pub date_to: Option<Date>,
    /// Only include cash flows with this status.
    pub status: Option<StatusId>,
    /// Only include cash flows of this type.
    pub type_id: Option<FlowTypeId>,
    /// Only include cash flows in this category.
    pub category: Option<CategoryId>,
    /// Only include cash flows in this subcategory.
    pub subcategory: Option<SubCategoryId>,
}

/// A cash flow along with the names of the entries it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashFlowRow {
    /// The cash flow.
    pub cash_flow: CashFlow,
    /// The name of its status.
    pub status_name: String,
    /// The name of its type.
    pub type_name: String,
    /// The name of its category.
    pub category_name: String,
    /// The name of its subcategory.
    pub subcategory_name: String,
}

/// One page of cash flows matching a filter, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashFlowPage {
    /// At most [PAGE_SIZE] rows.
    pub rows: Vec<CashFlowRow>,
    /// The 1-indexed page that was requested.
    pub page: u64,
    /// The number of pages holding matching cash flows.
    pub page_count: u64,
    /// The number of matching cash flows across all pages.
    pub total: u64,
}

fn format_date(date: Option<Date>) -> Result<Option<String>, Error> {
    date.map(|date| {
        date.format(DATE_FORMAT)
            .map_err(|error| Error::InvalidTimestamp(error.to_string()))
    })
    .transpose()
}

/// Get the 1-indexed `page` of cash flows matching `filter`, ordered by
/// `created_at` then ID, newest first.
///
/// Date bounds are inclusive and compare the date part of `created_at` only.
/// Page zero and pages past the last page give an empty list.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn query_cash_flows(
    filter: &CashFlowFilter,
    page: u64,
    connection: &Connection,
) -> Result<CashFlowPage, Error> {
    let date_from = format_date(filter.date_from)?;
    let date_to = format_date(filter.date_to)?;

    let total: u64 = connection
        .prepare(&format!(
            "SELECT COUNT(*) FROM cash_flow cf WHERE {FILTER_CLAUSE}"
        ))?
        .query_row(
            params![
                date_from,
                date_to,
                filter.status,
                filter.type_id,
                filter.category,
                filter.subcategory,
            ],
            |row| {
                let count: i64 = row.get(0)?;
                u64::try_from(count)
                    .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, count))
            },
        )?;
    let page_count = page_count(total);

    // SQLite integers are signed, so the offset is bound as an i64.
    let offset = match page_offset(page).and_then(|offset| i64::try_from(offset).ok()) {
        Some(offset) if page <= page_count => offset,
        _ => {
            tracing::debug!("Page {page} is out of range 1..={page_count}");
            return Ok(CashFlowPage {
                rows: Vec::new(),
                page,
                page_count,
                total,
            });
        }
    };

    let rows = connection
        .prepare(&format!(
            "SELECT cf.id, cf.created_at, cf.status_id, cf.type_id, cf.category_id,
                cf.subcategory_id, cf.amount_cents, cf.comment,
                s.name, t.name, c.name, sc.name
             FROM cash_flow cf
             INNER JOIN status s ON s.id = cf.status_id
             INNER JOIN flow_type t ON t.id = cf.type_id
             INNER JOIN category c ON c.id = cf.category_id
             INNER JOIN subcategory sc ON sc.id = cf.subcategory_id
             WHERE {FILTER_CLAUSE}
             ORDER BY cf.created_at DESC, cf.id DESC
             LIMIT ?7 OFFSET ?8"
        ))?
        .query_map(
            params![
                date_from,
                date_to,
                filter.status,
                filter.type_id,
                filter.category,
                filter.subcategory,
                PAGE_SIZE as i64,
                offset,
            ],
            map_cash_flow_row,
        )?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect::<Result<Vec<CashFlowRow>, Error>>()?;

    Ok(CashFlowPage {
        rows,
        page,
        page_count,
        total,
    })
}

fn map_cash_flow_row(row: &Row) -> Result<CashFlowRow, rusqlite::Error> {
    Ok(CashFlowRow {
        cash_flow: map_cash_flow_columns(row, 0)?,
        status_name: row.get(8)?,
        type_name: row.get(9)?,
        category_name: row.get(10)?,
        subcategory_name: row.get(11)?,
    })
}

#[cfg(test)]
mod query_cash_flows_tests {
    use rusqlite::Connection;
    use time::{
        Duration, PrimitiveDateTime,
        macros::{date, datetime},
    };

    use crate::{
        cash_flow::{Amount, CashFlowFilter, NewCashFlow, create_cash_flow, query_cash_flows},
        pagination::PAGE_SIZE,
        taxonomy::{
            Category, FlowType, Status, SubCategory, TaxonomyName, create_category,
            create_flow_type, create_status, create_subcategory,
        },
        test_utils::get_test_connection,
    };

    struct Fixture {
        connection: Connection,
        paid: Status,
        pending: Status,
        expense: FlowType,
        food: Category,
        fruit: SubCategory,
        income: FlowType,
        salary: Category,
        wages: SubCategory,
    }

    fn get_fixture() -> Fixture {
        let connection = get_test_connection();

        let paid = create_status(TaxonomyName::new_unchecked("Paid"), &connection).unwrap();
        let pending = create_status(TaxonomyName::new_unchecked("Pending"), &connection).unwrap();
        let expense =
            create_flow_type(TaxonomyName::new_unchecked("Expense"), &connection).unwrap();
        let food =
            create_category(TaxonomyName::new_unchecked("Food"), expense.id, &connection).unwrap();
        let fruit =
            create_subcategory(TaxonomyName::new_unchecked("Fruit"), food.id, &connection)
                .unwrap();
        let income = create_flow_type(TaxonomyName::new_unchecked("Income"), &connection).unwrap();
        let salary =
            create_category(TaxonomyName::new_unchecked("Salary"), income.id, &connection)
                .unwrap();
        let wages =
            create_subcategory(TaxonomyName::new_unchecked("Wages"), salary.id, &connection)
                .unwrap();

        Fixture {
            connection,
            paid,
            pending,
            expense,
            food,
            fruit,
            income,
            salary,
            wages,
        }
    }

    fn expense_at(fixture: &Fixture, created_at: PrimitiveDateTime) -> NewCashFlow {
        NewCashFlow {
            created_at,
            status_id: fixture.paid.id,
            type_id: fixture.expense.id,
            category_id: fixture.food.id,
            subcategory_id: fixture.fruit.id,
            amount: Amount::from_cents(500),
            comment: None,
        }
    }

    fn income_at(fixture: &Fixture, created_at: PrimitiveDateTime) -> NewCashFlow {
        NewCashFlow {
            created_at,
            status_id: fixture.pending.id,
            type_id: fixture.income.id,
            category_id: fixture.salary.id,
            subcategory_id: fixture.wages.id,
            amount: Amount::from_cents(100_000),
            comment: Some("January pay".to_owned()),
        }
    }

    #[test]
    fn returns_newest_first_with_names() {
        let fixture = get_fixture();
        let older = create_cash_flow(
            &expense_at(&fixture, datetime!(2024-01-01 09:00:00)),
            &fixture.connection,
        )
        .unwrap();
        let newer = create_cash_flow(
            &income_at(&fixture, datetime!(2024-01-02 09:00:00)),
            &fixture.connection,
        )
        .unwrap();

        let page = query_cash_flows(&CashFlowFilter::default(), 1, &fixture.connection).unwrap();

        let ids: Vec<_> = page.rows.iter().map(|row| row.cash_flow.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(page.total, 2);
        assert_eq!(page.page_count, 1);
        assert_eq!(page.rows[0].status_name, "Pending");
        assert_eq!(page.rows[0].type_name, "Income");
        assert_eq!(page.rows[0].category_name, "Salary");
        assert_eq!(page.rows[0].subcategory_name, "Wages");
    }

    #[test]
    fn ties_are_broken_by_id() {
        let fixture = get_fixture();
        let created_at = datetime!(2024-01-01 09:00:00);
        let first =
            create_cash_flow(&expense_at(&fixture, created_at), &fixture.connection).unwrap();
        let second =
            create_cash_flow(&expense_at(&fixture, created_at), &fixture.connection).unwrap();

        let page = query_cash_flows(&CashFlowFilter::default(), 1, &fixture.connection).unwrap();

        let ids: Vec<_> = page.rows.iter().map(|row| row.cash_flow.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let fixture = get_fixture();
        for created_at in [
            datetime!(2023-12-31 23:59:59),
            datetime!(2024-01-01 00:00:00),
            datetime!(2024-01-15 12:00:00),
            datetime!(2024-01-31 23:59:59),
            datetime!(2024-02-01 00:00:00),
        ] {
            create_cash_flow(&expense_at(&fixture, created_at), &fixture.connection).unwrap();
        }
        let filter = CashFlowFilter {
            date_from: Some(date!(2024-01-01)),
            date_to: Some(date!(2024-01-31)),
            ..Default::default()
        };

        let page = query_cash_flows(&filter, 1, &fixture.connection).unwrap();

        let dates: Vec<_> = page
            .rows
            .iter()
            .map(|row| row.cash_flow.created_at)
            .collect();
        assert_eq!(
            dates,
            vec![
                datetime!(2024-01-31 23:59:59),
                datetime!(2024-01-15 12:00:00),
                datetime!(2024-01-01 00:00:00),
            ]
        );
    }

    #[test]
    fn reference_filters_are_combined() {
        let fixture = get_fixture();
        let created_at = datetime!(2024-01-01 09:00:00);
        create_cash_flow(&expense_at(&fixture, created_at), &fixture.connection).unwrap();
        let income = create_cash_flow(&income_at(&fixture, created_at), &fixture.connection).unwrap();

        let matching = CashFlowFilter {
            status: Some(fixture.pending.id),
            type_id: Some(fixture.income.id),
            category: Some(fixture.salary.id),
            subcategory: Some(fixture.wages.id),
            ..Default::default()
        };
        let contradictory = CashFlowFilter {
            status: Some(fixture.paid.id),
            type_id: Some(fixture.income.id),
            ..Default::default()
        };

        let page = query_cash_flows(&matching, 1, &fixture.connection).unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].cash_flow.id, income.id);

        let page = query_cash_flows(&contradictory, 1, &fixture.connection).unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn pages_hold_at_most_page_size_rows() {
        let fixture = get_fixture();
        let start = datetime!(2024-01-01 00:00:00);
        for day in 0..(PAGE_SIZE + 5) {
            let created_at = start + Duration::days(day as i64);
            create_cash_flow(&expense_at(&fixture, created_at), &fixture.connection).unwrap();
        }

        let first_page =
            query_cash_flows(&CashFlowFilter::default(), 1, &fixture.connection).unwrap();
        let second_page =
            query_cash_flows(&CashFlowFilter::default(), 2, &fixture.connection).unwrap();

        assert_eq!(first_page.rows.len() as u64, PAGE_SIZE);
        assert_eq!(second_page.rows.len(), 5);
        assert_eq!(first_page.page_count, 2);
        assert_eq!(
            second_page.rows.last().map(|row| row.cash_flow.created_at),
            Some(start)
        );
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let fixture = get_fixture();
        for hour in 0..3 {
            let created_at = datetime!(2024-01-01 00:00:00) + Duration::hours(hour);
            create_cash_flow(&expense_at(&fixture, created_at), &fixture.connection).unwrap();
        }

        for page in [0, 2, 999, u64::MAX] {
            let result =
                query_cash_flows(&CashFlowFilter::default(), page, &fixture.connection).unwrap();

            assert!(result.rows.is_empty(), "want page {page} to be empty");
            assert_eq!(result.total, 3);
        }
    }
}
