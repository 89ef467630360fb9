//! The page that lists, filters and pages through cash flows.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// axum_extra's Query parses empty strings as None, which is what a submitted
// filter form with unset fields sends.
use axum_extra::extract::Query;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    cash_flow::{CashFlowFilter, CashFlowPage, CashFlowRow, query_cash_flows},
    database_id::DatabaseId,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        edit_delete_action_links,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators},
    taxonomy::{TaxonomyKind, TaxonomyOptions, get_taxonomy_options},
};

const DISPLAY_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// The state needed for the cash flows page.
#[derive(Debug, Clone)]
pub struct CashFlowsPageState {
    /// The database connection for reading cash flows.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Configuration for pagination controls.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for CashFlowsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters of the cash flows page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowsQuery {
    /// The 1-indexed page to show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DatabaseId>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_id: Option<DatabaseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DatabaseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<DatabaseId>,
}

impl CashFlowsQuery {
    /// Split the query into the filter and the requested page.
    fn into_parts(self, default_page: u64) -> (CashFlowFilter, u64) {
        let filter = CashFlowFilter {
            date_from: self.date_from,
            date_to: self.date_to,
            status: self.status,
            type_id: self.type_id,
            category: self.category,
            subcategory: self.subcategory,
        };

        (filter, self.page.unwrap_or(default_page))
    }

    /// The URL of `page` with the same filters as this query.
    fn page_url(&self, page: u64) -> String {
        let query = CashFlowsQuery {
            page: Some(page),
            ..self.clone()
        };

        match serde_urlencoded::to_string(&query) {
            Ok(query_string) => format!("{}?{query_string}", endpoints::CASH_FLOWS_VIEW),
            Err(error) => {
                tracing::error!("Could not encode query for page {page}: {error}");
                format!("{}?page={page}", endpoints::CASH_FLOWS_VIEW)
            }
        }
    }
}

/// Render the cash flows matching the filters in the query string, newest first.
pub async fn get_cash_flows_page(
    State(state): State<CashFlowsPageState>,
    Query(query): Query<CashFlowsQuery>,
) -> Result<Response, Error> {
    let (filter, page) = query.clone().into_parts(state.pagination_config.default_page);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let options = get_taxonomy_options(&connection).inspect_err(|error| {
        tracing::error!("Failed to retrieve dictionaries for cash flows page: {error}")
    })?;
    let cash_flow_page = query_cash_flows(&filter, page, &connection)
        .inspect_err(|error| tracing::error!("Could not query cash flows: {error}"))?;

    let is_page_in_range = page >= 1 && page <= cash_flow_page.page_count;
    let pagination_indicators = if is_page_in_range {
        create_pagination_indicators(
            page,
            cash_flow_page.page_count,
            state.pagination_config.max_pages,
        )
    } else {
        Vec::new()
    };

    Ok(cash_flows_view(
        &query,
        &filter,
        &options,
        &cash_flow_page,
        &pagination_indicators,
    )
    .into_response())
}

fn filter_select(
    name: &str,
    label: &str,
    selected: Option<DatabaseId>,
    choices: &[(DatabaseId, String)],
) -> Markup {
    html! {
        div
        {
            label for=(format!("filter-{name}")) class=(FORM_LABEL_STYLE) { (label) }

            select name=(name) id=(format!("filter-{name}")) class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[selected.is_none()] { "All" }

                @for (id, choice_label) in choices {
                    option value=(id) selected[selected == Some(*id)] { (choice_label) }
                }
            }
        }
    }
}

fn filter_form_view(filter: &CashFlowFilter, options: &TaxonomyOptions) -> Markup {
    let statuses = options.choices(TaxonomyKind::Status);
    let flow_types = options.choices(TaxonomyKind::Type);
    let categories = options.choices(TaxonomyKind::Category);
    let subcategories = options.choices(TaxonomyKind::SubCategory);

    html! {
        form
            id="filter-form"
            method="get"
            action=(endpoints::CASH_FLOWS_VIEW)
            class="grid grid-cols-1 gap-4 md:grid-cols-3 lg:grid-cols-6 items-end"
        {
            div
            {
                label for="filter-date_from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    type="date"
                    name="date_from"
                    id="filter-date_from"
                    value=[filter.date_from]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="filter-date_to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    type="date"
                    name="date_to"
                    id="filter-date_to"
                    value=[filter.date_to]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (filter_select("status", "Status", filter.status, &statuses))
            (filter_select("type", "Type", filter.type_id, &flow_types))
            (filter_select("category", "Category", filter.category, &categories))
            (filter_select("subcategory", "Subcategory", filter.subcategory, &subcategories))

            div class="flex gap-4 items-center"
            {
                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Filter" }
                a href=(endpoints::CASH_FLOWS_VIEW) class=(LINK_STYLE) { "Clear" }
            }
        }
    }
}

fn table_row_view(row: &CashFlowRow) -> Markup {
    let cash_flow = &row.cash_flow;
    let edit_url = format_endpoint(endpoints::EDIT_CASH_FLOW_VIEW, cash_flow.id);
    let delete_url = format_endpoint(endpoints::CASH_FLOW_API, cash_flow.id);
    let created_at = cash_flow
        .created_at
        .format(DISPLAY_TIMESTAMP_FORMAT)
        .unwrap_or_default();
    let confirm_message = format!(
        "Are you sure you want to delete the record of {} from {}?",
        cash_flow.amount, cash_flow.created_at.date()
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-cash-flow-id=(cash_flow.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(cash_flow.created_at.date()) { (created_at) }
            }
            td class=(TABLE_CELL_STYLE) { span class=(BADGE_STYLE) { (row.status_name) } }
            td class=(TABLE_CELL_STYLE) { (row.type_name) }
            td class=(TABLE_CELL_STYLE) { (row.category_name) }
            td class=(TABLE_CELL_STYLE) { (row.subcategory_name) }
            td class="px-6 py-4 text-right tabular-nums" { (cash_flow.amount) }
            td class=(TABLE_CELL_STYLE) { (cash_flow.comment.as_deref().unwrap_or_default()) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    }
}

fn pagination_view(query: &CashFlowsQuery, indicators: &[PaginationIndicator]) -> Markup {
    html! {
        nav class="pagination flex justify-center mt-4" aria-label="Pagination"
        {
            ul class="pagination flex gap-2 items-center"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                a href=(query.page_url(*page)) class=(LINK_STYLE) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                p aria-current="page" class="font-bold" { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                p { "…" }
                            }
                            PaginationIndicator::BackButton(page) => {
                                a href=(query.page_url(*page)) class=(LINK_STYLE) { "Back" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(query.page_url(*page)) class=(LINK_STYLE) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn cash_flows_view(
    query: &CashFlowsQuery,
    filter: &CashFlowFilter,
    options: &TaxonomyOptions,
    cash_flow_page: &CashFlowPage,
    pagination_indicators: &[PaginationIndicator],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CASH_FLOWS_VIEW).into_html();
    let is_page_out_of_range = cash_flow_page.total > 0 && cash_flow_page.rows.is_empty();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full lg:max-w-6xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Records" }

                    a href=(endpoints::NEW_CASH_FLOW_VIEW) class=(LINK_STYLE) { "New Record" }
                }

                (filter_form_view(filter, options))

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    (cash_flow_page.total) " matching record(s)"
                }

                div class="overflow-x-auto dark:bg-gray-800"
                {
                    table
                        id="cash-flows-table"
                        class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Subcategory" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Comment" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in &cash_flow_page.rows {
                                (table_row_view(row))
                            }

                            @if cash_flow_page.rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="8"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        @if is_page_out_of_range {
                                            "There are no records on this page. "
                                            a href=(query.page_url(1)) class=(LINK_STYLE)
                                            {
                                                "Go to the first page"
                                            }
                                        } @else {
                                            "No records found."
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                @if !pagination_indicators.is_empty() {
                    (pagination_view(query, pagination_indicators))
                }
            }
        }
    );

    base("Records", &content)
}
