//! The dictionaries page and the endpoint that applies changes made on it.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    endpoints,
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    taxonomy::{
        MAX_NAME_LENGTH, TaxonomyKind, TaxonomyOperation, TaxonomyOptions, apply_operation,
        db::count_references_per_entry, get_taxonomy_options,
    },
};

/// The state needed for the dictionaries page.
#[derive(Debug, Clone)]
pub struct DictionariesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DictionariesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// One row on the dictionaries page.
struct EntryRow<'a> {
    id: DatabaseId,
    name: &'a str,
    parent_id: Option<DatabaseId>,
    reference_count: u32,
}

/// Render the page listing every status, type, category and subcategory.
pub async fn get_dictionaries_page(
    State(state): State<DictionariesPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let options = get_taxonomy_options(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve dictionaries: {error}"))?;

    let mut reference_counts = HashMap::new();
    for kind in TaxonomyKind::ALL {
        let counts = count_references_per_entry(kind, &connection).inspect_err(|error| {
            tracing::error!("Could not count records per {kind}: {error}")
        })?;
        reference_counts.insert(kind, counts);
    }

    Ok(dictionaries_view(&options, &reference_counts).into_response())
}

/// The state needed for applying taxonomy operations.
#[derive(Debug, Clone)]
pub struct ManageTaxonomyState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ManageTaxonomyState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Apply the add, edit or delete operation named in the submitted form.
///
/// Redirects back to the dictionaries page on success or when the form names
/// no operation, otherwise responds with an error alert.
pub async fn manage_taxonomy_endpoint(
    State(state): State<ManageTaxonomyState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let redirect = (
        HxRedirect(endpoints::DICTIONARIES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    );

    let operation = match TaxonomyOperation::decode(&fields) {
        Ok(Some(operation)) => operation,
        Ok(None) => {
            tracing::debug!("No taxonomy operation in request, nothing to do");
            return redirect.into_response();
        }
        Err(error) => {
            tracing::warn!("Rejected taxonomy request: {error}");
            return error.into_alert_response();
        }
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let kind = operation.kind();

    match apply_operation(&operation, &mut connection) {
        Ok(()) => {
            tracing::info!("Applied {kind} operation {operation:?}");
            redirect.into_response()
        }
        Err(error) => {
            tracing::warn!("Could not apply {kind} operation {operation:?}: {error}");
            error.into_alert_response()
        }
    }
}

fn section_title(kind: TaxonomyKind) -> &'static str {
    match kind {
        TaxonomyKind::Status => "Statuses",
        TaxonomyKind::Type => "Types",
        TaxonomyKind::Category => "Categories",
        TaxonomyKind::SubCategory => "Subcategories",
    }
}

fn parent_field(kind: TaxonomyKind) -> Option<&'static str> {
    match kind {
        TaxonomyKind::Status | TaxonomyKind::Type => None,
        TaxonomyKind::Category => Some("type_id"),
        TaxonomyKind::SubCategory => Some("category_id"),
    }
}

/// The `(id, label)` choices for the parent of `kind`.
fn parent_choices(kind: TaxonomyKind, options: &TaxonomyOptions) -> Vec<(DatabaseId, String)> {
    kind.parent()
        .map(|parent_kind| options.choices(parent_kind))
        .unwrap_or_default()
}

fn entry_rows<'a>(
    kind: TaxonomyKind,
    options: &'a TaxonomyOptions,
    reference_counts: &HashMap<DatabaseId, u32>,
) -> Vec<EntryRow<'a>> {
    let count = |id: DatabaseId| *reference_counts.get(&id).unwrap_or(&0);

    match kind {
        TaxonomyKind::Status => options
            .statuses
            .iter()
            .map(|status| EntryRow {
                id: status.id,
                name: status.name.as_ref(),
                parent_id: None,
                reference_count: count(status.id),
            })
            .collect(),
        TaxonomyKind::Type => options
            .flow_types
            .iter()
            .map(|flow_type| EntryRow {
                id: flow_type.id,
                name: flow_type.name.as_ref(),
                parent_id: None,
                reference_count: count(flow_type.id),
            })
            .collect(),
        TaxonomyKind::Category => options
            .categories
            .iter()
            .map(|category| EntryRow {
                id: category.id,
                name: category.name.as_ref(),
                parent_id: Some(category.type_id),
                reference_count: count(category.id),
            })
            .collect(),
        TaxonomyKind::SubCategory => options
            .subcategories
            .iter()
            .map(|subcategory| EntryRow {
                id: subcategory.id,
                name: subcategory.name.as_ref(),
                parent_id: Some(subcategory.category_id),
                reference_count: count(subcategory.id),
            })
            .collect(),
    }
}

fn parent_select(
    field: &str,
    choices: &[(DatabaseId, String)],
    selected: Option<DatabaseId>,
) -> Markup {
    html! {
        select name=(field) required class=(FORM_TEXT_INPUT_STYLE) aria-label="Parent"
        {
            @if selected.is_none() {
                option value="" disabled selected { "Choose…" }
            }

            @for (id, label) in choices {
                option value=(id) selected[selected == Some(*id)] { (label) }
            }
        }
    }
}

fn section_view(
    kind: TaxonomyKind,
    options: &TaxonomyOptions,
    reference_counts: &HashMap<DatabaseId, u32>,
) -> Markup {
    let tag = kind.tag();
    let choices = parent_choices(kind, options);
    let rows = entry_rows(kind, options, reference_counts);
    let column_count = if parent_field(kind).is_some() { 4 } else { 3 };
    let can_add = parent_field(kind).is_none() || !choices.is_empty();

    html! {
        section id=(format!("{tag}-section")) class="w-full lg:max-w-5xl space-y-4"
        {
            h2 class="text-lg font-bold" { (section_title(kind)) }

            @if can_add {
                form
                    hx-post=(endpoints::DICTIONARIES_API)
                    hx-target-error="#alert-container"
                    class="flex flex-wrap gap-2 items-center"
                {
                    input type="hidden" name=(format!("add_{tag}")) value="1";

                    input
                        type="text"
                        name="name"
                        placeholder=(format!("New {kind}"))
                        aria-label="Name"
                        required
                        maxlength=(MAX_NAME_LENGTH)
                        class=(FORM_TEXT_INPUT_STYLE);

                    @if let Some(field) = parent_field(kind) {
                        (parent_select(field, &choices, None))
                    }

                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Add" }
                }
            } @else {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    @if kind == TaxonomyKind::Category {
                        "Add a type before adding categories."
                    } @else {
                        "Add a category before adding subcategories."
                    }
                }
            }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        @if parent_field(kind).is_some() {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Parent" }
                        }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Records" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for row in &rows {
                        (entry_row_view(kind, row, &choices))
                    }

                    @if rows.is_empty() {
                        tr
                        {
                            td
                                colspan=(column_count)
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "Nothing here yet."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn entry_row_view(kind: TaxonomyKind, row: &EntryRow, choices: &[(DatabaseId, String)]) -> Markup {
    let tag = kind.tag();
    let edit_form_id = format!("edit-{tag}-{}", row.id);
    let confirm_message = if row.reference_count > 0 {
        format!(
            "'{}' is used by {} record(s) and cannot be deleted.",
            row.name, row.reference_count
        )
    } else {
        format!("Are you sure you want to delete '{}'?", row.name)
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                form
                    id=(edit_form_id)
                    hx-post=(endpoints::DICTIONARIES_API)
                    hx-target-error="#alert-container"
                {
                    input type="hidden" name=(format!("edit_{tag}")) value="1";
                    input type="hidden" name="id" value=(row.id);

                    input
                        type="text"
                        name="name"
                        value=(row.name)
                        aria-label="Name"
                        required
                        maxlength=(MAX_NAME_LENGTH)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if let Some(field) = parent_field(kind) {
                td class=(TABLE_CELL_STYLE)
                {
                    select
                        form=(edit_form_id)
                        name=(field)
                        required
                        aria-label="Parent"
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for (id, label) in choices {
                            option value=(id) selected[row.parent_id == Some(*id)] { (label) }
                        }
                    }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(BADGE_STYLE) { (row.reference_count) }
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    button type="submit" form=(edit_form_id) class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Save"
                    }

                    form
                        hx-post=(endpoints::DICTIONARIES_API)
                        hx-confirm=(confirm_message)
                        hx-target-error="#alert-container"
                    {
                        input type="hidden" name=(format!("delete_{tag}")) value="1";
                        input type="hidden" name="id" value=(row.id);

                        button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }
                    }
                }
            }
        }
    }
}

fn dictionaries_view(
    options: &TaxonomyOptions,
    reference_counts: &HashMap<TaxonomyKind, HashMap<DatabaseId, u32>>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DICTIONARIES_VIEW).into_html();
    let empty_counts = HashMap::new();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl space-y-8"
            {
                header
                {
                    h1 class="text-xl font-bold" { "Dictionaries" }
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Entries used by a record cannot be deleted or moved to another parent."
                    }
                }

                @for kind in TaxonomyKind::ALL {
                    (section_view(
                        kind,
                        options,
                        reference_counts.get(&kind).unwrap_or(&empty_counts),
                    ))
                }
            }
        }
    );

    base("Dictionaries", &content)
}
