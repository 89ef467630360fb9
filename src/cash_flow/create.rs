//! The page and endpoint for recording a new cash flow.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// axum_extra's Form parses empty strings as None instead of rejecting the request.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    cash_flow::{
        CashFlowForm, FieldErrors, create_cash_flow,
        form::{CashFlowFormView, FormMethod, cash_flow_form_view},
        validate_cash_flow,
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base},
    navigation::NavBar,
    taxonomy::{TaxonomyOptions, get_taxonomy_options},
    timezone::local_now,
};

/// The state needed for the new cash flow page.
#[derive(Debug, Clone)]
pub struct NewCashFlowPageState {
    /// The database connection for reading the taxonomies.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewCashFlowPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for recording a new cash flow.
pub async fn get_new_cash_flow_page(
    State(state): State<NewCashFlowPageState>,
) -> Result<Response, Error> {
    let options = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_taxonomy_options(&connection).inspect_err(|error| {
            tracing::error!("Failed to retrieve dictionaries for new cash flow page: {error}")
        })?
    };

    Ok(new_cash_flow_view(&options).into_response())
}

fn create_form(form: &CashFlowForm, errors: &FieldErrors, options: &TaxonomyOptions) -> Markup {
    cash_flow_form_view(&CashFlowFormView {
        endpoint: endpoints::CASH_FLOWS_API,
        method: FormMethod::Post,
        form,
        errors,
        options,
        submit_label: "Create Record",
    })
}

fn new_cash_flow_view(options: &TaxonomyOptions) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CASH_FLOW_VIEW).into_html();
    let is_missing_taxonomies = options.statuses.is_empty() || options.subcategories.is_empty();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold my-4" { "New Record" }

            @if is_missing_taxonomies {
                p class="mb-4 text-sm"
                {
                    "Add at least one status, type, category and subcategory on the "
                    a href=(endpoints::DICTIONARIES_VIEW) class=(LINK_STYLE) { "dictionaries page" }
                    " before recording cash flows."
                }
            }

            p class="mb-4 text-sm text-gray-500 dark:text-gray-400"
            {
                "Leave the date empty to use the current time."
            }

            (create_form(&CashFlowForm::default(), &FieldErrors::default(), options))
        }
    };

    base("New Record", &content)
}

/// The state needed to create a cash flow.
#[derive(Debug, Clone)]
pub struct CreateCashFlowState {
    /// The database connection for managing cash flows.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateCashFlowState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new cash flow.
///
/// Redirects to the cash flows view on success. If the input is invalid, the
/// form is sent back with an error message under each offending field.
pub async fn create_cash_flow_endpoint(
    State(state): State<CreateCashFlowState>,
    Form(form): Form<CashFlowForm>,
) -> Response {
    let now = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let new_cash_flow = match validate_cash_flow(&form, now, &connection) {
        Ok(new_cash_flow) => new_cash_flow,
        Err(Error::InvalidCashFlow(errors)) => {
            tracing::debug!("Rejected new cash flow: {errors}");

            return match get_taxonomy_options(&connection) {
                Ok(options) => create_form(&form, &errors, &options).into_response(),
                Err(error) => error.into_alert_response(),
            };
        }
        Err(error) => {
            tracing::error!("could not validate cash flow: {error}");
            return error.into_alert_response();
        }
    };

    match create_cash_flow(&new_cash_flow, &connection) {
        Ok(cash_flow) => {
            tracing::info!("Created cash flow {}", cash_flow.id);

            (
                HxRedirect(endpoints::CASH_FLOWS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create cash flow: {error}");
            error.into_alert_response()
        }
    }
}
