//! The page and endpoint for editing an existing cash flow.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    cash_flow::{
        CashFlowForm, CashFlowId, FieldErrors,
        form::{CashFlowFormView, FormMethod, cash_flow_form_view},
        get_cash_flow, update_cash_flow, validate_cash_flow,
    },
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    taxonomy::{TaxonomyOptions, get_taxonomy_options},
};

/// The state needed to edit a cash flow.
#[derive(Debug, Clone)]
pub struct EditCashFlowState {
    /// The database connection for managing cash flows.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCashFlowState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit_form(
    cash_flow_id: CashFlowId,
    form: &CashFlowForm,
    errors: &FieldErrors,
    options: &TaxonomyOptions,
) -> Markup {
    let endpoint = format_endpoint(endpoints::CASH_FLOW_API, cash_flow_id);

    cash_flow_form_view(&CashFlowFormView {
        endpoint: &endpoint,
        method: FormMethod::Put,
        form,
        errors,
        options,
        submit_label: "Save Changes",
    })
}

fn edit_cash_flow_view(
    cash_flow_id: CashFlowId,
    form: &CashFlowForm,
    options: &TaxonomyOptions,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CASH_FLOWS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold my-4" { "Edit Record #" (cash_flow_id) }

            (edit_form(cash_flow_id, form, &FieldErrors::default(), options))
        }
    };

    base("Edit Record", &content)
}

/// Renders the page for editing the cash flow `cash_flow_id`, or the 404 page
/// if it does not exist.
pub async fn get_edit_cash_flow_page(
    State(state): State<EditCashFlowState>,
    Path(cash_flow_id): Path<CashFlowId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let cash_flow = get_cash_flow(cash_flow_id, &connection)?;
    let options = get_taxonomy_options(&connection).inspect_err(|error| {
        tracing::error!("Failed to retrieve dictionaries for edit page: {error}")
    })?;

    Ok(edit_cash_flow_view(
        cash_flow_id,
        &CashFlowForm::from_cash_flow(&cash_flow),
        &options,
    )
    .into_response())
}

/// A route handler for replacing the cash flow `cash_flow_id`.
///
/// An empty date keeps the date the cash flow already has. Redirects to the
/// cash flows view on success and sends the form back with field errors if
/// the input is invalid.
pub async fn edit_cash_flow_endpoint(
    State(state): State<EditCashFlowState>,
    Path(cash_flow_id): Path<CashFlowId>,
    Form(form): Form<CashFlowForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let existing = match get_cash_flow(cash_flow_id, &connection) {
        Ok(cash_flow) => cash_flow,
        Err(Error::NotFound) => {
            tracing::warn!("Tried to update missing cash flow {cash_flow_id}");
            return Error::UpdateMissingCashFlow.into_alert_response();
        }
        Err(error) => return error.into_alert_response(),
    };

    let new_cash_flow = match validate_cash_flow(&form, existing.created_at, &connection) {
        Ok(new_cash_flow) => new_cash_flow,
        Err(Error::InvalidCashFlow(errors)) => {
            tracing::debug!("Rejected changes to cash flow {cash_flow_id}: {errors}");

            return match get_taxonomy_options(&connection) {
                Ok(options) => edit_form(cash_flow_id, &form, &errors, &options).into_response(),
                Err(error) => error.into_alert_response(),
            };
        }
        Err(error) => {
            tracing::error!("could not validate cash flow {cash_flow_id}: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = update_cash_flow(cash_flow_id, &new_cash_flow, &connection) {
        tracing::error!("Could not update cash flow {cash_flow_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::CASH_FLOWS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod edit_cash_flow_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use scraper::Selector;
    use time::macros::datetime;

    use crate::{
        cash_flow::{
            Amount, CashFlow, CashFlowForm, create_cash_flow,
            edit::{EditCashFlowState, edit_cash_flow_endpoint, get_edit_cash_flow_page},
            get_cash_flow,
        },
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_hx_endpoint,
            assert_hx_redirect, assert_status_ok, assert_valid_html, create_test_taxonomies,
            get_test_connection, must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    fn get_state_with_cash_flow() -> (EditCashFlowState, CashFlow) {
        let connection = get_test_connection();
        let taxonomies = create_test_taxonomies(&connection);
        let mut new_cash_flow = taxonomies.new_cash_flow(datetime!(2024-01-15 08:30:00), 1_050);
        new_cash_flow.comment = Some("Apples".to_owned());
        let cash_flow = create_cash_flow(&new_cash_flow, &connection).unwrap();

        let state = EditCashFlowState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, cash_flow)
    }

    #[tokio::test]
    async fn edit_page_is_prefilled() {
        let (state, cash_flow) = get_state_with_cash_flow();

        let response = get_edit_cash_flow_page(State(state), Path(cash_flow.id))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::CASH_FLOW_API, cash_flow.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "text", "10.50");
        let created_at = Selector::parse("input[name=created_at]").unwrap();
        assert_eq!(
            form.select(&created_at)
                .next()
                .and_then(|input| input.value().attr("value")),
            Some("2024-01-15T08:30:00")
        );
    }

    #[tokio::test]
    async fn edit_page_for_missing_cash_flow_is_not_found() {
        let (state, _) = get_state_with_cash_flow();

        let result = get_edit_cash_flow_page(State(state), Path(999)).await;

        let response = axum::response::IntoResponse::into_response(result.unwrap_err());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn can_update_cash_flow_and_keep_date() {
        let (state, cash_flow) = get_state_with_cash_flow();
        let mut form = CashFlowForm::from_cash_flow(&cash_flow);
        form.created_at = None;
        form.amount = Some("3.21".to_owned());
        form.comment = Some("Pears".to_owned());

        let response =
            edit_cash_flow_endpoint(State(state.clone()), Path(cash_flow.id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CASH_FLOWS_VIEW);
        let updated = get_cash_flow(cash_flow.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.amount, Amount::from_cents(321));
        assert_eq!(updated.comment.as_deref(), Some("Pears"));
        assert_eq!(updated.created_at, cash_flow.created_at);
    }

    #[tokio::test]
    async fn invalid_update_returns_form_and_keeps_record() {
        let (state, cash_flow) = get_state_with_cash_flow();
        let mut form = CashFlowForm::from_cash_flow(&cash_flow);
        form.subcategory = Some("999".to_owned());

        let response =
            edit_cash_flow_endpoint(State(state.clone()), Path(cash_flow.id), Form(form)).await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        assert_form_error_message(
            &must_get_form(&html),
            "subcategory",
            "select a valid choice.",
        );
        assert_eq!(
            get_cash_flow(cash_flow.id, &state.db_connection.lock().unwrap()).unwrap(),
            cash_flow
        );
    }

    #[tokio::test]
    async fn update_missing_cash_flow_is_not_found() {
        let (state, cash_flow) = get_state_with_cash_flow();
        let form = CashFlowForm::from_cash_flow(&cash_flow);

        let response = edit_cash_flow_endpoint(State(state), Path(999), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
