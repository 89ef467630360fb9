use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    cash_flow::{CashFlowId, delete_cash_flow},
};

/// The state needed to delete a cash flow.
#[derive(Debug, Clone)]
pub struct DeleteCashFlowState {
    /// The database connection for managing cash flows.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCashFlowState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a cash flow, responds with an alert.
///
/// The status code has to be 200 OK on success or htmx will not remove the table row.
pub async fn delete_cash_flow_endpoint(
    State(state): State<DeleteCashFlowState>,
    Path(cash_flow_id): Path<CashFlowId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_cash_flow(cash_flow_id, &connection) {
        Ok(()) => {
            tracing::info!("Deleted cash flow {cash_flow_id}");
            Alert::SuccessSimple {
                message: "Record deleted successfully".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete cash flow {cash_flow_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_cash_flow_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::datetime;

    use crate::{
        Error,
        cash_flow::{
            create_cash_flow,
            delete::{DeleteCashFlowState, delete_cash_flow_endpoint},
            get_cash_flow,
        },
        test_utils::{
            assert_status_ok, assert_valid_html, create_test_taxonomies, get_test_connection,
            parse_html_fragment,
        },
    };

    fn get_state() -> DeleteCashFlowState {
        DeleteCashFlowState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    #[tokio::test]
    async fn deletes_cash_flow() {
        let state = get_state();
        let cash_flow_id = {
            let connection = state.db_connection.lock().unwrap();
            let taxonomies = create_test_taxonomies(&connection);

            create_cash_flow(
                &taxonomies.new_cash_flow(datetime!(2024-01-15 08:30:00), 100),
                &connection,
            )
            .unwrap()
            .id
        };

        let response = delete_cash_flow_endpoint(State(state.clone()), Path(cash_flow_id)).await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_eq!(
            get_cash_flow(cash_flow_id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn deleting_missing_cash_flow_is_not_found() {
        let state = get_state();

        let response = delete_cash_flow_endpoint(State(state), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
