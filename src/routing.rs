//! Application router configuration.

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    cash_flow::{
        create_cash_flow_endpoint, delete_cash_flow_endpoint, edit_cash_flow_endpoint,
        get_cash_flows_page, get_edit_cash_flow_page, get_new_cash_flow_page,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    taxonomy::{get_dictionaries_page, manage_taxonomy_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::CASH_FLOWS_VIEW, get(get_cash_flows_page))
        .route(endpoints::NEW_CASH_FLOW_VIEW, get(get_new_cash_flow_page))
        .route(endpoints::EDIT_CASH_FLOW_VIEW, get(get_edit_cash_flow_page))
        .route(endpoints::DICTIONARIES_VIEW, get(get_dictionaries_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(endpoints::CASH_FLOWS_API, post(create_cash_flow_endpoint))
        .route(
            endpoints::CASH_FLOW_API,
            put(edit_cash_flow_endpoint).delete(delete_cash_flow_endpoint),
        )
        .route(endpoints::DICTIONARIES_API, post(manage_taxonomy_endpoint));

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        AppState, PaginationConfig, build_router,
        endpoints::{self, format_endpoint},
    };

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().expect("Could not open database in memory."),
            "Etc/UTC",
            PaginationConfig::default(),
        )
        .expect("Could not create app state.");

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn pages_are_served() {
        let server = get_test_server();

        for endpoint in [
            endpoints::CASH_FLOWS_VIEW,
            endpoints::NEW_CASH_FLOW_VIEW,
            endpoints::DICTIONARIES_VIEW,
        ] {
            let response = server.get(endpoint).await;

            assert_eq!(
                response.status_code(),
                StatusCode::OK,
                "want {endpoint} to be served"
            );
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server.get("/does/not/exist").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn edit_page_for_missing_cash_flow_is_not_found() {
        let server = get_test_server();

        server
            .get(&format_endpoint(endpoints::EDIT_CASH_FLOW_VIEW, 42))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn can_add_status_then_see_it_on_dictionaries_page() {
        let server = get_test_server();

        let response = server
            .post(endpoints::DICTIONARIES_API)
            .form(&[("add_status", "1"), ("name", "Pending")])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(
            response.header("hx-redirect"),
            endpoints::DICTIONARIES_VIEW
        );
        let page = server.get(endpoints::DICTIONARIES_VIEW).await.text();
        assert!(page.contains("Pending"), "want new status listed on the page");
    }

    #[tokio::test]
    async fn deleting_missing_cash_flow_is_not_found() {
        let server = get_test_server();

        server
            .delete(&format_endpoint(endpoints::CASH_FLOW_API, 42))
            .await
            .assert_status_not_found();
    }
}
