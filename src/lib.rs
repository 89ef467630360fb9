//! A cash-flow ledger web app.
//!
//! Records financial transactions ("cash flows") and the reference data that
//! classifies them: statuses, types, categories and subcategories. The library
//! provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod cash_flow;
mod database_id;
mod db;
mod endpoints;
mod error;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod routing;
mod taxonomy;
#[cfg(test)]
mod test_utils;
mod timezone;

pub use app_state::AppState;
pub use cash_flow::{
    Amount, AmountError, CashFlow, CashFlowField, CashFlowFilter, CashFlowPage, CashFlowRow,
    FieldError, FieldErrors, NewCashFlow, create_cash_flow, query_cash_flows,
};
pub use database_id::DatabaseId;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::{PAGE_SIZE, PaginationConfig};
pub use routing::build_router;
pub use taxonomy::{
    Category, FlowType, Status, SubCategory, TaxonomyEntry, TaxonomyKind, TaxonomyName,
    TaxonomyOperation, apply_operation, create_category, create_flow_type, create_status,
    create_subcategory,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
