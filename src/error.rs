//! Defines the app level error type and conversions to rendered HTML pages and alerts.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, cash_flow::FieldErrors, database_id::DatabaseId,
    internal_server_error::InternalServerError, not_found::NotFoundError, taxonomy::TaxonomyKind,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty (or whitespace only) string was used as a taxonomy name.
    #[error("name cannot be empty")]
    EmptyName,

    /// A taxonomy name was longer than the maximum allowed number of characters.
    #[error("name cannot be longer than {0} characters")]
    NameTooLong(usize),

    /// Another entry of the same kind with the same name (ignoring case and
    /// surrounding whitespace) already exists in the same scope.
    #[error("the {kind} \"{name}\" already exists")]
    DuplicateName {
        /// The kind of entry that was being created or edited.
        kind: TaxonomyKind,
        /// The offending name.
        name: String,
    },

    /// The taxonomy entry could not be found.
    #[error("could not find the {0} with ID {1}")]
    TaxonomyNotFound(TaxonomyKind, DatabaseId),

    /// The parent ID of a category or subcategory does not refer to an
    /// existing type or category, respectively.
    #[error("the parent of the {0} (ID {1}) does not exist")]
    InvalidParent(TaxonomyKind, DatabaseId),

    /// Tried to delete a taxonomy entry that is used by at least one cash flow.
    #[error("the {0} is referenced by {1} record(s) and cannot be deleted")]
    ReferencedTaxonomy(TaxonomyKind, u32),

    /// Tried to move a category or subcategory to another parent while cash
    /// flows still reference it.
    #[error("the {0} is referenced by {1} record(s) and cannot be moved to another parent")]
    ParentChangeConflict(TaxonomyKind, u32),

    /// The taxonomy management request could not be decoded into exactly one
    /// operation.
    #[error("invalid request: {0}")]
    InvalidOperation(String),

    /// A cash flow failed validation. Holds every field error that was found.
    #[error("invalid cash flow: {0}")]
    InvalidCashFlow(FieldErrors),

    /// Tried to update a cash flow that does not exist.
    #[error("tried to update a cash flow that is not in the database")]
    UpdateMissingCashFlow,

    /// Tried to delete a cash flow that does not exist.
    #[error("tried to delete a cash flow that is not in the database")]
    DeleteMissingCashFlow,

    /// A timestamp could not be converted to or from its database format.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::TaxonomyNotFound(..) => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert fragment for htmx requests.
    ///
    /// Errors caused by the client's input are shown verbatim so the user can
    /// correct and resubmit, everything else is logged and shown as a generic
    /// failure.
    pub fn into_alert_response(self) -> Response {
        let (status_code, message, details) = match &self {
            Error::EmptyName | Error::NameTooLong(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid name".to_owned(),
                format!("The name is not valid: {self}."),
            ),
            Error::DuplicateName { kind, .. } => (
                StatusCode::BAD_REQUEST,
                format!("Duplicate {kind}"),
                format!("{self}. Choose a different name, or edit the existing {kind}."),
            ),
            Error::InvalidParent(kind, _) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid {kind}"),
                format!("{self}. Try refreshing the page."),
            ),
            Error::InvalidOperation(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid request".to_owned(),
                self.to_string(),
            ),
            Error::TaxonomyNotFound(kind, _) => (
                StatusCode::NOT_FOUND,
                format!("Could not find {kind}"),
                format!(
                    "{self}. Try refreshing the page to see if the {kind} has already been deleted."
                ),
            ),
            Error::ReferencedTaxonomy(kind, _) => (
                StatusCode::CONFLICT,
                format!("Could not delete {kind}"),
                format!("The {kind} is referenced and cannot be deleted: {self}."),
            ),
            Error::ParentChangeConflict(kind, _) => (
                StatusCode::CONFLICT,
                format!("Could not update {kind}"),
                format!("{self}."),
            ),
            Error::UpdateMissingCashFlow => (
                StatusCode::NOT_FOUND,
                "Could not update record".to_owned(),
                "The record could not be found.".to_owned(),
            ),
            Error::DeleteMissingCashFlow => (
                StatusCode::NOT_FOUND,
                "Could not delete record".to_owned(),
                "The record could not be found. \
                Try refreshing the page to see if the record has already been deleted."
                    .to_owned(),
            ),
            Error::InvalidCashFlow(errors) => (
                StatusCode::BAD_REQUEST,
                "Invalid record".to_owned(),
                errors.to_string(),
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings".to_owned(),
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_owned(),
                    "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                )
            }
        };

        (status_code, Alert::Error { message, details }).into_response()
    }
}
