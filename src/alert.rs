//! Alert fragments for reporting the outcome of htmx requests.
//!
//! Alerts are rendered into the `#alert-container` element defined in
//! [crate::html::base], either as the normal response target or via the
//! `hx-target-error` attribute for error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

const SUCCESS_STYLE: &str = "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
    dark:bg-gray-800 dark:text-green-400 border border-green-300 dark:border-green-800";
const ERROR_STYLE: &str = "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
    dark:bg-gray-800 dark:text-red-400 border border-red-300 dark:border-red-800";

/// A dismissable message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// A success message with no further details.
    SuccessSimple {
        /// The headline shown to the user.
        message: String,
    },
    /// An error message with details on what went wrong and how to fix it.
    Error {
        /// The headline shown to the user.
        message: String,
        /// Explains the error in more detail.
        details: String,
    },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (style, role, message, details) = match self {
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, "status", message, None),
            Alert::Error { message, details } => (ERROR_STYLE, "alert", message, Some(details)),
        };

        html! {
            div
                class=(style)
                role=(role)
            {
                div class="flex items-start justify-between gap-4"
                {
                    div
                    {
                        p class="font-semibold" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty()) {
                            span class="block mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="font-bold"
                        onclick="this.closest('[role]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}
