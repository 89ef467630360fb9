//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/cash_flows/{cash_flow_id}/edit', use [format_endpoint].

use crate::database_id::DatabaseId;

/// The root route, which lists the cash flows.
pub const ROOT: &str = "/";
/// The page for listing, filtering and paging through cash flows.
pub const CASH_FLOWS_VIEW: &str = ROOT;
/// The page for recording a new cash flow.
pub const NEW_CASH_FLOW_VIEW: &str = "/cash_flows/new";
/// The page for editing an existing cash flow.
pub const EDIT_CASH_FLOW_VIEW: &str = "/cash_flows/{cash_flow_id}/edit";
/// The page for managing statuses, types, categories and subcategories.
pub const DICTIONARIES_VIEW: &str = "/dictionaries";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create cash flows.
pub const CASH_FLOWS_API: &str = "/api/cash_flows";
/// The route to update or delete a single cash flow.
pub const CASH_FLOW_API: &str = "/api/cash_flows/{cash_flow_id}";
/// The route that applies a single add, edit or delete operation to the dictionaries.
pub const DICTIONARIES_API: &str = "/api/dictionaries";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/cash_flows/{cash_flow_id}', '{cash_flow_id}' is the parameter.
///
/// This function assumes that an endpoint path contains a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: DatabaseId) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    #[track_caller]
    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::CASH_FLOWS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_CASH_FLOW_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_CASH_FLOW_VIEW);
        assert_endpoint_is_valid_uri(endpoints::DICTIONARIES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::CASH_FLOWS_API);
        assert_endpoint_is_valid_uri(endpoints::CASH_FLOW_API);
        assert_endpoint_is_valid_uri(endpoints::DICTIONARIES_API);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::EDIT_CASH_FLOW_VIEW, 42);

        assert_eq!(formatted_path, "/cash_flows/42/edit");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
