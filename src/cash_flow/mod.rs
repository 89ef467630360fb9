//! Cash flows: recorded financial transactions classified by the taxonomies.

mod amount;
mod core;
mod create;
mod delete;
mod edit;
mod form;
mod list_page;
mod query;
mod validation;

pub use amount::{Amount, AmountError};
pub use core::{
    CashFlow, CashFlowId, NewCashFlow, create_cash_flow, create_cash_flow_table,
    delete_cash_flow, get_cash_flow, update_cash_flow,
};
pub use create::{create_cash_flow_endpoint, get_new_cash_flow_page};
pub use delete::delete_cash_flow_endpoint;
pub use edit::{edit_cash_flow_endpoint, get_edit_cash_flow_page};
pub use list_page::get_cash_flows_page;
pub use query::{CashFlowFilter, CashFlowPage, CashFlowRow, query_cash_flows};
pub use validation::{CashFlowField, CashFlowForm, FieldError, FieldErrors, validate_cash_flow};
