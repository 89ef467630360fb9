//! Checks user input for a cash flow against the taxonomies before it is stored.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{
    Date, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    Error,
    cash_flow::{Amount, CashFlow, NewCashFlow},
    database_id::DatabaseId,
    taxonomy::{get_category, get_flow_type, get_status, get_subcategory},
};

/// The maximum number of characters in a cash flow comment.
pub const MAX_COMMENT_LENGTH: usize = 500;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const DATE_TIME_MINUTES_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");
/// The format used by `datetime-local` inputs with a step of one second.
pub const DATE_TIME_SECONDS_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

const REQUIRED_MESSAGE: &str = "this field is required.";
const INVALID_CHOICE_MESSAGE: &str = "select a valid choice.";

/// The user editable fields of a cash flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CashFlowField {
    /// When the money moved.
    CreatedAt,
    /// The status reference.
    Status,
    /// The type reference.
    Type,
    /// The category reference.
    Category,
    /// The subcategory reference.
    SubCategory,
    /// The amount.
    Amount,
    /// The free text comment.
    Comment,
}

impl CashFlowField {
    /// The name of the form field, e.g. "subcategory".
    pub fn name(&self) -> &'static str {
        match self {
            CashFlowField::CreatedAt => "created_at",
            CashFlowField::Status => "status",
            CashFlowField::Type => "type",
            CashFlowField::Category => "category",
            CashFlowField::SubCategory => "subcategory",
            CashFlowField::Amount => "amount",
            CashFlowField::Comment => "comment",
        }
    }
}

/// A problem with the value of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The field the problem is with.
    pub field: CashFlowField,
    /// A message the user can act on.
    pub message: String,
}

/// Every problem found with a submitted cash flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Record a problem with `field`.
    pub fn push(&mut self, field: CashFlowField, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// The first message recorded for `field`.
    pub fn get(&self, field: CashFlowField) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// Whether no problems were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded problems in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field.name(), error.message))
            .collect();

        write!(f, "{}", messages.join(" "))
    }
}

/// The raw form data for creating or editing a cash flow.
///
/// Every field is kept as text so that the form can be shown again with the
/// user's input when validation fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowForm {
    /// `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS`.
    pub created_at: Option<String>,
    /// The status ID.
    pub status: Option<String>,
    /// The type ID.
    #[serde(rename = "type")]
    pub type_id: Option<String>,
    /// The category ID.
    pub category: Option<String>,
    /// The subcategory ID.
    pub subcategory: Option<String>,
    /// The amount as a decimal number.
    pub amount: Option<String>,
    /// An optional note.
    pub comment: Option<String>,
}

impl CashFlowForm {
    /// Fill in the form with the current values of `cash_flow`.
    pub fn from_cash_flow(cash_flow: &CashFlow) -> Self {
        Self {
            created_at: cash_flow.created_at.format(DATE_TIME_SECONDS_FORMAT).ok(),
            status: Some(cash_flow.status_id.to_string()),
            type_id: Some(cash_flow.type_id.to_string()),
            category: Some(cash_flow.category_id.to_string()),
            subcategory: Some(cash_flow.subcategory_id.to_string()),
            amount: Some(cash_flow.amount.to_string()),
            comment: cash_flow.comment.clone(),
        }
    }
}

/// Parse a submitted date, with or without a time.
///
/// A date on its own is taken to mean midnight.
pub fn parse_created_at(text: &str) -> Option<PrimitiveDateTime> {
    let text = text.trim();

    PrimitiveDateTime::parse(text, DATE_TIME_SECONDS_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(text, DATE_TIME_MINUTES_FORMAT))
        .or_else(|_| Date::parse(text, DATE_FORMAT).map(|date| date.with_time(Time::MIDNIGHT)))
        .ok()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Look up the entry named by the ID in `raw_id` with `get_entry`.
///
/// Missing, malformed and unknown IDs are recorded in `errors` and give `None`.
fn resolve_reference<T>(
    field: CashFlowField,
    raw_id: Option<&str>,
    errors: &mut FieldErrors,
    get_entry: impl FnOnce(DatabaseId) -> Result<T, Error>,
) -> Result<Option<T>, Error> {
    let Some(raw_id) = non_empty(raw_id) else {
        errors.push(field, REQUIRED_MESSAGE);
        return Ok(None);
    };

    let Ok(id) = raw_id.parse::<DatabaseId>() else {
        errors.push(field, INVALID_CHOICE_MESSAGE);
        return Ok(None);
    };

    match get_entry(id) {
        Ok(entry) => Ok(Some(entry)),
        Err(Error::NotFound) => {
            errors.push(field, INVALID_CHOICE_MESSAGE);
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

/// Validate `form` and turn it into a cash flow ready to be stored.
///
/// An empty `created_at` is replaced with `default_created_at`. Every field is
/// checked before returning, so the error holds all problems at once:
/// - the status, type, category and subcategory must exist,
/// - the category must belong to the type,
/// - the subcategory must belong to the category,
/// - the amount must be positive with at most two decimal places,
/// - the comment must be at most [MAX_COMMENT_LENGTH] characters after trimming.
///
/// # Errors
/// Returns [Error::InvalidCashFlow] with the field errors if the input is
/// invalid, or [Error::SqlError] if the taxonomies could not be read.
pub fn validate_cash_flow(
    form: &CashFlowForm,
    default_created_at: PrimitiveDateTime,
    connection: &Connection,
) -> Result<NewCashFlow, Error> {
    let mut errors = FieldErrors::default();

    let created_at = match non_empty(form.created_at.as_deref()) {
        None => Some(default_created_at),
        Some(text) => {
            let created_at = parse_created_at(text);
            if created_at.is_none() {
                errors.push(CashFlowField::CreatedAt, "enter a valid date and time.");
            }
            created_at
        }
    };

    let status = resolve_reference(
        CashFlowField::Status,
        form.status.as_deref(),
        &mut errors,
        |id| get_status(id, connection),
    )?;
    let flow_type = resolve_reference(
        CashFlowField::Type,
        form.type_id.as_deref(),
        &mut errors,
        |id| get_flow_type(id, connection),
    )?;
    let category = resolve_reference(
        CashFlowField::Category,
        form.category.as_deref(),
        &mut errors,
        |id| get_category(id, connection),
    )?;
    let subcategory = resolve_reference(
        CashFlowField::SubCategory,
        form.subcategory.as_deref(),
        &mut errors,
        |id| get_subcategory(id, connection),
    )?;

    if let (Some(flow_type), Some(category)) = (&flow_type, &category)
        && category.type_id != flow_type.id
    {
        errors.push(CashFlowField::Category, "category does not belong to type.");
    }

    if let (Some(category), Some(subcategory)) = (&category, &subcategory)
        && subcategory.category_id != category.id
    {
        errors.push(
            CashFlowField::SubCategory,
            "subcategory does not belong to category.",
        );
    }

    let amount = match non_empty(form.amount.as_deref()) {
        None => {
            errors.push(CashFlowField::Amount, REQUIRED_MESSAGE);
            None
        }
        Some(text) => match text.parse::<Amount>() {
            Ok(amount) => Some(amount),
            Err(error) => {
                errors.push(CashFlowField::Amount, error.to_string());
                None
            }
        },
    };

    let comment = non_empty(form.comment.as_deref()).map(str::to_owned);
    if let Some(comment) = &comment
        && comment.chars().count() > MAX_COMMENT_LENGTH
    {
        errors.push(
            CashFlowField::Comment,
            format!("comment must be at most {MAX_COMMENT_LENGTH} characters."),
        );
    }

    match (created_at, status, flow_type, category, subcategory, amount) {
        (
            Some(created_at),
            Some(status),
            Some(flow_type),
            Some(category),
            Some(subcategory),
            Some(amount),
        ) if errors.is_empty() => Ok(NewCashFlow {
            created_at,
            status_id: status.id,
            type_id: flow_type.id,
            category_id: category.id,
            subcategory_id: subcategory.id,
            amount,
            comment,
        }),
        _ => Err(Error::InvalidCashFlow(errors)),
    }
}
