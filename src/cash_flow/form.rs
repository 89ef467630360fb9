//! The form shared by the pages for creating and editing a cash flow.

use maud::{Markup, html};

use crate::{
    cash_flow::{CashFlowField, CashFlowForm, FieldErrors, validation::MAX_COMMENT_LENGTH},
    database_id::DatabaseId,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, field_error_message},
    taxonomy::{TaxonomyKind, TaxonomyOptions},
};

/// The HTTP method the form is submitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    /// Create a new cash flow.
    Post,
    /// Replace an existing cash flow.
    Put,
}

/// Everything needed to render the cash flow form.
pub struct CashFlowFormView<'a> {
    /// Where the form is submitted to.
    pub endpoint: &'a str,
    pub method: FormMethod,
    /// The values to fill the inputs with.
    pub form: &'a CashFlowForm,
    /// Messages to show under the offending inputs.
    pub errors: &'a FieldErrors,
    /// The choices for the select inputs.
    pub options: &'a TaxonomyOptions,
    pub submit_label: &'a str,
}

fn reference_select(
    field: CashFlowField,
    label: &str,
    selected: Option<&str>,
    choices: &[(DatabaseId, String)],
    errors: &FieldErrors,
) -> Markup {
    let name = field.name();
    let selected = selected.and_then(|id| id.trim().parse::<DatabaseId>().ok());

    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            select name=(name) id=(name) required class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" selected[selected.is_none()] { "Select a " (label.to_lowercase()) }

                @for (id, choice_label) in choices {
                    option value=(id) selected[selected == Some(*id)] { (choice_label) }
                }
            }

            (field_error_message(name, errors.get(field)))
        }
    }
}

/// Render the cash flow form.
///
/// On a validation error the endpoint responds with this form again, so the
/// form replaces itself with the response.
pub fn cash_flow_form_view(view: &CashFlowFormView<'_>) -> Markup {
    let CashFlowFormView {
        endpoint,
        method,
        form,
        errors,
        options,
        submit_label,
    } = view;

    let statuses = options.choices(TaxonomyKind::Status);
    let flow_types = options.choices(TaxonomyKind::Type);
    let categories = options.choices(TaxonomyKind::Category);
    let subcategories = options.choices(TaxonomyKind::SubCategory);

    let (hx_post, hx_put) = match method {
        FormMethod::Post => (Some(*endpoint), None),
        FormMethod::Put => (None, Some(*endpoint)),
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="created_at" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="created_at"
                    id="created_at"
                    type="datetime-local"
                    step="1"
                    value=[form.created_at.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error_message(
                    CashFlowField::CreatedAt.name(),
                    errors.get(CashFlowField::CreatedAt),
                ))
            }

            (reference_select(CashFlowField::Status, "Status", form.status.as_deref(), &statuses, errors))
            (reference_select(CashFlowField::Type, "Type", form.type_id.as_deref(), &flow_types, errors))
            (reference_select(CashFlowField::Category, "Category", form.category.as_deref(), &categories, errors))
            (reference_select(
                CashFlowField::SubCategory,
                "Subcategory",
                form.subcategory.as_deref(),
                &subcategories,
                errors,
            ))

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    name="amount"
                    id="amount"
                    type="text"
                    inputmode="decimal"
                    placeholder="0.00"
                    required
                    value=[form.amount.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error_message(
                    CashFlowField::Amount.name(),
                    errors.get(CashFlowField::Amount),
                ))
            }

            div
            {
                label for="comment" class=(FORM_LABEL_STYLE) { "Comment" }

                textarea
                    name="comment"
                    id="comment"
                    rows="3"
                    maxlength=(MAX_COMMENT_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (form.comment.as_deref().unwrap_or_default())
                }

                (field_error_message(
                    CashFlowField::Comment.name(),
                    errors.get(CashFlowField::Comment),
                ))
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}
