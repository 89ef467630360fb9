//! The full lists of taxonomy entries used to fill select inputs.

use rusqlite::Connection;

use crate::{
    Error,
    database_id::DatabaseId,
    taxonomy::{
        Category, CategoryId, FlowType, FlowTypeId, Status, SubCategory, TaxonomyKind,
        db::{get_all_categories, get_all_flow_types, get_all_statuses, get_all_subcategories},
    },
};

/// Every status, type, category and subcategory, each sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyOptions {
    pub statuses: Vec<Status>,
    pub flow_types: Vec<FlowType>,
    pub categories: Vec<Category>,
    pub subcategories: Vec<SubCategory>,
}

impl TaxonomyOptions {
    /// The name of the type `type_id`, or an empty string if it does not exist.
    pub fn flow_type_name(&self, type_id: FlowTypeId) -> &str {
        self.flow_types
            .iter()
            .find(|flow_type| flow_type.id == type_id)
            .map(|flow_type| flow_type.name.as_ref())
            .unwrap_or_default()
    }

    /// The name of the category `category_id`, or an empty string if it does not exist.
    pub fn category_name(&self, category_id: CategoryId) -> &str {
        self.categories
            .iter()
            .find(|category| category.id == category_id)
            .map(|category| category.name.as_ref())
            .unwrap_or_default()
    }

    /// A label that disambiguates categories with the same name, e.g. "Expense / Other".
    pub fn category_label(&self, category: &Category) -> String {
        format!("{} / {}", self.flow_type_name(category.type_id), category.name)
    }

    /// A label that disambiguates subcategories with the same name, e.g. "Food / Other".
    pub fn subcategory_label(&self, subcategory: &SubCategory) -> String {
        format!(
            "{} / {}",
            self.category_name(subcategory.category_id),
            subcategory.name
        )
    }

    /// The `(id, label)` pairs for a select input listing every entry of `kind`.
    ///
    /// Categories and subcategories are labelled with their parent's name.
    pub fn choices(&self, kind: TaxonomyKind) -> Vec<(DatabaseId, String)> {
        match kind {
            TaxonomyKind::Status => self
                .statuses
                .iter()
                .map(|status| (status.id, status.name.to_string()))
                .collect(),
            TaxonomyKind::Type => self
                .flow_types
                .iter()
                .map(|flow_type| (flow_type.id, flow_type.name.to_string()))
                .collect(),
            TaxonomyKind::Category => self
                .categories
                .iter()
                .map(|category| (category.id, self.category_label(category)))
                .collect(),
            TaxonomyKind::SubCategory => self
                .subcategories
                .iter()
                .map(|subcategory| (subcategory.id, self.subcategory_label(subcategory)))
                .collect(),
        }
    }
}

/// Load every taxonomy entry.
pub fn get_taxonomy_options(connection: &Connection) -> Result<TaxonomyOptions, Error> {
    Ok(TaxonomyOptions {
        statuses: get_all_statuses(connection)?,
        flow_types: get_all_flow_types(connection)?,
        categories: get_all_categories(connection)?,
        subcategories: get_all_subcategories(connection)?,
    })
}
