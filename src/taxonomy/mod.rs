//! Reference data that classifies cash flows: statuses, types, categories and subcategories.

mod db;
mod domain;
mod manage;
mod operation;
mod options;
mod page;
mod validation;

pub use db::{
    create_category, create_flow_type, create_status, create_subcategory, create_taxonomy_tables,
    get_category, get_flow_type, get_status, get_subcategory,
};
#[cfg(test)]
pub use db::{get_all_categories, get_all_statuses};
pub use domain::{
    Category, CategoryId, FlowType, FlowTypeId, MAX_NAME_LENGTH, Status, StatusId, SubCategory,
    SubCategoryId, TaxonomyKind, TaxonomyName,
};
pub use manage::apply_operation;
pub use operation::{TaxonomyEntry, TaxonomyOperation};
pub use options::{TaxonomyOptions, get_taxonomy_options};
pub use page::{get_dictionaries_page, manage_taxonomy_endpoint};
