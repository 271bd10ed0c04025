pub mod types;
pub mod taxonomy;
pub mod keyword;
pub mod semantic;
pub mod policy;
pub mod subcategory;
pub mod classifier;
pub mod tagging;

pub use types::*;
pub use taxonomy::*;
pub use classifier::*;
pub use tagging::generate_tags;

use std::path::PathBuf;

use thiserror::Error;

/// Category used when nothing in the taxonomy matched.
pub const FALLBACK_CATEGORY: &str = "Sonstiges";
/// Sub-category for documents without any text or keywords.
pub const UNCATEGORIZED: &str = "Unkategorisiert";
/// Sub-category for categories without their own fallback.
pub const GENERAL_SUBCATEGORY: &str = "Allgemein";

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("I/O error reading taxonomy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid taxonomy JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Taxonomy has no categories")]
    EmptyTaxonomy,

    #[error("Duplicate category in taxonomy: {0}")]
    DuplicateCategory(String),

    #[error("Taxonomy contains a category with an empty name")]
    EmptyCategoryName,
}
