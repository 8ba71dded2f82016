use std::path::PathBuf;

use thiserror::Error;

use crate::types::Category;

/// Errors raised while loading a catalog or compiling it into a filter.
///
/// The matcher itself never fails; every variant here belongs to the
/// construction step and is fatal for the host.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("failed to parse banned-term catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize banned-term catalog for digest: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("banned-term catalog {name:?} has no terms and no fragments")]
    EmptyCatalog { name: String },

    /// `category` is `None` for fragments.
    #[error("blank entry in {}", .category.map(|c| c.as_str()).unwrap_or("fragments"))]
    BlankTerm { category: Option<Category> },

    #[error("failed to compile pattern for {term:?}")]
    Compile {
        term: String,
        #[source]
        source: regex::Error,
    },

    #[error("i/o error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = FilterError> = std::result::Result<T, E>;
