// Public modules so directory-core and the admin CLI can use them
pub mod assets;
pub mod compile;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod types;

pub use assets::{
    catalog_digest, default_catalog_text, read_verified_or_embedded, write_default_catalog,
};
pub use compile::{CompiledPattern, PatternKind, SubstitutionTable};
pub use error::FilterError;
pub use matcher::{ContentFilter, FilterBuilder, FilterMatch};
pub use normalize::normalize;
pub use types::{Catalog, Category, CategoryTerms};
