use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assets::{BANNED_TERMS_TOML, BANNED_TERMS_TOML_NAME};
use crate::error::{FilterError, Result};

/// Organizational bucket for banned terms. Matching ignores it; it only shows
/// up in audit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Slur,
    Profanity,
    Sexual,
    Extremist,
    Violence,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Slur,
        Category::Profanity,
        Category::Sexual,
        Category::Extremist,
        Category::Violence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Slur => "slur",
            Category::Profanity => "profanity",
            Category::Sexual => "sexual",
            Category::Extremist => "extremist",
            Category::Violence => "violence",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryTerms {
    pub name: Category,
    #[serde(default)]
    pub terms: Vec<String>,
}

/// Banned-term catalog as written on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Catalog {
    pub name: String,
    pub version: String,
    pub description: Option<String>,

    // Substrings matched without word boundaries
    #[serde(default)]
    pub fragments: Vec<String>,

    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryTerms>,
}

impl Catalog {
    pub fn parse(text: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(text)?;
        Ok(catalog)
    }

    /// The catalog embedded in this crate.
    pub fn builtin() -> Result<Self> {
        Self::parse(BANNED_TERMS_TOML).map_err(|e| {
            tracing::error!(
                file = BANNED_TERMS_TOML_NAME,
                error = %e,
                "embedded catalog is malformed"
            );
            e
        })
    }

    /// Every canonical term across all categories, in catalog order.
    pub fn terms(&self) -> impl Iterator<Item = (Category, &str)> + '_ {
        self.categories
            .iter()
            .flat_map(|c| c.terms.iter().map(move |t| (c.name, t.as_str())))
    }

    pub fn terms_in(&self, category: Category) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|c| c.name == category)
            .flat_map(|c| c.terms.iter().map(String::as_str))
            .collect()
    }

    pub fn term_count(&self) -> usize {
        self.categories.iter().map(|c| c.terms.len()).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.term_count() == 0 && self.fragments.is_empty() {
            return Err(FilterError::EmptyCatalog {
                name: self.name.clone(),
            });
        }
        for (category, term) in self.terms() {
            if term.trim().is_empty() {
                return Err(FilterError::BlankTerm {
                    category: Some(category),
                });
            }
        }
        if self.fragments.iter().any(|f| f.trim().is_empty()) {
            return Err(FilterError::BlankTerm { category: None });
        }
        Ok(())
    }
}
