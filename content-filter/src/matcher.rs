use serde::Serialize;

use crate::assets::{catalog_digest, BANNED_TERMS_TOML};
use crate::compile::{compile_term, CompiledPattern, PatternKind, SubstitutionTable};
use crate::error::Result;
use crate::normalize::normalize;
use crate::types::{Catalog, Category};

// ----------------- Result -----------------

/// Which pattern fired, for audit trails. Hosts gate on the boolean only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterMatch {
    pub term: String,
    pub kind: PatternKind,
    pub normalized: String,
}

// ----------------- Builder -----------------

#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    catalog: Option<Catalog>,
    digest: Option<String>,
    word_substitutions: Option<SubstitutionTable>,
    fragment_substitutions: Option<SubstitutionTable>,
}

impl FilterBuilder {
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Digest of the catalog source text, carried into audit records.
    pub fn digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    pub fn word_substitutions(mut self, table: SubstitutionTable) -> Self {
        self.word_substitutions = Some(table);
        self
    }

    pub fn fragment_substitutions(mut self, table: SubstitutionTable) -> Self {
        self.fragment_substitutions = Some(table);
        self
    }

    /// Validate the catalog and compile every term and fragment.
    /// Without an explicit catalog the embedded one is used.
    pub fn build(self) -> Result<ContentFilter> {
        let (catalog, digest) = match self.catalog {
            Some(c) => {
                let digest = match self.digest {
                    Some(d) => d,
                    None => catalog_digest(&toml::to_string(&c)?),
                };
                (c, digest)
            }
            None => (
                Catalog::builtin()?,
                self.digest
                    .unwrap_or_else(|| catalog_digest(BANNED_TERMS_TOML)),
            ),
        };
        catalog.validate()?;

        let words = self.word_substitutions.unwrap_or_else(SubstitutionTable::words);
        let frags = self
            .fragment_substitutions
            .unwrap_or_else(SubstitutionTable::fragments);

        let word_patterns = catalog
            .terms()
            .map(|(category, term)| compile_term(term, PatternKind::Word(category), &words))
            .collect::<Result<Vec<_>>>()?;
        let fragment_patterns = catalog
            .fragments
            .iter()
            .map(|f| compile_term(f, PatternKind::Fragment, &frags))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            catalog = %catalog.name,
            version = %catalog.version,
            words = word_patterns.len(),
            fragments = fragment_patterns.len(),
            digest = %digest,
            "content filter compiled"
        );

        Ok(ContentFilter {
            name: catalog.name,
            version: catalog.version,
            digest,
            word_patterns,
            fragment_patterns,
        })
    }
}

// ----------------- Core -----------------

/// Compiled, immutable banned-term filter. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    name: String,
    version: String,
    digest: String,
    word_patterns: Vec<CompiledPattern>,
    fragment_patterns: Vec<CompiledPattern>,
}

impl ContentFilter {
    pub fn builder() -> FilterBuilder {
        FilterBuilder::default()
    }

    pub fn builtin() -> Result<Self> {
        Self::builder().build()
    }

    pub fn from_catalog(catalog: &Catalog) -> Result<Self> {
        Self::builder().catalog(catalog.clone()).build()
    }

    /// Parse and compile catalog text, recording its digest.
    pub fn from_toml(text: &str) -> Result<Self> {
        Self::builder()
            .catalog(Catalog::parse(text)?)
            .digest(catalog_digest(text))
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn word_patterns(&self) -> &[CompiledPattern] {
        &self.word_patterns
    }

    pub fn fragment_patterns(&self) -> &[CompiledPattern] {
        &self.fragment_patterns
    }

    pub fn patterns_for(&self, category: Category) -> impl Iterator<Item = &CompiledPattern> {
        self.word_patterns
            .iter()
            .filter(move |p| p.kind() == PatternKind::Word(category))
    }

    pub fn len(&self) -> usize {
        self.word_patterns.len() + self.fragment_patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `text` contains a banned term or fragment after normalization.
    /// Absent or empty input is never banned.
    pub fn contains_banned_words<'a>(&self, text: impl Into<Option<&'a str>>) -> bool {
        self.find_match(text).is_some()
    }

    /// Same evaluation as [`contains_banned_words`](Self::contains_banned_words),
    /// reporting the first pattern that fired. Word patterns are tried before
    /// fragments, each in catalog order.
    pub fn find_match<'a>(&self, text: impl Into<Option<&'a str>>) -> Option<FilterMatch> {
        let text = text.into().filter(|t| !t.is_empty())?;
        let normalized = normalize(text);

        let hit = self
            .word_patterns
            .iter()
            .chain(self.fragment_patterns.iter())
            .find(|p| p.is_match(&normalized))?;

        tracing::debug!(term = hit.term(), kind = %hit.kind(), "banned pattern matched");
        Some(FilterMatch {
            term: hit.term().to_string(),
            kind: hit.kind(),
            normalized,
        })
    }

    /// True if any of `fields` is banned.
    pub fn check_all<'a, I>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        fields.into_iter().any(|f| self.contains_banned_words(f))
    }
}
