//! Turns canonical terms into substitution-tolerant regexes.

use std::collections::BTreeMap;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};

use crate::error::{FilterError, Result};
use crate::types::Category;

/// Letter -> characters accepted in its place. The letter itself is always
/// accepted, whether or not it is listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionTable {
    classes: BTreeMap<char, Vec<char>>,
}

impl SubstitutionTable {
    pub fn empty() -> Self {
        Self {
            classes: BTreeMap::new(),
        }
    }

    /// Table applied to full terms.
    pub fn words() -> Self {
        Self::empty()
            .with('a', "@4")
            .with('e', "3")
            .with('i', "1!|")
            .with('o', "0")
            .with('u', "*")
            .with('s', "5$")
            .with('t', "7+")
    }

    /// Narrower table applied to fragments: vowels only.
    pub fn fragments() -> Self {
        Self::empty()
            .with('a', "@4")
            .with('e', "3")
            .with('i', "1!|")
            .with('o', "0")
            .with('u', "*")
    }

    pub fn with(mut self, letter: char, alternatives: &str) -> Self {
        let letter = letter.to_ascii_lowercase();
        let class = self.classes.entry(letter).or_insert_with(|| vec![letter]);
        for alt in alternatives.chars() {
            if !class.contains(&alt) {
                class.push(alt);
            }
        }
        self
    }

    pub fn alternatives(&self, letter: char) -> Option<&[char]> {
        self.classes.get(&letter).map(Vec::as_slice)
    }

    /// Regex source for a single letter position.
    fn position(&self, letter: char) -> String {
        match self.classes.get(&letter) {
            Some(class) => {
                let mut out = String::from("[");
                for c in class {
                    out.push_str(&regex::escape(&c.to_string()));
                }
                out.push(']');
                out
            }
            None => regex::escape(&letter.to_string()),
        }
    }
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        Self::words()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Word(Category),
    Fragment,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Word(category) => write!(f, "{category}"),
            PatternKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Serialized as its display name: the category, or `"fragment"`.
impl Serialize for PatternKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    term: String,
    kind: PatternKind,
    regex: Regex,
}

impl CompiledPattern {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Unanchored search; `text` is expected to be normalized already.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Regex source for `term` under `table`.
///
/// Whitespace between the words of a multi-word term is dropped: normalized
/// text never contains whitespace, so "kill yourself" has to match
/// "killyourself".
pub fn pattern_source(term: &str, table: &SubstitutionTable) -> String {
    term.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| table.position(c))
        .collect()
}

pub fn compile_term(
    term: &str,
    kind: PatternKind,
    table: &SubstitutionTable,
) -> Result<CompiledPattern> {
    let source = pattern_source(term, table);
    let regex = RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|source| FilterError::Compile {
            term: term.to_string(),
            source,
        })?;
    Ok(CompiledPattern {
        term: term.to_lowercase(),
        kind,
        regex,
    })
}
