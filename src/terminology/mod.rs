//! Competing spellings of the same concept across a corpus.
//!
//! A [`Glossary`] maps each canonical term to its known variants. Every term
//! is matched as a whole word, case-insensitively, against the raw text of
//! each document. A concept is reported once more than one of its spellings
//! is actually in use.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{Error, Result},
    vectorizer::{Document, SourceId},
};

/// Ordered canonical term → variants table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Glossary {
    entries: IndexMap<String, Vec<String>>,
}

impl Default for Glossary {
    fn default() -> Self {
        const TABLE: &[(&str, &[&str])] = &[
            ("authentication", &["auth", "authn"]),
            ("authorization", &["authz"]),
            ("configuration", &["config", "cfg"]),
            ("application", &["app"]),
            ("repository", &["repo"]),
            ("directory", &["dir", "folder"]),
            ("identifier", &["id"]),
            ("environment", &["env"]),
            ("development", &["dev"]),
            ("production", &["prod"]),
            ("component", &["comp"]),
            ("element", &["elem"]),
            ("property", &["prop"]),
            ("attribute", &["attr"]),
            ("function", &["func", "fn"]),
            ("documentation", &["docs", "doc"]),
        ];
        TABLE
            .iter()
            .map(|(canonical, variants)| (*canonical, variants.iter().copied()))
            .collect()
    }
}

impl<C, V, T> FromIterator<(C, V)> for Glossary
where
    C: Into<String>,
    V: IntoIterator<Item = T>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(c, v)| (c.into(), v.into_iter().map(Into::into).collect()))
            .collect();
        Self { entries }
    }
}

impl Glossary {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Add or replace one concept
    pub fn insert(&mut self, canonical: impl Into<String>, variants: Vec<String>) {
        self.entries.insert(canonical.into(), variants);
    }

    pub fn get(&self, canonical: &str) -> Option<&[String]> {
        self.entries.get(canonical).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Terms must be non-blank
    pub fn validate(&self) -> Result<()> {
        for (canonical, variants) in &self.entries {
            if canonical.trim().is_empty() {
                return Err(Error::invalid_config("glossary", "canonical term is blank"));
            }
            if variants.iter().any(|v| v.trim().is_empty()) {
                return Err(Error::invalid_config(
                    "glossary",
                    format!("blank variant for `{canonical}`"),
                ));
            }
        }
        Ok(())
    }
}

/// Where and how often one term appears
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermUsage {
    pub files: BTreeSet<SourceId>,
    pub count: usize,
}

/// One concept written more than one way
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminologyGroup {
    pub canonical_term: String,
    /// Terms actually in use, glossary order (canonical first when used)
    pub variants: Vec<String>,
    /// Usage per term in `variants`
    pub usage: IndexMap<String, TermUsage>,
    pub suggested_term: String,
    /// Every file using any term of the group
    pub affected_files: BTreeSet<SourceId>,
}

impl TerminologyGroup {
    /// Literal `(find, replace)` pairs toward the suggested term
    pub fn replacements(&self) -> Vec<(String, String)> {
        self.variants
            .iter()
            .filter(|v| **v != self.suggested_term)
            .map(|v| (v.clone(), self.suggested_term.clone()))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct CompiledConcept {
    canonical: String,
    /// canonical first, then variants
    terms: Vec<(String, Regex)>,
}

/// Terminology Consistency Analyzer
#[derive(Debug, Clone)]
pub struct TerminologyAnalyzer {
    concepts: Vec<CompiledConcept>,
}

impl TerminologyAnalyzer {
    pub fn new(glossary: &Glossary) -> Result<Self> {
        glossary.validate()?;
        let concepts = glossary
            .iter()
            .map(|(canonical, variants)| {
                let terms = std::iter::once(canonical)
                    .chain(variants.iter().map(String::as_str))
                    .map(|term| Ok((term.to_string(), term_regex(term)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(CompiledConcept {
                    canonical: canonical.to_string(),
                    terms,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { concepts })
    }

    /// Groups with more than one term in use, in glossary order
    pub fn analyze(&self, docs: &[Document]) -> Vec<TerminologyGroup> {
        let groups: Vec<TerminologyGroup> = self
            .concepts
            .par_iter()
            .filter_map(|concept| concept.group(docs))
            .collect();
        info!(concepts = self.concepts.len(), groups = groups.len(), "terminology analysis finished");
        groups
    }
}

impl CompiledConcept {
    fn group(&self, docs: &[Document]) -> Option<TerminologyGroup> {
        let mut usage: IndexMap<String, TermUsage> = IndexMap::new();
        for (term, re) in &self.terms {
            let mut u = TermUsage::default();
            for doc in docs {
                let hits = re.find_iter(&doc.raw_text).count();
                if hits > 0 {
                    u.count += hits;
                    u.files.insert(doc.source_id.clone());
                }
            }
            if u.count > 0 {
                // a term listed twice keeps its first usage
                usage.entry(term.clone()).or_insert(u);
            }
        }
        if usage.len() < 2 {
            return None;
        }

        let suggested_term = match usage.get(&self.canonical) {
            Some(_) => self.canonical.clone(),
            None => {
                let mut best: Option<(&String, usize)> = None;
                for (term, u) in &usage {
                    if best.map_or(true, |(_, c)| u.count > c) {
                        best = Some((term, u.count));
                    }
                }
                best.map(|(t, _)| t.clone())?
            }
        };
        let affected_files = usage.values().flat_map(|u| u.files.iter().cloned()).collect();

        Some(TerminologyGroup {
            canonical_term: self.canonical.clone(),
            variants: usage.keys().cloned().collect(),
            usage,
            suggested_term,
            affected_files,
        })
    }
}

fn term_regex(term: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(&format!(r"\b{}\b", regex::escape(term)))
        .case_insensitive(true)
        .build()?)
}
