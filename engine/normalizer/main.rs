//! Word normalization pipeline reducing surface forms to canonical lookup
//! keys.

/// Ordered inflection rule chains.
pub mod inflection;
/// Pluggable lemma/stem/token capability.
pub mod morphology;
/// Expansion tables for abbreviations, contractions, and slang.
pub mod tables;

use std::{collections::HashMap, fmt, sync::Arc};

use regex::Regex;

use inflection::InflectionRules;
use morphology::{Morphology, WordForms};

/// Deterministic, I/O-free word normalizer.
///
/// Every raw token passes the same fixed pipeline: lowercase and trim,
/// abbreviation expansion (with and without trailing period), contraction
/// expansion, slang expansion, possessive stripping, hyphen splitting,
/// inflection reduction, and a final punctuation sweep.
pub struct Normalizer {
    abbreviations: HashMap<&'static str, &'static str>,
    contractions: HashMap<&'static str, &'static str>,
    slang: HashMap<&'static str, &'static str>,
    inflections: InflectionRules,
    cleanup: Regex,
    whitespace: Regex,
    words: Regex,
    morphology: Option<Arc<dyn Morphology>>,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("morphology", &self.morphology.is_some())
            .finish()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Creates a normalizer with the built-in rule set and no morphological
    /// analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            abbreviations: tables::abbreviation_map(),
            contractions: tables::contraction_map(),
            slang: tables::slang_map(),
            inflections: InflectionRules::new(),
            cleanup: Regex::new(r"[^\w\s]").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
            words: Regex::new(r"[A-Za-z]+(?:'[A-Za-z]+)*").unwrap(),
            morphology: None,
        }
    }

    /// Attaches a morphological analyzer contributing lemma/stem/token
    /// fallback keys.
    #[must_use]
    pub fn with_morphology(mut self, morphology: Arc<dyn Morphology>) -> Self {
        self.morphology = Some(morphology);
        self
    }

    /// Reduces a raw token to its canonical lookup key.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let mut word = raw.trim().to_lowercase().replace('\u{2019}', "'");
        if word.is_empty() {
            return word;
        }

        if let Some(expanded) = self
            .abbreviations
            .get(word.as_str())
            .or_else(|| self.abbreviations.get(word.trim_end_matches('.')))
        {
            word = (*expanded).to_string();
        }
        if let Some(expanded) = self.contractions.get(word.as_str()) {
            word = (*expanded).to_string();
        }
        if let Some(expanded) = self.slang.get(word.as_str()) {
            word = (*expanded).to_string();
        }

        if let Some(stripped) = word.strip_suffix("'s") {
            word = stripped.to_string();
        } else if let Some(stripped) = word.strip_suffix('\'') {
            word = stripped.to_string();
        }

        word = word.replace('-', " ");
        word = self.inflections.reduce(&word);

        let word = self.cleanup.replace_all(&word, "");
        self.whitespace.replace_all(word.trim(), " ").into_owned()
    }

    /// Produces the canonical key plus any analyzer-derived fallback forms.
    #[must_use]
    pub fn word_forms(&self, raw: &str) -> WordForms {
        let normalized = self.normalize(raw);
        let mut forms = WordForms {
            normalized,
            ..WordForms::default()
        };
        if let Some(analyzer) = &self.morphology {
            forms.lemma = analyzer.lemma(raw).map(|form| form.to_lowercase());
            forms.stem = analyzer.stem(raw).map(|form| form.to_lowercase());
            forms.token = analyzer.token(raw).map(|form| form.to_lowercase());
        }
        forms
    }

    /// Distinct index keys for a word: surface form first, then the
    /// canonical key and any analyzer forms.
    #[must_use]
    pub fn lookup_keys(&self, word: &str) -> Vec<String> {
        let surface = word.trim().to_lowercase();
        let mut keys = Vec::with_capacity(5);
        if !surface.is_empty() {
            keys.push(surface);
        }
        for form in self.word_forms(word).keys() {
            if !keys.contains(&form) {
                keys.push(form);
            }
        }
        keys
    }

    /// Extracts alphabetic words from running text. Contractions stay
    /// whole; numbers and bare punctuation are skipped.
    #[must_use]
    pub fn extract_words(&self, text: &str) -> Vec<String> {
        self.words
            .find_iter(&text.replace('\u{2019}', "'"))
            .map(|token| token.as_str().to_string())
            .collect()
    }
}
