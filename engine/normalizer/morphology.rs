/// Morphological forms of a word used as fallback lookup keys. The
/// normalized key is always present; the analyzer-derived forms exist only
/// when a [`Morphology`] capability is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordForms {
    /// Canonical rule-normalized key.
    pub normalized: String,
    /// Dictionary base form.
    pub lemma: Option<String>,
    /// Suffix-stripped root; not guaranteed to be a real word.
    pub stem: Option<String>,
    /// Sub-word token form.
    pub token: Option<String>,
}

impl WordForms {
    /// Distinct non-empty forms in lookup order, normalized key first.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(4);
        for form in [
            Some(&self.normalized),
            self.lemma.as_ref(),
            self.stem.as_ref(),
            self.token.as_ref(),
        ]
        .into_iter()
        .flatten()
        {
            if !form.is_empty() && !keys.iter().any(|seen| seen == form) {
                keys.push(form.clone());
            }
        }
        keys
    }
}

/// Pluggable morphological-analysis capability: a lemmatizer with
/// part-of-speech disambiguation, a stemmer, and a sub-word tokenizer.
/// The rule-based normalizer works without one; an attached analyzer only
/// contributes additional fallback lookup keys.
pub trait Morphology: Send + Sync {
    /// Dictionary base form of the word, if the analyzer can produce one.
    fn lemma(&self, word: &str) -> Option<String>;
    /// Stemmer output for the word.
    fn stem(&self, word: &str) -> Option<String>;
    /// Leading sub-word token for the word.
    fn token(&self, word: &str) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_deduplicate_and_keep_order() {
        let forms = WordForms {
            normalized: "run".into(),
            lemma: Some("run".into()),
            stem: Some("runn".into()),
            token: None,
        };
        assert_eq!(forms.keys(), vec!["run".to_string(), "runn".to_string()]);
    }

    #[test]
    fn empty_forms_are_dropped() {
        let forms = WordForms {
            normalized: "go".into(),
            lemma: Some(String::new()),
            stem: None,
            token: Some("go".into()),
        };
        assert_eq!(forms.keys(), vec!["go".to_string()]);
    }
}
