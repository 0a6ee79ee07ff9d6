//! WordNet-style noun lemmatizer.
//!
//! Words are reduced with the noun exception table and the noun detachment
//! rules. A candidate only counts if the noun lexicon knows it, and the
//! shortest known form wins. Unknown words come back unchanged.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::ArtifactError;

const EMBEDDED_INDEX: &str = include_str!("../resources/wordnet/index.noun");
const EMBEDDED_EXCEPTIONS: &str = include_str!("../resources/wordnet/noun.exc");

/// Noun detachment rules, applied to the surface form only (no chaining).
const NOUN_SUFFIXES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

pub static EMBEDDED_LEMMATIZER: Lazy<Lemmatizer> =
    Lazy::new(|| Lemmatizer::parse(EMBEDDED_INDEX, EMBEDDED_EXCEPTIONS));

#[derive(Debug, Clone, Default)]
pub struct Lemmatizer {
    lexicon: HashSet<String>,
    exceptions: HashMap<String, Vec<String>>,
}

fn is_plain_word(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase())
}

impl Lemmatizer {
    /// Parse an `index.noun` body and a `noun.exc` body.
    ///
    /// License/header lines in WordNet index files start with a space. Entries
    /// that are not plain lowercase ASCII words (collocations like `ice_cream`,
    /// hyphenated forms) are dropped so lemmas never leave `[a-z]`.
    pub fn parse(index: &str, exceptions: &str) -> Self {
        let lexicon = index
            .lines()
            .filter(|line| !line.starts_with(' '))
            .filter_map(|line| line.split_whitespace().next())
            .filter(|lemma| is_plain_word(lemma))
            .map(str::to_string)
            .collect();

        let mut exception_map: HashMap<String, Vec<String>> = HashMap::new();
        for line in exceptions.lines() {
            let mut fields = line.split_whitespace();
            let Some(inflected) = fields.next() else {
                continue;
            };
            if !is_plain_word(inflected) {
                continue;
            }
            let bases: Vec<String> = fields
                .filter(|base| is_plain_word(base))
                .map(str::to_string)
                .collect();
            if !bases.is_empty() {
                exception_map
                    .entry(inflected.to_string())
                    .or_default()
                    .extend(bases);
            }
        }

        Self {
            lexicon,
            exceptions: exception_map,
        }
    }

    /// Load `index.noun` and `noun.exc` from a WordNet `dict` directory.
    pub fn load(wordnet_dir: &Path) -> Result<Self, ArtifactError> {
        let read = |name: &str| {
            let path = wordnet_dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| ArtifactError::Io { path, source })
        };
        let index = read("index.noun")?;
        let exceptions = read("noun.exc")?;

        let lemmatizer = Self::parse(&index, &exceptions);
        if lemmatizer.lexicon.is_empty() {
            return Err(ArtifactError::EmptyResource(wordnet_dir.join("index.noun")));
        }
        Ok(lemmatizer)
    }

    pub fn lexicon_size(&self) -> usize {
        self.lexicon.len()
    }

    pub fn lemmatize<'a>(&'a self, word: &'a str) -> &'a str {
        let candidates: Vec<&str> = match self.exceptions.get(word) {
            Some(bases) => std::iter::once(word)
                .chain(bases.iter().map(String::as_str))
                .collect(),
            None => {
                let mut forms = vec![word];
                for (suffix, replacement) in NOUN_SUFFIXES {
                    if let Some(stem) = word.strip_suffix(suffix) {
                        forms.push(self.intern(stem, replacement));
                    }
                }
                forms
            }
        };

        let mut best: Option<&str> = None;
        for form in candidates {
            if !self.lexicon.contains(form) {
                continue;
            }
            // Strictly shorter only: ties keep the earlier form.
            if best.map_or(true, |b| form.len() < b.len()) {
                best = Some(form);
            }
        }
        best.unwrap_or(word)
    }

    /// Resolve `stem + replacement` to the lexicon's own copy of the string,
    /// or to the empty string when the lexicon does not contain it.
    fn intern(&self, stem: &str, replacement: &str) -> &str {
        let mut form = String::with_capacity(stem.len() + replacement.len());
        form.push_str(stem);
        form.push_str(replacement);
        self.lexicon.get(form.as_str()).map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemmatize(word: &str) -> String {
        EMBEDDED_LEMMATIZER.lemmatize(word).to_string()
    }

    #[test]
    fn test_plural_rules() {
        assert_eq!(lemmatize("expectations"), "expectation");
        assert_eq!(lemmatize("batteries"), "battery");
        assert_eq!(lemmatize("glasses"), "glass");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("watches"), "watch");
        assert_eq!(lemmatize("brushes"), "brush");
        assert_eq!(lemmatize("women"), "woman");
    }

    #[test]
    fn test_exceptions() {
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("knives"), "knife");
        assert_eq!(lemmatize("feet"), "foot");
        assert_eq!(lemmatize("clothes"), "cloth");
    }

    #[test]
    fn test_unknown_and_non_noun_words_unchanged() {
        assert_eq!(lemmatize("exceeded"), "exceeded");
        assert_eq!(lemmatize("awesome"), "awesome");
        assert_eq!(lemmatize("less"), "less");
        assert_eq!(lemmatize("glass"), "glass");
    }

    #[test]
    fn test_shortest_known_form_wins() {
        let lemmatizer = Lemmatizer::parse("ax n\naxe n\naxes n\n", "");
        assert_eq!(lemmatizer.lemmatize("axes"), "ax");
    }

    #[test]
    fn test_parse_skips_headers_and_collocations() {
        let lemmatizer = Lemmatizer::parse(
            "  1 This software and database is being provided\nice_cream n 1\nt-shirt n 1\nphone n 1\n",
            "oxen ox\nox_en ox\n",
        );
        assert_eq!(lemmatizer.lexicon_size(), 1);
        assert_eq!(lemmatizer.lemmatize("phones"), "phone");
        // exception target missing from the lexicon: word stays as is
        assert_eq!(lemmatizer.lemmatize("oxen"), "oxen");
    }

    #[test]
    fn test_wordnet_database_lines() {
        let index = "  1 This software and database is being provided to you, the LICENSEE, by  \n\
  29 WordNet 3.0 Copyright 2006 by Princeton University.  All rights reserved.  \n\
con n 3 2 @ ~ 3 0 06722453 07229148 05832924  \n\
goose n 3 3 @ ~ #m 3 1 01855672 07646821 10138767  \n\
pro n 3 3 @ ~ + 3 0 10484858 06722453 07170753  \n\
pros_and_cons n 1 1 @ 1 0 06722613  \n";
        let lemmatizer = Lemmatizer::parse(index, "geese goose\n");
        assert_eq!(lemmatizer.lexicon_size(), 3);
        assert_eq!(lemmatizer.lemmatize("pros"), "pro");
        assert_eq!(lemmatizer.lemmatize("cons"), "con");
        assert_eq!(lemmatizer.lemmatize("geese"), "goose");
    }

    #[test]
    fn test_exception_targets_are_in_embedded_lexicon() {
        assert_eq!(lemmatize("geese"), "goose");
        for (inflected, bases) in &EMBEDDED_LEMMATIZER.exceptions {
            assert!(
                bases.iter().any(|b| EMBEDDED_LEMMATIZER.lexicon.contains(b)),
                "{} has no base in the lexicon",
                inflected
            );
        }
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.noun"), "mouse n 1\n").unwrap();
        std::fs::write(dir.path().join("noun.exc"), "mice mouse\n").unwrap();
        let lemmatizer = Lemmatizer::load(dir.path()).unwrap();
        assert_eq!(lemmatizer.lemmatize("mice"), "mouse");
    }

    #[test]
    fn test_load_requires_exception_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.noun"), "mouse n 1\n").unwrap();
        assert!(matches!(
            Lemmatizer::load(dir.path()),
            Err(ArtifactError::Io { .. })
        ));
    }
}
