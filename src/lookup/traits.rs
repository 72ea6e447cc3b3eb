//! Definition lookup trait and the definition model.
//!
//! A `Lookup` turns a word identifier into the content shown while the user
//! tries to recall the word. Where definitions come from (network, files,
//! nowhere) is up to the implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::normalize_word;
use crate::error::Result;

/// How a word is pronounced in one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronunciation {
    /// Region label, e.g. "us" or "uk".
    pub region: String,
    /// Phonetic transcription.
    pub phonetic: String,
}

/// One meaning of a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    /// Part of speech, e.g. "n." or "v.".
    pub part: String,
    /// The meaning text.
    pub meaning: String,
}

/// An example sentence using the word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Sentence containing the word.
    pub text: String,
    /// Optional translation of the sentence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

/// Everything known about a word for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Normalized word identifier.
    pub word: String,
    #[serde(default)]
    pub pronunciations: Vec<Pronunciation>,
    #[serde(default)]
    pub senses: Vec<Sense>,
    #[serde(default)]
    pub examples: Vec<Example>,
    /// Masked spelling shown when nothing else is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Definition {
    /// Create an empty definition for a word.
    pub fn new(word: impl AsRef<str>) -> Self {
        Self {
            word: normalize_word(word.as_ref()),
            pronunciations: Vec::new(),
            senses: Vec::new(),
            examples: Vec::new(),
            hint: None,
        }
    }

    /// A definition carrying only a masked-spelling hint.
    pub fn hint_only(word: impl AsRef<str>) -> Self {
        let mut definition = Self::new(word);
        definition.hint = Some(mask_word(&definition.word));
        definition
    }

    /// Add a sense.
    pub fn with_sense(mut self, part: impl Into<String>, meaning: impl Into<String>) -> Self {
        self.senses.push(Sense {
            part: part.into(),
            meaning: meaning.into(),
        });
        self
    }

    /// Add an example sentence.
    pub fn with_example(mut self, text: impl Into<String>, translation: Option<String>) -> Self {
        self.examples.push(Example {
            text: text.into(),
            translation,
        });
        self
    }

    /// Add a pronunciation.
    pub fn with_pronunciation(
        mut self,
        region: impl Into<String>,
        phonetic: impl Into<String>,
    ) -> Self {
        self.pronunciations.push(Pronunciation {
            region: region.into(),
            phonetic: phonetic.into(),
        });
        self
    }

    /// Senses that can be shown without giving the answer away.
    ///
    /// A sense whose text contains the word (ignoring case and whitespace)
    /// is hidden.
    pub fn visible_senses(&self) -> Vec<&Sense> {
        self.senses
            .iter()
            .filter(|s| {
                let text: String = format!("{}{}", s.meaning, s.part)
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_lowercase();
                !text.contains(&self.word)
            })
            .collect()
    }

    /// Example sentences with every occurrence of the word blanked out.
    ///
    /// Sentences that do not contain the word are skipped.
    pub fn cloze_examples(&self) -> Vec<String> {
        self.examples
            .iter()
            .filter_map(|e| blank_out(&e.text, &self.word))
            .collect()
    }

    /// Whether nothing but a hint is known.
    pub fn is_hint_only(&self) -> bool {
        self.senses.is_empty() && self.examples.is_empty() && self.hint.is_some()
    }
}

/// Mask a word, keeping the first and last letters: `apple` → `a___e`.
pub fn mask_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let masked: String = match chars.len() {
        0 => String::new(),
        1 | 2 => "_".repeat(chars.len()),
        n => {
            let mut s = String::new();
            s.push(chars[0]);
            s.push_str(&"_".repeat(n - 2));
            s.push(chars[n - 1]);
            s
        }
    };
    format!("{} ({} letters)", masked, chars.len())
}

/// Replace case-insensitive occurrences of `word` in `text` with underscores.
fn blank_out(text: &str, word: &str) -> Option<String> {
    if word.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    // Lowercasing can change byte lengths outside ASCII; only blank when the
    // offsets still line up.
    if lower.len() != text.len() || !lower.contains(word) {
        return None;
    }

    let blank = "_".repeat(word.chars().count());
    let mut out = String::with_capacity(text.len());
    let mut rest = 0;
    for (start, _) in lower.match_indices(word) {
        out.push_str(&text[rest..start]);
        out.push_str(&blank);
        rest = start + word.len();
    }
    out.push_str(&text[rest..]);
    Some(out)
}

/// Trait for definition sources.
pub trait Lookup: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the definition of a normalized word.
    ///
    /// Returns `NotFound` when the source has nothing for the word.
    fn fetch(&self, word: &str) -> Result<Definition>;
}

impl<T: Lookup + ?Sized> Lookup for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fetch(&self, word: &str) -> Result<Definition> {
        (**self).fetch(word)
    }
}

impl<T: Lookup + ?Sized> Lookup for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fetch(&self, word: &str) -> Result<Definition> {
        (**self).fetch(word)
    }
}
