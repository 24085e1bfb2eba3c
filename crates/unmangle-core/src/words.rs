use std::ops::Range;

use regex::Regex;
use tracing::debug;

use crate::UnmangleError;

/// Characters that end a word. Whitespace is matched separately.
pub const BOUNDARY_CHARS: [char; 5] = ['.', '_', '-', '(', ')'];

pub const DEFAULT_PLACEHOLDER: char = '?';

/// A maximal run of non-boundary characters containing the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub span: Range<usize>,
}

pub struct WordExtractor {
    placeholder: char,
    word_pattern: Regex,
}

impl WordExtractor {
    pub fn new(placeholder: char) -> Result<Self, UnmangleError> {
        if placeholder.is_whitespace() || BOUNDARY_CHARS.contains(&placeholder) {
            return Err(UnmangleError::InvalidPlaceholder { placeholder });
        }

        let ph = regex::escape(&placeholder.to_string());
        let word_pattern = Regex::new(&format!(r"[^\s._\-()]*{ph}[^\s._\-()]*"))
            .map_err(|e| UnmangleError::Pattern { message: e.to_string() })?;

        Ok(Self {
            placeholder,
            word_pattern,
        })
    }

    pub fn placeholder(&self) -> char {
        self.placeholder
    }

    pub fn contains_placeholder(&self, name: &str) -> bool {
        name.contains(self.placeholder)
    }

    /// Returns every word of `name` in left-to-right order.
    pub fn extract(&self, name: &str) -> Vec<Word> {
        let words: Vec<Word> = self
            .word_pattern
            .find_iter(name)
            .map(|m| Word {
                text: m.as_str().to_string(),
                span: m.range(),
            })
            .collect();

        debug!("Extracted {} word(s) from '{}'", words.len(), name);
        words
    }
}
