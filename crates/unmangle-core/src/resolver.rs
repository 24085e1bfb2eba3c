use anyhow::Result;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::words::{WordExtractor, DEFAULT_PLACEHOLDER};

/// Known patterns, written with the default placeholder.
pub const BUILTIN_REPLACEMENTS: &[(&str, &str)] = &[
    ("Ungek?rzt", "Ungekürzt"),
];

/// Ordered pattern table applied before any prompting.
#[derive(Debug, Clone, Default)]
pub struct ReplacementTable {
    entries: Vec<(String, String)>,
}

impl ReplacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in entries, rewritten for `placeholder`.
    pub fn builtin(placeholder: char) -> Self {
        let mut table = Self::new();
        for (pattern, replacement) in BUILTIN_REPLACEMENTS {
            let pattern = if placeholder == DEFAULT_PLACEHOLDER {
                pattern.to_string()
            } else {
                pattern.replace(DEFAULT_PLACEHOLDER, &placeholder.to_string())
            };
            table.insert(pattern, *replacement);
        }
        table
    }

    pub fn insert(&mut self, pattern: impl Into<String>, replacement: impl Into<String>) {
        self.entries.push((pattern.into(), replacement.into()));
    }

    /// Applies every entry in order, each to the output of the previous one.
    pub fn apply(&self, name: &str) -> String {
        let mut current = name.to_string();
        for (pattern, replacement) in &self.entries {
            if current.contains(pattern.as_str()) {
                debug!("Table replacement: '{}' -> '{}'", pattern, replacement);
                current = current.replace(pattern.as_str(), replacement);
            }
        }
        current
    }
}

/// Answers given during this run, keyed by the word they were given for.
#[derive(Debug, Clone, Default)]
pub struct ReplacementMemo {
    answers: IndexMap<String, String>,
}

impl ReplacementMemo {
    pub fn get(&self, word: &str) -> Option<&str> {
        self.answers.get(word).map(String::as_str)
    }

    /// Keeps the first answer recorded for a word.
    pub fn record(&mut self, word: &str, answer: &str) {
        self.answers
            .entry(word.to_string())
            .or_insert_with(|| answer.to_string());
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Entries in the order they were learned.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.answers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Turns a name with placeholders into its repaired form.
///
/// The table is consulted first. Words still carrying the placeholder are
/// answered from the memo or, failing that, by the `prompt` callback, which
/// receives the current name and the word and returns the text to put in
/// place of the word's first placeholder.
pub struct Resolver {
    extractor: WordExtractor,
    table: ReplacementTable,
    memo: ReplacementMemo,
}

impl Resolver {
    pub fn new(extractor: WordExtractor, table: ReplacementTable) -> Self {
        Self {
            extractor,
            table,
            memo: ReplacementMemo::default(),
        }
    }

    pub fn memo(&self) -> &ReplacementMemo {
        &self.memo
    }

    pub fn into_memo(self) -> ReplacementMemo {
        self.memo
    }

    pub fn resolve<F>(&mut self, name: &str, prompt: &mut F) -> Result<String>
    where
        F: FnMut(&str, &str) -> Result<String>,
    {
        if !self.extractor.contains_placeholder(name) {
            return Ok(name.to_string());
        }

        let partial = self.table.apply(name);
        let words = self.extractor.extract(&partial);
        if words.is_empty() {
            return Ok(partial);
        }

        let placeholder = self.extractor.placeholder();
        let mut resolved = String::with_capacity(partial.len());
        let mut cursor = 0;

        for word in words {
            let current = format!("{}{}", resolved, &partial[cursor..]);
            info!("Current name: {}", current);
            info!("Word to process: {}", word.text);

            let answer = match self.memo.get(&word.text) {
                Some(previous) => {
                    info!("Using previous replacement: '{}'", previous);
                    previous.to_string()
                }
                None => {
                    let answer = prompt(&current, &word.text)?;
                    self.memo.record(&word.text, &answer);
                    answer
                }
            };

            resolved.push_str(&partial[cursor..word.span.start]);
            resolved.push_str(&word.text.replacen(placeholder, &answer, 1));
            cursor = word.span.end;
        }
        resolved.push_str(&partial[cursor..]);

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn resolver() -> Resolver {
        Resolver::new(
            WordExtractor::new('?').unwrap(),
            ReplacementTable::builtin('?'),
        )
    }

    fn scripted(answers: &[&str]) -> (VecDeque<String>, Vec<String>) {
        (answers.iter().map(|a| a.to_string()).collect(), Vec::new())
    }

    #[test]
    fn test_table_match_needs_no_prompt() {
        let mut resolver = resolver();
        let mut prompts = 0;
        let mut prompt = |_: &str, _: &str| -> Result<String> {
            prompts += 1;
            Ok(String::new())
        };

        let result = resolver.resolve("Ungek?rzt_Hoerbuch.mp3", &mut prompt).unwrap();

        assert_eq!(result, "Ungekürzt_Hoerbuch.mp3");
        assert_eq!(prompts, 0);
        assert!(resolver.memo().is_empty());
    }

    #[test]
    fn test_name_without_placeholder_is_untouched() {
        let mut table = ReplacementTable::new();
        table.insert("Hoer", "Hör");
        let mut resolver = Resolver::new(WordExtractor::new('?').unwrap(), table);
        let mut prompt = |_: &str, _: &str| -> Result<String> { panic!("unexpected prompt") };

        let result = resolver.resolve("Hoerbuch.mp3", &mut prompt).unwrap();

        assert_eq!(result, "Hoerbuch.mp3");
    }

    #[test]
    fn test_empty_answer_deletes_placeholder() {
        let mut resolver = resolver();
        let mut asked = Vec::new();
        let mut prompt = |_: &str, word: &str| -> Result<String> {
            asked.push(word.to_string());
            Ok(String::new())
        };

        let result = resolver.resolve("Over view?.txt", &mut prompt).unwrap();

        assert_eq!(result, "Over view.txt");
        assert_eq!(asked, vec!["view?"]);
        assert_eq!(resolver.memo().get("view?"), Some(""));
    }

    #[test]
    fn test_second_resolution_reuses_memo() {
        let mut resolver = resolver();
        let (mut answers, mut asked) = scripted(&["ü", "x"]);
        let mut prompt = |_: &str, word: &str| -> Result<String> {
            asked.push(word.to_string());
            Ok(answers.pop_front().unwrap())
        };

        let first = resolver.resolve("F?r Elise.mp3", &mut prompt).unwrap();
        let second = resolver.resolve("Nur f?r F?r.txt", &mut prompt).unwrap();

        assert_eq!(first, "Für Elise.mp3");
        assert_eq!(second, "Nur fxr Für.txt");
        assert_eq!(asked, vec!["F?r", "f?r"]);
    }

    #[test]
    fn test_reused_answer_is_echoed() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let mut resolver = resolver();
        let mut prompts = 0;
        let mut prompt = |_: &str, _: &str| -> Result<String> {
            prompts += 1;
            Ok("ö".to_string())
        };

        let (first, second) = tracing::subscriber::with_default(subscriber, || {
            (
                resolver.resolve("K?ln.txt", &mut prompt).unwrap(),
                resolver.resolve("K?ln (2).txt", &mut prompt).unwrap(),
            )
        });

        assert_eq!(first, "Köln.txt");
        assert_eq!(second, "Köln (2).txt");
        assert_eq!(prompts, 1);
        let output = logs.contents();
        assert_eq!(output.matches("Using previous replacement: 'ö'").count(), 1);
        assert!(output.contains("Word to process: K?ln"));
    }

    #[test]
    fn test_duplicate_word_gets_same_answer_at_each_position() {
        let mut resolver = resolver();
        let mut prompts = 0;
        let mut prompt = |_: &str, _: &str| -> Result<String> {
            prompts += 1;
            Ok("ö".to_string())
        };

        let result = resolver.resolve("sch?n sch?n", &mut prompt).unwrap();

        assert_eq!(result, "schön schön");
        assert_eq!(prompts, 1);
    }

    #[test]
    fn test_longer_word_containing_short_word_is_not_clobbered() {
        let mut resolver = resolver();
        let (mut answers, _) = scripted(&["1", "2"]);
        let mut prompt = |_: &str, _: &str| -> Result<String> { Ok(answers.pop_front().unwrap()) };

        let result = resolver.resolve("ab? b?", &mut prompt).unwrap();

        assert_eq!(result, "ab1 b2");
    }

    #[test]
    fn test_only_first_placeholder_in_word_is_replaced() {
        let mut resolver = resolver();
        let mut prompt = |_: &str, _: &str| -> Result<String> { Ok("ö".to_string()) };

        let result = resolver.resolve("Gr??e.txt", &mut prompt).unwrap();

        assert_eq!(result, "Grö?e.txt");
    }

    #[test]
    fn test_prompt_sees_partially_resolved_name() {
        let mut resolver = resolver();
        let mut seen = Vec::new();
        let mut prompt = |name: &str, _: &str| -> Result<String> {
            seen.push(name.to_string());
            Ok("ä".to_string())
        };

        resolver.resolve("K?se und Tr?ume", &mut prompt).unwrap();

        assert_eq!(seen, vec!["K?se und Tr?ume", "Käse und Tr?ume"]);
    }

    #[test]
    fn test_prompt_error_propagates() {
        let mut resolver = resolver();
        let mut prompt = |_: &str, _: &str| -> Result<String> { anyhow::bail!("stdin closed") };

        assert!(resolver.resolve("Caf?", &mut prompt).is_err());
        assert!(resolver.memo().is_empty());
    }

    #[test]
    fn test_table_entries_apply_in_order() {
        let mut table = ReplacementTable::new();
        table.insert("Stra?e", "Straße");
        table.insert("Straße 1", "Hauptstraße 1");

        assert_eq!(table.apply("Stra?e 1.txt"), "Hauptstraße 1.txt");
    }

    #[test]
    fn test_builtin_table_follows_placeholder() {
        let table = ReplacementTable::builtin('#');

        assert_eq!(table.apply("Ungek#rzt.mp3"), "Ungekürzt.mp3");
        assert_eq!(table.apply("Ungek?rzt.mp3"), "Ungek?rzt.mp3");
    }

    #[test]
    fn test_memo_keeps_first_answer() {
        let mut memo = ReplacementMemo::default();
        memo.record("f?r", "ü");
        memo.record("f?r", "x");

        assert_eq!(memo.get("f?r"), Some("ü"));
        assert_eq!(memo.len(), 1);
    }
}
