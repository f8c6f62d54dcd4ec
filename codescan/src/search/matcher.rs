use regex::{Regex, RegexBuilder};

use crate::config::SearchConfig;
use crate::errors::ScanResult;

/// Strategy for pattern matching, compiled once from the configuration.
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// Case-sensitive literal substring search
    Literal(String),
    /// Compiled regular expression; also used for case-insensitive literals
    /// (escaped needle with the case-insensitivity flag)
    Regex(Regex),
}

/// Locates pattern occurrences within a single line of text.
///
/// Holds no per-file state and is safe to share across scan workers. The
/// only way to change matching behavior is to compile a new matcher.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    strategy: MatchStrategy,
    whole_word: bool,
}

impl PatternMatcher {
    /// Compiles the configured pattern. A malformed regular expression is
    /// reported here, before any file is opened.
    pub fn new(config: &SearchConfig) -> ScanResult<Self> {
        let strategy = if config.use_regex {
            let regex = RegexBuilder::new(&config.pattern)
                .case_insensitive(!config.case_sensitive)
                .build()?;
            MatchStrategy::Regex(regex)
        } else if config.case_sensitive {
            MatchStrategy::Literal(config.pattern.clone())
        } else {
            // Escaping keeps literal semantics while the regex engine
            // handles Unicode-correct case folding.
            let regex = RegexBuilder::new(&regex::escape(&config.pattern))
                .case_insensitive(true)
                .build()?;
            MatchStrategy::Regex(regex)
        };

        Ok(Self {
            strategy,
            whole_word: config.whole_word,
        })
    }

    /// Finds all non-overlapping matches in `line`, as ordered byte-offset
    /// spans `(start, end)`.
    pub fn find_matches(&self, line: &str) -> Vec<(usize, usize)> {
        let mut spans: Vec<(usize, usize)> = match &self.strategy {
            MatchStrategy::Literal(needle) => line
                .match_indices(needle.as_str())
                .map(|(start, matched)| (start, start + matched.len()))
                .collect(),
            MatchStrategy::Regex(regex) => regex
                .find_iter(line)
                .map(|m| (m.start(), m.end()))
                .collect(),
        };

        if self.whole_word {
            spans.retain(|&(start, end)| is_word_bounded(line, start, end));
        }
        spans
    }
}

/// A span is a whole word when neither adjacent character is alphanumeric
/// or underscore; line boundaries count as word boundaries.
fn is_word_bounded(line: &str, start: usize, end: usize) -> bool {
    let before = line[..start].chars().next_back();
    let after = line[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
