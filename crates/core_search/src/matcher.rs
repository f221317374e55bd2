use regex::{Regex, RegexBuilder};
use tracing::debug;

const PATTERN_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    MatchAll,
    Regex,
    /// The pattern did not compile and is matched as plain text.
    Literal,
}

#[derive(Debug, Clone)]
enum Compiled {
    All,
    Regex(Regex),
    Literal(String),
}

/// Immutable, case-insensitive text matcher built from user input.
///
/// Compilation never fails: an empty pattern matches everything and a
/// pattern the regex engine rejects degrades to a case-insensitive substring
/// search for the raw text.
#[derive(Debug, Clone)]
pub struct Matcher {
    pattern: String,
    compiled: Compiled,
}

impl Matcher {
    pub fn compile(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Self::match_all();
        }

        let compiled = match RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
        {
            Ok(regex) => Compiled::Regex(regex),
            Err(err) => {
                debug!(%pattern, error = %err, "search pattern rejected; matching literally");
                Compiled::Literal(pattern.to_lowercase())
            }
        };
        Self { pattern, compiled }
    }

    pub fn match_all() -> Self {
        Self {
            pattern: String::new(),
            compiled: Compiled::All,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn kind(&self) -> MatcherKind {
        match self.compiled {
            Compiled::All => MatcherKind::MatchAll,
            Compiled::Regex(_) => MatcherKind::Regex,
            Compiled::Literal(_) => MatcherKind::Literal,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.compiled {
            Compiled::All => true,
            Compiled::Regex(regex) => regex.is_match(text),
            Compiled::Literal(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::match_all()
    }
}
