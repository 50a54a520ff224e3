//! Ordered field matchers.
//!
//! Each personal-info field is resolved by a chain of matchers tried in
//! priority order; the first matcher that returns a value wins and later ones
//! are never consulted.

use regex::Regex;

use crate::errors::ParserError;
use crate::parser::compile;

pub trait FieldMatcher: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    fn try_match(&self, text: &str) -> Option<String>;
}

/// Matches a regex and returns one capture group, optionally rewritten.
pub struct RegexMatcher {
    name: &'static str,
    regex: Regex,
    group: usize,
    normalize: fn(&str) -> String,
}

impl RegexMatcher {
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, ParserError> {
        Ok(Self {
            name,
            regex: compile(name, pattern)?,
            group: 0,
            normalize: |s| s.trim().to_string(),
        })
    }

    /// Returns capture group `group` instead of the whole match.
    pub fn capture(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    pub fn normalized(mut self, normalize: fn(&str) -> String) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl FieldMatcher for RegexMatcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_match(&self, text: &str) -> Option<String> {
        let caps = self.regex.captures(text)?;
        let value = (self.normalize)(caps.get(self.group)?.as_str());
        (!value.is_empty()).then_some(value)
    }
}

/// Returns the first match of `regex` whose text contains none of `excluded`
/// (case-insensitive).
pub struct ExcludingMatcher {
    name: &'static str,
    regex: Regex,
    excluded: &'static [&'static str],
}

impl ExcludingMatcher {
    pub fn new(
        name: &'static str,
        pattern: &str,
        excluded: &'static [&'static str],
    ) -> Result<Self, ParserError> {
        Ok(Self {
            name,
            regex: compile(name, pattern)?,
            excluded,
        })
    }
}

impl FieldMatcher for ExcludingMatcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_match(&self, text: &str) -> Option<String> {
        self.regex
            .find_iter(text)
            .map(|m| m.as_str())
            .find(|candidate| {
                let lower = candidate.to_lowercase();
                !self.excluded.iter().any(|ex| lower.contains(ex))
            })
            .map(str::to_string)
    }
}

/// A priority-ordered list of matchers for one field.
pub struct MatcherChain {
    matchers: Vec<Box<dyn FieldMatcher>>,
}

impl MatcherChain {
    pub fn new(matchers: Vec<Box<dyn FieldMatcher>>) -> Self {
        Self { matchers }
    }

    /// Value of the first matcher that succeeds, with that matcher's name.
    pub fn first_match(&self, text: &str) -> Option<(&'static str, String)> {
        self.matchers
            .iter()
            .find_map(|m| m.try_match(text).map(|value| (m.name(), value)))
    }

    pub fn any_match(&self, text: &str) -> bool {
        self.matchers.iter().any(|m| m.try_match(text).is_some())
    }
}
