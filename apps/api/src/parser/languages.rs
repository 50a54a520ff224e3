//! Spoken languages and their levels.

use regex::Regex;
use tracing::debug;

use crate::errors::ParserError;
use crate::models::cv::Language;
use crate::parser::headings::{Heading, Headings};
use crate::parser::locator::SectionKind;
use crate::parser::{compile, IdSequence, SectionEntry, SectionExtractor};

/// Canonical display name, the spellings that introduce it, and the level
/// assumed when the language is listed without one.
const LANGUAGE_NAMES: &[(&str, &str, &str)] = &[
    ("Français", r"Fran[çc]ais|French", "native"),
    ("Anglais", r"Anglais|English", "B2"),
    ("Vietnamien", r"Vietnamien|Vietnamese", "B1"),
    ("Espagnol", r"Espagnol|Spanish", "B1"),
    ("Allemand", r"Allemand|German", "B1"),
    ("Italien", r"Italien|Italian", "B1"),
];

const DEFAULT_LEVEL: &str = "B1";
const CEFR_PATTERN: &str = r"(?i)\b([ABC][12])\b";

/// Every known spelling as one regex alternation.
pub(crate) fn language_spellings() -> String {
    LANGUAGE_NAMES
        .iter()
        .map(|&(_, spellings, _)| spellings)
        .collect::<Vec<_>>()
        .join("|")
}

struct LanguagePattern {
    name: &'static str,
    default_level: &'static str,
    /// `Name : level (CODE)`
    labelled: Regex,
    /// `Name`, `Name - level` or `Name level`, used when no labelled form matched
    bare: Regex,
}

pub struct LanguagesExtractor {
    headings: Headings,
    patterns: Vec<LanguagePattern>,
    cefr: Regex,
}

impl LanguagesExtractor {
    pub fn new(headings: Headings) -> Result<Self, ParserError> {
        let patterns = LANGUAGE_NAMES
            .iter()
            .map(|&(name, spellings, default_level)| {
                // The level stops at the first separator.
                let labelled =
                    format!(r"(?i)\b(?:{spellings})\s*:\s*([^(,;|]+)(?:\(([^)]+)\))?");
                let bare = format!(
                    r"(?i)\b(?:{spellings})\b(?:\s*[-–]\s*|\s+)?([^(,;|:]*)(?:\(([^)]+)\))?"
                );
                Ok(LanguagePattern {
                    name,
                    default_level,
                    labelled: compile("language", &labelled)?,
                    bare: compile("bare_language", &bare)?,
                })
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        Ok(Self {
            headings,
            patterns,
            cefr: compile("cefr", CEFR_PATTERN)?,
        })
    }

    /// Parenthetical code, then a bare CEFR code, then native, then fluent
    /// (B2/C2 when the line says so, C1 otherwise), then `default`.
    fn resolve_level(
        &self,
        level_text: &str,
        annotation: Option<&str>,
        line: &str,
        default: &str,
    ) -> String {
        if let Some(code) = annotation.map(str::trim).filter(|c| !c.is_empty()) {
            return code.to_string();
        }
        if let Some(caps) = self.cefr.captures(level_text) {
            return caps[1].to_uppercase();
        }

        let level = level_text.to_lowercase();
        if ["natale", "native", "natif", "maternelle"]
            .iter()
            .any(|k| level.contains(k))
        {
            return "native".to_string();
        }
        if level.contains("courant") || level.contains("fluent") {
            let line = line.to_lowercase();
            return if line.contains("b2") {
                "B2".to_string()
            } else if line.contains("c2") {
                "C2".to_string()
            } else {
                "C1".to_string()
            };
        }
        default.to_string()
    }

    /// Labelled entries win; bare names are only read from lines without any.
    fn languages_on(&self, line: &str) -> Vec<(&'static str, String)> {
        let labelled: Vec<_> = self
            .patterns
            .iter()
            .filter_map(|p| {
                let caps = p.labelled.captures(line)?;
                let level_text = caps.get(1).map_or("", |m| m.as_str());
                let annotation = caps.get(2).map(|m| m.as_str());
                Some((p.name, self.resolve_level(level_text, annotation, line, DEFAULT_LEVEL)))
            })
            .collect();
        if !labelled.is_empty() {
            return labelled;
        }

        self.patterns
            .iter()
            .filter_map(|p| {
                let caps = p.bare.captures(line)?;
                let level_text = caps.get(1).map_or("", |m| m.as_str());
                let annotation = caps.get(2).map(|m| m.as_str());
                Some((p.name, self.resolve_level(level_text, annotation, line, p.default_level)))
            })
            .collect()
    }
}

impl SectionExtractor for LanguagesExtractor {
    type Record = Language;
    const KIND: SectionKind = SectionKind::Languages;

    fn detects_header(&self, lines: &[&str]) -> bool {
        self.headings.any_line_is(lines, Heading::Languages)
    }

    fn extract(&self, lines: &[&str], entry: SectionEntry) -> Vec<Language> {
        let mut inside = entry == SectionEntry::Open;
        let mut ids = IdSequence::new("lang");
        let mut languages = Vec::new();

        for line in lines.iter().filter(|line| !line.is_empty()) {
            match self.headings.classify(line) {
                Some(Heading::Languages) => inside = true,
                Some(_) if inside => break,
                _ => {}
            }
            if !inside {
                continue;
            }

            for (name, level) in self.languages_on(line) {
                debug!(language = name, level = %level, "Language found");
                languages.push(Language {
                    id: ids.next_id(),
                    name: name.to_string(),
                    level,
                });
            }
        }

        debug!(count = languages.len(), "Languages extracted");
        languages
    }
}
