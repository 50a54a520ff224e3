//! Canonical section headings.
//!
//! A heading is a whole line naming a section ("EXPÉRIENCES", "FORMATION",
//! "COMPÉTENCES TECHNIQUES", ...). Opening a heading always closes whatever
//! section was open before it. Patterns are case-insensitive and accept both
//! accented and unaccented spellings.

use regex::Regex;

use crate::errors::ParserError;
use crate::parser::compile;
use crate::parser::languages::language_spellings;
use crate::parser::locator::SectionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Experience,
    Projects,
    Education,
    TechnicalSkills,
    Languages,
    /// A bare "COMPÉTENCES" / "SKILLS" heading with no qualifier.
    Skills,
    Certificates,
    /// Headings with no extractor of their own (hobbies, references, ...).
    Other,
}

/// Checked in order: the qualified skills headings must win over the bare one.
/// `{languages}` is replaced by the known language spellings, so that
/// "Langues : Anglais" is a heading and "Languages: Python, Go" is not.
/// A bare "PROJETS" closes the open section without opening one.
const HEADING_PATTERNS: &[(Heading, &str)] = &[
    (
        Heading::Experience,
        r"(?i)^(?:EXP[ÉE]RIENCES?(?:\s+PROFESSIONNELLES?)?|(?:WORK|PROFESSIONAL)\s+EXPERIENCES?)\s*:?$",
    ),
    (
        Heading::Projects,
        r"(?i)^(?:PROJETS?\s+PERSONNELS?|(?:PERSONAL|SIDE)\s+PROJECTS?)\s*:?$",
    ),
    (Heading::Education, r"(?i)^(?:FORMATIONS?|[ÉE]DUCATION)\s*:?$"),
    (
        Heading::TechnicalSkills,
        r"(?i)^(?:COMP[ÉE]?TENCES\s+TECHNIQUES?|TECHNICAL\s+SKILLS)\b",
    ),
    (
        Heading::Languages,
        r"(?i)^(?:(?:LANGUES?|LANGUAGES)\s*(?:$|:\s*(?:$|(?:{languages})\b))|COMP[ÉE]?TENCES\s+LINGUISTIQUES?\b|LINGUISTIQUES\s+TRANSVERSALES\b)",
    ),
    (Heading::Skills, r"(?i)^(?:COMP[ÉE]?TENCES|SKILLS)\s*:?$"),
    (Heading::Certificates, r"(?i)^CERTIFI(?:CATS?|CATIONS?)\s*:?$"),
    (
        Heading::Other,
        r"(?i)^(?:PROJETS?|PROJECTS?|LOISIRS|CENTRES?\s+D'INT[ÉE]R[ÊE]TS?|INT[ÉE]R[ÊE]TS|INTERESTS|HOBBIES|R[ÉE]F[ÉE]RENCES|DIVERS)\s*:?$",
    ),
];

impl Heading {
    /// The extractor section a heading opens, if any.
    pub fn kind(self) -> Option<SectionKind> {
        match self {
            Heading::Experience | Heading::Projects => Some(SectionKind::Experience),
            Heading::Education => Some(SectionKind::Education),
            Heading::TechnicalSkills | Heading::Skills => Some(SectionKind::Skills),
            Heading::Languages => Some(SectionKind::Languages),
            Heading::Certificates | Heading::Other => None,
        }
    }
}

/// Compiled heading registry. Cheap to clone: compiled regexes share their
/// program internally.
#[derive(Debug, Clone)]
pub struct Headings {
    patterns: Vec<(Heading, Regex)>,
}

impl Headings {
    pub fn new() -> Result<Self, ParserError> {
        let patterns = HEADING_PATTERNS
            .iter()
            .map(|(heading, pattern)| {
                let pattern = pattern.replace("{languages}", &language_spellings());
                Ok((*heading, compile("heading", &pattern)?))
            })
            .collect::<Result<Vec<_>, ParserError>>()?;
        Ok(Self { patterns })
    }

    /// Returns the heading a trimmed line names, if any.
    pub fn classify(&self, line: &str) -> Option<Heading> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(line))
            .map(|(heading, _)| *heading)
    }

    pub fn is_heading(&self, line: &str) -> bool {
        self.classify(line).is_some()
    }

    /// `true` if any line of the document names `heading`.
    pub fn any_line_is(&self, lines: &[&str], heading: Heading) -> bool {
        lines.iter().any(|line| self.classify(line) == Some(heading))
    }
}
