//! Keyword-driven section locator.
//!
//! Looser than the heading registry: any line containing one of a kind's
//! keywords opens that section, and the span runs until a line mentions any
//! section title at all. Used to recover sections whose heading the
//! extractors' own state machines don't recognise.

use std::fmt;

use regex::Regex;

use crate::errors::ParserError;
use crate::parser::compile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Experience,
    Education,
    Skills,
    Languages,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Languages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Languages => "languages",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            SectionKind::Experience => &[
                r"exp[ée]\p{M}*rience",
                "professionnel",
                "emploi",
                r"\bposte\b",
                r"carri[èe]re",
                r"\bwork\b",
                "employment",
                "projets",
            ],
            SectionKind::Education => &[
                "formation",
                r"[ée]ducation",
                r"dipl[ôo]me",
                r"universit[ée]",
                r"[ée]cole",
                "studies",
                "degree",
            ],
            SectionKind::Skills => &[
                r"comp[ée]\p{M}*tences",
                "skills",
                "technique",
                "technical",
                "outils",
                r"\btools\b",
                "technologies",
                "langages",
                "frameworks",
            ],
            SectionKind::Languages => &[r"\blangues?\b", r"\blanguages\b", "idiomas"],
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any of these ends the span being collected, whatever its kind.
const SECTION_TITLE_MARKERS: &[&str] = &[
    r"\bformation",
    r"\b[ée]ducation",
    r"exp[ée]\p{M}*rience",
    r"comp[ée]\p{M}*tences",
    r"\bskills",
    r"\blangues",
    r"\blanguages",
    r"\bprojets",
    r"\bcertifications",
    r"\bloisirs",
    r"centres d'int[ée]r[êe]t",
    r"\br[ée]f[ée]rences",
    r"\bdivers\b",
];

#[derive(Debug, Clone)]
pub struct SectionLocator {
    titles: Vec<(SectionKind, Regex)>,
    /// Lines that open with a keyword and carry nothing after a colon.
    standalone_titles: Vec<(SectionKind, Regex)>,
    any_title: Regex,
}

impl SectionLocator {
    pub fn new() -> Result<Self, ParserError> {
        let titles = SectionKind::ALL
            .iter()
            .map(|kind| Ok((*kind, compile("section_title", &alternation(kind.keywords()))?)))
            .collect::<Result<Vec<_>, ParserError>>()?;
        let standalone_titles = SectionKind::ALL
            .iter()
            .map(|kind| {
                let pattern = format!(r"(?i)^(?:{})[^:]*:?$", kind.keywords().join("|"));
                Ok((*kind, compile("standalone_title", &pattern)?))
            })
            .collect::<Result<Vec<_>, ParserError>>()?;
        Ok(Self {
            titles,
            standalone_titles,
            any_title: compile("section_marker", &alternation(SECTION_TITLE_MARKERS))?,
        })
    }

    /// `true` for a line that reads as a title of `kind` on its own
    /// ("Diplômes obtenus"), as opposed to one merely mentioning a keyword
    /// ("Ingénieur support technique").
    pub fn is_standalone_title(&self, line: &str, kind: SectionKind) -> bool {
        find(&self.standalone_titles, kind).is_some_and(|re| re.is_match(line.trim()))
    }

    /// Returns the first span of `kind` as newline-terminated lines, header
    /// first, or `""` when no line carries one of the kind's keywords.
    pub fn locate(&self, text: &str, kind: SectionKind) -> String {
        self.locate_with(text, kind, |_| true)
    }

    /// Same as [`locate`](Self::locate), but the header must also satisfy
    /// `accept`. Keyword lines it rejects are skipped.
    pub fn locate_with(
        &self,
        text: &str,
        kind: SectionKind,
        accept: impl Fn(&str) -> bool,
    ) -> String {
        let Some(title) = find(&self.titles, kind) else {
            return String::new();
        };

        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        let Some(header) = lines
            .by_ref()
            .find(|&line| title.is_match(line) && accept(line))
        else {
            return String::new();
        };

        let mut section = format!("{header}\n");
        for line in lines.take_while(|line| !self.any_title.is_match(line)) {
            section.push_str(line);
            section.push('\n');
        }
        section
    }
}

fn find(patterns: &[(SectionKind, Regex)], kind: SectionKind) -> Option<&Regex> {
    patterns.iter().find(|(k, _)| *k == kind).map(|(_, re)| re)
}

fn alternation(patterns: &[&str]) -> String {
    format!("(?i)(?:{})", patterns.join("|"))
}
