// Heuristic CV parser.
// Pipeline: normalizer -> headings/locator -> field extractors -> CvRecord.
// Every pattern is compiled once in `CvParser::new`; parsing itself never fails.

pub mod education;
pub mod experience;
pub mod headings;
pub mod languages;
pub mod locator;
pub mod matchers;
pub mod normalizer;
pub mod personal;
pub mod skills;

use std::path::Path;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::errors::ParserError;
use crate::extraction::TextExtractor;
use crate::models::cv::CvRecord;

use education::EducationExtractor;
use experience::ExperienceExtractor;
use headings::Headings;
use languages::LanguagesExtractor;
use locator::{SectionKind, SectionLocator};
use personal::PersonalInfoExtractor;
use skills::SkillsExtractor;

pub(crate) fn compile(name: &'static str, pattern: &str) -> Result<Regex, ParserError> {
    Regex::new(pattern).map_err(|source| ParserError::Pattern { name, source })
}

/// Per-category record ids: `exp-1`, `exp-2`, ... Scoped to one parse.
#[derive(Debug)]
pub struct IdSequence {
    prefix: &'static str,
    issued: usize,
}

impl IdSequence {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, issued: 0 }
    }

    pub fn next_id(&mut self) -> String {
        self.issued += 1;
        format!("{}-{}", self.prefix, self.issued)
    }
}

/// How an extractor enters its line stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEntry {
    /// Whole document: records are only collected once the extractor's own
    /// heading has been seen.
    Scan,
    /// A located span with the header already stripped: the section is open
    /// from the first line.
    Open,
}

/// A section extractor: gated on its own headings, fed trimmed lines.
pub trait SectionExtractor {
    type Record;
    const KIND: SectionKind;

    /// `true` if any line is a heading this extractor opens on.
    fn detects_header(&self, lines: &[&str]) -> bool;

    fn extract(&self, lines: &[&str], entry: SectionEntry) -> Vec<Self::Record>;
}

/// Immutable, shareable parser. Build once, call `parse` from any thread.
pub struct CvParser {
    headings: Headings,
    locator: SectionLocator,
    personal: PersonalInfoExtractor,
    experience: ExperienceExtractor,
    education: EducationExtractor,
    skills: SkillsExtractor,
    languages: LanguagesExtractor,
}

impl CvParser {
    pub fn new() -> Result<Self, ParserError> {
        let headings = Headings::new()?;
        Ok(Self {
            headings: headings.clone(),
            locator: SectionLocator::new()?,
            personal: PersonalInfoExtractor::new()?,
            experience: ExperienceExtractor::new(headings.clone())?,
            education: EducationExtractor::new(headings.clone())?,
            skills: SkillsExtractor::new(headings.clone())?,
            languages: LanguagesExtractor::new(headings)?,
        })
    }

    /// Parses extracted CV text. Empty text yields the empty record.
    pub fn parse(&self, text: &str) -> CvRecord {
        if text.trim().is_empty() {
            info!("No text to parse, returning empty CV");
            return CvRecord::empty();
        }

        let lines = normalizer::lines(text);
        let record = CvRecord {
            personal_info: self.personal.extract(text),
            experiences: self.section(&self.experience, text, &lines),
            education: self.section(&self.education, text, &lines),
            skills: self.section(&self.skills, text, &lines),
            languages: self.section(&self.languages, text, &lines),
        };

        info!(
            experiences = record.experiences.len(),
            education = record.education.len(),
            skills = record.skills.len(),
            languages = record.languages.len(),
            "CV parsed"
        );
        record
    }

    /// Extracts the file's text with `extractor` and parses it.
    pub fn parse_file(&self, path: &Path, extractor: &dyn TextExtractor) -> CvRecord {
        let text = extractor.extract_text(path);
        if text.is_empty() {
            warn!(path = %path.display(), "No text extracted from file");
        }
        self.parse(&text)
    }

    /// Runs `extractor` over the whole document when it recognises one of
    /// its headings, otherwise over the span the locator finds for its kind.
    fn section<E: SectionExtractor>(&self, extractor: &E, text: &str, lines: &[&str]) -> Vec<E::Record> {
        if extractor.detects_header(lines) {
            return extractor.extract(lines, SectionEntry::Scan);
        }

        let span = self
            .locator
            .locate_with(text, E::KIND, |line| self.accepts_fallback_header(line, E::KIND));
        if span.is_empty() {
            debug!(section = %E::KIND, "Section not found");
            return Vec::new();
        }

        debug!(section = %E::KIND, "Falling back to located section");
        let span_lines = normalizer::lines(&span);
        extractor.extract(span_lines.get(1..).unwrap_or(&[]), SectionEntry::Open)
    }

    /// A located span may only open on a canonical heading of the same kind,
    /// or on a non-canonical line that still reads as a title of that kind.
    fn accepts_fallback_header(&self, line: &str, kind: SectionKind) -> bool {
        match self.headings.classify(line) {
            Some(heading) => heading.kind() == Some(kind),
            None => self.locator.is_standalone_title(line, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CV: &str = "Jane Doe\n\
        jane.doe@example.com\n\
        06 12 34 56 78\n\
        Toulouse, France\n\
        \n\
        EXPÉRIENCES\n\
        Développeuse Backend\n\
        Airbus - Toulouse\n\
        2023\n\
        Technologies: Rust, PostgreSQL\n\
        \n\
        FORMATION\n\
        2019 - 2022\n\
        INSA Toulouse - Génie Informatique\n\
        \n\
        LANGUES\n\
        Anglais : courant (C1)\n\
        Français : langue maternelle\n";

    fn parser() -> CvParser {
        CvParser::new().unwrap()
    }

    #[test]
    fn test_empty_text_gives_empty_record() {
        let p = parser();
        assert_eq!(p.parse(""), CvRecord::empty());
        assert_eq!(p.parse("  \n\t\n"), CvRecord::empty());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let p = parser();
        assert_eq!(p.parse(CV), p.parse(CV));
    }

    #[test]
    fn test_sections_stay_isolated() {
        let cv = parser().parse(CV);

        assert_eq!(cv.experiences.len(), 1);
        assert_eq!(cv.experiences[0].position, "Développeuse Backend");
        assert_eq!(cv.experiences[0].company, "Airbus");

        assert_eq!(cv.education.len(), 1);
        assert_eq!(cv.education[0].institution, "INSA Toulouse");
        assert_eq!(cv.education[0].degree, "Génie Informatique");

        let names: Vec<_> = cv.languages.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Anglais", "Français"]);
    }

    #[test]
    fn test_personal_info_is_filled() {
        let cv = parser().parse(CV);
        assert_eq!(cv.personal_info.name.as_deref(), Some("Jane Doe"));
        assert_eq!(cv.personal_info.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(cv.personal_info.location.as_deref(), Some("Toulouse"));
    }

    #[test]
    fn test_unrecognised_experience_heading_uses_locator() {
        let cv = parser().parse("Expériences en entreprise\nStagiaire développeur\nThales - Paris\n2022\n");
        assert_eq!(cv.experiences.len(), 1, "{:#?}", cv.experiences);
        assert_eq!(cv.experiences[0].position, "Stagiaire développeur");
        assert_eq!(cv.experiences[0].company, "Thales");
        assert_eq!(cv.experiences[0].start_date, "2022");
        assert!(cv.education.is_empty());
    }

    #[test]
    fn test_unrecognised_education_heading_uses_locator() {
        let cv = parser().parse("Diplômes\n2018 - 2021\nUniversité de Lyon - Licence en Mathématiques\n");
        assert_eq!(cv.education.len(), 1, "{:#?}", cv.education);
        assert_eq!(cv.education[0].institution, "Université de Lyon");
        assert_eq!(cv.education[0].field, "Mathématiques");
        assert!(cv.experiences.is_empty());
    }

    #[test]
    fn test_fallback_skips_keyword_lines_of_other_sections() {
        let cv = parser().parse(
            "Jane Doe\n\
             EXPÉRIENCES\n\
             Ingénieur support technique\n\
             Orange - Paris\n\
             2021\n\
             Développement Python et Docker\n\
             COMPÉTENCES\n\
             Rust, Java\n",
        );
        let skills: Vec<_> = cv.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skills, vec!["Rust", "Java"]);
        assert_eq!(cv.experiences.len(), 1);
        assert_eq!(cv.experiences[0].company, "Orange");
    }

    #[test]
    fn test_mid_sentence_keyword_does_not_open_a_section() {
        let cv = parser().parse("Parcours professionnel\nStagiaire développeur\nThales - Paris\n2022\n");
        assert!(cv.experiences.is_empty());
    }

    #[test]
    fn test_languages_stack_line_keeps_experience() {
        let cv = parser().parse(
            "John Smith\n\
             WORK EXPERIENCE\n\
             Backend engineer at Acme\n\
             Languages: Python, Go\n\
             Acme - Berlin\n\
             2021\n",
        );
        assert_eq!(cv.experiences.len(), 1, "{:#?}", cv.experiences);
        assert_eq!(cv.experiences[0].position, "Backend engineer at Acme");
        assert_eq!(cv.experiences[0].company, "Acme");
        assert_eq!(cv.experiences[0].start_date, "2021");
        let skills: Vec<_> = cv.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skills, vec!["Python", "Go"]);
        assert!(cv.languages.is_empty());
    }

    #[test]
    fn test_bare_projects_heading_closes_education() {
        let cv = parser().parse(
            "Jane Doe\n\
             FORMATION\n\
             2019 - 2022\n\
             INSA Lyon\n\
             PROJETS\n\
             Application de budget\n\
             Projet académique\n\
             2022\n",
        );
        assert!(cv.experiences.is_empty(), "{:#?}", cv.experiences);
        assert_eq!(cv.education.len(), 1);
        assert_eq!(cv.education[0].institution, "INSA Lyon");
        assert_eq!(cv.education[0].description, "");
    }

    #[test]
    fn test_ids_restart_per_parse() {
        let p = parser();
        let first = p.parse(CV);
        let second = p.parse(CV);
        assert_eq!(first.experiences[0].id, "exp-1");
        assert_eq!(second.experiences[0].id, "exp-1");
        assert_eq!(first.languages[1].id, "lang-2");
    }

    #[test]
    fn test_id_sequence() {
        let mut ids = IdSequence::new("edu");
        assert_eq!(ids.next_id(), "edu-1");
        assert_eq!(ids.next_id(), "edu-2");
    }
}
