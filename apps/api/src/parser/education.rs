//! Education entries from the FORMATION section.
//!
//! Every year-range line inside the section anchors one entry; institution,
//! degree and description are read from the lines right after it.

use regex::Regex;
use tracing::debug;

use crate::errors::ParserError;
use crate::models::cv::Education;
use crate::parser::headings::{Heading, Headings};
use crate::parser::locator::SectionKind;
use crate::parser::normalizer::split_dash;
use crate::parser::{compile, IdSequence, SectionEntry, SectionExtractor};

/// Lines after the anchor searched for the institution.
const INSTITUTION_LINES: usize = 5;
/// Lines after the anchor searched for the description.
const DESCRIPTION_LINES: usize = 6;
const MAX_DESCRIPTION_PARTS: usize = 3;
const DEGREE_PLACEHOLDER: &str = "Études d'ingénieur";
const DEGREE_UNKNOWN: &str = "Formation en cours";

const YEAR_RANGE_PATTERN: &str =
    r"(?i)(\d{4})\s*[-–]\s*(\d{4}|pr[ée]sent|aujourd'hui|actuel(?:lement)?|current)";
const INSTITUTION_PATTERN: &str = r"(?i)\bINSA\b|universit[ée]|university|[ée]cole|institut|college";
const ALL_CAPS_PATTERN: &str = r"^[A-Z\s]+:?$";
const FIELD_PATTERN: &str = r"(?i)\b(?:en|in)\s+(.+)$";

pub struct EducationExtractor {
    headings: Headings,
    year_range: Regex,
    institution: Regex,
    all_caps: Regex,
    field: Regex,
}

impl EducationExtractor {
    pub fn new(headings: Headings) -> Result<Self, ParserError> {
        Ok(Self {
            headings,
            year_range: compile("year_range", YEAR_RANGE_PATTERN)?,
            institution: compile("institution", INSTITUTION_PATTERN)?,
            all_caps: compile("all_caps", ALL_CAPS_PATTERN)?,
            field: compile("field", FIELD_PATTERN)?,
        })
    }

    /// Index of the institution line following the anchor at `anchor`.
    fn find_institution(&self, lines: &[&str], anchor: usize) -> Option<usize> {
        let end = (anchor + 1 + INSTITUTION_LINES).min(lines.len());
        (anchor + 1..end)
            .take_while(|&j| !self.headings.is_heading(lines[j]))
            .find(|&j| {
                let line = lines[j];
                !line.is_empty() && line != "CONTACT" && self.institution.is_match(line)
            })
    }

    fn description(&self, lines: &[&str], anchor: usize, skip: Option<usize>) -> String {
        let end = (anchor + 1 + DESCRIPTION_LINES).min(lines.len());
        (anchor + 1..end)
            .filter(|&j| Some(j) != skip)
            .map(|j| lines[j])
            .take_while(|line| !self.headings.is_heading(line) && !self.year_range.is_match(line))
            .filter(|line| !line.is_empty() && !self.all_caps.is_match(line))
            .take(MAX_DESCRIPTION_PARTS)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn field_of(&self, degree: &str) -> String {
        self.field
            .captures(degree)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_default()
    }
}

fn is_ongoing(end: &str) -> bool {
    let end = end.to_lowercase();
    ["présent", "present", "aujourd'hui", "actuel", "current"]
        .iter()
        .any(|marker| end.starts_with(marker))
}

impl SectionExtractor for EducationExtractor {
    type Record = Education;
    const KIND: SectionKind = SectionKind::Education;

    fn detects_header(&self, lines: &[&str]) -> bool {
        self.headings.any_line_is(lines, Heading::Education)
    }

    fn extract(&self, lines: &[&str], entry: SectionEntry) -> Vec<Education> {
        let mut inside = entry == SectionEntry::Open;
        let mut ids = IdSequence::new("edu");
        let mut education = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            match self.headings.classify(line) {
                Some(Heading::Education) => {
                    inside = true;
                    continue;
                }
                Some(_) if inside => break,
                _ => {}
            }
            if !inside {
                continue;
            }

            let Some(caps) = self.year_range.captures(line) else {
                continue;
            };
            let start_date = caps[1].to_string();
            let end_token = &caps[2];
            let end_date = if is_ongoing(end_token) {
                String::new()
            } else {
                end_token.to_string()
            };

            let institution_idx = self.find_institution(lines, i);
            // Placeholder degrees carry no field of study.
            let (institution, degree, field) = match institution_idx.map(|j| lines[j]) {
                Some(l) => match split_dash(l) {
                    Some((left, right)) => (left.to_string(), right.to_string(), self.field_of(right)),
                    None => (l.to_string(), DEGREE_PLACEHOLDER.to_string(), String::new()),
                },
                None => (String::new(), DEGREE_UNKNOWN.to_string(), String::new()),
            };

            debug!(institution = %institution, degree = %degree, "Education found");
            education.push(Education {
                id: ids.next_id(),
                field,
                degree,
                institution,
                start_date,
                end_date,
                description: self.description(lines, i, institution_idx),
            });
        }

        debug!(count = education.len(), "Education extracted");
        education
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalizer::lines;

    fn extract(text: &str) -> Vec<Education> {
        EducationExtractor::new(Headings::new().unwrap())
            .unwrap()
            .extract(&lines(text), SectionEntry::Scan)
    }

    #[test]
    fn test_year_range_with_institution_and_degree() {
        let edu = extract("FORMATION\n2019 - 2022\nINSA Toulouse - Génie Informatique\n");
        assert_eq!(edu.len(), 1);
        assert_eq!(edu[0].id, "edu-1");
        assert_eq!(edu[0].start_date, "2019");
        assert_eq!(edu[0].end_date, "2022");
        assert_eq!(edu[0].institution, "INSA Toulouse");
        assert_eq!(edu[0].degree, "Génie Informatique");
        assert_eq!(edu[0].description, "");
    }

    #[test]
    fn test_present_blanks_end_date() {
        let edu = extract("FORMATION\n2020 - présent\nUniversité Paul Sabatier\n");
        assert_eq!(edu.len(), 1);
        assert_eq!(edu[0].start_date, "2020");
        assert_eq!(edu[0].end_date, "");
        assert_eq!(edu[0].institution, "Université Paul Sabatier");
        assert_eq!(edu[0].degree, "Études d'ingénieur");
        assert_eq!(edu[0].field, "");
    }

    #[test]
    fn test_field_comes_from_the_degree_side_only() {
        let edu = extract("FORMATION\n2017 - 2019\nÉcole en ligne OpenClassrooms\n");
        assert_eq!(edu[0].institution, "École en ligne OpenClassrooms");
        assert_eq!(edu[0].field, "");
    }

    #[test]
    fn test_present_is_case_and_accent_insensitive() {
        let edu = extract("FORMATION\n2020 – PRESENT\nEcole 42\n");
        assert_eq!(edu[0].end_date, "");
    }

    #[test]
    fn test_missing_institution() {
        let edu = extract("FORMATION\n2015 - 2018\nBaccalauréat scientifique\n");
        assert_eq!(edu.len(), 1);
        assert_eq!(edu[0].institution, "");
        assert_eq!(edu[0].degree, "Formation en cours");
        assert_eq!(edu[0].field, "");
        assert_eq!(edu[0].description, "Baccalauréat scientifique");
    }

    #[test]
    fn test_one_entry_per_year_range() {
        let text = "FORMATION\n\
            2019 - 2022\n\
            INSA Toulouse - Master en Informatique\n\
            Cours: algorithmique, réseaux\n\
            2016 - 2019\n\
            Université de Lyon - Licence\n";
        let edu = extract(text);
        assert_eq!(edu.len(), 2);
        assert_eq!(edu[0].field, "Informatique");
        assert_eq!(edu[0].description, "Cours: algorithmique, réseaux");
        assert_eq!(edu[1].id, "edu-2");
        assert_eq!(edu[1].institution, "Université de Lyon");
        assert_eq!(edu[1].degree, "Licence");
        assert_eq!(edu[1].field, "");
    }

    #[test]
    fn test_other_heading_ends_the_section() {
        let text = "FORMATION\n2019 - 2022\nINSA Lyon\nLANGUES\nAnglais : courant\n2010 - 2012\nÉcole X\n";
        let edu = extract(text);
        assert_eq!(edu.len(), 1);
        assert_eq!(edu[0].description, "");
    }

    #[test]
    fn test_year_range_outside_section_is_ignored() {
        assert!(extract("EXPÉRIENCE\n2019 - 2022\nINSA Lyon\n").is_empty());
    }

    #[test]
    fn test_description_is_capped() {
        let text = "FORMATION\n2019 - 2022\nINSA Lyon\na\nb\nc\nd\n";
        let edu = extract(text);
        assert_eq!(edu[0].description, "a b c");
    }

    #[test]
    fn test_contact_line_is_skipped() {
        let edu = extract("FORMATION\n2019 - 2022\nCONTACT\nInstitut Mines-Télécom\n");
        assert_eq!(edu[0].institution, "Institut Mines");
        assert_eq!(edu[0].degree, "Télécom");
    }
}
