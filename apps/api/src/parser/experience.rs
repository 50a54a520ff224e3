//! Work experience and personal projects.
//!
//! A line-oriented state machine: headings move it between `Outside`,
//! `Experience` and `Projects`. Inside either section every plausible title
//! line is checked with a bounded lookahead for a year; a title with no year in
//! reach is not an entry.

use regex::Regex;
use tracing::debug;

use crate::errors::ParserError;
use crate::models::cv::Experience;
use crate::parser::headings::{Heading, Headings};
use crate::parser::locator::SectionKind;
use crate::parser::normalizer::{has_dash, is_numeric, split_dash};
use crate::parser::{compile, IdSequence, SectionEntry, SectionExtractor};

/// Raw lines after a title searched for the year, company and location.
const LOOKAHEAD_LINES: usize = 7;
/// Raw lines after a "projet" line searched when the main window has no year.
const PROJECT_LOOKAHEAD_LINES: usize = 7;
/// Raw lines after a title searched for description sub-labels.
const DESCRIPTION_LINES: usize = 8;
const MIN_TITLE_CHARS: usize = 6;
const DEFAULT_COMPANY: &str = "Projet personnel";

const YEAR_PATTERN: &str = r"\b((?:19|20)\d{2})\b";
const SUB_LABEL_PATTERN: &str = r"(?i)^(?:Fonctionnalit[ée]s|Features|Technologies|Tech\s+stack|Stack|Comp[ée]tences|D[ée]ploiement|Deployment|CERTIFICATS)\s*(?::|$)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceState {
    Outside,
    Experience,
    Projects,
}

impl ExperienceState {
    /// Any heading other than experience/projects closes the section.
    pub fn on_heading(self, heading: Heading) -> Self {
        match heading {
            Heading::Experience => ExperienceState::Experience,
            Heading::Projects => ExperienceState::Projects,
            _ => ExperienceState::Outside,
        }
    }

    pub fn is_active(self) -> bool {
        self != ExperienceState::Outside
    }
}

/// Where an entry's header block was found in the document.
struct EntryAnchor {
    year: String,
    year_line: usize,
}

pub struct ExperienceExtractor {
    headings: Headings,
    year: Regex,
    sub_label: Regex,
}

impl ExperienceExtractor {
    pub fn new(headings: Headings) -> Result<Self, ParserError> {
        Ok(Self {
            headings,
            year: compile("year", YEAR_PATTERN)?,
            sub_label: compile("sub_label", SUB_LABEL_PATTERN)?,
        })
    }

    fn is_candidate_title(&self, line: &str) -> bool {
        !line.is_empty()
            && !is_numeric(line)
            && line.chars().count() >= MIN_TITLE_CHARS
            && !self.sub_label.is_match(line)
    }

    /// Non-blank lines in `lines[from..from + len]`, cut at the first heading.
    fn window<'a>(&self, lines: &[&'a str], from: usize, len: usize) -> Vec<(usize, &'a str)> {
        let end = (from + len).min(lines.len());
        let start = from.min(end);
        lines[start..end]
            .iter()
            .enumerate()
            .map(|(offset, line)| (start + offset, *line))
            .take_while(|(_, line)| !self.headings.is_heading(line))
            .filter(|(_, line)| !line.is_empty())
            .collect()
    }

    fn find_year(&self, window: &[(usize, &str)]) -> Option<EntryAnchor> {
        window.iter().find_map(|(idx, line)| {
            self.year.captures(line).map(|caps| EntryAnchor {
                year: caps[1].to_string(),
                year_line: *idx,
            })
        })
    }

    /// Year for the title at `title_idx`: directly in its window, or after a
    /// "projet" line of that window.
    fn find_anchor<'a>(
        &self,
        lines: &[&'a str],
        title_idx: usize,
    ) -> Option<(EntryAnchor, Vec<(usize, &'a str)>)> {
        let window = self.window(lines, title_idx + 1, LOOKAHEAD_LINES);
        if let Some(anchor) = self.find_year(&window) {
            return Some((anchor, window));
        }
        let (project_idx, _) = window.iter().find(|(_, line)| mentions_project(line))?;
        let extended = self.window(lines, project_idx + 1, PROJECT_LOOKAHEAD_LINES);
        self.find_year(&extended).map(|anchor| (anchor, window))
    }

    fn description(&self, lines: &[&str], title_idx: usize) -> String {
        self.window(lines, title_idx + 1, DESCRIPTION_LINES)
            .into_iter()
            .map(|(_, line)| line)
            .filter(|line| self.sub_label.is_match(line))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SectionExtractor for ExperienceExtractor {
    type Record = Experience;
    const KIND: SectionKind = SectionKind::Experience;

    fn detects_header(&self, lines: &[&str]) -> bool {
        lines.iter().any(|line| {
            matches!(
                self.headings.classify(line),
                Some(Heading::Experience | Heading::Projects)
            )
        })
    }

    fn extract(&self, lines: &[&str], entry: SectionEntry) -> Vec<Experience> {
        let mut state = match entry {
            SectionEntry::Scan => ExperienceState::Outside,
            SectionEntry::Open => ExperienceState::Experience,
        };
        let mut ids = IdSequence::new("exp");
        let mut experiences = Vec::new();
        // Lines up to here belong to the header block of an accepted entry.
        let mut consumed_until = 0;

        for (i, line) in lines.iter().enumerate() {
            if let Some(heading) = self.headings.classify(line) {
                state = state.on_heading(heading);
                continue;
            }
            if !state.is_active() || i < consumed_until || !self.is_candidate_title(line) {
                continue;
            }

            let Some((anchor, window)) = self.find_anchor(lines, i) else {
                continue;
            };

            let (company, location) = window
                .iter()
                .map(|(_, l)| *l)
                .find(|l| has_dash(l) || mentions_project(l))
                .map(|l| match split_dash(l) {
                    Some((left, right)) => (left.to_string(), right.to_string()),
                    None => (l.to_string(), String::new()),
                })
                .unwrap_or_default();
            let company = if company.is_empty() {
                DEFAULT_COMPANY.to_string()
            } else {
                company
            };

            debug!(position = %line, company = %company, year = %anchor.year, "Experience found");
            experiences.push(Experience {
                id: ids.next_id(),
                position: line.to_string(),
                company,
                location,
                start_date: anchor.year,
                end_date: String::new(),
                is_current_position: false,
                description: self.description(lines, i),
            });
            consumed_until = anchor.year_line.max(i) + 1;
        }

        debug!(count = experiences.len(), "Experiences extracted");
        experiences
    }
}

fn mentions_project(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("projet") || lower.contains("project")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalizer::lines;

    fn extractor() -> ExperienceExtractor {
        ExperienceExtractor::new(Headings::new().unwrap()).unwrap()
    }

    fn extract(text: &str) -> Vec<Experience> {
        extractor().extract(&lines(text), SectionEntry::Scan)
    }

    const CV: &str = "Jean Dupont\n\
        EXPÉRIENCES\n\
        Développeur Full Stack\n\
        Airbus - Toulouse\n\
        2023\n\
        Technologies: React, Node\n\
        Fonctionnalités: tableau de bord\n\
        PROJETS PERSONNELS\n\
        Application de gestion de budget\n\
        Projet académique\n\
        2022\n\
        Déploiement: Vercel\n\
        FORMATION\n\
        Master Informatique\n\
        2021\n";

    #[test]
    fn test_entries_in_document_order() {
        let exps = extract(CV);
        assert_eq!(exps.len(), 2, "{exps:#?}");

        assert_eq!(exps[0].id, "exp-1");
        assert_eq!(exps[0].position, "Développeur Full Stack");
        assert_eq!(exps[0].company, "Airbus");
        assert_eq!(exps[0].location, "Toulouse");
        assert_eq!(exps[0].start_date, "2023");
        assert_eq!(
            exps[0].description,
            "Technologies: React, Node Fonctionnalités: tableau de bord"
        );

        assert_eq!(exps[1].id, "exp-2");
        assert_eq!(exps[1].position, "Application de gestion de budget");
        assert_eq!(exps[1].company, "Projet académique");
        assert_eq!(exps[1].location, "");
        assert_eq!(exps[1].start_date, "2022");
        assert_eq!(exps[1].description, "Déploiement: Vercel");
    }

    #[test]
    fn test_formation_heading_closes_the_section() {
        let exps = extract(CV);
        assert!(exps.iter().all(|e| e.position != "Master Informatique"));
    }

    #[test]
    fn test_end_date_is_never_detected() {
        let exps = extract("EXPÉRIENCE\nIngénieur logiciel\nAcme - Lyon\n2020 - présent\n");
        assert_eq!(exps.len(), 1);
        assert_eq!(exps[0].start_date, "2020");
        assert_eq!(exps[0].end_date, "");
        assert!(!exps[0].is_current_position);
    }

    #[test]
    fn test_title_without_year_is_discarded() {
        assert!(extract("EXPÉRIENCE\nIngénieur logiciel\nAcme - Lyon\n").is_empty());
    }

    #[test]
    fn test_year_beyond_window_is_not_used() {
        let text = "EXPÉRIENCE\nIngénieur logiciel\na1\na2\na3\na4\na5\na6\na7\n2020\n";
        assert!(extract(text).is_empty());
    }

    #[test]
    fn test_project_line_extends_the_lookahead() {
        let text = "PROJETS PERSONNELS\n\
            Plateforme de réservation\n\
            Projet de fin d'études\n\
            l1\nl2\nl3\nl4\nl5\nl6\n\
            2021\n";
        let exps = extract(text);
        assert_eq!(exps.len(), 1);
        assert_eq!(exps[0].start_date, "2021");
        assert_eq!(exps[0].company, "Projet de fin d'études");
    }

    #[test]
    fn test_missing_company_defaults() {
        let exps = extract("EXPÉRIENCE\nIngénieur logiciel\n2019\n");
        assert_eq!(exps.len(), 1);
        assert_eq!(exps[0].company, "Projet personnel");
    }

    #[test]
    fn test_no_heading_means_no_entries() {
        assert!(extract("Ingénieur logiciel\nAcme - Lyon\n2020\n").is_empty());
    }

    #[test]
    fn test_open_entry_starts_inside_the_section() {
        let exps = extractor().extract(
            &lines("Ingénieur logiciel\nAcme - Lyon\n2020\n"),
            SectionEntry::Open,
        );
        assert_eq!(exps.len(), 1);
        assert_eq!(exps[0].company, "Acme");
    }

    #[test]
    fn test_short_and_numeric_lines_are_not_titles() {
        let exps = extract("EXPÉRIENCE\nStage\n12345678\n2020\n");
        assert!(exps.is_empty());
    }

    #[test]
    fn test_titles_starting_with_a_label_word() {
        let exps = extract(
            "PROJETS PERSONNELS\n\
             Stack Overflow clone\n\
             Projet académique\n\
             2021\n\
             EXPÉRIENCE\n\
             Deployment engineer\n\
             OVH - Roubaix\n\
             2019\n",
        );
        let positions: Vec<_> = exps.iter().map(|e| e.position.as_str()).collect();
        assert_eq!(positions, vec!["Stack Overflow clone", "Deployment engineer"]);
        assert_eq!(exps[1].company, "OVH");
        assert_eq!(exps[0].description, "");
    }

    #[test]
    fn test_bare_projects_heading_closes_the_section() {
        let exps = extract("EXPÉRIENCE\nIngénieur logiciel\nPROJETS\nApplication de budget\nProjet académique\n2022\n");
        assert!(exps.is_empty(), "{exps:#?}");
    }

    #[test]
    fn test_state_transitions() {
        let s = ExperienceState::Outside;
        assert_eq!(s.on_heading(Heading::Experience), ExperienceState::Experience);
        assert_eq!(s.on_heading(Heading::Projects), ExperienceState::Projects);
        assert_eq!(
            ExperienceState::Projects.on_heading(Heading::Languages),
            ExperienceState::Outside
        );
        assert!(!ExperienceState::Outside.is_active());
    }
}
