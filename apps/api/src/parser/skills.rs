//! Technical skills from a closed technology vocabulary.

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use crate::errors::ParserError;
use crate::models::cv::{Skill, SkillCategory, SkillLevel};
use crate::parser::headings::{Heading, Headings};
use crate::parser::locator::SectionKind;
use crate::parser::normalizer::title_case;
use crate::parser::{compile, IdSequence, SectionEntry, SectionExtractor};

/// Lowercase technology names recognised as skills.
const TECH_VOCABULARY: &[&str] = &[
    "java", "python", "javascript", "typescript", "dart", "sql", "html", "css", "c", "php",
    "ruby", "go", "rust", "kotlin", "swift", "react", "angular", "vue", "next", "flutter",
    "spring", "hibernate", "django", "flask", "docker", "kubernetes", "git", "jenkins",
    "supabase", "firebase", "apache", "camel", "bootstrap", "node", "express", "mongodb",
    "postgresql", "mysql", "redis", "nosql", "graphql", "tailwindcss", "prisma", "stripe",
    "aws", "azure", "linux",
];

/// A tech-stack listing line ("Langages : Java, Python", "Languages used: Rust").
/// "Languages: English" is a languages heading and is never read as one.
const STACK_LINE_PATTERN: &str = r"(?i)\b(?:langages?|languages?(?:\s+used)?)\s*:";
const STACK_HEADER_PATTERN: &str = r"(?i)^(?:langages?|languages?(?:\s+used)?)\s*:";
const WORD_PATTERN: &str = r"\w+";

pub struct SkillsExtractor {
    headings: Headings,
    stack_line: Regex,
    stack_header: Regex,
    word: Regex,
    vocabulary: HashSet<&'static str>,
}

impl SkillsExtractor {
    pub fn new(headings: Headings) -> Result<Self, ParserError> {
        Ok(Self {
            headings,
            stack_line: compile("stack_line", STACK_LINE_PATTERN)?,
            stack_header: compile("stack_header", STACK_HEADER_PATTERN)?,
            word: compile("word", WORD_PATTERN)?,
            vocabulary: TECH_VOCABULARY.iter().copied().collect(),
        })
    }

    fn opens_section(&self, line: &str) -> bool {
        match self.headings.classify(line) {
            Some(heading) => heading == Heading::TechnicalSkills,
            None => self.stack_header.is_match(line),
        }
    }

    fn collect_line(
        &self,
        line: &str,
        seen: &mut HashSet<String>,
        ids: &mut IdSequence,
        skills: &mut Vec<Skill>,
    ) {
        let lower = line.to_lowercase();
        for word in self.word.find_iter(&lower).map(|m| m.as_str()) {
            if self.vocabulary.contains(word) && seen.insert(word.to_string()) {
                skills.push(Skill {
                    id: ids.next_id(),
                    name: title_case(word),
                    category: SkillCategory::Technical,
                    level: SkillLevel::Intermediate,
                });
            }
        }
    }
}

impl SectionExtractor for SkillsExtractor {
    type Record = Skill;
    const KIND: SectionKind = SectionKind::Skills;

    fn detects_header(&self, lines: &[&str]) -> bool {
        lines.iter().any(|line| self.opens_section(line))
    }

    fn extract(&self, lines: &[&str], entry: SectionEntry) -> Vec<Skill> {
        let mut inside = entry == SectionEntry::Open;
        let mut ids = IdSequence::new("skill");
        let mut seen = HashSet::new();
        let mut skills = Vec::new();

        for line in lines.iter().filter(|line| !line.is_empty()) {
            if self.opens_section(line) {
                inside = true;
            } else if let Some(heading) = self.headings.classify(line) {
                // Sub-headings such as a bare "COMPÉTENCES" keep the section open.
                inside = inside && heading == Heading::Skills;
                continue;
            }

            if inside || self.stack_line.is_match(line) {
                self.collect_line(line, &mut seen, &mut ids, &mut skills);
            }
        }

        debug!(count = skills.len(), "Skills extracted");
        skills
    }
}
