//! Personal information: name, e-mail, phone, links and location.
//!
//! Runs on the whole document rather than on a section. Links, e-mail and
//! phone are searched in the flattened text; name and location need line
//! boundaries and use the raw lines.

use tracing::debug;

use crate::errors::ParserError;
use crate::models::cv::PersonalInfo;
use crate::parser::matchers::{ExcludingMatcher, FieldMatcher, MatcherChain, RegexMatcher};
use crate::parser::normalizer;

/// The name is looked for in this many leading non-blank lines.
const NAME_SCAN_LINES: usize = 5;
const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 50;

const EMAIL_PATTERN: &str = r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b";

const LOCATION_COUNTRIES: &str = "France|Vietnam|Belgique|Belgium|Suisse|Switzerland|Luxembourg|Canada|Maroc|Morocco|Tunisie|Tunisia|Alg[ée]rie|Algeria|Espagne|Spain|Allemagne|Germany|Italie|Italy";

pub struct PersonalInfoExtractor {
    email: RegexMatcher,
    phone: MatcherChain,
    linkedin: RegexMatcher,
    website: MatcherChain,
    location: MatcherChain,
}

impl PersonalInfoExtractor {
    pub fn new() -> Result<Self, ParserError> {
        let phone = MatcherChain::new(vec![
            Box::new(RegexMatcher::new(
                "phone_fr",
                r"(?:\+33|0)\s?[1-9](?:[\s.-]?\d{2}){4}",
            )?),
            Box::new(RegexMatcher::new(
                "phone_international",
                r"\+?(?:\d{1,3}[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}",
            )?),
            Box::new(RegexMatcher::new("phone_digits", r"(?:\+\d{1,3}\s?)?\d{10,}")?),
        ]);

        let website = MatcherChain::new(vec![
            Box::new(
                RegexMatcher::new("github", r"(?i)(?:https?://)?(?:www\.)?github\.com/[\w-]+/?")?
                    .normalized(with_https),
            ),
            Box::new(RegexMatcher::new(
                "deployed_site",
                r"(?i)https?://[\w.-]+\.(?:vercel\.app|onrender\.com|herokuapp\.com|netlify\.app)[\w/.-]*",
            )?),
            Box::new(ExcludingMatcher::new(
                "generic_url",
                r"(?i)(?:https?://|www\.)[\w-]+(?:\.[\w-]+)*\.[a-z]{2,}(?:/[\w./-]*)?",
                &["linkedin", "github"],
            )?),
        ]);

        let location = MatcherChain::new(vec![
            Box::new(
                RegexMatcher::new(
                    "campus",
                    r"(?i:campus)[ \t]+(\p{Lu}[\p{L}'-]*(?:[ \t]+\p{Lu}[\p{L}'-]*)*)",
                )?
                .capture(1),
            ),
            Box::new(
                RegexMatcher::new(
                    "city_country",
                    &format!(
                        r"(\p{{Lu}}\p{{Ll}}+(?:[ \t-]+\p{{Lu}}\p{{Ll}}+)*)[ \t]*,?[ \t]*\b(?:{LOCATION_COUNTRIES})\b"
                    ),
                )?
                .capture(1),
            ),
            Box::new(RegexMatcher::new("insa_city", r"\bINSA[ \t]+(\p{Lu}\p{Ll}+)")?.capture(1)),
        ]);

        Ok(Self {
            email: RegexMatcher::new("email", EMAIL_PATTERN)?,
            phone,
            linkedin: RegexMatcher::new(
                "linkedin",
                r"(?i)(?:https?://)?(?:www\.)?(?:linkedin\.com/in/|\bin/)[\w-]+/?",
            )?
            .normalized(normalize_linkedin),
            website,
            location,
        })
    }

    pub fn extract(&self, text: &str) -> PersonalInfo {
        let flat = normalizer::flatten(text);
        // Mask e-mail addresses so their domains can't pass for a website.
        let masked = self.mask_emails(&flat);

        let info = PersonalInfo {
            name: self.find_name(text),
            email: self.email.try_match(&flat),
            phone: self.phone.first_match(&flat).map(|(family, phone)| {
                debug!(family, "Phone matched");
                phone
            }),
            linkedin: self.linkedin.try_match(&flat),
            website: self.website.first_match(&masked).map(|(source, url)| {
                debug!(source, "Website matched");
                url
            }),
            location: self.location.first_match(text).map(|(template, location)| {
                debug!(template, "Location matched");
                location
            }),
        };

        debug!(
            name = info.name.is_some(),
            email = info.email.is_some(),
            phone = info.phone.is_some(),
            linkedin = info.linkedin.is_some(),
            website = info.website.is_some(),
            location = info.location.is_some(),
            "Personal info extracted"
        );
        info
    }

    /// First of the leading lines that reads like "Firstname Lastname".
    fn find_name(&self, text: &str) -> Option<String> {
        normalizer::lines(text)
            .into_iter()
            .filter(|line| !line.is_empty())
            .take(NAME_SCAN_LINES)
            .find(|line| self.looks_like_name(line))
            .map(str::to_string)
    }

    fn looks_like_name(&self, line: &str) -> bool {
        let len = line.chars().count();
        (NAME_MIN_CHARS..NAME_MAX_CHARS).contains(&len)
            && !line.chars().any(|c| c.is_ascii_digit())
            && !self.email.is_match(line)
            && !self.phone.any_match(line)
            && line.contains(' ')
    }

    fn mask_emails(&self, text: &str) -> String {
        let mut masked = text.to_string();
        while let Some(email) = self.email.try_match(&masked) {
            masked = masked.replacen(&email, " ", 1);
        }
        masked
    }
}

fn with_https(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn normalize_linkedin(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") {
        url.to_string()
    } else if url.starts_with("in/") {
        format!("https://linkedin.com/{url}")
    } else if url.starts_with("www.") {
        format!("https://{url}")
    } else {
        format!("https://www.{url}")
    }
}
