use serde::{Deserialize, Serialize};

/// Aggregate output of one parse. Every list is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRecord {
    pub personal_info: PersonalInfo,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub languages: Vec<Language>,
}

impl CvRecord {
    /// The canonical "no data" record returned when no text could be extracted.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.personal_info.is_empty()
            && self.experiences.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.languages.is_empty()
    }
}

/// Contact details found anywhere in the document. Absent fields are omitted
/// from the JSON mapping rather than serialized as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl PersonalInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.linkedin.is_none()
            && self.website.is_none()
            && self.location.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub position: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    /// Empty means ongoing or unspecified.
    pub end_date: String,
    pub is_current_position: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub degree: String,
    pub institution: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    #[default]
    Technical,
    Soft,
    Language,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub category: SkillCategory,
    pub level: SkillLevel,
}

/// `level` is `native`, a CEFR code (`A1`..`C2`), or the verbatim text of a
/// parenthetical annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: String,
    pub name: String,
    pub level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_serializes_all_lists() {
        let json = serde_json::to_value(CvRecord::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "personalInfo": {},
                "experiences": [],
                "education": [],
                "skills": [],
                "languages": []
            })
        );
    }

    #[test]
    fn test_personal_info_omits_absent_fields() {
        let info = PersonalInfo {
            email: Some("jane.doe@example.com".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({ "email": "jane.doe@example.com" }));
    }

    #[test]
    fn test_experience_uses_camel_case_keys() {
        let exp = Experience {
            id: "exp-1".to_string(),
            position: "Stage Développeur".to_string(),
            company: "Acme".to_string(),
            location: "Lyon".to_string(),
            start_date: "2023".to_string(),
            end_date: String::new(),
            is_current_position: false,
            description: String::new(),
        };
        let json = serde_json::to_value(&exp).unwrap();
        assert_eq!(json["startDate"], "2023");
        assert_eq!(json["isCurrentPosition"], false);
        assert!(json.get("start_date").is_none());
    }

    #[test]
    fn test_skill_enums_serialize_lowercase() {
        let skill = Skill {
            id: "skill-1".to_string(),
            name: "Rust".to_string(),
            category: SkillCategory::default(),
            level: SkillLevel::default(),
        };
        let json = serde_json::to_value(&skill).unwrap();
        assert_eq!(json["category"], "technical");
        assert_eq!(json["level"], "intermediate");
    }
}
