//! The closed résumé-section vocabulary and the per-document `SectionSet`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A résumé section, serialized as its camelCase token (`personalInfo`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    PersonalInfo,
    ProfessionalSummary,
    Education,
    Experience,
    Projects,
    Skills,
    Achievements,
    Certifications,
}

impl Section {
    /// Canonical render order.
    pub const ALL: [Section; 8] = [
        Section::PersonalInfo,
        Section::ProfessionalSummary,
        Section::Education,
        Section::Experience,
        Section::Projects,
        Section::Skills,
        Section::Achievements,
        Section::Certifications,
    ];

    /// The JSON key used for this section in `ResumeContent`.
    pub fn key(self) -> &'static str {
        match self {
            Section::PersonalInfo => "personalInfo",
            Section::ProfessionalSummary => "professionalSummary",
            Section::Education => "education",
            Section::Experience => "experience",
            Section::Projects => "projects",
            Section::Skills => "skills",
            Section::Achievements => "achievements",
            Section::Certifications => "certifications",
        }
    }

    /// Human-readable heading used by the PDF renderer.
    pub fn title(self) -> &'static str {
        match self {
            Section::PersonalInfo => "Personal Information",
            Section::ProfessionalSummary => "Professional Summary",
            Section::Education => "Education",
            Section::Experience => "Experience",
            Section::Projects => "Projects",
            Section::Skills => "Skills",
            Section::Achievements => "Achievements",
            Section::Certifications => "Certifications",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSection(pub String);

impl fmt::Display for UnknownSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown resume section '{}'", self.0)
    }
}

impl std::error::Error for UnknownSection {}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.key() == s.trim())
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

/// The sections detected in one source document.
///
/// Built once per document and never mutated afterwards: there is no insert or
/// remove API. Iteration follows first-seen discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Section>", from = "Vec<Section>")]
pub struct SectionSet {
    sections: Vec<Section>,
}

impl SectionSet {
    /// Builds a set from raw model tokens. Unknown tokens are dropped and
    /// duplicates collapse onto their first occurrence.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sections = tokens.into_iter().filter_map(|token| {
            let token = token.as_ref();
            match token.parse::<Section>() {
                Ok(section) => Some(section),
                Err(e) => {
                    warn!("Ignoring section token outside the vocabulary: {e}");
                    None
                }
            }
        });
        Self::from_sections(sections)
    }

    pub fn from_sections<I: IntoIterator<Item = Section>>(sections: I) -> Self {
        let mut ordered: Vec<Section> = Vec::new();
        for section in sections {
            if !ordered.contains(&section) {
                ordered.push(section);
            }
        }
        Self { sections: ordered }
    }

    pub fn contains(&self, section: Section) -> bool {
        self.sections.contains(&section)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        key.parse::<Section>()
            .map(|section| self.contains(section))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = Section> + '_ {
        self.sections.iter().copied()
    }

    pub fn keys(&self) -> Vec<String> {
        self.iter().map(|s| s.key().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl From<Vec<Section>> for SectionSet {
    fn from(sections: Vec<Section>) -> Self {
        Self::from_sections(sections)
    }
}

impl From<SectionSet> for Vec<Section> {
    fn from(set: SectionSet) -> Self {
        set.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_tokens_round_trip_through_from_str() {
        for section in Section::ALL {
            assert_eq!(section.key().parse::<Section>().unwrap(), section);
        }
    }

    #[test]
    fn test_serde_uses_camel_case_tokens() {
        let json = serde_json::to_string(&Section::ProfessionalSummary).unwrap();
        assert_eq!(json, "\"professionalSummary\"");
        let parsed: Section = serde_json::from_str("\"personalInfo\"").unwrap();
        assert_eq!(parsed, Section::PersonalInfo);
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        assert!("coursework".parse::<Section>().is_err());
        assert!("PersonalInfo".parse::<Section>().is_err());
    }

    #[test]
    fn test_from_tokens_drops_unknown_and_duplicates() {
        let set = SectionSet::from_tokens(["skills", "links", "personalInfo", "skills"]);
        assert_eq!(set.keys(), vec!["skills", "personalInfo"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_from_tokens_keeps_discovery_order() {
        let set = SectionSet::from_tokens(["experience", "personalInfo", "education"]);
        let order: Vec<Section> = set.iter().collect();
        assert_eq!(
            order,
            vec![Section::Experience, Section::PersonalInfo, Section::Education]
        );
    }

    #[test]
    fn test_contains_key_handles_unknown_keys() {
        let set = SectionSet::from_tokens(["personalInfo"]);
        assert!(set.contains_key("personalInfo"));
        assert!(!set.contains_key("skills"));
        assert!(!set.contains_key("links"));
    }

    #[test]
    fn test_section_set_serializes_as_token_list() {
        let set = SectionSet::from_tokens(["personalInfo", "skills"]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, serde_json::json!(["personalInfo", "skills"]));
    }
}
