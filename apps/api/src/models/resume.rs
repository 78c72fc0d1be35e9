use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::lenient;
use crate::models::section::Section;

/// Contact block at the top of every résumé.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub linkedin: Option<String>,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub github: Option<String>,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub website: Option<String>,
}

/// Skill lists keyed by category (`technical`, `tools`, `soft`, ...).
///
/// Accepts either a category map or a flat list, which lands in `technical`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Skills(pub BTreeMap<String, Vec<String>>);

/// Categories rendered first, in this order; any others follow alphabetically.
const PREFERRED_SKILL_CATEGORIES: &[&str] = &[
    "technical",
    "frameworks",
    "tools",
    "databases",
    "languages",
    "soft",
];

impl Skills {
    /// Categories in display order, skipping empty ones.
    pub fn ordered_categories(&self) -> Vec<(&str, &[String])> {
        let mut ordered: Vec<(&str, &[String])> = PREFERRED_SKILL_CATEGORIES
            .iter()
            .filter_map(|cat| self.0.get_key_value(*cat))
            .map(|(k, v)| (k.as_str(), v.as_slice()))
            .collect();
        for (category, items) in &self.0 {
            if !PREFERRED_SKILL_CATEGORIES.contains(&category.as_str()) {
                ordered.push((category.as_str(), items.as_slice()));
            }
        }
        ordered.retain(|(_, items)| !items.is_empty());
        ordered
    }

    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.0.values().flatten()
    }
}

impl<'de> Deserialize<'de> for Skills {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut categories = BTreeMap::new();
        match Value::deserialize(deserializer)? {
            Value::Object(map) => {
                for (category, items) in map {
                    categories.insert(category, lenient::value_to_list(items));
                }
            }
            Value::Null => {}
            other => {
                categories.insert("technical".to_string(), lenient::value_to_list(other));
            }
        }
        Ok(Skills(categories))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::text")]
    pub company: String,
    #[serde(deserialize_with = "lenient::text")]
    pub duration: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub description: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub technologies: Vec<String>,
    #[serde(
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub technologies: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub achievements: Vec<String>,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    #[serde(deserialize_with = "lenient::text")]
    pub degree: String,
    #[serde(deserialize_with = "lenient::text")]
    pub institution: String,
    #[serde(deserialize_with = "lenient::text")]
    pub year: String,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub gpa: Option<String>,
    #[serde(
        deserialize_with = "lenient::string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub relevant_courses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub issuer: String,
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<String>,
}

/// Structured résumé content.
///
/// Every section is optional so a validated value carries exactly the
/// sections of the document it came from. JSON keys are the section tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub professional_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<Experience>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Skills>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<Certification>>,
}

impl ResumeContent {
    /// Returns true when `personalInfo.name` is present and non-blank.
    pub fn has_valid_name(&self) -> bool {
        self.personal_info
            .as_ref()
            .map(|p| !p.name.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn has_section(&self, section: Section) -> bool {
        match section {
            Section::PersonalInfo => self.personal_info.is_some(),
            Section::ProfessionalSummary => self.professional_summary.is_some(),
            Section::Education => self.education.is_some(),
            Section::Experience => self.experience.is_some(),
            Section::Projects => self.projects.is_some(),
            Section::Skills => self.skills.is_some(),
            Section::Achievements => self.achievements.is_some(),
            Section::Certifications => self.certifications.is_some(),
        }
    }

    /// Sections carried by this value, in canonical order.
    pub fn present_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.has_section(*s))
            .collect()
    }

    /// Lowercased plain text of every field, for keyword matching.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(summary) = &self.professional_summary {
            parts.push(summary);
        }
        if let Some(skills) = &self.skills {
            parts.extend(skills.all().map(String::as_str));
        }
        for exp in self.experience.iter().flatten() {
            parts.push(&exp.title);
            parts.extend(exp.description.iter().map(String::as_str));
            parts.extend(exp.technologies.iter().map(String::as_str));
            parts.extend(exp.achievements.iter().map(String::as_str));
        }
        for project in self.projects.iter().flatten() {
            parts.push(&project.name);
            parts.push(&project.description);
            parts.extend(project.technologies.iter().map(String::as_str));
            parts.extend(project.achievements.iter().map(String::as_str));
        }
        for edu in self.education.iter().flatten() {
            parts.push(&edu.degree);
            parts.extend(edu.relevant_courses.iter().map(String::as_str));
        }
        parts.extend(self.achievements.iter().flatten().map(String::as_str));
        for cert in self.certifications.iter().flatten() {
            parts.push(&cert.name);
        }
        parts.join("\n").to_lowercase()
    }

    /// Fixed sample résumé used when an export request carries no content.
    pub fn placeholder() -> Self {
        let skills = BTreeMap::from([
            (
                "technical".to_string(),
                strings(&["JavaScript", "TypeScript", "React", "Node.js", "Python"]),
            ),
            (
                "tools".to_string(),
                strings(&["Git", "Docker", "AWS", "MongoDB"]),
            ),
            ("languages".to_string(), strings(&["English", "Spanish"])),
        ]);

        ResumeContent {
            personal_info: Some(PersonalInfo {
                name: "John Doe".to_string(),
                email: "john.doe@example.com".to_string(),
                phone: "+1 (555) 123-4567".to_string(),
                location: "New York, NY".to_string(),
                linkedin: Some("linkedin.com/in/johndoe".to_string()),
                github: Some("github.com/johndoe".to_string()),
                website: None,
            }),
            professional_summary: None,
            education: Some(vec![Education {
                degree: "Bachelor of Computer Science".to_string(),
                institution: "University of Technology".to_string(),
                year: "2020".to_string(),
                gpa: Some("3.8".to_string()),
                relevant_courses: vec![],
            }]),
            experience: Some(vec![
                Experience {
                    title: "Senior Software Developer".to_string(),
                    company: "Tech Solutions Inc.".to_string(),
                    duration: "2022 - Present".to_string(),
                    description: strings(&[
                        "Led development of scalable web applications serving 100K+ users",
                        "Implemented CI/CD pipelines reducing deployment time by 60%",
                        "Mentored junior developers and conducted code reviews",
                    ]),
                    technologies: strings(&["React", "Node.js", "AWS", "MongoDB"]),
                    achievements: vec![],
                },
                Experience {
                    title: "Software Developer".to_string(),
                    company: "StartupCorp".to_string(),
                    duration: "2020 - 2022".to_string(),
                    description: strings(&[
                        "Built responsive web applications using modern JavaScript frameworks",
                        "Collaborated with cross-functional teams to deliver features on time",
                    ]),
                    technologies: strings(&["JavaScript", "React", "PostgreSQL"]),
                    achievements: vec![],
                },
            ]),
            projects: Some(vec![Project {
                name: "E-commerce Platform".to_string(),
                description: "Full-stack e-commerce application with payment integration"
                    .to_string(),
                technologies: strings(&["React", "Node.js", "MongoDB", "Stripe API"]),
                achievements: strings(&[
                    "Implemented secure payment processing with Stripe",
                    "Built admin dashboard for inventory management",
                ]),
                url: None,
                github: None,
            }]),
            skills: Some(Skills(skills)),
            achievements: None,
            certifications: None,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
