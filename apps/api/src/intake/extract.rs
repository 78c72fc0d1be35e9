//! Heuristic résumé parse: plain-text extraction plus regexes.
//!
//! Best effort only, used by the parse endpoint where no model call is made.
//! Contact details come from pattern matches, sections from header lines, and
//! skills from a fixed keyword list.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::models::resume::{
    Certification, Education, Experience, PersonalInfo, Project, ResumeContent, Skills,
};
use crate::tailoring::keywords::keyword_regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?\(?\b([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})\b").unwrap()
});
static PHONE_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{3}[-.\s]?\d{3}[-.\s]?\d{4}").unwrap());
static LINKEDIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)linkedin\.com/(?:in|pub)/([a-zA-Z0-9-]+)").unwrap());
static WEBSITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:www\.)?[a-zA-Z0-9-]+\.(?:com|net|org|io|dev|me)\b").unwrap()
});
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Heading {
    Summary,
    Experience,
    Education,
    Projects,
    Certifications,
    Skills,
}

static HEADINGS: Lazy<Vec<(Heading, Regex)>> = Lazy::new(|| {
    [
        (Heading::Summary, r"(?i)\b(summary|objective|profile|about|overview)\b"),
        (
            Heading::Experience,
            r"(?i)\b(experience|employment|work\s+history)\b",
        ),
        (
            Heading::Education,
            r"(?i)\b(education|academic|qualifications|degrees?)\b",
        ),
        (Heading::Projects, r"(?i)\b(projects?|portfolio|work\s+samples)\b"),
        (
            Heading::Certifications,
            r"(?i)\b(certifications?|certificates?|licenses?)\b",
        ),
        (
            Heading::Skills,
            r"(?i)\b(skills|technologies|competencies|tools)\b",
        ),
    ]
    .into_iter()
    .map(|(heading, pattern)| (heading, Regex::new(pattern).unwrap()))
    .collect()
});

/// Header lines are short; anything longer is body text mentioning a keyword.
const MAX_HEADING_LEN: usize = 40;
const NAME_SEARCH_LINES: usize = 10;

const SKILL_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "technical",
        &[
            "JavaScript", "TypeScript", "Python", "Java", "C++", "C#", "PHP", "Ruby", "Go",
            "Rust", "HTML", "CSS", "SQL", "Kotlin", "Swift", "Scala",
        ],
    ),
    (
        "frameworks",
        &[
            "React", "Angular", "Vue", "Node.js", "Express", "Django", "Flask", "Spring",
            "Laravel", "Next.js", "Svelte", "FastAPI", "Tailwind", "Axum", "Tokio",
        ],
    ),
    (
        "databases",
        &[
            "MySQL", "PostgreSQL", "MongoDB", "Redis", "SQLite", "Oracle", "SQL Server",
            "DynamoDB",
        ],
    ),
    (
        "tools",
        &[
            "Git", "Docker", "Kubernetes", "Jenkins", "Jira", "Figma", "Terraform", "AWS",
            "GCP", "Azure", "Webpack", "Photoshop",
        ],
    ),
];

static SKILL_MATCHERS: Lazy<Vec<(&str, Vec<(&str, Regex)>)>> = Lazy::new(|| {
    SKILL_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let matchers = keywords
                .iter()
                .filter_map(|keyword| keyword_regex(keyword).map(|re| (*keyword, re)))
                .collect();
            (*category, matchers)
        })
        .collect()
});

/// Pulls plain text from PDF bytes. CPU-bound: call from a blocking task.
pub fn extract_text(pdf: &[u8]) -> anyhow::Result<String> {
    pdf_extract::extract_text_from_mem(pdf)
        .map_err(|e| anyhow::anyhow!("Failed to extract text from PDF: {e}"))
}

/// Builds best-effort structured content from résumé plain text.
pub fn parse_resume_text(text: &str) -> ResumeContent {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut content = ResumeContent {
        personal_info: Some(extract_personal_info(text, &lines)),
        ..Default::default()
    };

    for (heading, body) in split_sections(&lines) {
        match heading {
            Heading::Summary => content.professional_summary = Some(body.join(" ")),
            Heading::Experience => content.experience = Some(parse_experience(&body)),
            Heading::Education => content.education = Some(parse_education(&body)),
            Heading::Projects => content.projects = Some(parse_projects(&body)),
            Heading::Certifications => content.certifications = Some(parse_certifications(&body)),
            // Skills come from the keyword scan over the whole text below.
            Heading::Skills => {}
        }
    }

    let skills = extract_skills(text);
    if !skills.0.is_empty() {
        content.skills = Some(skills);
    }

    content
}

fn extract_personal_info(text: &str, lines: &[&str]) -> PersonalInfo {
    let mut info = PersonalInfo::default();

    if let Some(m) = EMAIL.find(text) {
        info.email = m.as_str().to_string();
    }
    if let Some(m) = PHONE.find(text) {
        info.phone = m.as_str().trim().to_string();
    }
    if let Some(captures) = LINKEDIN.captures(text) {
        info.linkedin = Some(format!("https://linkedin.com/in/{}", &captures[1]));
    }
    info.website = WEBSITE
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|site| {
            let lower = site.to_lowercase();
            !lower.contains("linkedin")
                && !lower.contains("github")
                && !text_is_email_domain(text, site)
        })
        .map(|site| {
            if site.to_lowercase().starts_with("http") {
                site.to_string()
            } else {
                format!("https://{site}")
            }
        });

    info.name = lines
        .iter()
        .take(NAME_SEARCH_LINES)
        .find(|line| looks_like_name(line))
        .map(|line| line.to_string())
        .unwrap_or_default();

    info
}

/// True when `site` only occurs as the domain part of an email address.
fn text_is_email_domain(text: &str, site: &str) -> bool {
    EMAIL
        .find_iter(text)
        .any(|m| m.as_str().ends_with(site))
}

fn looks_like_name(line: &str) -> bool {
    let lower = line.to_lowercase();
    !line.contains('@')
        && !PHONE_LIKE.is_match(line)
        && line.len() > 2
        && line.len() < 50
        && !lower.contains("resume")
        && !lower.contains("curriculum vitae")
        && lower != "cv"
}

fn heading_of(line: &str) -> Option<Heading> {
    if line.len() >= MAX_HEADING_LEN {
        return None;
    }
    HEADINGS
        .iter()
        .find(|(_, regex)| regex.is_match(line))
        .map(|(heading, _)| *heading)
}

fn split_sections<'a>(lines: &[&'a str]) -> Vec<(Heading, Vec<&'a str>)> {
    let mut sections: Vec<(Heading, Vec<&'a str>)> = Vec::new();
    for &line in lines {
        match heading_of(line) {
            Some(heading) => sections.push((heading, Vec::new())),
            None => {
                if let Some((_, body)) = sections.last_mut() {
                    body.push(line);
                }
            }
        }
    }
    sections.retain(|(_, body)| !body.is_empty());
    sections
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['•', '-', '*', '·', '▪', '◦'])
        .trim()
}

fn is_bullet(line: &str) -> bool {
    line.starts_with(['•', '-', '*', '·', '▪', '◦'])
}

fn is_date_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    YEAR.is_match(line)
        && (line.contains('-')
            || line.contains('–')
            || lower.contains(" to ")
            || lower.contains("present"))
}

/// An entry starts at a date line; the non-bullet line before it, if any, is
/// taken as "title, company" or "title at company".
fn parse_experience(body: &[&str]) -> Vec<Experience> {
    let mut entries: Vec<Experience> = Vec::new();
    let mut pending_heading: Option<&str> = None;

    for &line in body {
        if is_date_line(line) && !is_bullet(line) {
            let (title, company) = pending_heading
                .take()
                .map(split_title_company)
                .unwrap_or_default();
            entries.push(Experience {
                title,
                company,
                duration: line.to_string(),
                ..Default::default()
            });
        } else if is_bullet(line) || entries.is_empty() {
            match entries.last_mut() {
                Some(entry) if is_bullet(line) => {
                    entry.description.push(strip_bullet(line).to_string())
                }
                _ => pending_heading = Some(line),
            }
        } else if pending_heading.is_none() && !entries.is_empty() {
            // A plain line after an entry is either the next heading or a wrapped bullet.
            pending_heading = Some(line);
        } else if let Some(previous) = pending_heading.replace(line) {
            if let Some(entry) = entries.last_mut() {
                entry.description.push(previous.to_string());
            }
        }
    }

    if let (Some(line), Some(entry)) = (pending_heading, entries.last_mut()) {
        entry.description.push(line.to_string());
    }

    entries
}

fn split_title_company(line: &str) -> (String, String) {
    for separator in [" at ", ", ", " | ", " - ", " – "] {
        if let Some((title, company)) = line.split_once(separator) {
            return (title.trim().to_string(), company.trim().to_string());
        }
    }
    (line.trim().to_string(), String::new())
}

fn parse_education(body: &[&str]) -> Vec<Education> {
    let year = body
        .iter()
        .find_map(|line| YEAR.find(line))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let mut text_lines = body.iter().filter(|line| !YEAR.is_match(line) || line.len() > 12);

    vec![Education {
        degree: text_lines.next().map(|s| s.to_string()).unwrap_or_default(),
        institution: text_lines.next().map(|s| s.to_string()).unwrap_or_default(),
        year,
        ..Default::default()
    }]
}

fn parse_projects(body: &[&str]) -> Vec<Project> {
    let mut projects: Vec<Project> = Vec::new();
    for line in body {
        match projects.last_mut() {
            Some(project) if is_bullet(line) => {
                let text = strip_bullet(line);
                if project.description.is_empty() {
                    project.description = text.to_string();
                } else {
                    project.achievements.push(text.to_string());
                }
            }
            _ => projects.push(Project {
                name: strip_bullet(line).to_string(),
                ..Default::default()
            }),
        }
    }
    projects
}

fn parse_certifications(body: &[&str]) -> Vec<Certification> {
    body.iter()
        .map(|line| {
            let line = strip_bullet(line);
            let date = YEAR
                .find(line)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            Certification {
                name: line.to_string(),
                date,
                ..Default::default()
            }
        })
        .collect()
}

fn extract_skills(text: &str) -> Skills {
    let mut categories = BTreeMap::new();
    for (category, keywords) in SKILL_MATCHERS.iter() {
        let found: Vec<String> = keywords
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(keyword, _)| keyword.to_string())
            .collect();
        if !found.is_empty() {
            categories.insert(category.to_string(), found);
        }
    }
    Skills(categories)
}
