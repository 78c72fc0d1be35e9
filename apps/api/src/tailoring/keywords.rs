//! Deterministic job-keyword mining and ATS-style coverage scoring.
//!
//! No LLM call: regexes over the job description, then whole-word matching
//! against the résumé text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::resume::ResumeContent;

const MAX_KEYWORDS: usize = 15;

static SKILL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:experience with|proficiency in|knowledge of|familiar with|skilled in|expertise in|working with)\s+([^.,\n]+)",
        r"(?i)(?:required|preferred|must have|should have|need)\s+(?:skills?|experience|knowledge)?\s*:?\s*([^.,\n]+)",
        r"(?i)(?:technologies|tools|software|platforms|frameworks|languages|systems)\s*:?\s*([^.,\n]+)",
        r"(?i)[•·-]\s*([^.,\n]+?(?:experience|skills?|knowledge|proficiency))",
        r"(?i)\(([^)]+(?:experience|skills?|knowledge|API|framework|platform|software|tool))\)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static CAPITALIZED_TERM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][a-zA-Z]*(?:\.[a-zA-Z]+)*)\b").unwrap());

static SPLIT_DELIMITERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;|&/]").unwrap());

static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.-]").unwrap());

// Capitalized only because they open a sentence or a bullet.
const COMMON_WORDS: &[&str] = &[
    "The", "And", "For", "You", "We", "Our", "This", "That", "All", "New", "Will", "Can", "May",
    "Looking", "Seeking", "Join", "Must", "Should", "Are", "Is", "Who", "What", "With", "As",
    "In", "If", "To", "At", "Your", "They", "It", "Help", "Work", "Working", "Strong",
    "Ability", "About", "Responsibilities", "Requirements", "Required", "Preferred",
    "Experience", "Bonus", "Plus",
];

/// Mines up to 15 distinct, title-cased skill keywords from a job description.
pub fn extract_job_keywords(job_description: &str) -> Vec<String> {
    if job_description.trim().is_empty() {
        return Vec::new();
    }

    let mut raw: Vec<String> = Vec::new();

    for pattern in SKILL_PATTERNS.iter() {
        for captures in pattern.captures_iter(job_description) {
            if let Some(m) = captures.get(1) {
                raw.extend(
                    SPLIT_DELIMITERS
                        .split(m.as_str().trim())
                        .map(str::trim)
                        .filter(|s| s.len() > 2)
                        .map(str::to_string),
                );
            }
        }
    }

    for captures in CAPITALIZED_TERM.captures_iter(job_description) {
        let term = &captures[1];
        if term.len() > 2 && !COMMON_WORDS.contains(&term) {
            raw.push(term.to_string());
        }
    }

    let mut keywords: Vec<String> = Vec::new();
    for keyword in raw {
        let cleaned = DISALLOWED_CHARS.replace_all(&keyword, "");
        let cleaned = cleaned.trim();
        if cleaned.len() <= 2 || cleaned.len() >= 50 {
            continue;
        }
        if cleaned.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let titled = title_case(cleaned);
        if !keywords.contains(&titled) {
            keywords.push(titled);
        }
    }

    keywords.truncate(MAX_KEYWORDS);
    keywords
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// How many job keywords a résumé mentions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCoverage {
    /// 0 – 100. A job with no extractable keywords scores 100.
    pub score: u32,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

pub fn keyword_coverage(content: &ResumeContent, keywords: &[String]) -> KeywordCoverage {
    let text = content.searchable_text();
    let (matched, missing): (Vec<String>, Vec<String>) = keywords
        .iter()
        .cloned()
        .partition(|keyword| mentions(&text, keyword));

    let score = if keywords.is_empty() {
        100
    } else {
        (matched.len() * 100 / keywords.len()) as u32
    };

    KeywordCoverage {
        score,
        matched,
        missing,
    }
}

/// Whole-word, case-insensitive matcher for one keyword. Keywords ending in
/// symbols (`C++`, `C#`) are matched without the trailing word boundary.
pub fn keyword_regex(keyword: &str) -> Option<Regex> {
    let escaped = regex::escape(keyword.trim());
    if escaped.is_empty() {
        return None;
    }
    let ends_in_word_char = keyword
        .trim()
        .chars()
        .last()
        .map(|c| c.is_alphanumeric())
        .unwrap_or(false);
    let pattern = if ends_in_word_char {
        format!(r"(?i)(?:^|[^\w]){escaped}\b")
    } else {
        format!(r"(?i)(?:^|[^\w]){escaped}")
    };
    Regex::new(&pattern).ok()
}

/// True when `text` mentions `keyword` as a whole word.
pub fn mentions(text: &str, keyword: &str) -> bool {
    keyword_regex(keyword)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}
