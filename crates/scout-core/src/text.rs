//! Keyword heuristics shared by adapters and the synthetic tiers.

use crate::models::{EmploymentType, RemoteType};

/// Technical skills recognised in free-text job descriptions.
const SKILL_VOCABULARY: &[&str] = &[
    "Python",
    "JavaScript",
    "TypeScript",
    "Java",
    "React",
    "Node.js",
    "SQL",
    "AWS",
    "Docker",
    "Kubernetes",
    "Git",
    "Agile",
    "Scrum",
    "REST API",
    "Machine Learning",
    "Data Analysis",
    "Cloud Computing",
    "Angular",
    "Vue.js",
    "MongoDB",
    "PostgreSQL",
    "Redis",
    "GraphQL",
    "Microservices",
    "DevOps",
    "CI/CD",
    "Jenkins",
    "Terraform",
    "HTML",
    "CSS",
    "C++",
    "C#",
    ".NET",
    "PHP",
    "Ruby",
    "Rust",
    "Swift",
];

const MAX_EXTRACTED_SKILLS: usize = 8;

/// Pick out known skills mentioned in `text`, in vocabulary order.
pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| contains_term(&lower, &skill.to_lowercase()))
        .take(MAX_EXTRACTED_SKILLS)
        .map(|skill| (*skill).to_string())
        .collect()
}

/// Skills typical for a search phrase. Never empty.
pub fn skills_for_keywords(keywords: &str) -> Vec<String> {
    let lower = keywords.to_lowercase();
    let families: &[(&str, &[&str])] = &[
        ("software", &["Python", "JavaScript", "React", "SQL", "Git"]),
        ("data", &["Python", "SQL", "Machine Learning", "Data Analysis", "Tableau"]),
        ("web", &["JavaScript", "React", "HTML", "CSS", "Node.js"]),
        ("mobile", &["Swift", "Kotlin", "React Native", "iOS", "Android"]),
        ("devops", &["Docker", "Kubernetes", "AWS", "CI/CD", "Terraform"]),
        ("ai", &["Python", "Machine Learning", "TensorFlow", "PyTorch", "Data Science"]),
        ("cloud", &["AWS", "Azure", "Docker", "Kubernetes", "Terraform"]),
    ];

    let skills: &[&str] = families
        .iter()
        .find(|(family, _)| contains_term(&lower, family))
        .map(|(_, skills)| *skills)
        .unwrap_or(&["Problem Solving", "Team Collaboration", "Communication", "Agile"]);
    skills.iter().map(|s| (*s).to_string()).collect()
}

/// Guess the employment type from the posting title and description.
pub fn detect_employment_type(title: &str, description: &str) -> EmploymentType {
    let text = format!("{title} {description}").to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if any(&["intern", "co-op", "co op"]) {
        EmploymentType::Internship
    } else if any(&["contract", "freelance", "consultant"]) {
        EmploymentType::Contract
    } else if any(&["temporary", "seasonal"]) {
        EmploymentType::Temporary
    } else if any(&["part-time", "part time", "parttime"]) {
        EmploymentType::PartTime
    } else {
        EmploymentType::FullTime
    }
}

/// Guess the remote arrangement from description and location text.
pub fn detect_remote_type(description: &str, location: &str) -> Option<RemoteType> {
    let text = format!("{description} {location}").to_lowercase();
    if text.contains("hybrid") {
        Some(RemoteType::Hybrid)
    } else if ["remote", "work from home", "telecommute", "distributed", "anywhere"]
        .iter()
        .any(|k| text.contains(k))
    {
        Some(RemoteType::Remote)
    } else if text.contains("on-site") || text.contains("onsite") || text.contains("in office") {
        Some(RemoteType::OnSite)
    } else {
        None
    }
}

/// Keep a salary string only if it carries amount and currency/range semantics.
pub fn normalize_salary_text(text: &str) -> Option<String> {
    let trimmed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let upper = trimmed.to_uppercase();
    let has_currency = ['$', '€', '£', '₹'].iter().any(|c| trimmed.contains(*c))
        || ["USD", "EUR", "GBP", "INR", "CAD", "AUD"]
            .iter()
            .any(|code| upper.contains(code));
    let has_range = trimmed.contains('-') || trimmed.contains('–');
    (has_currency || has_range).then_some(trimmed)
}

/// Format an integer amount with thousands separators (`120000` -> `120,000`).
pub fn format_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Collapse whitespace and lower-case, for cache keys and dedup keys.
pub fn normalize_key_part(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whole-word-ish containment: short terms like "go" or "ai" must not match
/// inside other words.
fn contains_term(haystack: &str, term: &str) -> bool {
    if term.len() > 3 {
        return haystack.contains(term);
    }
    haystack
        .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .any(|word| word == term)
}
