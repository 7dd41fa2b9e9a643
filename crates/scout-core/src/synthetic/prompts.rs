use crate::query::JobQuery;
use crate::traits::Prompt;

use super::{MAX_TRENDING_SKILLS, SyntheticRequest};

const SYSTEM: &str = "You are a labour-market data assistant. \
Answer with valid JSON only: no prose, no explanations, no markdown.";

const DEFAULT_MAX_TOKENS: u32 = 2000;
const JOBS_MAX_TOKENS: u32 = 4000;
const TEMPERATURE: f32 = 0.7;

pub(super) fn build(request: &SyntheticRequest<'_>) -> Prompt {
    let (user, max_tokens) = match request {
        SyntheticRequest::Jobs { query, .. } => (jobs(query), JOBS_MAX_TOKENS),
        SyntheticRequest::Salary { title, location } => {
            (salary(title, location), DEFAULT_MAX_TOKENS)
        }
        SyntheticRequest::Skills { industry, keywords } => {
            (skills(industry, keywords), DEFAULT_MAX_TOKENS)
        }
        SyntheticRequest::Company { name } => (company(name), DEFAULT_MAX_TOKENS),
        SyntheticRequest::Trends { industry } => (trends(industry), DEFAULT_MAX_TOKENS),
    };
    Prompt {
        system: SYSTEM.to_string(),
        user,
        max_tokens,
        temperature: TEMPERATURE,
    }
}

fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn jobs(query: &JobQuery) -> String {
    let experience = query
        .experience_level
        .map(|l| l.as_str())
        .unwrap_or("any level");
    let employment = query
        .employment_type
        .map(|e| e.as_str())
        .unwrap_or("Full-time");
    let remote = if query.remote {
        "Only remote positions."
    } else {
        "Mix remote, hybrid and on-site positions."
    };
    format!(
        r#"Create {limit} realistic, currently plausible job postings.
Keywords: {keywords}
Location: {location}
Experience level: {experience}
Employment type: {employment}
{remote}

Vary companies and locations. Each posting has 3-5 requirements and 4-8 skills.
Return a JSON array of objects shaped like:
{{"id": "unique id", "title": "...", "company": "...", "company_size": "Startup|Small|Medium|Large|Enterprise",
  "industry": "...", "location": "City, Region or Remote", "description": "2-3 sentences",
  "employment_type": "Full-time|Part-time|Contract|Temporary|Internship",
  "posted_date": "Today|N days ago", "salary_range": "$NNN,NNN - $NNN,NNN",
  "requirements": ["..."], "skills": ["..."], "remote_type": "Remote|Hybrid|On-site",
  "url": "https://..."}}"#,
        limit = query.effective_limit(),
        keywords = or(&query.keywords, "software"),
        location = or(&query.location, "various locations including remote"),
    )
}

fn salary(title: &str, location: &str) -> String {
    format!(
        r#"Estimate annual salaries in USD for "{title}" in {location}.
Return a JSON object shaped like:
{{"job_title": "{title}", "location": "{location}",
  "entry_level": {{"min_salary": 0, "median_salary": 0, "max_salary": 0}},
  "mid_level": {{"min_salary": 0, "median_salary": 0, "max_salary": 0}},
  "senior_level": {{"min_salary": 0, "median_salary": 0, "max_salary": 0}},
  "factors": ["..."], "trending_skills": ["..."],
  "market_outlook": "Growing|Stable|Declining", "note": "..."}}
Within each level min_salary <= median_salary <= max_salary."#,
        location = or(location, "the United States"),
    )
}

fn skills(industry: &str, keywords: &str) -> String {
    let focus = if keywords.trim().is_empty() {
        String::new()
    } else {
        format!("Focus on skills related to: {keywords}.\n")
    };
    format!(
        r#"List the {MAX_TRENDING_SKILLS} most in-demand skills in the {industry} industry right now.
{focus}Mix languages, frameworks, cloud and tooling, and emerging technology.
Return a JSON array of skill names."#,
        industry = or(industry, "technology"),
    )
}

fn company(name: &str) -> String {
    format!(
        r#"Describe the company "{name}". Use real facts if it exists, otherwise plausible details.
Return a JSON object shaped like:
{{"company_name": "{name}", "industry": "...", "size": "Startup|Small|Medium|Large|Enterprise",
  "founded_year": 2010, "location": "...", "culture": ["..."], "benefits": ["..."],
  "tech_stack": ["..."], "growth_stage": "Growing|Mature|Scaling", "rating": 4.2,
  "notable_for": "..."}}"#
    )
}

fn trends(industry: &str) -> String {
    format!(
        r#"Summarise current hiring-market trends for the {industry} industry.
Return a JSON object shaped like:
{{"industry": "{industry}", "hot_roles": ["..."], "emerging_skills": ["..."],
  "salary_trends": "Increasing|Stable|Decreasing", "remote_work_trend": "High|Medium|Low adoption",
  "hiring_outlook": "Strong|Moderate|Cautious", "key_trends": ["..."],
  "growth_areas": ["..."], "competitive_factors": ["..."]}}"#,
        industry = or(industry, "technology"),
    )
}
