use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::insight::{CompanyInfo, MarketTrends, SalaryInsight};
use crate::posted::PostedDate;
use crate::query::JobQuery;
use crate::text;

/// Stage of the fallback chain that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Authenticated live API.
    Api,
    /// Scraped job board.
    Scrape,
    /// Produced by the text-generation backend.
    AiGenerated,
    /// Hand-authored deterministic data; the terminal tier.
    StaticFallback,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Api => "api",
            Tier::Scrape => "scrape",
            Tier::AiGenerated => "ai_fallback",
            Tier::StaticFallback => "static_fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Tier::AiGenerated | Tier::StaticFallback)
    }
}

/// Provenance of a record: which source and which tier produced it.
///
/// Rendered as `{origin}_{tier}` (`indeed_scrape`, `linkedin_ai_fallback`)
/// or just the tier when the record did not come from a specific source
/// (`ai_fallback`, `static_fallback`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceTag {
    pub origin: Option<String>,
    pub tier: Tier,
}

impl SourceTag {
    pub fn new(origin: impl Into<String>, tier: Tier) -> Self {
        Self {
            origin: Some(origin.into()),
            tier,
        }
    }

    pub fn tier_only(tier: Tier) -> Self {
        Self { origin: None, tier }
    }

    /// Same tier, attributed to a source.
    pub fn with_origin(tier: Tier, origin: Option<&str>) -> Self {
        Self {
            origin: origin.map(str::to_string),
            tier,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.tier.is_fallback()
    }

    /// Prefix used for record ids.
    pub fn id_prefix(&self) -> &str {
        self.origin.as_deref().unwrap_or(match self.tier {
            Tier::AiGenerated => "ai",
            Tier::StaticFallback => "static",
            Tier::Api => "api",
            Tier::Scrape => "scrape",
        })
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "{}_{}", origin, self.tier.as_str()),
            None => f.write_str(self.tier.as_str()),
        }
    }
}

impl FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Longest suffixes first so "x_ai_fallback" is not read as "x_ai" + "fallback".
        for tier in [
            Tier::StaticFallback,
            Tier::AiGenerated,
            Tier::Scrape,
            Tier::Api,
        ] {
            let suffix = tier.as_str();
            if s == suffix {
                return Ok(SourceTag::tier_only(tier));
            }
            if let Some(origin) = s.strip_suffix(suffix).and_then(|o| o.strip_suffix('_'))
                && !origin.is_empty()
            {
                return Ok(SourceTag::new(origin, tier));
            }
        }
        Err(format!("Unknown source tag: {s}"))
    }
}

impl Serialize for SourceTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SourceTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Temporary,
    Internship,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::Contract => "Contract",
            EmploymentType::Temporary => "Temporary",
            EmploymentType::Internship => "Internship",
        }
    }

    /// Lenient parse accepting `Full-time`, `FULL_TIME`, `full time`, ...
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "fulltime" | "permanent" => Some(EmploymentType::FullTime),
            "parttime" => Some(EmploymentType::PartTime),
            "contract" | "contractor" | "freelance" => Some(EmploymentType::Contract),
            "temporary" | "temp" => Some(EmploymentType::Temporary),
            "internship" | "intern" => Some(EmploymentType::Internship),
            _ => None,
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteType {
    Remote,
    Hybrid,
    #[serde(rename = "On-site")]
    OnSite,
}

impl RemoteType {
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let lower = raw.to_lowercase();
        if lower.contains("hybrid") {
            Some(RemoteType::Hybrid)
        } else if lower.contains("remote") {
            Some(RemoteType::Remote)
        } else if lower.contains("site") || lower.contains("office") {
            Some(RemoteType::OnSite)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanySize {
    Startup,
    Small,
    Medium,
    Large,
    Enterprise,
}

impl CompanySize {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanySize::Startup => "Startup",
            CompanySize::Small => "Small",
            CompanySize::Medium => "Medium",
            CompanySize::Large => "Large",
            CompanySize::Enterprise => "Enterprise",
        }
    }

    /// Parses both bare names and UI labels such as `Startup (1-50)`.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        [
            CompanySize::Startup,
            CompanySize::Small,
            CompanySize::Medium,
            CompanySize::Large,
            CompanySize::Enterprise,
        ]
        .into_iter()
        .find(|size| lower.starts_with(&size.as_str().to_lowercase()))
    }

    /// Bucket a headcount into a size category.
    pub fn from_headcount(staff: u64) -> Self {
        match staff {
            0..=50 => CompanySize::Startup,
            51..=200 => CompanySize::Small,
            201..=1000 => CompanySize::Medium,
            1001..=5000 => CompanySize::Large,
            _ => CompanySize::Enterprise,
        }
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical job posting produced by every tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique within a result set; prefixed with the source name.
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub employment_type: EmploymentType,
    pub posted_date: PostedDate,
    pub salary_range: Option<String>,
    pub requirements: Vec<String>,
    pub skills: BTreeSet<String>,
    pub company_size: CompanySize,
    pub industry: String,
    pub url: String,
    pub source: SourceTag,
    pub remote_type: Option<RemoteType>,
}

impl JobRecord {
    /// Identity used for cross-source deduplication.
    pub fn dedup_key(&self) -> (String, String) {
        (
            text::normalize_key_part(&self.title),
            text::normalize_key_part(&self.company),
        )
    }
}

/// A partially-populated job as parsed from a source.
///
/// Every field is optional; [`JobDraft::finish`] fills the documented
/// defaults so a [`JobRecord`] is always complete.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub employment_type: Option<String>,
    pub posted_date: Option<String>,
    pub salary_range: Option<String>,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub company_size: Option<String>,
    #[serde(alias = "company_industry")]
    pub industry: Option<String>,
    #[serde(alias = "application_url")]
    pub url: Option<String>,
    pub remote_type: Option<String>,
}

pub const DEFAULT_COMPANY: &str = "Undisclosed Company";
pub const DEFAULT_INDUSTRY: &str = "Technology";

/// Requirements used when a source lists none.
pub fn default_requirements() -> Vec<String> {
    vec![
        "Bachelor's degree in relevant field".to_string(),
        "Strong problem-solving skills".to_string(),
        "Team collaboration experience".to_string(),
    ]
}

impl JobDraft {
    /// Build a complete record, substituting defaults for anything missing.
    pub fn finish(self, source: SourceTag, query: &JobQuery) -> JobRecord {
        let title = non_empty(self.title).unwrap_or_else(|| {
            let base = query.keywords.trim();
            if base.is_empty() {
                "Software Developer".to_string()
            } else {
                format!("{base} Developer")
            }
        });
        let company = non_empty(self.company).unwrap_or_else(|| DEFAULT_COMPANY.to_string());
        let location = non_empty(self.location)
            .or_else(|| non_empty(Some(query.location.clone())))
            .unwrap_or_else(|| "Remote".to_string());
        let description = non_empty(self.description)
            .unwrap_or_else(|| format!("Exciting {title} opportunity at {company}."));

        let employment_type = self
            .employment_type
            .as_deref()
            .and_then(EmploymentType::parse_loose)
            .unwrap_or_else(|| text::detect_employment_type(&title, &description));

        let posted_date = self
            .posted_date
            .as_deref()
            .map(PostedDate::parse_relative)
            .unwrap_or(PostedDate::Recently);

        let requirements: Vec<String> = self
            .requirements
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        let requirements = if requirements.is_empty() {
            default_requirements()
        } else {
            requirements
        };

        let mut skills: BTreeSet<String> = self
            .skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if skills.is_empty() {
            skills.extend(text::extract_skills(&description));
        }
        if skills.is_empty() {
            skills.extend(text::skills_for_keywords(&query.keywords));
        }

        let remote_type = self
            .remote_type
            .as_deref()
            .and_then(RemoteType::parse_loose)
            .or_else(|| text::detect_remote_type(&description, &location));

        let id = match non_empty(self.id) {
            Some(id) if id.starts_with(source.id_prefix()) => id,
            Some(id) => format!("{}_{}", source.id_prefix(), id),
            None => format!(
                "{}_{}",
                source.id_prefix(),
                &compute_hash(&format!("{title}|{company}|{location}"))[..12]
            ),
        };

        JobRecord {
            id,
            salary_range: self
                .salary_range
                .as_deref()
                .and_then(text::normalize_salary_text),
            company_size: self
                .company_size
                .as_deref()
                .and_then(CompanySize::parse_loose)
                .unwrap_or(CompanySize::Medium),
            industry: non_empty(self.industry).unwrap_or_else(|| DEFAULT_INDUSTRY.to_string()),
            url: non_empty(self.url).unwrap_or_else(|| "#".to_string()),
            title,
            company,
            location,
            description,
            employment_type,
            posted_date,
            requirements,
            skills,
            source,
            remote_type,
        }
    }
}

/// Any value the orchestrator can serve (and cache).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Jobs(Vec<JobRecord>),
    Salary(SalaryInsight),
    Skills(Vec<String>),
    Company(CompanyInfo),
    Trends(MarketTrends),
}

impl Payload {
    /// Number of records, for logging.
    pub fn record_count(&self) -> usize {
        match self {
            Payload::Jobs(jobs) => jobs.len(),
            Payload::Skills(skills) => skills.len(),
            Payload::Salary(_) | Payload::Company(_) | Payload::Trends(_) => 1,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash_consistency() {
        let h1 = compute_hash("hello world");
        let h2 = compute_hash("hello world");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn source_tag_rendering() {
        assert_eq!(SourceTag::new("linkedin", Tier::Api).to_string(), "linkedin_api");
        assert_eq!(
            SourceTag::new("indeed", Tier::AiGenerated).to_string(),
            "indeed_ai_fallback"
        );
        assert_eq!(
            SourceTag::tier_only(Tier::StaticFallback).to_string(),
            "static_fallback"
        );
    }

    #[test]
    fn source_tag_parsing() {
        assert_eq!(
            "glassdoor_scrape".parse::<SourceTag>().unwrap(),
            SourceTag::new("glassdoor", Tier::Scrape)
        );
        assert_eq!(
            "indeed_ai_fallback".parse::<SourceTag>().unwrap(),
            SourceTag::new("indeed", Tier::AiGenerated)
        );
        assert_eq!(
            "static_fallback".parse::<SourceTag>().unwrap(),
            SourceTag::tier_only(Tier::StaticFallback)
        );
        assert!("mystery".parse::<SourceTag>().is_err());
    }

    #[test]
    fn employment_type_loose_parsing() {
        assert_eq!(
            EmploymentType::parse_loose("FULL_TIME"),
            Some(EmploymentType::FullTime)
        );
        assert_eq!(
            EmploymentType::parse_loose("Part-time"),
            Some(EmploymentType::PartTime)
        );
        assert_eq!(EmploymentType::parse_loose("gig"), None);
    }

    #[test]
    fn company_size_parsing() {
        assert_eq!(
            CompanySize::parse_loose("Startup (1-50)"),
            Some(CompanySize::Startup)
        );
        assert_eq!(CompanySize::parse_loose("large"), Some(CompanySize::Large));
        assert_eq!(CompanySize::from_headcount(12_000), CompanySize::Enterprise);
    }

    #[test]
    fn draft_fills_every_default() {
        let query = JobQuery::new("Rust").with_location("Berlin");
        let record = JobDraft::default().finish(SourceTag::new("indeed", Tier::Scrape), &query);

        assert!(record.id.starts_with("indeed_"));
        assert_eq!(record.title, "Rust Developer");
        assert_eq!(record.company, DEFAULT_COMPANY);
        assert_eq!(record.location, "Berlin");
        assert!(!record.description.is_empty());
        assert_eq!(record.employment_type, EmploymentType::FullTime);
        assert_eq!(record.posted_date, PostedDate::Recently);
        assert_eq!(record.salary_range, None);
        assert_eq!(record.requirements.len(), 3);
        assert!(!record.skills.is_empty());
        assert_eq!(record.company_size, CompanySize::Medium);
        assert_eq!(record.url, "#");
    }

    #[test]
    fn draft_keeps_parsed_fields() {
        let draft = JobDraft {
            id: Some("123".into()),
            title: Some("  Data Engineer ".into()),
            company: Some("Acme".into()),
            description: Some("Hybrid role building Python and SQL pipelines".into()),
            employment_type: Some("CONTRACT".into()),
            posted_date: Some("2 days ago".into()),
            salary_range: Some("$100,000 - $130,000".into()),
            skills: vec!["SQL".into(), "SQL".into(), " ".into()],
            ..Default::default()
        };
        let record = draft.finish(
            SourceTag::new("linkedin", Tier::Api),
            &JobQuery::new("data"),
        );

        assert_eq!(record.id, "linkedin_123");
        assert_eq!(record.title, "Data Engineer");
        assert_eq!(record.employment_type, EmploymentType::Contract);
        assert_eq!(record.posted_date, PostedDate::DaysAgo(2));
        assert_eq!(record.salary_range.as_deref(), Some("$100,000 - $130,000"));
        assert_eq!(record.skills.len(), 1);
        assert_eq!(record.remote_type, Some(RemoteType::Hybrid));
    }

    #[test]
    fn dedup_key_is_case_insensitive() {
        let query = JobQuery::new("x");
        let a = JobDraft {
            title: Some("Data Scientist".into()),
            company: Some("Acme".into()),
            ..Default::default()
        }
        .finish(SourceTag::new("a", Tier::Scrape), &query);
        let b = JobDraft {
            title: Some("data  scientist".into()),
            company: Some("ACME".into()),
            ..Default::default()
        }
        .finish(SourceTag::new("b", Tier::Api), &query);
        assert_eq!(a.dedup_key(), b.dedup_key());
    }
}
