use async_trait::async_trait;
use chrono::DateTime;
use scout_core::error::AppError;
use scout_core::models::{JobDraft, JobRecord, SourceTag, Tier};
use scout_core::query::JobQuery;
use scout_core::text::format_thousands;
use scout_core::traits::{FetchRequest, Fetcher, JobSource};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "https://jobs.googleapis.com/v4";

/// Google Cloud Talent Solution job search.
#[derive(Clone)]
pub struct TalentSource<F> {
    fetcher: F,
    base_url: String,
    api_key: Option<String>,
    project_id: Option<String>,
}

impl<F: Fetcher> TalentSource<F> {
    pub fn new(fetcher: F, api_key: Option<String>, project_id: Option<String>) -> Self {
        Self {
            fetcher,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            project_id,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn request(&self, query: &JobQuery) -> Result<FetchRequest, AppError> {
        let (Some(key), Some(project)) = (&self.api_key, &self.project_id) else {
            return Err(AppError::CredentialMissing("cloud talent".into()));
        };
        let url = format!("{}/projects/{project}/jobs:search", self.base_url);
        Ok(FetchRequest::post_json(url, search_body(query)).with_bearer(key.clone()))
    }
}

fn search_body(query: &JobQuery) -> Value {
    let location_filters: Vec<Value> = if query.location.trim().is_empty() {
        Vec::new()
    } else {
        vec![json!({ "address": query.location.trim() })]
    };
    let employment_types: Vec<&str> = match query.employment_type {
        Some(kind) => vec![talent_employment_type(kind.as_str())],
        None => vec!["FULL_TIME", "PART_TIME", "CONTRACTOR"],
    };

    json!({
        "requestMetadata": {
            "userId": "scout",
            "sessionId": Uuid::new_v4().to_string(),
            "domain": "scout.local",
        },
        "jobQuery": {
            "query": query.keywords,
            "locationFilters": location_filters,
            "employmentTypes": employment_types,
        },
        "enableBroadening": true,
        "pageSize": query.effective_limit(),
        "orderBy": "relevance desc",
    })
}

fn talent_employment_type(label: &str) -> &'static str {
    match label {
        "Part-time" => "PART_TIME",
        "Contract" => "CONTRACTOR",
        "Temporary" => "TEMPORARY",
        "Internship" => "INTERN",
        _ => "FULL_TIME",
    }
}

// ---- Cloud Talent API types ----

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    matching_jobs: Vec<MatchingJob>,
}

#[derive(Deserialize)]
struct MatchingJob {
    #[serde(default)]
    job: TalentJob,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct TalentJob {
    name: Option<String>,
    title: Option<String>,
    company_display_name: Option<String>,
    addresses: Vec<String>,
    description: Option<String>,
    employment_types: Vec<String>,
    posting_create_time: Option<String>,
    application_info: Option<ApplicationInfo>,
    compensation_info: Option<CompensationInfo>,
    qualifications: Option<Value>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ApplicationInfo {
    uris: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CompensationInfo {
    entries: Vec<CompensationEntry>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CompensationEntry {
    amount: Option<Money>,
    range: Option<MoneyRange>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct MoneyRange {
    #[serde(rename = "minCompensation", alias = "min")]
    min: Option<Money>,
    #[serde(rename = "maxCompensation", alias = "max")]
    max: Option<Money>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Money {
    currency_code: Option<String>,
    /// int64 values arrive as JSON strings.
    units: Option<Value>,
}

impl Money {
    fn whole_units(&self) -> Option<u64> {
        match self.units.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn currency(&self) -> &str {
        self.currency_code.as_deref().unwrap_or("USD")
    }
}

fn salary_text(info: &CompensationInfo) -> Option<String> {
    let entry = info.entries.first()?;
    if let Some(amount) = &entry.amount
        && let Some(units) = amount.whole_units()
    {
        return Some(format!("{} {}", amount.currency(), format_thousands(units)));
    }
    let range = entry.range.as_ref()?;
    let min = range.min.as_ref()?;
    let min_units = min.whole_units().filter(|&units| units > 0)?;
    match range.max.as_ref().and_then(Money::whole_units) {
        Some(max_units) if max_units >= min_units => Some(format!(
            "{} {} - {}",
            min.currency(),
            format_thousands(min_units),
            format_thousands(max_units)
        )),
        _ => Some(format!("{} {}+", min.currency(), format_thousands(min_units))),
    }
}

/// Requirements from either free-text or structured qualifications.
fn requirements(qualifications: Option<&Value>) -> Vec<String> {
    match qualifications {
        Some(Value::String(text)) => text
            .lines()
            .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Object(map)) => {
            let mut out = Vec::new();
            if let Some(level) = map
                .get("educationLevels")
                .and_then(Value::as_array)
                .and_then(|levels| levels.first())
                .and_then(Value::as_str)
            {
                out.push(format!("Education: {level}"));
            }
            if let Some(months) = map.get("experienceInMonths").and_then(Value::as_u64)
                && months >= 12
            {
                out.push(format!("{}+ years experience", months / 12));
            }
            out
        }
        _ => Vec::new(),
    }
}

fn parse_results(body: &str, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| AppError::ParseError(format!("cloud talent response: {e}")))?;

    let jobs = response
        .matching_jobs
        .into_iter()
        .map(|m| m.job)
        .take(query.effective_limit())
        .map(|job| {
            let posted_date = job
                .posting_create_time
                .as_deref()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.date_naive().format("%Y-%m-%d").to_string());
            JobDraft {
                id: job
                    .name
                    .as_deref()
                    .and_then(|name| name.rsplit('/').next())
                    .map(str::to_string),
                title: job.title,
                company: job.company_display_name,
                location: job.addresses.into_iter().next(),
                description: job.description,
                employment_type: job.employment_types.into_iter().next(),
                posted_date,
                salary_range: job.compensation_info.as_ref().and_then(salary_text),
                requirements: requirements(job.qualifications.as_ref()),
                url: job.application_info.and_then(|info| info.uris.into_iter().next()),
                ..Default::default()
            }
            .finish(SourceTag::new("google", Tier::Api), query)
        })
        .collect();

    Ok(jobs)
}

#[async_trait]
impl<F: Fetcher + 'static> JobSource for TalentSource<F> {
    fn name(&self) -> &str {
        "google"
    }

    fn tier(&self) -> Tier {
        Tier::Api
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
        let request = self.request(query)?;
        let body = self.fetcher.fetch(&request).await?;
        parse_results(&body, query)
    }
}
