use async_trait::async_trait;
use chrono::DateTime;
use scout_core::error::AppError;
use scout_core::insight::CompanyInfo;
use scout_core::models::{CompanySize, JobDraft, JobRecord, SourceTag, Tier};
use scout_core::query::{JobQuery, MAX_LIMIT};
use scout_core::text::format_thousands;
use scout_core::traits::{CompanyDirectory, FetchRequest, Fetcher, JobSource};
use serde::Deserialize;

const JOBS_URL: &str = "https://api.linkedin.com/rest/jobs/jobPostings";
const COMPANY_SEARCH_URL: &str = "https://api.linkedin.com/v2/companySearch";
const RESTLI_VERSION: &str = "2.0.0";

/// LinkedIn Jobs API, plus company search for the company-insights chain.
///
/// A `429` surfaces as `RateLimitExceeded` straight away; the fallback chain
/// takes over instead of the adapter sleeping on it.
#[derive(Clone)]
pub struct LinkedInSource<F> {
    fetcher: F,
    access_token: Option<String>,
}

impl<F: Fetcher> LinkedInSource<F> {
    pub fn new(fetcher: F, access_token: Option<String>) -> Self {
        Self {
            fetcher,
            access_token,
        }
    }

    fn authorized(&self, request: FetchRequest) -> Result<FetchRequest, AppError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| AppError::CredentialMissing("linkedin".into()))?;
        Ok(request
            .with_bearer(token)
            .with_header("X-Restli-Protocol-Version", RESTLI_VERSION))
    }

    fn jobs_request(&self, query: &JobQuery) -> Result<FetchRequest, AppError> {
        let mut request = FetchRequest::get(JOBS_URL)
            .with_param("keywords", &query.keywords)
            .with_param("count", query.effective_limit().min(MAX_LIMIT))
            .with_param("start", 0);
        if !query.location.trim().is_empty() {
            request = request.with_param("locationFallback", query.location.trim());
        }
        if let Some(level) = query.experience_level {
            request = request.with_param("experienceLevel", level.linkedin_code());
        }
        if let Some(size) = query.company_size {
            request = request.with_param("f_C", company_size_code(size));
        }
        if query.remote {
            request = request.with_param("f_WT", 2);
        }
        self.authorized(request)
    }
}

fn company_size_code(size: CompanySize) -> u8 {
    match size {
        CompanySize::Startup => 2,
        CompanySize::Small => 3,
        CompanySize::Medium => 4,
        CompanySize::Large => 5,
        CompanySize::Enterprise => 6,
    }
}

// ---- LinkedIn API types ----

#[derive(Deserialize)]
struct Elements<T> {
    #[serde(default = "Vec::new")]
    elements: Vec<T>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Posting {
    job_posting_id: Option<serde_json::Value>,
    job_posting_info: PostingInfo,
    company_details: CompanyDetails,
    /// Epoch milliseconds.
    listed_at: Option<i64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PostingInfo {
    job_title: Option<String>,
    job_location: Option<JobLocation>,
    description: Option<TextValue>,
    employment_type: Option<String>,
    skills: Vec<String>,
    compensation: Option<Compensation>,
    apply_method: Option<ApplyMethod>,
    work_remote_allowed: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JobLocation {
    city: Option<String>,
    country: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TextValue {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Compensation {
    min_salary: Option<Amount>,
    max_salary: Option<Amount>,
    currency_code: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Amount {
    amount: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ApplyMethod {
    company_apply_url: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CompanyDetails {
    company_name: Option<String>,
    employee_count_range: Option<CountRange>,
    industry: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CountRange {
    start: Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CompanyElement {
    localized_name: Option<String>,
    localized_industry: Option<String>,
    staff_count: Option<u64>,
    localized_description: Option<String>,
    headquarters: Option<JobLocation>,
    founded_on: Option<FoundedOn>,
    specialities: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FoundedOn {
    year: Option<u16>,
}

impl JobLocation {
    fn display(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

fn salary_text(compensation: &Compensation) -> Option<String> {
    let currency = compensation.currency_code.as_deref().unwrap_or("USD");
    let whole = |a: &Amount| a.amount.map(|v| format_thousands(v.max(0.0).round() as u64));
    let min = compensation.min_salary.as_ref().and_then(whole)?;
    match compensation.max_salary.as_ref().and_then(whole) {
        Some(max) => Some(format!("{currency} {min} - {max}")),
        None => Some(format!("{currency} {min}+")),
    }
}

fn id_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_postings(body: &str, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
    let response: Elements<Posting> = serde_json::from_str(body)
        .map_err(|e| AppError::ParseError(format!("linkedin jobs response: {e}")))?;

    let jobs = response
        .elements
        .into_iter()
        .take(query.effective_limit())
        .map(|posting| {
            let id = posting.job_posting_id.as_ref().and_then(id_text);
            let info = posting.job_posting_info;
            let company = posting.company_details;
            let url = info
                .apply_method
                .and_then(|m| m.company_apply_url)
                .filter(|u| !u.trim().is_empty())
                .or_else(|| {
                    id.as_ref()
                        .map(|id| format!("https://www.linkedin.com/jobs/view/{id}"))
                });
            let posted_date = posting
                .listed_at
                .and_then(DateTime::from_timestamp_millis)
                .map(|ts| ts.date_naive().format("%Y-%m-%d").to_string());

            JobDraft {
                id,
                title: info.job_title,
                company: company.company_name,
                location: info.job_location.as_ref().and_then(JobLocation::display),
                description: info.description.and_then(|d| d.text),
                employment_type: info.employment_type,
                posted_date,
                salary_range: info.compensation.as_ref().and_then(salary_text),
                skills: info.skills,
                company_size: company
                    .employee_count_range
                    .and_then(|r| r.start)
                    .map(|staff| CompanySize::from_headcount(staff).as_str().to_string()),
                industry: company.industry,
                url,
                remote_type: info.work_remote_allowed.then(|| "Remote".to_string()),
                ..Default::default()
            }
            .finish(SourceTag::new("linkedin", Tier::Api), query)
        })
        .collect();

    Ok(jobs)
}

fn parse_company(body: &str, wanted: &str) -> Result<Option<CompanyInfo>, AppError> {
    let response: Elements<CompanyElement> = serde_json::from_str(body)
        .map_err(|e| AppError::ParseError(format!("linkedin company search: {e}")))?;
    let Some(found) = response.elements.into_iter().next() else {
        return Ok(None);
    };

    let size = found
        .staff_count
        .map(CompanySize::from_headcount)
        .unwrap_or(CompanySize::Medium);
    let growth_stage = match size {
        CompanySize::Startup | CompanySize::Small => "Growth",
        CompanySize::Medium => "Scale-up",
        CompanySize::Large | CompanySize::Enterprise => "Established",
    };
    let description = found.localized_description.unwrap_or_default();

    let info = CompanyInfo {
        company_name: found.localized_name.unwrap_or_else(|| wanted.to_string()),
        industry: found.localized_industry.unwrap_or_default(),
        size: size.as_str().to_string(),
        founded_year: found.founded_on.and_then(|f| f.year).filter(|y| *y > 0),
        location: found
            .headquarters
            .as_ref()
            .and_then(JobLocation::display)
            .unwrap_or_default(),
        culture: Vec::new(),
        benefits: Vec::new(),
        tech_stack: found.specialities,
        growth_stage: growth_stage.to_string(),
        rating: None,
        notable_for: description,
        source: SourceTag::new("linkedin", Tier::Api),
    };
    info.validate().map(Some)
}

#[async_trait]
impl<F: Fetcher + 'static> JobSource for LinkedInSource<F> {
    fn name(&self) -> &str {
        "linkedin"
    }

    fn tier(&self) -> Tier {
        Tier::Api
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
        let request = self.jobs_request(query)?;
        let body = self.fetcher.fetch(&request).await?;
        parse_postings(&body, query)
    }
}

#[async_trait]
impl<F: Fetcher + 'static> CompanyDirectory for LinkedInSource<F> {
    fn name(&self) -> &str {
        "linkedin"
    }

    async fn lookup(&self, company: &str) -> Result<Option<CompanyInfo>, AppError> {
        let request = self.authorized(
            FetchRequest::get(COMPANY_SEARCH_URL)
                .with_param("keywords", company)
                .with_param("count", 1),
        )?;
        let body = self.fetcher.fetch(&request).await?;
        parse_company(&body, company)
    }
}
