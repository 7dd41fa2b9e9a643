//! Synthetic data: the two terminal tiers of every fallback chain.
//!
//! The model tier asks a [`TextGenerator`] for JSON and validates it; the
//! static tier builds deterministic records from hand-authored tables and
//! cannot fail.

mod fallback;
mod prompts;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::dedup;
use crate::error::AppError;
use crate::insight::{CompanyInfo, MarketTrends, SalaryInsight};
use crate::models::{JobDraft, Payload, SourceTag, Tier};
use crate::query::JobQuery;
use crate::traits::TextGenerator;

pub use fallback::{static_company, static_jobs, static_salary, static_skills, static_trends};

/// Cap on skills returned by either tier.
pub const MAX_TRENDING_SKILLS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticKind {
    Jobs,
    SalaryInsight,
    TrendingSkills,
    CompanyInfo,
    MarketTrends,
}

impl SyntheticKind {
    /// Whether the model must answer with a JSON array rather than an object.
    pub fn expects_list(&self) -> bool {
        matches!(self, SyntheticKind::Jobs | SyntheticKind::TrendingSkills)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyntheticKind::Jobs => "jobs",
            SyntheticKind::SalaryInsight => "salary_insight",
            SyntheticKind::TrendingSkills => "trending_skills",
            SyntheticKind::CompanyInfo => "company_info",
            SyntheticKind::MarketTrends => "market_trends",
        }
    }
}

impl fmt::Display for SyntheticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to synthesise, with its parameters.
#[derive(Debug, Clone, Copy)]
pub enum SyntheticRequest<'a> {
    /// `origin` attributes the records to a source whose chain fell through.
    Jobs {
        query: &'a JobQuery,
        origin: Option<&'a str>,
    },
    Salary {
        title: &'a str,
        location: &'a str,
    },
    Skills {
        industry: &'a str,
        keywords: &'a str,
    },
    Company {
        name: &'a str,
    },
    Trends {
        industry: &'a str,
    },
}

impl SyntheticRequest<'_> {
    pub fn kind(&self) -> SyntheticKind {
        match self {
            SyntheticRequest::Jobs { .. } => SyntheticKind::Jobs,
            SyntheticRequest::Salary { .. } => SyntheticKind::SalaryInsight,
            SyntheticRequest::Skills { .. } => SyntheticKind::TrendingSkills,
            SyntheticRequest::Company { .. } => SyntheticKind::CompanyInfo,
            SyntheticRequest::Trends { .. } => SyntheticKind::MarketTrends,
        }
    }

    fn origin(&self) -> Option<&str> {
        match self {
            SyntheticRequest::Jobs { origin, .. } => *origin,
            _ => None,
        }
    }

    /// Tag carried by records from the given synthetic tier.
    pub fn tag(&self, tier: Tier) -> SourceTag {
        SourceTag::with_origin(tier, self.origin())
    }
}

/// Strip code fences, parse JSON and check the top-level shape for `kind`.
pub fn parse_model_json(kind: SyntheticKind, raw: &str) -> Result<serde_json::Value, AppError> {
    let body = strip_code_fence(raw);
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(%kind, raw_len = raw.len(), error = %e, "Model response is not JSON");
        AppError::ParseError(format!("{kind}: {e}"))
    })?;

    let shape_ok = if kind.expects_list() {
        value.is_array()
    } else {
        value.is_object()
    };
    if !shape_ok {
        tracing::warn!(%kind, raw_len = raw.len(), "Model response has the wrong JSON shape");
        return Err(AppError::ParseError(format!(
            "{kind}: expected a JSON {}",
            if kind.expects_list() { "array" } else { "object" }
        )));
    }
    Ok(value)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn decode<T: DeserializeOwned>(kind: SyntheticKind, value: serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|e| AppError::ParseError(format!("{kind}: {e}")))
}

/// Produces synthetic records through the model tier, then the static tier.
#[derive(Clone, Default)]
pub struct SyntheticGenerator {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl SyntheticGenerator {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// A generator with no model backend; only the static tier works.
    pub fn static_only() -> Self {
        Self::default()
    }

    /// Both tiers: the model answer if it is usable, static data otherwise.
    pub async fn generate(&self, request: SyntheticRequest<'_>) -> Payload {
        match self.generate_model(request).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::info!(
                    kind = %request.kind(),
                    reason = %e.kind(),
                    "Model tier unavailable, using static data"
                );
                self.generate_static(request)
            }
        }
    }

    /// Model tier only.
    pub async fn generate_model(&self, request: SyntheticRequest<'_>) -> Result<Payload, AppError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| AppError::CredentialMissing("text generation".into()))?;

        let kind = request.kind();
        let prompt = prompts::build(&request);
        let raw = generator.complete(&prompt).await?;
        let value = parse_model_json(kind, &raw)?;
        let tag = request.tag(Tier::AiGenerated);

        match request {
            SyntheticRequest::Jobs { query, .. } => {
                let drafts: Vec<JobDraft> = decode(kind, value)?;
                let mut seen = HashSet::new();
                let mut jobs: Vec<_> = drafts
                    .into_iter()
                    .map(|draft| draft.finish(tag.clone(), query))
                    .filter(|job| seen.insert(job.dedup_key()))
                    .take(query.effective_limit())
                    .collect();
                if jobs.is_empty() {
                    return Err(AppError::EmptyResult);
                }
                dedup::ensure_unique_ids(&mut jobs);
                Ok(Payload::Jobs(jobs))
            }
            SyntheticRequest::Salary { title, location } => {
                let mut insight: SalaryInsight = decode(kind, value)?;
                if insight.job_title.trim().is_empty() {
                    insight.job_title = title.to_string();
                }
                if insight.location.trim().is_empty() {
                    insight.location = fallback::display_location(location);
                }
                insight.source = tag;
                Ok(Payload::Salary(insight))
            }
            SyntheticRequest::Skills { .. } => {
                let skills: Vec<String> = decode(kind, value)?;
                let skills = dedup_skills(skills);
                if skills.is_empty() {
                    return Err(AppError::EmptyResult);
                }
                Ok(Payload::Skills(skills))
            }
            SyntheticRequest::Company { name } => {
                let mut info: CompanyInfo = decode(kind, value)?;
                if info.company_name.trim().is_empty() {
                    info.company_name = name.to_string();
                }
                info.source = tag;
                Ok(Payload::Company(info.validate()?))
            }
            SyntheticRequest::Trends { industry } => {
                let mut trends: MarketTrends = decode(kind, value)?;
                if trends.industry.trim().is_empty() {
                    trends.industry = industry.to_string();
                }
                trends.source = tag;
                Ok(Payload::Trends(trends.validate()?))
            }
        }
    }

    /// Static tier; always succeeds.
    pub fn generate_static(&self, request: SyntheticRequest<'_>) -> Payload {
        match request {
            SyntheticRequest::Jobs { query, origin } => Payload::Jobs(static_jobs(query, origin)),
            SyntheticRequest::Salary { title, location } => {
                Payload::Salary(static_salary(title, location))
            }
            SyntheticRequest::Skills { industry, keywords } => {
                Payload::Skills(static_skills(industry, keywords))
            }
            SyntheticRequest::Company { name } => Payload::Company(static_company(name)),
            SyntheticRequest::Trends { industry } => Payload::Trends(static_trends(industry)),
        }
    }
}

/// Trim, drop blanks and case-insensitive repeats, cap at the maximum.
fn dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .take(MAX_TRENDING_SKILLS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockTextGenerator;

    fn with_model(response: &str) -> (SyntheticGenerator, MockTextGenerator) {
        let mock = MockTextGenerator::new(response);
        (SyntheticGenerator::new(Some(Arc::new(mock.clone()))), mock)
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fence("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  [] "), "[]");
    }

    #[test]
    fn parse_checks_shape() {
        assert!(parse_model_json(SyntheticKind::Jobs, "[]").is_ok());
        assert!(parse_model_json(SyntheticKind::SalaryInsight, "{}").is_ok());

        let err = parse_model_json(SyntheticKind::Jobs, "{\"a\": 1}").unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
        let err = parse_model_json(SyntheticKind::CompanyInfo, "[1]").unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
        let err = parse_model_json(SyntheticKind::TrendingSkills, "Sure! Here you go").unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }

    #[tokio::test]
    async fn no_backend_is_credential_missing() {
        let generator = SyntheticGenerator::static_only();
        let err = generator
            .generate_model(SyntheticRequest::Trends { industry: "tech" })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CredentialMissing(_)));
    }

    #[tokio::test]
    async fn model_jobs_are_completed_and_tagged() {
        let (generator, mock) = with_model(
            r#"```json
            [
              {"title": "ML Engineer", "company": "Nimbus", "skills": ["Python", "PyTorch"]},
              {"title": "ML Engineer", "company": "nimbus"},
              {"company": "Orbit"}
            ]
            ```"#,
        );
        let query = JobQuery::new("Machine Learning").with_limit(5);

        let payload = generator
            .generate_model(SyntheticRequest::Jobs {
                query: &query,
                origin: Some("indeed"),
            })
            .await
            .unwrap();

        let Payload::Jobs(jobs) = payload else {
            panic!("expected jobs");
        };
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].title, "Machine Learning Developer");
        assert!(jobs.iter().all(|j| j.source.to_string() == "indeed_ai_fallback"));
        assert!(jobs.iter().all(|j| !j.skills.is_empty()));
        assert_eq!(mock.prompts().len(), 1);
    }

    #[tokio::test]
    async fn model_jobs_with_repeated_ids_are_renumbered() {
        let (generator, _) = with_model(
            r#"[
              {"id": "1", "title": "Data Engineer", "company": "Acme"},
              {"id": "1", "title": "Data Analyst", "company": "Acme"}
            ]"#,
        );
        let query = JobQuery::new("data");

        let Payload::Jobs(jobs) = generator
            .generate_model(SyntheticRequest::Jobs {
                query: &query,
                origin: None,
            })
            .await
            .unwrap()
        else {
            panic!("expected jobs");
        };

        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["ai_1", "ai_1_1"]);
    }

    #[tokio::test]
    async fn empty_model_list_is_empty_result() {
        let (generator, _) = with_model("[]");
        let query = JobQuery::new("rust");
        let err = generator
            .generate_model(SyntheticRequest::Jobs {
                query: &query,
                origin: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyResult));
    }

    #[tokio::test]
    async fn model_salary_with_reversed_band_is_rejected() {
        let (generator, _) = with_model(
            r#"{
              "job_title": "Engineer", "location": "Austin",
              "entry_level": {"min_salary": 90000, "median_salary": 70000, "max_salary": 80000},
              "mid_level": {"min_salary": 90000, "median_salary": 100000, "max_salary": 120000},
              "senior_level": {"min_salary": 120000, "median_salary": 150000, "max_salary": 180000}
            }"#,
        );
        let err = generator
            .generate_model(SyntheticRequest::Salary {
                title: "Engineer",
                location: "Austin",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }

    #[tokio::test]
    async fn model_salary_is_accepted() {
        let (generator, _) = with_model(
            r#"{
              "job_title": "Engineer", "location": "",
              "entry_level": {"min_salary": 60000, "median_salary": 70000, "max_salary": 80000},
              "mid_level": {"min_salary": 90000, "median_salary": 100000, "max_salary": 120000},
              "senior_level": {"min_salary": 120000, "median_salary": 150000, "max_salary": 180000},
              "market_outlook": "Growing"
            }"#,
        );
        let payload = generator
            .generate_model(SyntheticRequest::Salary {
                title: "Engineer",
                location: "",
            })
            .await
            .unwrap();
        let Payload::Salary(insight) = payload else {
            panic!("expected salary");
        };
        assert_eq!(insight.location, "All locations");
        assert_eq!(insight.currency, "USD");
        assert_eq!(insight.source.to_string(), "ai_fallback");
    }

    #[tokio::test]
    async fn model_skills_are_deduplicated_and_capped() {
        let many: Vec<String> = (0..30).map(|i| format!("\"Skill {i}\"")).collect();
        let raw = format!("[\"Rust\", \"rust\", \" \", {}]", many.join(","));
        let (generator, _) = with_model(&raw);

        let payload = generator
            .generate_model(SyntheticRequest::Skills {
                industry: "technology",
                keywords: "",
            })
            .await
            .unwrap();
        let Payload::Skills(skills) = payload else {
            panic!("expected skills");
        };
        assert_eq!(skills.len(), MAX_TRENDING_SKILLS);
        assert_eq!(skills[0], "Rust");
        assert_eq!(skills[1], "Skill 0");
    }

    #[tokio::test]
    async fn generate_falls_back_to_static() {
        let (generator, _) = with_model("not json at all");
        let payload = generator
            .generate(SyntheticRequest::Company { name: "Acme" })
            .await;
        let Payload::Company(info) = payload else {
            panic!("expected company");
        };
        assert_eq!(info.company_name, "Acme");
        assert_eq!(info.source.to_string(), "static_fallback");
    }

    #[tokio::test]
    async fn backend_error_propagates_from_model_tier() {
        let mock = MockTextGenerator::with_error(AppError::LlmError {
            message: "overloaded".into(),
            status_code: 503,
        });
        let generator = SyntheticGenerator::new(Some(Arc::new(mock)));
        let err = generator
            .generate_model(SyntheticRequest::Trends { industry: "finance" })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LlmError { status_code: 503, .. }));
    }
}
