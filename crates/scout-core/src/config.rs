use std::time::Duration;

use crate::error::AppError;
use crate::orchestrator::OrchestratorConfig;
use crate::throttle::ThrottleConfig;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// Runtime configuration, read from the environment.
///
/// Credentials are optional: a missing one disables the corresponding tier,
/// which the orchestrator then skips as `CredentialMissing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoutConfig {
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub talent_api_key: Option<String>,
    pub talent_project_id: Option<String>,
    pub linkedin_token: Option<String>,
    pub cache_ttl: Duration,
    pub scrape_delay: Duration,
    pub api_min_interval: Duration,
    pub adapter_timeout: Duration,
    pub model_timeout: Duration,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        let orchestrator = OrchestratorConfig::default();
        Self {
            llm_api_key: None,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            talent_api_key: None,
            talent_project_id: None,
            linkedin_token: None,
            cache_ttl: orchestrator.cache_ttl,
            scrape_delay: Duration::from_millis(1000),
            api_min_interval: Duration::from_millis(1000),
            adapter_timeout: orchestrator.adapter_timeout,
            model_timeout: orchestrator.model_timeout,
        }
    }
}

impl ScoutConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Ok(Self {
            llm_api_key: get("GROQ_API_KEY"),
            llm_base_url: get("SCOUT_LLM_BASE_URL").unwrap_or(defaults.llm_base_url),
            llm_model: get("SCOUT_LLM_MODEL").unwrap_or(defaults.llm_model),
            talent_api_key: get("JOBS_API_KEY"),
            talent_project_id: get("JOBS_API_PROJECT_ID"),
            linkedin_token: get("LINKEDIN_ACCESS_TOKEN"),
            cache_ttl: duration(get("SCOUT_CACHE_TTL_SECS"), "SCOUT_CACHE_TTL_SECS", Duration::from_secs, 0)?
                .unwrap_or(defaults.cache_ttl),
            scrape_delay: duration(
                get("SCOUT_SCRAPE_DELAY_MS"),
                "SCOUT_SCRAPE_DELAY_MS",
                Duration::from_millis,
                0,
            )?
            .unwrap_or(defaults.scrape_delay),
            api_min_interval: duration(
                get("SCOUT_API_MIN_INTERVAL_MS"),
                "SCOUT_API_MIN_INTERVAL_MS",
                Duration::from_millis,
                0,
            )?
            .unwrap_or(defaults.api_min_interval),
            adapter_timeout: duration(
                get("SCOUT_ADAPTER_TIMEOUT_SECS"),
                "SCOUT_ADAPTER_TIMEOUT_SECS",
                Duration::from_secs,
                1,
            )?
            .unwrap_or(defaults.adapter_timeout),
            model_timeout: duration(
                get("SCOUT_MODEL_TIMEOUT_SECS"),
                "SCOUT_MODEL_TIMEOUT_SECS",
                Duration::from_secs,
                1,
            )?
            .unwrap_or(defaults.model_timeout),
        })
    }

    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            adapter_timeout: self.adapter_timeout,
            model_timeout: self.model_timeout,
            cache_ttl: self.cache_ttl,
        }
    }

    pub fn scrape_throttle(&self) -> ThrottleConfig {
        ThrottleConfig::scrape(self.scrape_delay)
    }

    pub fn api_throttle(&self) -> ThrottleConfig {
        ThrottleConfig::api(self.api_min_interval)
    }
}

fn duration(
    raw: Option<String>,
    name: &str,
    unit: fn(u64) -> Duration,
    min: u64,
) -> Result<Option<Duration>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let parsed: u64 = raw.parse().map_err(|_| {
        AppError::ConfigError(format!(
            "Invalid {name} '{raw}': must be a non-negative integer"
        ))
    })?;
    if parsed < min {
        return Err(AppError::ConfigError(format!(
            "{name} must be at least {min}"
        )));
    }
    Ok(Some(unit(parsed)))
}
