use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::models::{CompanySize, EmploymentType};
use crate::text::normalize_key_part;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 50;

/// Seniority filter, with the LinkedIn experience-level code for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Executive => "executive",
        }
    }

    pub fn linkedin_code(&self) -> u8 {
        match self {
            ExperienceLevel::Entry => 1,
            ExperienceLevel::Mid => 2,
            ExperienceLevel::Senior => 3,
            ExperienceLevel::Executive => 4,
        }
    }

    /// Accepts bare names and UI labels such as `Senior Level`.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        if lower.starts_with("entry") || lower.starts_with("junior") {
            Some(ExperienceLevel::Entry)
        } else if lower.starts_with("mid") {
            Some(ExperienceLevel::Mid)
        } else if lower.starts_with("senior") {
            Some(ExperienceLevel::Senior)
        } else if lower.starts_with("exec") || lower.starts_with("director") {
            Some(ExperienceLevel::Executive)
        } else {
            None
        }
    }
}

/// A job search request as seen by the orchestrator and every adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    pub keywords: String,
    pub location: String,
    pub experience_level: Option<ExperienceLevel>,
    pub company_size: Option<CompanySize>,
    pub employment_type: Option<EmploymentType>,
    pub remote: bool,
    pub limit: usize,
}

impl JobQuery {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            location: String::new(),
            experience_level: None,
            company_size: None,
            employment_type: None,
            remote: false,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_experience_level(mut self, level: ExperienceLevel) -> Self {
        self.experience_level = Some(level);
        self
    }

    pub fn with_company_size(mut self, size: CompanySize) -> Self {
        self.company_size = Some(size);
        self
    }

    pub fn with_employment_type(mut self, employment_type: EmploymentType) -> Self {
        self.employment_type = Some(employment_type);
        self
    }

    pub fn with_remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    /// Set the result limit, clamped to `1..=50`.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self
    }

    /// The limit actually honoured, whatever was written into the field.
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Same query asking for a different number of records.
    pub fn with_share(&self, limit: usize) -> Self {
        self.clone().with_limit(limit)
    }

    /// Canonical cache key; every parameter participates.
    pub fn cache_key(&self, kind: &str) -> String {
        CacheKey::new(kind)
            .param("keywords", &self.keywords)
            .param("location", &self.location)
            .param(
                "experience",
                self.experience_level.map(|l| l.as_str()).unwrap_or(""),
            )
            .param(
                "company_size",
                self.company_size.map(|s| s.as_str()).unwrap_or(""),
            )
            .param(
                "employment",
                self.employment_type.map(|e| e.as_str()).unwrap_or(""),
            )
            .param("remote", if self.remote { "true" } else { "false" })
            .param("limit", &self.effective_limit().to_string())
            .build()
    }
}

/// Builder for `kind|param=value|...` cache keys.
///
/// Values are normalised, then form-encoded so a `|` or `=` inside a value
/// cannot forge another parameter.
#[derive(Debug, Clone)]
pub struct CacheKey {
    buf: String,
}

impl CacheKey {
    pub fn new(kind: &str) -> Self {
        Self {
            buf: kind.to_string(),
        }
    }

    pub fn param(mut self, name: &str, value: &str) -> Self {
        let normalized = normalize_key_part(value);
        let encoded: String = form_urlencoded::byte_serialize(normalized.as_bytes()).collect();
        let _ = write!(self.buf, "|{name}={encoded}");
        self
    }

    pub fn build(self) -> String {
        self.buf
    }
}
