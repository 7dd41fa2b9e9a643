use std::future::Future;

use async_trait::async_trait;

use crate::error::AppError;
use crate::insight::CompanyInfo;
use crate::models::{JobRecord, Tier};
use crate::query::JobQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An outbound HTTP request as built by an adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub json: Option<serde_json::Value>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            bearer: None,
            json: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            json: Some(body),
            ..Self::get(url)
        }
    }

    pub fn with_param(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// First value of a query parameter, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Performs HTTP requests and returns the response body.
///
/// Non-2xx statuses, timeouts and connection failures come back as typed
/// [`AppError`]s, never as panics.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// One external job source, queried through its own request format.
///
/// `Ok(vec![])` means the source answered and had nothing; `Err` means the
/// source could not be queried or its answer could not be understood.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Short name used in source tags and ids (`indeed`, `linkedin`).
    fn name(&self) -> &str;

    fn tier(&self) -> Tier;

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, AppError>;
}

/// A chat prompt for the text-generation backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Text-generation backend (OpenAI-compatible chat completions).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model(&self) -> &str;

    /// Returns the raw completion text, fences and all.
    async fn complete(&self, prompt: &Prompt) -> Result<String, AppError>;
}

/// Looks up company profiles in an external directory.
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when the directory has no such company.
    async fn lookup(&self, company: &str) -> Result<Option<CompanyInfo>, AppError>;
}
