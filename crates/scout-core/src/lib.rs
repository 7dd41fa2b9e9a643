pub mod cache;
pub mod clock;
pub mod config;
pub mod dedup;
pub mod error;
pub mod insight;
pub mod models;
pub mod orchestrator;
pub mod posted;
pub mod query;
pub mod reporter;
pub mod synthetic;
pub mod text;
pub mod throttle;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use cache::ResultCache;
pub use clock::{Clock, SystemClock};
pub use config::ScoutConfig;
pub use error::{AppError, FailureKind};
pub use insight::{CompanyInfo, MarketTrends, SalaryBand, SalaryInsight};
pub use models::{
    CompanySize, EmploymentType, JobDraft, JobRecord, Payload, RemoteType, SourceTag, Tier,
    compute_hash,
};
pub use orchestrator::{FallbackOrchestrator, OrchestratorConfig};
pub use posted::PostedDate;
pub use query::{ExperienceLevel, JobQuery};
pub use reporter::{FallbackEvent, FallbackReporter, SilentReporter, TracingReporter};
pub use synthetic::{SyntheticGenerator, SyntheticKind, SyntheticRequest};
pub use throttle::{RateLimitedFetcher, ThrottleConfig};
pub use traits::{CompanyDirectory, FetchRequest, Fetcher, JobSource, Method, Prompt, TextGenerator};
