pub mod fetcher;
pub mod glassdoor;
mod html;
pub mod indeed;
pub mod linkedin;
pub mod llm;
pub mod talent;
pub mod wiring;

pub use fetcher::ReqwestFetcher;
pub use glassdoor::GlassdoorSource;
pub use indeed::IndeedSource;
pub use linkedin::LinkedInSource;
pub use llm::OpenAiGenerator;
pub use talent::TalentSource;
pub use wiring::{build_orchestrator, build_with_fetcher};
