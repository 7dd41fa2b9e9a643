use crate::error::FailureKind;
use crate::models::SourceTag;

/// Where a request is in its walk down the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackEvent<'a> {
    CacheHit {
        key: &'a str,
    },
    TierAttempt {
        key: &'a str,
        tier: &'a SourceTag,
    },
    TierFailed {
        key: &'a str,
        tier: &'a SourceTag,
        reason: FailureKind,
        detail: &'a str,
    },
    Served {
        key: &'a str,
        tier: &'a SourceTag,
        records: usize,
    },
}

/// Receives orchestrator progress events.
///
/// Decouples the fallback policy from how transitions are observed.
pub trait FallbackReporter: Send + Sync {
    fn report(&self, event: FallbackEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FallbackReporter for TracingReporter {
    fn report(&self, event: FallbackEvent<'_>) {
        match event {
            FallbackEvent::CacheHit { key } => {
                tracing::debug!(%key, "Served from cache");
            }
            FallbackEvent::TierAttempt { key, tier } => {
                tracing::debug!(%key, %tier, "Trying tier");
            }
            FallbackEvent::TierFailed {
                key,
                tier,
                reason,
                detail,
            } => {
                tracing::warn!(%key, %tier, %reason, %detail, "Tier failed, falling through");
            }
            FallbackEvent::Served { key, tier, records } => {
                tracing::info!(%key, %tier, records, "Request served");
            }
        }
    }
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl FallbackReporter for SilentReporter {}
