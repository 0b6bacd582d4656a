//! Upload-completion polling.
//!
//! Phrase processes uploads asynchronously. After creating one, callers poll
//! its state on a fixed cadence until it is terminal or the attempt budget
//! runs out:
//!
//! ```text
//! PENDING --success--> SUCCESS   (true)
//! PENDING --error----> ERROR     (false, warning)
//! PENDING --budget---> TIMEOUT   (false, warning)
//! PENDING --other----> PENDING
//! PENDING --transport failure--> Err(_)
//! ```
//!
//! The budget is checked before each query, so at most `attempts` queries are
//! ever issued and a timeout is reported exactly `interval * attempts` after
//! the call started.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use phrasebridge_core::{ProjectId, UploadId, UploadState};

use crate::error::{invalid_argument, PhraseError};

/// Read access to the processing state of an upload.
#[async_trait]
pub trait UploadStatusSource: Send + Sync {
    /// Query the current state of `upload_id` in `project_id`.
    ///
    /// Transport failures (network errors, non-200 responses) are errors.
    /// A body that cannot be interpreted is reported as [`UploadState::Pending`].
    async fn query_upload_status(
        &self,
        project_id: &ProjectId,
        upload_id: &UploadId,
    ) -> Result<UploadState, PhraseError>;
}

/// Cadence and budget for [`poll_upload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each query.
    pub interval: Duration,
    /// Maximum number of queries.
    pub attempts: u32,
}

impl PollPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);
    pub const DEFAULT_ATTEMPTS: u32 = 5;

    pub fn new(interval: Duration, attempts: u32) -> Self {
        Self { interval, attempts }
    }

    /// Total time a run that never reaches a terminal state waits.
    pub fn budget(&self) -> Duration {
        self.interval * self.attempts
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL, Self::DEFAULT_ATTEMPTS)
    }
}

/// How a poll run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Phrase reported `success`.
    Succeeded,
    /// Phrase reported `error`.
    Failed,
    /// The attempt budget ran out while the upload was still pending.
    TimedOut { waited: Duration },
}

impl PollOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollOutcome::Succeeded => write!(f, "upload succeeded"),
            PollOutcome::Failed => write!(f, "upload details returned error state"),
            PollOutcome::TimedOut { waited } => {
                write!(f, "timed out after {}ms", waited.as_millis())
            }
        }
    }
}

/// Recurring timer owned by one poll run. Dropping it stops the ticks.
struct PollTicker {
    interval: Interval,
}

impl PollTicker {
    /// First tick fires one full period after start.
    fn start(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

impl Drop for PollTicker {
    fn drop(&mut self) {
        tracing::trace!("upload poll timer released");
    }
}

/// Poll `upload_id` until it reaches a terminal state or `policy` is exhausted.
///
/// Empty identifiers and a zero interval are rejected before any query.
/// A transport failure aborts the run and is returned as-is.
pub async fn poll_upload<S>(
    source: &S,
    project_id: &ProjectId,
    upload_id: &UploadId,
    policy: PollPolicy,
) -> Result<PollOutcome, PhraseError>
where
    S: UploadStatusSource + ?Sized,
{
    if upload_id.as_str().trim().is_empty() {
        return Err(invalid_argument("upload id must not be empty"));
    }
    if project_id.as_str().trim().is_empty() {
        return Err(invalid_argument("project id must not be empty"));
    }
    if policy.interval.is_zero() {
        return Err(invalid_argument("poll interval must be greater than zero"));
    }

    let mut ticker = PollTicker::start(policy.interval);
    for attempt in 1..=policy.attempts {
        ticker.tick().await;
        let state = source.query_upload_status(project_id, upload_id).await?;
        tracing::debug!(upload_id = %upload_id, attempt, state = %state, "polled upload state");

        match state {
            UploadState::Success => return Ok(PollOutcome::Succeeded),
            UploadState::Error => {
                let outcome = PollOutcome::Failed;
                tracing::warn!(upload_id = %upload_id, "{outcome}");
                return Ok(outcome);
            }
            UploadState::Pending => {}
        }
    }

    let outcome = PollOutcome::TimedOut {
        waited: policy.budget(),
    };
    tracing::warn!(
        upload_id = %upload_id,
        "{outcome} while waiting for phrase to process upload with id {upload_id}"
    );
    Ok(outcome)
}

/// [`poll_upload`] reduced to whether the upload succeeded.
pub async fn ensure_upload_succeeded<S>(
    source: &S,
    project_id: &ProjectId,
    upload_id: &UploadId,
    policy: PollPolicy,
) -> Result<bool, PhraseError>
where
    S: UploadStatusSource + ?Sized,
{
    Ok(poll_upload(source, project_id, upload_id, policy)
        .await?
        .is_success())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
