//! Group-level common free time: fetch everyone's availability, then intersect.
//!
//! Fetches fan out concurrently and are joined before any intersection work
//! starts. The join is all-or-nothing: one failed or slow participant fails the
//! whole group.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::error::{NuttyError, Result};
use crate::record::{AvailabilityRecord, CommonTimeSlot, UserId};
use crate::source::AvailabilitySource;
use crate::sweep::{ensure_unique, intersect_records};

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Tuning for [`compute_common_free_time`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Budget for the entire fetch fan-out, in milliseconds.
    pub fetch_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Find every maximal window, per date, in which all of `user_ids` are free.
///
/// An empty `user_ids` returns an empty list without touching `source`.
///
/// # Errors
/// - `NuttyError::DuplicateUser` if an identifier is repeated (checked before fetching).
/// - `NuttyError::Fetch` for the first participant whose fetch fails.
/// - `NuttyError::Timeout` if the fan-out exceeds `config.fetch_timeout()`.
/// - `NuttyError::InvalidRecord` if any fetched record has `start_time >= end_time`.
pub async fn compute_common_free_time(
    source: &dyn AvailabilitySource,
    user_ids: &[UserId],
    config: &EngineConfig,
) -> Result<Vec<CommonTimeSlot>> {
    ensure_unique(user_ids)?;
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let budget = config.fetch_timeout();
    let fetches = user_ids.iter().map(|user_id| async move {
        tracing::debug!(%user_id, "fetching availability");
        source
            .fetch_availability(user_id)
            .await
            .map_err(|err| {
                tracing::warn!(%user_id, error = %err, "availability fetch failed");
                NuttyError::Fetch {
                    user_id: user_id.clone(),
                    source: err,
                }
            })
    });

    let fetched = match tokio::time::timeout(budget, try_join_all(fetches)).await {
        Ok(result) => result?,
        Err(_) => {
            tracing::warn!(users = user_ids.len(), ?budget, "availability fetch timed out");
            return Err(NuttyError::Timeout(budget));
        }
    };

    // Records are attributed to the identifier they were fetched for.
    let mut records: Vec<AvailabilityRecord> = Vec::new();
    for (user_id, user_records) in user_ids.iter().zip(fetched) {
        records.extend(user_records.into_iter().map(|r| AvailabilityRecord {
            user_id: user_id.clone(),
            ..r
        }));
    }

    let slots = intersect_records(user_ids, &records)?;
    tracing::info!(
        users = user_ids.len(),
        records = records.len(),
        slots = slots.len(),
        "computed common free time"
    );
    Ok(slots)
}

/// A source and config bundled for repeated queries.
#[derive(Clone)]
pub struct CommonTimeFinder {
    source: Arc<dyn AvailabilitySource>,
    config: EngineConfig,
}

impl CommonTimeFinder {
    pub fn new(source: Arc<dyn AvailabilitySource>) -> Self {
        CommonTimeFinder {
            source,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn find(&self, user_ids: &[UserId]) -> Result<Vec<CommonTimeSlot>> {
        compute_common_free_time(self.source.as_ref(), user_ids, &self.config).await
    }
}
