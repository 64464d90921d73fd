//! Where availability comes from.
//!
//! The engine never reaches for a global backend client; callers hand it an
//! [`AvailabilitySource`]. [`InMemorySource`] is the bundled implementation,
//! used by the CLI (records loaded from a file) and by tests (including
//! injected failures).

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::record::{AvailabilityRecord, UserId};

/// Outbound port: look up every availability record a user has declared.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// All records for `user_id`. A user with no records yields an empty list.
    async fn fetch_availability(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AvailabilityRecord>, FetchError>;
}

#[derive(Default)]
struct Store {
    records: HashMap<UserId, Vec<AvailabilityRecord>>,
    failures: HashMap<UserId, FetchError>,
}

/// Availability held in process memory.
#[derive(Default)]
pub struct InMemorySource {
    store: RwLock<Store>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from a flat list, grouping records by owner.
    pub fn from_records(records: impl IntoIterator<Item = AvailabilityRecord>) -> Self {
        let mut grouped: HashMap<UserId, Vec<AvailabilityRecord>> = HashMap::new();
        for record in records {
            grouped.entry(record.user_id.clone()).or_default().push(record);
        }
        InMemorySource {
            store: RwLock::new(Store {
                records: grouped,
                failures: HashMap::new(),
            }),
        }
    }

    /// Replace everything `user_id` has declared with `records`.
    ///
    /// Incoming records are re-tagged to `user_id`; an empty list clears the user.
    pub fn replace_user_availability(
        &self,
        user_id: &UserId,
        records: Vec<AvailabilityRecord>,
    ) -> Result<usize, FetchError> {
        let records: Vec<AvailabilityRecord> = records
            .into_iter()
            .map(|r| AvailabilityRecord {
                user_id: user_id.clone(),
                ..r
            })
            .collect();
        let count = records.len();

        let mut store = self.write()?;
        if records.is_empty() {
            store.records.remove(user_id);
        } else {
            store.records.insert(user_id.clone(), records);
        }
        Ok(count)
    }

    /// A user's records ordered by date, then start time.
    pub fn user_availability(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AvailabilityRecord>, FetchError> {
        let store = self.read()?;
        let mut records = store.records.get(user_id).cloned().unwrap_or_default();
        records.sort_by_key(|r| (r.date, r.start_time));
        Ok(records)
    }

    /// Make every subsequent fetch for `user_id` fail with `error`.
    pub fn fail_for(&self, user_id: &UserId, error: FetchError) -> Result<(), FetchError> {
        self.write()?.failures.insert(user_id.clone(), error);
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Store>, FetchError> {
        self.store
            .read()
            .map_err(|_| FetchError::Unavailable("availability store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Store>, FetchError> {
        self.store
            .write()
            .map_err(|_| FetchError::Unavailable("availability store lock poisoned".to_string()))
    }
}

#[async_trait]
impl AvailabilitySource for InMemorySource {
    async fn fetch_availability(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<AvailabilityRecord>, FetchError> {
        if let Some(error) = self.read()?.failures.get(user_id) {
            return Err(error.clone());
        }
        self.user_availability(user_id)
    }
}
