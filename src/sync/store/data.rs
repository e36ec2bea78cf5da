use chrono::{DateTime, Utc};

use crate::sync::{FetchError, ResourceKey};

/// What the cache knows about one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// Last successful payload. Never reset by a later failure.
    pub data: Option<T>,
    /// Outcome of the most recent attempt when it failed
    pub error: Option<FetchError>,
    /// When `data` was last replaced
    pub fetched_at: Option<DateTime<Utc>>,
    /// A fetch for this key is in flight
    pub is_validating: bool,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            fetched_at: None,
            is_validating: false,
        }
    }
}

/// Summary of a [`CacheEntry`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Nothing fetched and nothing in flight
    Idle,
    /// First fetch in flight
    Loading,
    Ready,
    /// Data is present but the latest attempt failed
    Stale,
    /// Every attempt so far failed
    Failed,
}

impl<T> CacheEntry<T> {
    pub fn status(&self) -> EntryStatus {
        match (&self.data, &self.error) {
            (Some(_), Some(_)) => EntryStatus::Stale,
            (Some(_), None) => EntryStatus::Ready,
            (None, _) if self.is_validating => EntryStatus::Loading,
            (None, Some(_)) => EntryStatus::Failed,
            (None, None) => EntryStatus::Idle,
        }
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn apply(&mut self, patch: EntryPatch<T>) {
        if let Some(data) = patch.data {
            self.data = Some(data);
        }
        if let Some(error) = patch.error {
            self.error = error;
        }
        if let Some(fetched_at) = patch.fetched_at {
            self.fetched_at = Some(fetched_at);
        }
        if let Some(is_validating) = patch.is_validating {
            self.is_validating = is_validating;
        }
    }
}

/// A partial update to a [`CacheEntry`]. `None` fields are left untouched.
///
/// There is no way to clear `data`: a failed fetch only sets `error`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPatch<T> {
    pub data: Option<T>,
    /// `Some(None)` clears the error
    pub error: Option<Option<FetchError>>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub is_validating: Option<bool>,
}

impl<T> Default for EntryPatch<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            fetched_at: None,
            is_validating: None,
        }
    }
}

impl<T> EntryPatch<T> {
    /// Marks a fetch as started.
    pub fn validating() -> Self {
        Self {
            is_validating: Some(true),
            ..Default::default()
        }
    }

    pub fn success(data: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            data: Some(data),
            error: Some(None),
            fetched_at: Some(fetched_at),
            is_validating: Some(false),
        }
    }

    pub fn failure(error: FetchError) -> Self {
        Self {
            error: Some(Some(error)),
            is_validating: Some(false),
            ..Default::default()
        }
    }

    /// Commits the outcome of a fetch.
    pub fn settled(result: Result<T, FetchError>, fetched_at: DateTime<Utc>) -> Self {
        match result {
            Ok(data) => Self::success(data, fetched_at),
            Err(error) => Self::failure(error),
        }
    }
}

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(super) u64);

/// Delivered to listeners after every change to their key.
#[derive(Debug, Clone, PartialEq)]
pub struct Update<T> {
    pub key: ResourceKey,
    pub entry: CacheEntry<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        let mut entry = CacheEntry::<u32>::default();
        assert_eq!(entry.status(), EntryStatus::Idle);

        entry.apply(EntryPatch::validating());
        assert_eq!(entry.status(), EntryStatus::Loading);

        entry.apply(EntryPatch::failure(FetchError::Http { status: 502 }));
        assert_eq!(entry.status(), EntryStatus::Failed);

        entry.apply(EntryPatch::success(7, Utc::now()));
        assert_eq!(entry.status(), EntryStatus::Ready);
        assert_eq!(entry.error, None);

        entry.apply(EntryPatch::failure(FetchError::Network("reset".into())));
        assert_eq!(entry.status(), EntryStatus::Stale);
        assert_eq!(entry.data, Some(7));
    }

    #[test]
    fn test_failure_keeps_data_and_fetched_at() {
        let at = Utc::now();
        let mut entry = CacheEntry::default();
        entry.apply(EntryPatch::success("payload", at));
        entry.apply(EntryPatch::validating());
        entry.apply(EntryPatch::failure(FetchError::Decode("eof".into())));

        assert_eq!(entry.data, Some("payload"));
        assert_eq!(entry.fetched_at, Some(at));
        assert!(!entry.is_validating);
        assert!(entry.error.is_some());
    }
}
