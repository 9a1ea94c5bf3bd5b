//! Single-slot save cache
//!
//! Remembers the last payload that was persisted together with the key the
//! store assigned to it. Saving a deep-equal payload again resolves to the
//! cached key without touching the store.
//!
//! The slot is replaced wholesale on every miss; there is no history.
//! Concurrent saves are allowed but unordered: the last one to complete
//! owns the slot.

use crate::app_data::AppData;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Payload that can be recognized as not worth saving
pub trait CachePayload {
    /// True when saving would persist nothing meaningful
    fn is_trivial(&self) -> bool;
}

impl CachePayload for AppData {
    #[inline]
    fn is_trivial(&self) -> bool {
        AppData::is_trivial(self)
    }
}

impl CachePayload for Value {
    fn is_trivial(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

/// Equality used to detect a cache hit
pub type EqualityFn<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Last successful save
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSaveEntry<T> {
    /// Store-assigned key
    pub key: String,
    /// Payload exactly as saved
    pub data: T,
    /// When the save completed
    pub saved_at: DateTime<Utc>,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Saves answered from the slot
    pub hit_count: u64,
    /// Saves that reached the store
    pub miss_count: u64,
}

/// Slot state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing saved yet
    Empty,
    /// Holds the last save
    Populated,
}

/// How a save request was answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Payload was trivial; nothing persisted and no key
    Skipped,
    /// Payload equal to the cached one; key reused
    Reused(String),
    /// Payload persisted under a new key
    Saved(String),
}

impl SaveOutcome {
    /// Resulting key, empty for [`SaveOutcome::Skipped`]
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Skipped => "",
            Self::Reused(key) | Self::Saved(key) => key,
        }
    }

    /// Whether the store was called
    #[inline]
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

struct Slot<T> {
    entry: Option<CachedSaveEntry<T>>,
    stats: CacheStats,
}

/// Single-slot cache keyed by payload equality
pub struct StateCache<T> {
    slot: Mutex<Slot<T>>,
    equality: EqualityFn<T>,
    clock: Arc<dyn Clock>,
}

impl<T> StateCache<T>
where
    T: PartialEq + 'static,
{
    /// Create cache comparing payloads with `PartialEq`
    #[must_use]
    pub fn new() -> Self {
        Self::with_equality(Arc::new(|a: &T, b: &T| a == b))
    }
}

impl<T> Default for StateCache<T>
where
    T: PartialEq + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateCache<T> {
    /// Create cache with a custom equality
    #[must_use]
    pub fn with_equality(equality: EqualityFn<T>) -> Self {
        Self {
            slot: Mutex::new(Slot {
                entry: None,
                stats: CacheStats::default(),
            }),
            equality,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for `saved_at`
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.slot.lock().stats
    }

    /// Slot state
    #[must_use]
    pub fn state(&self) -> CacheState {
        if self.slot.lock().entry.is_some() {
            CacheState::Populated
        } else {
            CacheState::Empty
        }
    }

    /// Drop the cached entry, keeping the counters
    pub fn clear(&self) {
        self.slot.lock().entry = None;
    }
}

impl<T: Clone> StateCache<T> {
    /// Copy of the cached entry
    #[must_use]
    pub fn entry(&self) -> Option<CachedSaveEntry<T>> {
        self.slot.lock().entry.clone()
    }
}

impl<T> StateCache<T>
where
    T: CachePayload + Clone,
{
    /// Key of the cached entry if `data` equals it, counting a hit
    pub fn reuse(&self, data: &T) -> Option<String> {
        let mut slot = self.slot.lock();
        let key = slot
            .entry
            .as_ref()
            .filter(|entry| (self.equality)(&entry.data, data))
            .map(|entry| entry.key.clone())?;
        slot.stats.hit_count += 1;
        metrics::counter!("appnav_state_cache_hits_total").increment(1);
        Some(key)
    }

    /// Save `data` through `persist` unless it is trivial or already cached
    ///
    /// The slot is only replaced when `persist` succeeds.
    ///
    /// # Errors
    /// Whatever `persist` fails with.
    pub async fn save_or_reuse<F, Fut, E>(&self, data: T, persist: F) -> Result<SaveOutcome, E>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if data.is_trivial() {
            debug!("trivial payload, nothing to save");
            return Ok(SaveOutcome::Skipped);
        }
        if let Some(key) = self.reuse(&data) {
            debug!(%key, "payload unchanged, reusing saved key");
            return Ok(SaveOutcome::Reused(key));
        }

        self.slot.lock().stats.miss_count += 1;
        metrics::counter!("appnav_state_cache_misses_total").increment(1);

        let key = persist(data.clone()).await?;
        info!(%key, "app state saved");
        let entry = CachedSaveEntry {
            key: key.clone(),
            data,
            saved_at: self.clock.now(),
        };
        self.slot.lock().entry = Some(entry);
        Ok(SaveOutcome::Saved(key))
    }
}

impl<T> Debug for StateCache<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("StateCache")
            .field("populated", &slot.entry.is_some())
            .field("stats", &slot.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appnav_selection::SelectionVariant;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed;

    impl Clock for Fixed {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        }
    }

    fn payload(customer: &str) -> AppData {
        let mut variant = SelectionVariant::new();
        variant
            .add_select_option("Customer", "I", "EQ", customer, None)
            .unwrap();
        AppData::with_selection(variant)
    }

    async fn save(
        cache: &StateCache<AppData>,
        data: AppData,
        calls: &AtomicUsize,
    ) -> Result<SaveOutcome, String> {
        cache
            .save_or_reuse(data, move |_| async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Ok(format!("K{n}"))
            })
            .await
    }

    #[tokio::test]
    async fn equal_payload_reuses_key() {
        let cache = StateCache::new();
        let calls = AtomicUsize::new(0);

        let first = save(&cache, payload("C1"), &calls).await.unwrap();
        let second = save(&cache, payload("C1"), &calls).await.unwrap();

        assert_eq!(first, SaveOutcome::Saved("K0".into()));
        assert_eq!(second, SaveOutcome::Reused("K0".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats(), CacheStats { hit_count: 1, miss_count: 1 });
    }

    #[tokio::test]
    async fn different_payload_persists_again() {
        let cache = StateCache::new();
        let calls = AtomicUsize::new(0);

        save(&cache, payload("C1"), &calls).await.unwrap();
        let second = save(&cache, payload("C2"), &calls).await.unwrap();

        assert_eq!(second.key(), "K1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.entry().unwrap().data, payload("C2"));
    }

    #[tokio::test]
    async fn trivial_payload_skips_store() {
        let cache = StateCache::new();
        let calls = AtomicUsize::new(0);

        let outcome = save(&cache, AppData::default(), &calls).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Skipped);
        assert_eq!(outcome.key(), "");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(cache.state(), CacheState::Empty);
    }

    #[tokio::test]
    async fn failed_persist_keeps_previous_entry() {
        let cache = StateCache::new().with_clock(Arc::new(Fixed));
        let calls = AtomicUsize::new(0);
        save(&cache, payload("C1"), &calls).await.unwrap();

        let err = cache
            .save_or_reuse(payload("C2"), |_| async { Err::<String, _>("offline") })
            .await
            .unwrap_err();

        assert_eq!(err, "offline");
        let entry = cache.entry().unwrap();
        assert_eq!(entry.key, "K0");
        assert_eq!(entry.saved_at, Fixed.now());
    }

    #[tokio::test]
    async fn custom_equality_is_used() {
        let cache: StateCache<serde_json::Value> =
            StateCache::with_equality(Arc::new(|a, b| a["id"] == b["id"]));

        let first = cache
            .save_or_reuse(json!({"id": 1, "scroll": 10}), |_| async {
                Ok::<_, ()>("A".to_string())
            })
            .await
            .unwrap();
        let second = cache
            .save_or_reuse(json!({"id": 1, "scroll": 99}), |_| async {
                Ok::<_, ()>("B".to_string())
            })
            .await
            .unwrap();

        assert!(first.is_saved());
        assert_eq!(second, SaveOutcome::Reused("A".into()));
    }
}
