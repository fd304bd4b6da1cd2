//! Purge policies deciding which tiles to evict.
//!
//! # Design
//!
//! Policies are pure selectors: they consume the backend's read-only query
//! surface ([`PurgeQueries`]) and return the keys to remove, deterministically
//! ordered oldest-first. They never mutate the backend; the cache manager
//! performs the actual delete. This keeps policy logic independently testable
//! against a fake backend.
//!
//! Two built-in policies exist, selected by
//! [`PurgeStrategy`](crate::cache::PurgeStrategy):
//!
//! - [`CountBasedPurge`] bounds the tile count, always removing at least
//!   `minimal_purge` entries per pass so the purge cost amortizes across many
//!   writes instead of removing one tile per store.
//! - [`TimeBasedPurge`] removes entries older than the expiry period, then
//!   extends the selection count-based if the remainder still exceeds
//!   capacity. Age expiry is a pre-filter, not a substitute for the capacity
//!   bound.

use std::collections::HashSet;

use crate::cache::types::{CacheConfig, PurgeStrategy, StorageError, TileKey};

/// Read-only query surface purge policies run against.
///
/// Implemented by the SQLite store; tests implement it with an in-memory
/// fake.
pub trait PurgeQueries {
    /// Number of entries currently stored.
    fn count_entries(&self) -> Result<u64, StorageError>;

    /// Up to `limit` keys ordered by ascending last access, ties broken by
    /// insertion order.
    fn oldest_entries(&self, limit: u64) -> Result<Vec<TileKey>, StorageError>;

    /// All keys whose last access is strictly before `threshold`
    /// (unix-epoch milliseconds), oldest first.
    fn entries_older_than(&self, threshold: i64) -> Result<Vec<TileKey>, StorageError>;
}

/// Strategy deciding which entries a purge pass removes.
pub trait PurgePolicy {
    /// Select the keys to evict given the current configuration.
    ///
    /// `now` is the current time in unix-epoch milliseconds. Returns an
    /// empty selection when no eviction is needed.
    fn select_for_eviction(
        &self,
        backend: &dyn PurgeQueries,
        config: &CacheConfig,
        now: i64,
    ) -> Result<Vec<TileKey>, StorageError>;
}

impl PurgeStrategy {
    /// The policy implementing this strategy.
    pub fn policy(self) -> &'static dyn PurgePolicy {
        match self {
            PurgeStrategy::CountBased => &CountBasedPurge,
            PurgeStrategy::TimeBased => &TimeBasedPurge,
        }
    }
}

/// Evict the oldest entries once the tile count exceeds capacity.
///
/// Removes `max(minimal_purge, count - capacity)` entries per pass. The
/// `minimal_purge` floor applies to every pass.
pub struct CountBasedPurge;

impl PurgePolicy for CountBasedPurge {
    fn select_for_eviction(
        &self,
        backend: &dyn PurgeQueries,
        config: &CacheConfig,
        _now: i64,
    ) -> Result<Vec<TileKey>, StorageError> {
        let count = backend.count_entries()?;
        if count <= config.capacity {
            return Ok(Vec::new());
        }

        let victims = (count - config.capacity)
            .max(config.minimal_purge)
            .min(count);
        backend.oldest_entries(victims)
    }
}

/// Evict entries older than the expiry period, with a count-based fallback.
///
/// Active only when `expiry_period` is non-zero; with a zero period this
/// degrades to pure count-based selection. Expired entries are selected
/// regardless of capacity. If the surviving entries still exceed capacity,
/// the selection extends count-based over the remainder.
pub struct TimeBasedPurge;

impl PurgePolicy for TimeBasedPurge {
    fn select_for_eviction(
        &self,
        backend: &dyn PurgeQueries,
        config: &CacheConfig,
        now: i64,
    ) -> Result<Vec<TileKey>, StorageError> {
        if config.expiry_period.is_zero() {
            return CountBasedPurge.select_for_eviction(backend, config, now);
        }

        let threshold = now - config.expiry_period.as_millis() as i64;
        let mut selected = backend.entries_older_than(threshold)?;

        let count = backend.count_entries()?;
        let surviving = count - selected.len() as u64;
        if surviving > config.capacity {
            let extra = (surviving - config.capacity).max(config.minimal_purge);
            let want = (selected.len() as u64 + extra).min(count);

            // Expired entries are the oldest by construction, so the
            // oldest-first listing is a superset of the expired selection.
            let seen: HashSet<TileKey> = selected.iter().cloned().collect();
            for key in backend.oldest_entries(want)? {
                if !seen.contains(&key) {
                    selected.push(key);
                }
            }
        }

        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// In-memory backend holding `(key, last_access)` pairs in insertion
    /// order.
    struct FakeBackend {
        entries: Vec<(TileKey, i64)>,
    }

    impl FakeBackend {
        fn new(entries: Vec<(TileKey, i64)>) -> Self {
            Self { entries }
        }

        fn sorted_keys(&self) -> Vec<TileKey> {
            let mut indexed: Vec<(usize, &(TileKey, i64))> =
                self.entries.iter().enumerate().collect();
            indexed.sort_by_key(|(idx, (_, ts))| (*ts, *idx));
            indexed.into_iter().map(|(_, (key, _))| key.clone()).collect()
        }
    }

    impl PurgeQueries for FakeBackend {
        fn count_entries(&self) -> Result<u64, StorageError> {
            Ok(self.entries.len() as u64)
        }

        fn oldest_entries(&self, limit: u64) -> Result<Vec<TileKey>, StorageError> {
            let mut keys = self.sorted_keys();
            keys.truncate(limit as usize);
            Ok(keys)
        }

        fn entries_older_than(&self, threshold: i64) -> Result<Vec<TileKey>, StorageError> {
            let mut indexed: Vec<(usize, &(TileKey, i64))> = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, (_, ts))| *ts < threshold)
                .collect();
            indexed.sort_by_key(|(idx, (_, ts))| (*ts, *idx));
            Ok(indexed.into_iter().map(|(_, (key, _))| key.clone()).collect())
        }
    }

    fn key(col: u32) -> TileKey {
        TileKey::new("osm", 15, col, 100)
    }

    fn backend_with_ages(ages: &[i64]) -> FakeBackend {
        FakeBackend::new(
            ages.iter()
                .enumerate()
                .map(|(i, ts)| (key(i as u32), *ts))
                .collect(),
        )
    }

    #[test]
    fn test_count_based_under_capacity_selects_nothing() {
        let backend = backend_with_ages(&[1000, 2000, 3000]);
        let config = CacheConfig::default().with_capacity(3).with_minimal_purge(1);

        let selected = CountBasedPurge
            .select_for_eviction(&backend, &config, 5000)
            .unwrap();

        assert!(selected.is_empty());
    }

    #[test]
    fn test_count_based_selects_excess_oldest_first() {
        let backend = backend_with_ages(&[1000, 2000, 3000, 4000]);
        let config = CacheConfig::default().with_capacity(3).with_minimal_purge(1);

        let selected = CountBasedPurge
            .select_for_eviction(&backend, &config, 5000)
            .unwrap();

        assert_eq!(selected, vec![key(0)]);
    }

    #[test]
    fn test_count_based_applies_minimal_purge_floor() {
        let backend = backend_with_ages(&[1000, 2000, 3000, 4000, 5000, 6000]);
        let config = CacheConfig::default().with_capacity(5).with_minimal_purge(3);

        let selected = CountBasedPurge
            .select_for_eviction(&backend, &config, 7000)
            .unwrap();

        // Excess is 1, but the floor removes 3 per pass.
        assert_eq!(selected, vec![key(0), key(1), key(2)]);
    }

    #[test]
    fn test_count_based_minimal_purge_capped_at_count() {
        let backend = backend_with_ages(&[1000, 2000]);
        let config = CacheConfig::default().with_capacity(1).with_minimal_purge(100);

        let selected = CountBasedPurge
            .select_for_eviction(&backend, &config, 5000)
            .unwrap();

        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_count_based_is_deterministic_under_ties() {
        let backend = backend_with_ages(&[1000, 1000, 1000, 1000]);
        let config = CacheConfig::default().with_capacity(2).with_minimal_purge(2);

        let first = CountBasedPurge
            .select_for_eviction(&backend, &config, 5000)
            .unwrap();
        let second = CountBasedPurge
            .select_for_eviction(&backend, &config, 5000)
            .unwrap();

        // Insertion order breaks the tie, identically on every run.
        assert_eq!(first, vec![key(0), key(1)]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_time_based_selects_expired_entries() {
        let backend = backend_with_ages(&[1000, 2000, 9000]);
        let config = CacheConfig::default()
            .with_capacity(100)
            .with_minimal_purge(1)
            .with_expiry_period(Duration::from_millis(5000));

        let selected = TimeBasedPurge
            .select_for_eviction(&backend, &config, 10_000)
            .unwrap();

        // Threshold is 5000; entries at 1000 and 2000 are expired.
        assert_eq!(selected, vec![key(0), key(1)]);
    }

    #[test]
    fn test_time_based_ignores_capacity_for_expired() {
        // Everything expired even though well under capacity.
        let backend = backend_with_ages(&[100, 200, 300]);
        let config = CacheConfig::default()
            .with_capacity(1000)
            .with_minimal_purge(1)
            .with_expiry_period(Duration::from_millis(10));

        let selected = TimeBasedPurge
            .select_for_eviction(&backend, &config, 10_000)
            .unwrap();

        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_time_based_falls_back_to_count_based() {
        // One expired entry, but four survivors against a capacity of two.
        let backend = backend_with_ages(&[1000, 6000, 7000, 8000, 9000]);
        let config = CacheConfig::default()
            .with_capacity(2)
            .with_minimal_purge(1)
            .with_expiry_period(Duration::from_millis(5000));

        let selected = TimeBasedPurge
            .select_for_eviction(&backend, &config, 10_000)
            .unwrap();

        // Expired: key(0). Survivors exceed capacity by 2, so the two next
        // oldest join the selection.
        assert_eq!(selected, vec![key(0), key(1), key(2)]);
    }

    #[test]
    fn test_time_based_fallback_applies_minimal_purge_floor() {
        let backend = backend_with_ages(&[6000, 7000, 8000, 9000]);
        let config = CacheConfig::default()
            .with_capacity(3)
            .with_minimal_purge(2)
            .with_expiry_period(Duration::from_millis(5000));

        let selected = TimeBasedPurge
            .select_for_eviction(&backend, &config, 10_000)
            .unwrap();

        // Nothing expired; survivors exceed capacity by 1 but the floor
        // removes 2.
        assert_eq!(selected, vec![key(0), key(1)]);
    }

    #[test]
    fn test_time_based_zero_expiry_degrades_to_count_based() {
        let backend = backend_with_ages(&[1000, 2000, 3000, 4000]);
        let config = CacheConfig::default()
            .with_capacity(3)
            .with_minimal_purge(1)
            .with_expiry_period(Duration::ZERO);

        let selected = TimeBasedPurge
            .select_for_eviction(&backend, &config, 10_000)
            .unwrap();

        assert_eq!(selected, vec![key(0)]);
    }

    #[test]
    fn test_time_based_nothing_expired_under_capacity() {
        let backend = backend_with_ages(&[9000, 9500]);
        let config = CacheConfig::default()
            .with_capacity(10)
            .with_minimal_purge(1)
            .with_expiry_period(Duration::from_millis(5000));

        let selected = TimeBasedPurge
            .select_for_eviction(&backend, &config, 10_000)
            .unwrap();

        assert!(selected.is_empty());
    }

    #[test]
    fn test_strategy_dispatch() {
        let backend = backend_with_ages(&[1000, 2000, 3000, 4000]);
        let config = CacheConfig::default().with_capacity(3).with_minimal_purge(1);

        let selected = PurgeStrategy::CountBased
            .policy()
            .select_for_eviction(&backend, &config, 5000)
            .unwrap();

        assert_eq!(selected, vec![key(0)]);
    }
}
