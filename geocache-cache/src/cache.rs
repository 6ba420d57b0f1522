//! Generic expiring cache with per-key load deduplication.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use geocache_core::error::Result;

use crate::config::{CacheConfig, ExpiryPolicy};
use crate::flight::{FlightGuard, Outcome, Slot};
use crate::value::CacheValue;

/// Monotonic counters shared with in-flight guards.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) coalesced: AtomicU64,
    pub(crate) loads: AtomicU64,
    pub(crate) load_failures: AtomicU64,
    pub(crate) cancelled_loads: AtomicU64,
}

/// Table size below which the miss path only sweeps on the time trigger.
const MIN_SWEEP_LEN: usize = 64;

/// When the miss path next purges expired entries.
#[derive(Debug)]
struct Sweep {
    last: Instant,
    next_len: usize,
}

/// What a caller has to do after consulting the slot table.
enum Begin<'a, K: Eq + Hash, V, E> {
    Hit(V),
    Wait(watch::Receiver<Outcome<V, E>>),
    Lead(FlightGuard<'a, K, V, E>),
}

/// In-memory cache whose entries expire after a TTL, with single-flight loads.
///
/// For any key, at most one loader runs at a time: callers arriving while a
/// load is in flight wait for it and receive the same value or error. Callers
/// for other keys are never held up; the internal lock only guards the slot
/// table and is never held while a loader runs.
///
/// Expiry is lazy. An entry whose lifetime has passed is treated as absent on
/// the next read and reloaded (collapsed like any other miss). Failures are
/// never stored. Misses also purge expired entries from the table, at most
/// once per TTL unless the table has doubled since the last purge, so keys
/// that are never read again do not accumulate.
///
/// Thread-safe; share it behind an `Arc` or a longer-lived owner.
pub struct ExpiringCache<K, V, E> {
    slots: Mutex<HashMap<K, Slot<V, E>>>,
    config: CacheConfig,
    next_flight: AtomicU64,
    counters: Counters,
    sweep: Mutex<Sweep>,
}

impl<K, V, E> ExpiringCache<K, V, E>
where
    K: Eq + Hash + Clone + Debug,
    V: CacheValue + Clone,
    E: Clone,
{
    /// Creates a cache, rejecting non-positive durations.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            slots: Mutex::new(HashMap::new()),
            config,
            next_flight: AtomicU64::new(1),
            counters: Counters::default(),
            sweep: Mutex::new(Sweep {
                last: Instant::now(),
                next_len: MIN_SWEEP_LEN,
            }),
        })
    }

    /// Creates a cache with fixed expiry after `ttl`.
    pub fn with_ttl(ttl: Duration) -> Result<Self> {
        Self::new(CacheConfig::with_ttl(ttl))
    }

    /// Returns the cached value for `key`, loading it with `loader` on a miss.
    ///
    /// - Hit: returns a clone of the stored value; `loader` is not called.
    /// - Miss with a load already running for `key`: waits for it and returns
    ///   its outcome; `loader` is not called.
    /// - Otherwise: calls `loader` exactly once, stores a successful value and
    ///   returns the outcome to this caller and every waiter.
    ///
    /// If the leading caller is cancelled before its loader finishes, waiters
    /// wake up and one of them runs its own loader.
    pub async fn get_or_load<F, Fut>(&self, key: K, loader: F) -> std::result::Result<V, E>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let guard = loop {
            match self.begin(&key) {
                Begin::Hit(value) => return Ok(value),
                Begin::Lead(guard) => break guard,
                Begin::Wait(mut rx) => {
                    let outcome = rx.wait_for(Option::is_some).await.ok().and_then(|r| (*r).clone());
                    match outcome {
                        Some(outcome) => return outcome,
                        None => debug!(?key, "in-flight load was cancelled, retrying"),
                    }
                }
            }
        };

        let outcome = loader(key).await;
        match &outcome {
            Ok(value) => {
                let lifetime = self.config.lifetime_for(value);
                debug!(key = ?guard.key(), ?lifetime, negative = value.is_negative(), "Loaded");
                guard.complete(&outcome, lifetime);
            }
            Err(_) => {
                debug!(key = ?guard.key(), "Load failed, not caching");
                guard.complete(&outcome, Duration::ZERO);
            }
        }
        outcome
    }

    /// Consults the slot table under the lock and decides this caller's role.
    fn begin(&self, key: &K) -> Begin<'_, K, V, E> {
        let now = Instant::now();
        let mut table = self.slots.lock();

        match table.get_mut(key) {
            Some(Slot::Ready(entry)) if !entry.is_expired(now) => {
                if self.config.expiry == ExpiryPolicy::AfterAccess {
                    entry.touch(now);
                }
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                trace!(?key, "Cache hit");
                return Begin::Hit(entry.value.clone());
            }
            Some(Slot::Loading(flight)) => {
                self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                trace!(?key, running_for = ?now.duration_since(flight.started_at), "Joining in-flight load");
                return Begin::Wait(flight.subscribe());
            }
            Some(Slot::Ready(_)) => debug!(?key, "Cache entry expired"),
            None => {}
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!(?key, "Cache miss, loading");
        self.maybe_sweep(&mut table, now);
        let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
        Begin::Lead(FlightGuard::start(
            &self.slots,
            &mut table,
            &self.counters,
            key.clone(),
            id,
            now,
        ))
    }

    /// Purges expired entries once the table has doubled or a TTL has passed
    /// since the last purge. Called with the table lock held.
    fn maybe_sweep(&self, table: &mut HashMap<K, Slot<V, E>>, now: Instant) {
        let mut sweep = self.sweep.lock();
        if table.len() < sweep.next_len && now.duration_since(sweep.last) < self.config.ttl {
            return;
        }

        let removed = purge_expired(table, now);
        sweep.last = now;
        sweep.next_len = (table.len() * 2).max(MIN_SWEEP_LEN);
        if removed > 0 {
            debug!(removed, remaining = table.len(), "Purged expired entries");
        }
    }

    /// Returns the stored value for `key` without loading or touching expiry.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        match self.slots.lock().get(key) {
            Some(Slot::Ready(entry)) if !entry.is_expired(now) => Some(entry.value.clone()),
            _ => None,
        }
    }
}

impl<K, V, E> ExpiringCache<K, V, E>
where
    K: Eq + Hash,
{
    /// Makes the next `get_or_load` for `key` miss.
    ///
    /// A load already running for `key` still answers its current waiters,
    /// but its result is not stored.
    ///
    /// Returns true if anything was removed.
    pub fn invalidate(&self, key: &K) -> bool {
        self.slots.lock().remove(key).is_some()
    }

    /// Invalidates every key.
    pub fn invalidate_all(&self) {
        self.slots.lock().clear();
    }

    /// Removes all expired entries and returns how many were dropped.
    ///
    /// Expiry is still checked on every read and misses purge periodically;
    /// this reclaims memory right away.
    pub fn cleanup_expired(&self) -> usize {
        purge_expired(&mut self.slots.lock(), Instant::now())
    }

    /// Returns the number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let (entries, in_flight) = {
            let table = self.slots.lock();
            table.values().fold((0, 0), |(entries, in_flight), slot| match slot {
                Slot::Ready(entry) if !entry.is_expired(now) => (entries + 1, in_flight),
                Slot::Ready(_) => (entries, in_flight),
                Slot::Loading(_) => (entries, in_flight + 1),
            })
        };

        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            loads: self.counters.loads.load(Ordering::Relaxed),
            load_failures: self.counters.load_failures.load(Ordering::Relaxed),
            cancelled_loads: self.counters.cancelled_loads.load(Ordering::Relaxed),
            entries,
            in_flight,
        }
    }
}

/// Drops expired `Ready` slots, keeping in-flight markers. Returns how many were dropped.
fn purge_expired<K, V, E>(table: &mut HashMap<K, Slot<V, E>>, now: Instant) -> usize {
    let before = table.len();
    table.retain(|_, slot| match slot {
        Slot::Ready(entry) => !entry.is_expired(now),
        Slot::Loading(_) => true,
    });
    before - table.len()
}

/// Cache statistics.
///
/// Counters are cumulative since construction; `entries` and `in_flight` are
/// a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a stored, unexpired entry
    pub hits: u64,
    /// Lookups that started a load
    pub misses: u64,
    /// Lookups that waited on another caller's load
    pub coalesced: u64,
    /// Loads that finished successfully
    pub loads: u64,
    /// Loads that returned an error
    pub load_failures: u64,
    /// Loads abandoned before finishing
    pub cancelled_loads: u64,
    /// Unexpired stored entries
    pub entries: usize,
    /// Loads currently running
    pub in_flight: usize,
}
