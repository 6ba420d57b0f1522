//! Per-key slots and the RAII guard that owns an in-flight load.
//!
//! A slot is either a stored entry or the marker of a load that is currently
//! running. Exactly one caller (the leader) holds the [`FlightGuard`] for a
//! marker; everyone else subscribes to the marker's watch channel.
//!
//! ```text
//!  vacant / expired ──leader inserts──► Loading(id) ──Ok──► Ready(entry)
//!                                           │
//!                                           ├──Err─────► vacant
//!                                           └──dropped─► vacant (waiters retry)
//! ```
//!
//! The guard only touches the slot while it still holds *its own* marker
//! (matched by flight id); an `invalidate` in the meantime makes the finished
//! load serve its waiters without being stored.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::cache::Counters;

/// Outcome published to waiters. `None` until the leader finishes.
pub(crate) type Outcome<V, E> = Option<Result<V, E>>;

/// A stored value with its expiry.
pub(crate) struct CacheEntry<V> {
    pub(crate) value: V,
    pub(crate) expires_at: Instant,
    lifetime: Duration,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, now: Instant, lifetime: Duration) -> Self {
        Self {
            value,
            expires_at: now + lifetime,
            lifetime,
        }
    }

    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Re-arms the entry for a full lifetime starting at `now`.
    pub(crate) fn touch(&mut self, now: Instant) {
        self.expires_at = now + self.lifetime;
    }
}

/// Marker of a running load.
pub(crate) struct Flight<V, E> {
    pub(crate) id: u64,
    pub(crate) started_at: Instant,
    rx: watch::Receiver<Outcome<V, E>>,
}

impl<V, E> Flight<V, E> {
    pub(crate) fn subscribe(&self) -> watch::Receiver<Outcome<V, E>> {
        self.rx.clone()
    }
}

pub(crate) enum Slot<V, E> {
    Ready(CacheEntry<V>),
    Loading(Flight<V, E>),
}

impl<V, E> Slot<V, E> {
    fn is_flight(&self, id: u64) -> bool {
        matches!(self, Slot::Loading(flight) if flight.id == id)
    }
}

/// Held by the leader for the duration of a load.
///
/// Dropping the guard without calling [`FlightGuard::complete`] (the leader's
/// future was cancelled, or the loader panicked) removes the marker and closes
/// the channel, which wakes every waiter so one of them can lead a new load.
pub(crate) struct FlightGuard<'a, K: Eq + Hash, V, E> {
    slots: &'a Mutex<HashMap<K, Slot<V, E>>>,
    counters: &'a Counters,
    key: K,
    id: u64,
    tx: watch::Sender<Outcome<V, E>>,
    settled: bool,
}

impl<'a, K: Eq + Hash, V, E> FlightGuard<'a, K, V, E> {
    /// Inserts a fresh marker for `key` into the locked table and returns its guard.
    pub(crate) fn start(
        slots: &'a Mutex<HashMap<K, Slot<V, E>>>,
        table: &mut HashMap<K, Slot<V, E>>,
        counters: &'a Counters,
        key: K,
        id: u64,
        now: Instant,
    ) -> Self
    where
        K: Clone,
    {
        let (tx, rx) = watch::channel(None);
        table.insert(
            key.clone(),
            Slot::Loading(Flight {
                id,
                started_at: now,
                rx,
            }),
        );
        Self {
            slots,
            counters,
            key,
            id,
            tx,
            settled: false,
        }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }
}

impl<'a, K: Eq + Hash, V: Clone, E: Clone> FlightGuard<'a, K, V, E> {
    /// Records the loader's outcome and releases every waiter with it.
    ///
    /// Success replaces the marker with an entry living `lifetime`; failure
    /// removes the marker so nothing is cached.
    pub(crate) fn complete(mut self, outcome: &Result<V, E>, lifetime: Duration) {
        self.settled = true;

        {
            let mut table = self.slots.lock();
            if table.get(&self.key).is_some_and(|slot| slot.is_flight(self.id)) {
                match outcome {
                    Ok(value) => {
                        let entry = CacheEntry::new(value.clone(), Instant::now(), lifetime);
                        if let Some(slot) = table.get_mut(&self.key) {
                            *slot = Slot::Ready(entry);
                        }
                    }
                    Err(_) => {
                        table.remove(&self.key);
                    }
                }
            }
        }

        match outcome {
            Ok(_) => self.counters.loads.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.counters.load_failures.fetch_add(1, Ordering::Relaxed),
        };

        self.tx.send_replace(Some(outcome.clone()));
    }
}

impl<'a, K: Eq + Hash, V, E> Drop for FlightGuard<'a, K, V, E> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut table = self.slots.lock();
        if table.get(&self.key).is_some_and(|slot| slot.is_flight(self.id)) {
            table.remove(&self.key);
        }
        drop(table);

        self.counters.cancelled_loads.fetch_add(1, Ordering::Relaxed);
        // `tx` is dropped after this body and closes the channel.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expiry_is_inclusive() {
        let now = Instant::now();
        let entry = CacheEntry::new("v", now, Duration::from_secs(2));

        assert!(!entry.is_expired(now));
        assert!(!entry.is_expired(now + Duration::from_millis(1999)));
        assert!(entry.is_expired(now + Duration::from_secs(2)));
    }

    #[test]
    fn test_touch_rearms_full_lifetime() {
        let now = Instant::now();
        let mut entry = CacheEntry::new("v", now, Duration::from_secs(2));

        entry.touch(now + Duration::from_secs(1));
        assert_eq!(entry.expires_at, now + Duration::from_secs(3));
    }

    #[test]
    fn test_dropped_guard_removes_only_its_own_marker() {
        let slots: Mutex<HashMap<&str, Slot<u8, ()>>> = Mutex::new(HashMap::new());
        let counters = Counters::default();
        let now = Instant::now();

        let guard = {
            let mut table = slots.lock();
            FlightGuard::start(&slots, &mut table, &counters, "k", 1, now)
        };
        let rx = match slots.lock().get("k") {
            Some(Slot::Loading(flight)) => flight.subscribe(),
            _ => panic!("marker missing"),
        };

        // Another flight took over the key in the meantime.
        {
            let mut table = slots.lock();
            table.insert("k", Slot::Ready(CacheEntry::new(9, now, Duration::from_secs(1))));
        }

        drop(guard);
        assert!(matches!(slots.lock().get("k"), Some(Slot::Ready(_))));
        assert_eq!(counters.cancelled_loads.load(Ordering::Relaxed), 1);
        assert!(rx.has_changed().is_err(), "channel should be closed");
    }
}
