//! The single shared, subscribable copy of the address list.
//!
//! Every repository operation lands here, and views render only from the
//! published [`CacheSnapshot`]. Refreshes and mutations may complete in any
//! order, so a refresh remembers the mutation epoch it started at and, when
//! its response arrives, replays every mutation applied since then on top of
//! the fetched list before publishing it.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use addrbook_core::{AddressId, AddressRecord};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

/// What observers see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSnapshot {
    pub records: Vec<AddressRecord>,
    /// True while at least one list refresh is in flight.
    pub loading: bool,
    /// Bumped on every publish.
    pub version: u64,
    /// When the last refresh landed. `None` until the first one does.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl CacheSnapshot {
    pub fn get(&self, id: &AddressId) -> Option<&AddressRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &AddressId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Marks an add, edit, or delete as outstanding until dropped. Tombstones are
/// kept while any of these or any refresh is in flight.
#[must_use]
pub struct MutationGuard<'a> {
    cache: &'a AddressCache,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.cache.lock();
        state.outstanding -= 1;
        state.prune_tombstones();
    }
}

/// Handle for one in-flight refresh. Consumed by
/// [`AddressCache::finish_refresh`] or [`AddressCache::abort_refresh`].
#[derive(Debug)]
#[must_use]
pub struct RefreshTicket {
    id: u64,
    epoch: u64,
}

#[derive(Debug, Clone)]
enum CacheOp {
    Upsert(AddressRecord),
    Remove(AddressId),
}

impl CacheOp {
    fn apply(&self, records: &mut Vec<AddressRecord>) {
        match self {
            CacheOp::Upsert(record) => {
                match records.iter_mut().find(|r| r.id == record.id) {
                    Some(slot) => *slot = record.clone(),
                    None => records.push(record.clone()),
                }
            }
            CacheOp::Remove(id) => records.retain(|r| &r.id != id),
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    records: Vec<AddressRecord>,
    /// Incremented by every local mutation.
    epoch: u64,
    /// Mutations newer than the oldest in-flight refresh.
    journal: Vec<(u64, CacheOp)>,
    /// ticket id -> epoch at refresh start
    in_flight: BTreeMap<u64, u64>,
    next_ticket: u64,
    /// Newest refresh whose response has been applied.
    last_applied: Option<u64>,
    /// Ids deleted while a refresh or another mutation was in flight. Servers
    /// never reuse ids, so a late upsert for one of these is a stale response.
    removed: HashSet<AddressId>,
    /// Mutations issued to the backend and not yet settled.
    outstanding: usize,
    version: u64,
    fetched_at: Option<DateTime<Utc>>,
}

impl CacheState {
    fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            records: self.records.clone(),
            loading: !self.in_flight.is_empty(),
            version: self.version,
            fetched_at: self.fetched_at,
        }
    }

    fn mutate(&mut self, op: CacheOp) {
        self.epoch += 1;
        op.apply(&mut self.records);
        if !self.in_flight.is_empty() {
            self.journal.push((self.epoch, op));
        }
    }

    fn prune_tombstones(&mut self) {
        if self.outstanding == 0 && self.in_flight.is_empty() && !self.removed.is_empty() {
            debug!(count = self.removed.len(), "clearing tombstones");
            self.removed.clear();
        }
    }

    fn prune_journal(&mut self) {
        match self.in_flight.values().min().copied() {
            Some(oldest) => self.journal.retain(|(epoch, _)| *epoch > oldest),
            None => self.journal.clear(),
        }
    }
}

pub struct AddressCache {
    state: Mutex<CacheState>,
    tx: watch::Sender<CacheSnapshot>,
}

impl Default for AddressCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressCache {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CacheSnapshot::default());
        Self {
            state: Mutex::new(CacheState::default()),
            tx,
        }
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified after every change.
    pub fn subscribe(&self) -> watch::Receiver<CacheSnapshot> {
        self.tx.subscribe()
    }

    /// Mark a refresh as started.
    pub fn begin_refresh(&self) -> RefreshTicket {
        let mut state = self.lock();
        let ticket = RefreshTicket {
            id: state.next_ticket,
            epoch: state.epoch,
        };
        state.next_ticket += 1;
        state.in_flight.insert(ticket.id, ticket.epoch);
        self.publish(&mut state);
        ticket
    }

    /// Install the list fetched by the refresh behind `ticket`.
    ///
    /// Mutations applied after the refresh began are replayed on top, and a
    /// response older than one already applied is dropped.
    pub fn finish_refresh(&self, ticket: RefreshTicket, fetched: Vec<AddressRecord>) {
        let mut state = self.lock();
        state.in_flight.remove(&ticket.id);

        if state.last_applied.is_some_and(|last| last > ticket.id) {
            debug!(ticket = ticket.id, "dropping stale refresh response");
        } else {
            let mut records: Vec<AddressRecord> = fetched
                .into_iter()
                .filter(|r| !state.removed.contains(&r.id))
                .collect();
            let mut replayed = 0usize;
            for (epoch, op) in &state.journal {
                if *epoch > ticket.epoch {
                    op.apply(&mut records);
                    replayed += 1;
                }
            }
            debug!(
                ticket = ticket.id,
                count = records.len(),
                replayed,
                "refresh applied to cache"
            );
            state.records = records;
            state.last_applied = Some(ticket.id);
            state.fetched_at = Some(Utc::now());
        }

        state.prune_journal();
        state.prune_tombstones();
        self.publish(&mut state);
    }

    /// Release a refresh that failed. Cached records are left untouched.
    pub fn abort_refresh(&self, ticket: RefreshTicket) {
        let mut state = self.lock();
        state.in_flight.remove(&ticket.id);
        state.prune_journal();
        state.prune_tombstones();
        self.publish(&mut state);
    }

    /// Hold the returned guard across a backend add, edit, or delete and
    /// apply its result before dropping it.
    pub fn track_mutation(&self) -> MutationGuard<'_> {
        self.lock().outstanding += 1;
        MutationGuard { cache: self }
    }

    /// Insert or replace a record returned by `add` or `edit`.
    pub fn upsert(&self, record: AddressRecord) {
        let mut state = self.lock();
        if state.removed.contains(&record.id) {
            debug!(address_id = %record.id, "ignoring upsert for deleted address");
            return;
        }
        state.mutate(CacheOp::Upsert(record));
        self.publish(&mut state);
    }

    /// Drop a record after a confirmed `delete`.
    pub fn remove(&self, id: &AddressId) {
        let mut state = self.lock();
        state.removed.insert(id.clone());
        state.mutate(CacheOp::Remove(id.clone()));
        state.prune_tombstones();
        self.publish(&mut state);
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &mut CacheState) {
        state.version += 1;
        self.tx.send_replace(state.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrbook_core::AddressFields;

    fn record(id: &str, city: &str) -> AddressRecord {
        AddressRecord::new(
            id,
            AddressFields {
                city: city.into(),
                ..Default::default()
            },
        )
    }

    fn ids(snapshot: &CacheSnapshot) -> Vec<&str> {
        snapshot.records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn refresh_installs_list_and_tracks_loading() {
        let cache = AddressCache::new();
        assert!(!cache.snapshot().loading);

        let ticket = cache.begin_refresh();
        assert!(cache.snapshot().loading);

        cache.finish_refresh(ticket, vec![record("1", "A"), record("2", "B")]);
        let snap = cache.snapshot();
        assert!(!snap.loading);
        assert_eq!(ids(&snap), vec!["1", "2"]);
        assert!(snap.fetched_at.is_some());
    }

    #[test]
    fn delete_during_refresh_wins() {
        let cache = AddressCache::new();
        cache.finish_refresh(cache.begin_refresh(), vec![record("7", "A")]);

        let ticket = cache.begin_refresh();
        {
            let _delete = cache.track_mutation();
            cache.remove(&AddressId::from("7"));
        }
        // The response was produced before the delete reached the server.
        cache.finish_refresh(ticket, vec![record("6", "Z"), record("7", "A")]);

        assert_eq!(ids(&cache.snapshot()), vec!["6"]);
    }

    #[test]
    fn upsert_during_refresh_survives() {
        let cache = AddressCache::new();
        let ticket = cache.begin_refresh();
        cache.upsert(record("3", "New"));
        cache.finish_refresh(ticket, vec![record("1", "A")]);

        let snap = cache.snapshot();
        assert_eq!(ids(&snap), vec!["1", "3"]);
    }

    #[test]
    fn edit_during_refresh_overrides_fetched_value() {
        let cache = AddressCache::new();
        let ticket = cache.begin_refresh();
        cache.upsert(record("1", "Y"));
        cache.finish_refresh(ticket, vec![record("1", "X")]);

        let snap = cache.snapshot();
        assert_eq!(snap.get(&AddressId::from("1")).unwrap().fields.city, "Y");
    }

    #[test]
    fn stale_refresh_is_dropped() {
        let cache = AddressCache::new();
        let older = cache.begin_refresh();
        let newer = cache.begin_refresh();
        cache.finish_refresh(newer, vec![record("1", "new")]);
        cache.finish_refresh(older, vec![record("1", "old"), record("2", "old")]);

        let snap = cache.snapshot();
        assert_eq!(ids(&snap), vec!["1"]);
        assert_eq!(snap.records[0].fields.city, "new");
        assert!(!snap.loading);
    }

    #[test]
    fn late_upsert_after_delete_is_ignored() {
        let cache = AddressCache::new();
        cache.upsert(record("4", "A"));
        let edit = cache.track_mutation();
        {
            let _delete = cache.track_mutation();
            cache.remove(&AddressId::from("4"));
        }
        // The edit was issued before the delete but answers after it.
        cache.upsert(record("4", "B"));
        drop(edit);
        assert!(cache.snapshot().is_empty());
    }

    #[test]
    fn tombstones_cleared_once_settled() {
        let cache = AddressCache::new();
        cache.upsert(record("1", "A"));

        let ticket = cache.begin_refresh();
        let delete = cache.track_mutation();
        cache.remove(&AddressId::from("1"));
        drop(delete);
        assert_eq!(cache.lock().removed.len(), 1);

        cache.finish_refresh(ticket, vec![record("1", "A")]);
        assert!(cache.snapshot().is_empty());
        assert!(cache.lock().removed.is_empty());
        assert_eq!(cache.lock().outstanding, 0);
    }

    #[test]
    fn delete_with_nothing_in_flight_leaves_no_tombstone() {
        let cache = AddressCache::new();
        cache.upsert(record("1", "A"));
        cache.remove(&AddressId::from("1"));
        assert!(cache.lock().removed.is_empty());
    }

    #[test]
    fn aborted_refresh_keeps_records() {
        let cache = AddressCache::new();
        cache.finish_refresh(cache.begin_refresh(), vec![record("1", "A")]);
        let ticket = cache.begin_refresh();
        cache.abort_refresh(ticket);
        let snap = cache.snapshot();
        assert_eq!(ids(&snap), vec!["1"]);
        assert!(!snap.loading);
    }

    #[test]
    fn journal_is_empty_without_refreshes() {
        let cache = AddressCache::new();
        cache.upsert(record("1", "A"));
        cache.remove(&AddressId::from("1"));
        assert!(cache.lock().journal.is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let cache = AddressCache::new();
        let mut rx = cache.subscribe();
        cache.upsert(record("1", "A"));
        rx.changed().await.unwrap();
        assert_eq!(ids(&rx.borrow_and_update()), vec!["1"]);
    }
}
