//! Address repository: a backend plus the shared cache it feeds.

use std::sync::Arc;

use addrbook_core::{AddressId, AddressRecord, NewAddress, UpdatePayload};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::AddressBackend;
use crate::cache::{AddressCache, CacheSnapshot};
use crate::StoreError;

/// `list` / `add` / `edit` / `delete` against a backend.
///
/// Each successful call is reflected in the cache, which is the only thing
/// views should render from. Calls may be issued concurrently; the cache
/// reconciles whichever order they complete in. Failures leave the cache as
/// it was and are returned to the caller unretried.
pub struct AddressRepository {
    backend: Arc<dyn AddressBackend>,
    cache: AddressCache,
}

impl AddressRepository {
    pub fn new(backend: impl AddressBackend + 'static) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    pub fn from_shared(backend: Arc<dyn AddressBackend>) -> Self {
        Self {
            backend,
            cache: AddressCache::new(),
        }
    }

    /// Fetch the full list and reconcile it into the cache.
    ///
    /// Returns the list as published, which includes any mutations that
    /// completed while the fetch was in flight.
    pub async fn list(&self) -> Result<Vec<AddressRecord>, StoreError> {
        let ticket = self.cache.begin_refresh();
        match self.backend.fetch_all().await {
            Ok(records) => {
                info!(count = records.len(), "fetched addresses");
                self.cache.finish_refresh(ticket, records);
                Ok(self.cache.snapshot().records)
            }
            Err(e) => {
                warn!(error = %e, "address list refresh failed");
                self.cache.abort_refresh(ticket);
                Err(e)
            }
        }
    }

    pub async fn add(&self, address: NewAddress) -> Result<AddressRecord, StoreError> {
        let _guard = self.cache.track_mutation();
        let record = self.backend.insert(address).await.inspect_err(|e| {
            warn!(error = %e, "add address failed");
        })?;
        info!(address_id = %record.id, "address added");
        self.cache.upsert(record.clone());
        Ok(record)
    }

    /// Apply a partial update. A no-op payload is still sent and accepted.
    pub async fn edit(&self, payload: UpdatePayload) -> Result<AddressRecord, StoreError> {
        let address_id = payload.address_id.clone();
        let changed = payload.changed_fields().len();
        let _guard = self.cache.track_mutation();
        let record = self.backend.patch(payload).await.inspect_err(|e| {
            warn!(address_id = %address_id, error = %e, "edit address failed");
        })?;
        info!(address_id = %record.id, changed, "address updated");
        self.cache.upsert(record.clone());
        Ok(record)
    }

    pub async fn delete(&self, id: AddressId) -> Result<(), StoreError> {
        let _guard = self.cache.track_mutation();
        self.backend.remove(&id).await.inspect_err(|e| {
            warn!(address_id = %id, error = %e, "delete address failed");
        })?;
        info!(address_id = %id, "address deleted");
        self.cache.remove(&id);
        Ok(())
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.cache.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CacheSnapshot> {
        self.cache.subscribe()
    }

    pub fn cache(&self) -> &AddressCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalStore;
    use addrbook_core::{AddressField, AddressFields};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn fields(name: &str) -> AddressFields {
        AddressFields {
            full_name: name.into(),
            phone: "9000000000".into(),
            street: "1 Beach Rd".into(),
            landmark: String::new(),
            pin_code: "403001".into(),
            city: "Panaji".into(),
            state: "Goa".into(),
        }
    }

    /// Holds `fetch_all` open after reading until released.
    struct GatedBackend {
        inner: LocalStore,
        fetched: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl AddressBackend for GatedBackend {
        async fn fetch_all(&self) -> Result<Vec<AddressRecord>, StoreError> {
            let records = self.inner.fetch_all().await?;
            self.fetched.notify_one();
            self.release.notified().await;
            Ok(records)
        }

        async fn insert(&self, address: NewAddress) -> Result<AddressRecord, StoreError> {
            self.inner.insert(address).await
        }

        async fn patch(&self, payload: UpdatePayload) -> Result<AddressRecord, StoreError> {
            self.inner.patch(payload).await
        }

        async fn remove(&self, id: &AddressId) -> Result<(), StoreError> {
            self.inner.remove(id).await
        }
    }

    async fn seeded_gated(n: usize) -> (Arc<AddressRepository>, Arc<Notify>, Arc<Notify>) {
        let inner = LocalStore::open();
        for i in 0..n {
            inner
                .insert(NewAddress(fields(&format!("person {i}"))))
                .await
                .unwrap();
        }
        let fetched = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let repo = AddressRepository::new(GatedBackend {
            inner,
            fetched: fetched.clone(),
            release: release.clone(),
        });
        (Arc::new(repo), fetched, release)
    }

    #[tokio::test]
    async fn list_populates_cache() {
        let store = LocalStore::open();
        store.insert(NewAddress(fields("A"))).await.unwrap();
        let repo = AddressRepository::new(store);

        assert!(repo.snapshot().is_empty());
        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(repo.snapshot().records, listed);
    }

    #[tokio::test]
    async fn add_edit_delete_update_cache() {
        let repo = AddressRepository::new(LocalStore::open());

        let added = repo.add(NewAddress(fields("A"))).await.unwrap();
        assert!(repo.snapshot().contains(&added.id));

        let mut payload = UpdatePayload::new(added.id.clone());
        payload.set(AddressField::City, "Margao");
        let edited = repo.edit(payload).await.unwrap();
        assert_eq!(edited.fields.city, "Margao");
        assert_eq!(
            repo.snapshot().get(&added.id).unwrap().fields.city,
            "Margao"
        );

        repo.delete(added.id.clone()).await.unwrap();
        assert!(!repo.snapshot().contains(&added.id));
    }

    #[tokio::test]
    async fn noop_edit_is_accepted() {
        let repo = AddressRepository::new(LocalStore::open());
        let added = repo.add(NewAddress(fields("A"))).await.unwrap();
        let edited = repo.edit(UpdatePayload::new(added.id.clone())).await.unwrap();
        assert_eq!(edited, added);
        let again = repo.edit(UpdatePayload::new(added.id.clone())).await.unwrap();
        assert_eq!(again, added);
    }

    #[tokio::test]
    async fn failed_edit_leaves_cache() {
        let repo = AddressRepository::new(LocalStore::open());
        repo.add(NewAddress(fields("A"))).await.unwrap();
        let before = repo.snapshot().records;

        let mut payload = UpdatePayload::new(AddressId::from("404"));
        payload.set(AddressField::City, "Nowhere");
        let err = repo.edit(payload).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(repo.snapshot().records, before);
    }

    #[tokio::test]
    async fn delete_completing_during_refresh() {
        let (repo, fetched, release) = seeded_gated(7).await;
        let target = AddressId::from("7");

        let refresh = tokio::spawn({
            let repo = repo.clone();
            async move { repo.list().await }
        });

        // The fetch has read a list that still contains 7.
        fetched.notified().await;
        assert!(repo.snapshot().loading);
        repo.delete(target.clone()).await.unwrap();
        release.notify_one();

        let listed = refresh.await.unwrap().unwrap();
        assert!(!listed.iter().any(|r| r.id == target));
        let snap = repo.snapshot();
        assert!(!snap.contains(&target));
        assert_eq!(snap.records.len(), 6);
        assert!(!snap.loading);
    }

    #[tokio::test]
    async fn delete_completing_after_refresh() {
        let (repo, fetched, release) = seeded_gated(7).await;
        let target = AddressId::from("7");

        let refresh = tokio::spawn({
            let repo = repo.clone();
            async move { repo.list().await }
        });
        fetched.notified().await;
        release.notify_one();
        let listed = refresh.await.unwrap().unwrap();
        assert!(listed.iter().any(|r| r.id == target));

        repo.delete(target.clone()).await.unwrap();
        assert!(!repo.snapshot().contains(&target));
        assert_eq!(repo.snapshot().records.len(), 6);
    }
}
