//! The seam between the repository and whatever actually stores addresses.

use addrbook_core::{AddressId, AddressRecord, NewAddress, UpdatePayload};
use async_trait::async_trait;

use crate::StoreError;

/// Remote (or local) address storage.
///
/// Implementations own persistence and validation. They know nothing about
/// the client-side cache; [`AddressRepository`](crate::AddressRepository)
/// wraps a backend and keeps the cache in step with it.
#[async_trait]
pub trait AddressBackend: Send + Sync {
    /// Every stored address.
    async fn fetch_all(&self) -> Result<Vec<AddressRecord>, StoreError>;

    /// Store a new address and return it with its assigned id.
    async fn insert(&self, address: NewAddress) -> Result<AddressRecord, StoreError>;

    /// Apply a partial update and return the resulting record.
    ///
    /// A payload with no changed fields must succeed and leave the record as is.
    async fn patch(&self, payload: UpdatePayload) -> Result<AddressRecord, StoreError>;

    async fn remove(&self, id: &AddressId) -> Result<(), StoreError>;
}
