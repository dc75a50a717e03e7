//! Local address backend, in-memory or backed by a JSON file.

use std::path::{Path, PathBuf};

use addrbook_core::{
    AddressField, AddressFields, AddressId, AddressRecord, NewAddress, Region, UpdatePayload,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::AddressBackend;
use crate::StoreError;

/// Fields that must be non-blank on every stored address.
const REQUIRED: &[AddressField] = &[
    AddressField::FullName,
    AddressField::Phone,
    AddressField::Street,
    AddressField::PinCode,
    AddressField::City,
    AddressField::State,
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LocalState {
    next_id: u64,
    addresses: Vec<AddressRecord>,
}

/// Address store that lives in this process.
///
/// Ids are assigned sequentially as decimal strings starting at `"1"` and are
/// never reused. Use [`open`](Self::open) for an ephemeral store and
/// [`open_persistent`](Self::open_persistent) for one that is written back to a
/// JSON file after every mutation.
pub struct LocalStore {
    state: Mutex<LocalState>,
    path: Option<PathBuf>,
}

impl LocalStore {
    /// Open an empty in-memory store.
    pub fn open() -> Self {
        Self {
            state: Mutex::new(LocalState::default()),
            path: None,
        }
    }

    /// Open the store persisted at `path`, or an empty one if the file does
    /// not exist yet. The file is created on the first mutation.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let state = if path.exists() {
            let bytes = std::fs::read(path)?;
            let state: LocalState = serde_json::from_slice(&bytes)?;
            info!(path = %path.display(), count = state.addresses.len(), "loaded address file");
            state
        } else {
            LocalState::default()
        };
        Ok(Self {
            state: Mutex::new(state),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.addresses.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Write `next` out, then install it. On a failed write the current state
    /// is left as it was.
    async fn commit(&self, current: &mut LocalState, next: LocalState) -> Result<(), StoreError> {
        self.persist(&next).await?;
        *current = next;
        Ok(())
    }

    async fn persist(&self, state: &LocalState) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), "address file written");
        Ok(())
    }
}

/// Required-field presence and region membership.
fn validate(fields: &AddressFields) -> Result<(), StoreError> {
    if let Some(field) = REQUIRED.iter().find(|f| fields.get(**f).trim().is_empty()) {
        return Err(StoreError::MissingField(*field));
    }
    fields.state.parse::<Region>()?;
    Ok(())
}

#[async_trait]
impl AddressBackend for LocalStore {
    async fn fetch_all(&self) -> Result<Vec<AddressRecord>, StoreError> {
        Ok(self.state.lock().await.addresses.clone())
    }

    async fn insert(&self, address: NewAddress) -> Result<AddressRecord, StoreError> {
        validate(address.fields())?;
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.next_id += 1;
        let record = address.into_record(next.next_id);
        next.addresses.push(record.clone());
        self.commit(&mut state, next).await?;
        Ok(record)
    }

    async fn patch(&self, payload: UpdatePayload) -> Result<AddressRecord, StoreError> {
        let mut state = self.state.lock().await;
        let index = state
            .addresses
            .iter()
            .position(|r| r.id == payload.address_id)
            .ok_or_else(|| StoreError::NotFound(payload.address_id.clone()))?;

        if payload.is_noop() {
            return Ok(state.addresses[index].clone());
        }

        let mut next = state.clone();
        let slot = &mut next.addresses[index];
        payload.apply_to(&mut slot.fields);
        validate(&slot.fields)?;
        let record = slot.clone();
        self.commit(&mut state, next).await?;
        Ok(record)
    }

    async fn remove(&self, id: &AddressId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.addresses.retain(|r| &r.id != id);
        if next.addresses.len() == state.addresses.len() {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.commit(&mut state, next).await
    }
}
