//! Address list orchestration.
//!
//! The controller owns two kinds of local state and nothing else:
//!
//! - the creation form, a [`FieldStore`] that starts empty;
//! - an edit-session table keyed by [`AddressId`]. An id with a session is
//!   `Editing`, every other listed id is `Viewing`.
//!
//! The list itself is always read from the repository cache. Mutations are
//! issued as background calls ([`Pending`]) and the controller transitions
//! immediately without waiting for them.

use std::collections::HashMap;
use std::sync::Arc;

use addrbook_core::{
    diff, AddressField, AddressId, AddressRecord, Draft, FieldStore, NewAddress,
};
use addrbook_store::{AddressRepository, CacheSnapshot};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::pending::Pending;
use crate::ControllerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Viewing,
    Editing,
}

/// One row of the rendered list.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub record: AddressRecord,
    pub mode: EntryMode,
    /// The in-progress values while `Editing`.
    pub draft: Option<Draft>,
}

#[derive(Debug)]
struct EditSession {
    /// The record as it was when editing began.
    baseline: AddressRecord,
    form: FieldStore,
}

pub struct AddressListController {
    repo: Arc<AddressRepository>,
    create_form: FieldStore,
    sessions: HashMap<AddressId, EditSession>,
    /// Runtime that issued calls run on.
    runtime: Handle,
}

impl AddressListController {
    /// Controller whose calls run on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime. Use
    /// [`with_runtime`](Self::with_runtime) there.
    pub fn new(repo: Arc<AddressRepository>) -> Self {
        Self::with_runtime(repo, Handle::current())
    }

    /// Controller whose calls run on `runtime`. Its mutating methods can then
    /// be called from any thread.
    pub fn with_runtime(repo: Arc<AddressRepository>, runtime: Handle) -> Self {
        Self {
            repo,
            create_form: FieldStore::new(),
            sessions: HashMap::new(),
            runtime,
        }
    }

    pub fn repository(&self) -> &Arc<AddressRepository> {
        &self.repo
    }

    // ── List ──

    /// Reload the list through the repository.
    ///
    /// Edit sessions whose record is no longer listed are dropped.
    pub async fn refresh(&mut self) -> Result<(), ControllerError> {
        self.repo.list().await?;
        let snapshot = self.repo.snapshot();
        let before = self.sessions.len();
        self.sessions.retain(|id, _| snapshot.contains(id));
        let dropped = before - self.sessions.len();
        if dropped > 0 {
            debug!(dropped, "dropped edit sessions for vanished addresses");
        }
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        self.repo.snapshot().loading
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.repo.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CacheSnapshot> {
        self.repo.subscribe()
    }

    /// The cached list joined with edit-session state, in cache order.
    pub fn entries(&self) -> Vec<Entry> {
        self.repo
            .snapshot()
            .records
            .into_iter()
            .map(|record| match self.sessions.get(&record.id) {
                Some(session) => Entry {
                    record,
                    mode: EntryMode::Editing,
                    draft: Some(session.form.snapshot().clone()),
                },
                None => Entry {
                    record,
                    mode: EntryMode::Viewing,
                    draft: None,
                },
            })
            .collect()
    }

    // ── Creation ──

    pub fn create_form(&self) -> &FieldStore {
        &self.create_form
    }

    pub fn create_form_mut(&mut self) -> &mut FieldStore {
        &mut self.create_form
    }

    pub fn set_new_field(&mut self, field: AddressField, value: impl ToString) {
        self.create_form.set(field, value);
    }

    /// Submit the creation form.
    ///
    /// The form is cleared as soon as the call is issued, before the
    /// repository answers. If the add fails the cleared values are not
    /// restored; the error is only visible through the returned handle.
    pub fn submit_new(&mut self) -> Pending<AddressRecord> {
        let address = NewAddress::from_draft(self.create_form.snapshot());
        info!(full_name = %address.fields().full_name, "submitting new address");

        let repo = Arc::clone(&self.repo);
        let pending = Pending::spawn(&self.runtime, async move { repo.add(address).await });
        self.create_form.reset();
        pending
    }

    // ── Editing ──

    pub fn mode(&self, id: &AddressId) -> EntryMode {
        if self.sessions.contains_key(id) {
            EntryMode::Editing
        } else {
            EntryMode::Viewing
        }
    }

    /// `Viewing -> Editing`. The cached record becomes both the draft seed and
    /// the baseline the draft is later diffed against.
    ///
    /// Entering edit on an entry that is already editing keeps its draft.
    pub fn enter_edit(&mut self, id: &AddressId) -> Result<(), ControllerError> {
        if self.sessions.contains_key(id) {
            return Ok(());
        }
        let record = self
            .repo
            .snapshot()
            .get(id)
            .cloned()
            .ok_or_else(|| ControllerError::UnknownAddress(id.clone()))?;
        debug!(address_id = %id, "entering edit");
        self.sessions.insert(
            id.clone(),
            EditSession {
                form: FieldStore::seeded(&record.fields),
                baseline: record,
            },
        );
        Ok(())
    }

    pub fn edit_field(
        &mut self,
        id: &AddressId,
        field: AddressField,
        value: impl ToString,
    ) -> Result<(), ControllerError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| ControllerError::NotEditing(id.clone()))?;
        session.form.set(field, value);
        Ok(())
    }

    pub fn draft(&self, id: &AddressId) -> Option<&Draft> {
        self.sessions.get(id).map(|s| s.form.snapshot())
    }

    /// `Editing -> Viewing`, discarding the draft. Nothing is sent.
    pub fn cancel_edit(&mut self, id: &AddressId) -> Result<(), ControllerError> {
        self.sessions
            .remove(id)
            .ok_or_else(|| ControllerError::NotEditing(id.clone()))?;
        debug!(address_id = %id, "edit cancelled");
        Ok(())
    }

    /// `Editing -> Viewing`, sending the diff between draft and baseline.
    ///
    /// The entry is back in `Viewing` when this returns, whether or not the
    /// call has completed. An update with no changed fields is still sent.
    pub fn save_edit(&mut self, id: &AddressId) -> Result<Pending<AddressRecord>, ControllerError> {
        let session = self
            .sessions
            .remove(id)
            .ok_or_else(|| ControllerError::NotEditing(id.clone()))?;
        let payload = diff(&session.baseline, session.form.snapshot());
        info!(
            address_id = %id,
            changed = payload.changed_fields().len(),
            "saving address edit"
        );

        let repo = Arc::clone(&self.repo);
        Ok(Pending::spawn(&self.runtime, async move {
            repo.edit(payload).await
        }))
    }

    // ── Deletion ──

    /// Issue a delete. The entry leaves the list once the cache reflects it.
    pub fn delete(&mut self, id: &AddressId) -> Result<Pending<()>, ControllerError> {
        if self.sessions.contains_key(id) {
            return Err(ControllerError::EditInProgress(id.clone()));
        }
        if !self.repo.snapshot().contains(id) {
            return Err(ControllerError::UnknownAddress(id.clone()));
        }
        info!(address_id = %id, "deleting address");

        let repo = Arc::clone(&self.repo);
        let id = id.clone();
        Ok(Pending::spawn(&self.runtime, async move {
            repo.delete(id).await
        }))
    }
}
