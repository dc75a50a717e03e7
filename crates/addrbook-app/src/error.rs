use addrbook_core::AddressId;
use addrbook_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no address with id {0} in the list")]
    UnknownAddress(AddressId),

    #[error("address {0} is not being edited")]
    NotEditing(AddressId),

    #[error("address {0} has an edit in progress")]
    EditInProgress(AddressId),

    #[error("repository error: {0}")]
    Repository(#[from] StoreError),

    #[error("repository task failed: {0}")]
    TaskFailed(String),
}
