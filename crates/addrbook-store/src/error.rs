use addrbook_core::{AddressField, AddressId, ParseRegionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("address not found: {0}")]
    NotFound(AddressId),

    #[error("missing required field: {}", .0.label())]
    MissingField(AddressField),

    #[error(transparent)]
    UnknownRegion(#[from] ParseRegionError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),
}
