pub mod address;
pub mod diff;
pub mod field_store;
pub mod payload;
pub mod region;

pub use address::{
    AddressField, AddressFields, AddressId, AddressRecord, Draft, NewAddress, ParseFieldError,
};
pub use diff::diff;
pub use field_store::FieldStore;
pub use payload::UpdatePayload;
pub use region::{ParseRegionError, Region};
