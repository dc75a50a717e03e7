//! Storage layer: the repository seam, its shared cache, and a local backend.

mod backend;
mod cache;
mod error;
mod local;
mod repository;

pub use backend::AddressBackend;
pub use cache::{AddressCache, CacheSnapshot, MutationGuard, RefreshTicket};
pub use error::StoreError;
pub use local::LocalStore;
pub use repository::AddressRepository;
