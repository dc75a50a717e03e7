//! Address list controller and navigation state.

mod controller;
mod error;
pub mod nav;
mod pending;

pub use controller::{AddressListController, Entry, EntryMode};
pub use error::ControllerError;
pub use nav::{AuthState, Header, LoginSurface, Placement, Profile, Route};
pub use pending::Pending;
