//! Client-side state mirrored from the backend.
//!
//! Stores only change local state after the service reports success; the
//! backend stays the source of truth and `refresh` is the only reconciliation.

mod cards;
mod session;

pub use cards::CardStore;
pub use session::SessionStore;
