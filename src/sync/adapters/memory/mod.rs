//! In-memory adapters for reconciliation tests.

mod business;
mod collaboration;
mod identity;

pub use business::InMemoryBusinessStore;
pub use collaboration::InMemoryCollaborationStore;
pub use identity::StaticTokenProvider;
