//! Port contracts for task reconciliation.
//!
//! Ports define infrastructure-agnostic interfaces used by the
//! reconciliation services: one per store surface, plus the token issuer
//! both HTTP adapters authenticate through.

pub mod business;
pub mod collaboration;
pub mod identity;

pub use business::{BusinessStore, BusinessStoreError, BusinessStoreResult};
pub use collaboration::{CollaborationStore, CollaborationStoreError, CollaborationStoreResult};
pub use identity::{AccessToken, TokenError, TokenProvider, TokenResult};

#[cfg(test)]
pub use business::MockBusinessStore;
#[cfg(test)]
pub use collaboration::MockCollaborationStore;
