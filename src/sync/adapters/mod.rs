//! Adapter implementations of the reconciliation ports.
//!
//! - [`graph`]: Microsoft Graph list adapter for the collaboration store
//! - [`dataverse`]: Dynamics 365 Web API adapter for the business store
//! - [`identity`]: OAuth2 client-credentials token provider
//! - [`memory`]: in-memory fakes for tests

pub mod dataverse;
pub mod graph;
pub mod identity;
pub mod memory;
