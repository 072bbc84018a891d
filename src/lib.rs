//! Brunel: bidirectional task reconciliation between a collaboration store
//! and a business store.
//!
//! This crate keeps two independent task surfaces converged: lightweight
//! checklist and work-breakdown (WBS) lists in a Microsoft Graph-backed
//! collaboration store, and activity and project-task records in a Dynamics
//! 365 business store. Reconciliation runs as a stateless batch pass with no
//! intermediate database; cross-references written onto collaboration
//! records are the only durable linkage.
//!
//! # Architecture
//!
//! Brunel follows hexagonal architecture principles:
//!
//! - **Domain**: Record types, status vocabularies, and mapping rules with
//!   no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the two stores and the token
//!   issuer
//! - **Adapters**: Concrete implementations of ports (Graph lists, Dynamics
//!   Web API, OAuth2 client credentials, in-memory fakes)
//!
//! # Modules
//!
//! - [`config`]: Environment-backed settings for stores, identity, and scope
//! - [`sync`]: Reconciliation domain, ports, services, and adapters

pub mod config;
pub mod sync;
