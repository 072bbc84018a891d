//! OData Web API adapter for the business store.

mod client;
mod models;

pub use client::{DataverseBusinessStore, DataverseSettings};
