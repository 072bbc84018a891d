//! Unit tests for the reconciliation module.
//!
//! Tests are organised by layer: vocabulary mappings and record behaviour
//! in the domain, per-record engine decisions against mocked ports, and
//! whole-run sequencing against the in-memory stores.


mod orchestrator_tests;
mod push_tests;
