//! Hosted list API adapter for the collaboration store.

mod client;
mod models;

pub use client::{
    DEFAULT_CHECKLIST_LIST, DEFAULT_GRAPH_BASE, DEFAULT_WBS_LIST, GraphCollaborationStore,
    GraphSettings,
};
