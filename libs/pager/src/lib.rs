//! Pagination controller.
//!
//! Sits on top of `pager-core` and runs one full pagination cycle per
//! request: restore state from a token or a sticky session slot, enforce
//! the sort permission policy, delegate the fetch to a [`DataSource`],
//! plan the visible window and re-encode the state for the next click.
//!
//! Request and session are explicit context objects; nothing here reads
//! ambient state.

pub mod context;
pub mod controller;
pub mod fingerprint;
pub mod source;

pub use context::{MemorySession, PageRequest, SessionStore};
pub use controller::{PageView, Pager, PagerConfig, SortHeader};
pub use fingerprint::sticky_fingerprint;
pub use source::{DataSource, PageQuery};

// Re-export the core so embedders depend on one crate.
pub use pager_core::{
    Condition, ConditionEntry, Error, Join, PageItem, PagerState, SearchSpec, SortDir, SortKey,
    StateSnapshot, Value, SEARCH_KEY,
};
