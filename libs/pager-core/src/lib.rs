//! Core model for request-scoped pagination state.
//!
//! This crate is transport-agnostic: it owns the filter/join/sort state of
//! one pager, the reversible state token that round-trips that state through
//! a URL parameter or a session slot, and the planner that decides which
//! page controls to show. Query execution, markup and HTTP plumbing belong
//! to the embedder.

pub mod condition;
pub mod error;
pub mod state;
pub mod token;
pub mod window;

pub use condition::{Condition, ConditionEntry, Join, SearchSpec, Value};
pub use error::Error;
pub use state::{PagerState, SortDir, SortKey, SEARCH_KEY};
pub use token::{base64_url, StateSnapshot, TokenV1, TOKEN_VERSION};
pub use window::{plan, PageItem};
