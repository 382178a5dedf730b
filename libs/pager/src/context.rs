//! Explicit request and session context objects.

use std::collections::HashMap;

/// The slice of an inbound request the pager is allowed to read.
///
/// `query` carries the residual query parameters of the listing view; the
/// token and page parameters are already split out and must not appear in
/// it, so every navigation within one view maps to the same sticky slot.
#[derive(Clone, Debug, Default)]
pub struct PageRequest {
    /// Opaque state token from the URL, if the click carried one.
    pub token: Option<String>,
    /// Explicit page override.
    pub page: Option<u64>,
    /// Request path of the listing view.
    pub path: String,
    /// Residual query parameters, in request order.
    pub query: Vec<(String, String)>,
}

impl PageRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }
}

/// Server-side slot store for sticky pager state: fingerprint → token.
///
/// Last write wins; concurrent requests for the same view may race
/// harmlessly. The pager never inspects how slots are stored.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, token: String);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and single-process embedders.
#[derive(Clone, Debug, Default)]
pub struct MemorySession {
    slots: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, token: String) {
        self.slots.insert(key.to_string(), token);
    }

    fn remove(&mut self, key: &str) {
        self.slots.remove(key);
    }
}
