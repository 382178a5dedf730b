//! The reversible state token.
//!
//! The token is the only cross-request transfer mechanism for pager state:
//! base64url over compact JSON, safe to embed as a single URL query value
//! and opaque to clients. The wire layout is versioned so a decoder can
//! reject unknown layouts instead of misreading them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::condition::{ConditionEntry, Join};
use crate::error::Error;
use crate::state::{PagerState, SortDir, SortKey};

pub const TOKEN_VERSION: u8 = 1;

pub mod base64_url {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;

    pub fn encode(bytes: &[u8]) -> String {
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn decode(raw: &str) -> Result<Vec<u8>, base64::DecodeError> {
        URL_SAFE_NO_PAD.decode(raw)
    }
}

/// The subset of pager state that rides on the wire.
///
/// Sort permissions and view toggles are deliberately absent: they are
/// re-established by caller setup on every request and never trusted from
/// client input.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot {
    pub table: String,
    pub conditions: BTreeMap<String, ConditionEntry>,
    pub joins: Vec<Join>,
    pub sort: Option<SortKey>,
    pub direction: SortDir,
    pub page: u64,
}

/// Version-1 wire layout. Field names are terse; tokens ride in URLs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenV1 {
    /// Wire version, always [`TOKEN_VERSION`].
    pub v: u8,
    /// Pager identity (the data source table).
    pub t: String,
    /// Conditions keyed by qualified field name.
    pub c: BTreeMap<String, ConditionEntry>,
    /// Current page, 1-based.
    pub p: u64,
    /// Sort key, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<SortKey>,
    /// Sort direction.
    pub o: SortDir,
    /// Joins, in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub j: Vec<Join>,
}

impl TokenV1 {
    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        Self {
            v: TOKEN_VERSION,
            t: snapshot.table,
            c: snapshot.conditions,
            p: snapshot.page,
            s: snapshot.sort,
            o: snapshot.direction,
            j: snapshot.joins,
        }
    }

    pub fn into_snapshot(self) -> StateSnapshot {
        StateSnapshot {
            table: self.t,
            conditions: self.c,
            joins: self.j,
            sort: self.s,
            direction: self.o,
            page: self.p,
        }
    }

    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).expect("token layout is always JSON-serializable");
        base64_url::encode(&json)
    }

    pub fn decode(raw: &str) -> Result<Self, Error> {
        let bytes = base64_url::decode(raw).map_err(|_| Error::TokenInvalidBase64)?;
        let token: Self = serde_json::from_slice(&bytes).map_err(|_| Error::TokenInvalidJson)?;
        if token.v != TOKEN_VERSION {
            return Err(Error::TokenInvalidVersion);
        }
        if token.p == 0 {
            return Err(Error::TokenInvalidPage);
        }
        Ok(token)
    }
}

impl PagerState {
    /// Extract the wire subset of this state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            table: self.table().to_string(),
            conditions: self.conditions().clone(),
            joins: self.joins().to_vec(),
            sort: self.sort().cloned(),
            direction: self.direction(),
            page: self.page(),
        }
    }

    /// Replace the wire subset wholesale. Prior conditions are discarded;
    /// an inbound token always wins over caller-set filters.
    pub fn apply_snapshot(&mut self, snapshot: StateSnapshot) {
        self.clear_conditions();
        for (key, entry) in snapshot.conditions {
            self.insert_entry(key, entry);
        }
        self.replace_joins(snapshot.joins);
        match snapshot.sort {
            Some(sort) => self.set_sort(sort),
            None => self.unset_sort(),
        }
        self.set_direction(snapshot.direction);
        self.set_page(snapshot.page);
    }

    /// Encode the current state as a URL-safe token.
    pub fn encode_token(&self) -> String {
        TokenV1::from_snapshot(self.snapshot()).encode()
    }

    /// Decode a token back into a wire snapshot.
    pub fn decode_token(raw: &str) -> Result<StateSnapshot, Error> {
        TokenV1::decode(raw).map(TokenV1::into_snapshot)
    }
}
