//! Filter predicates and join descriptions.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Scalar operand of a filter predicate.
///
/// Untagged on the wire: JSON null/bool/number/string map straight onto the
/// variants, keeping tokens compact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// A single filter predicate: field, comparison operator, operand(s).
/// Immutable once constructed.
///
/// Equality is structural; the value collection compares as a multiset, so
/// `IN (1, 2)` equals `IN (2, 1)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Condition {
    field: String,
    operator: String,
    values: Vec<Value>,
}

impl Condition {
    /// Build a predicate with an explicit comparison operator.
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<Self, Error> {
        if values.is_empty() {
            return Err(Error::EmptyCondition);
        }
        Ok(Self {
            field: field.into(),
            operator: operator.into(),
            values,
        })
    }

    /// Short form: a single value means equality.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: "=".to_string(),
            values: vec![value.into()],
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.operator == other.operator
            && multiset_eq(&self.values, &other.values)
    }
}

fn multiset_eq(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    'outer: for v in a {
        for (i, w) in b.iter().enumerate() {
            if !used[i] && v == w {
                used[i] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

/// The reserved free-text search entry: one query string applied across a
/// list of fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchSpec {
    pub query: String,
    pub fields: Vec<String>,
}

/// What a conditions-map key holds: regular field predicates, or the search
/// entry under the reserved key. The search entry never takes part in
/// per-field predicate lookups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionEntry {
    Predicates(Vec<Condition>),
    Search(SearchSpec),
}

/// A relation to an auxiliary table used for filtering or sorting, with
/// extra predicates scoped to the join. `local_field` is table-qualified
/// before a join is stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Join {
    remote_table: String,
    remote_key: String,
    local_field: String,
    conditions: Vec<Condition>,
}

impl Join {
    pub fn new(
        remote_table: impl Into<String>,
        remote_key: impl Into<String>,
        local_field: impl Into<String>,
    ) -> Self {
        Self {
            remote_table: remote_table.into(),
            remote_key: remote_key.into(),
            local_field: local_field.into(),
            conditions: Vec::new(),
        }
    }

    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn remote_table(&self) -> &str {
        &self.remote_table
    }

    pub fn remote_key(&self) -> &str {
        &self.remote_key
    }

    pub fn local_field(&self) -> &str {
        &self.local_field
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}
