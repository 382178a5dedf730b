//! The per-request pagination state aggregate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, ConditionEntry, Join, SearchSpec, Value};
use crate::error::Error;

/// Reserved conditions key holding the free-text search entry.
pub const SEARCH_KEY: &str = "%search%";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// What a result set may be sorted by.
///
/// Callers choose the variant explicitly instead of the pager guessing
/// whether a name is a column or a computed sort on the data source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// A table-qualified column name.
    Field(String),
    /// An opaque computed-sort token the data source understands; exempt
    /// from permission validation.
    Computed(String),
}

impl SortKey {
    pub fn name(&self) -> &str {
        match self {
            Self::Field(name) | Self::Computed(name) => name,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }
}

/// Aggregate root for one pager: filter conditions, joins, sort, current
/// page and the sort permission list. Created per request, mutated only
/// through its own operations, discarded once the next token is produced.
#[derive(Clone, Debug)]
pub struct PagerState {
    table: String,
    conditions: BTreeMap<String, ConditionEntry>,
    joins: Vec<Join>,
    sort: Option<SortKey>,
    direction: SortDir,
    page: u64,
    all: bool,
    jump_to: bool,
    sort_permissions: Vec<SortKey>,
}

impl PagerState {
    /// Create default state for the given pager identity (the data source
    /// table).
    pub fn new(table: impl Into<String>) -> Result<Self, Error> {
        let table = table.into();
        if table.is_empty() {
            return Err(Error::MissingIdentity);
        }
        Ok(Self {
            table,
            conditions: BTreeMap::new(),
            joins: Vec::new(),
            sort: None,
            direction: SortDir::Asc,
            page: 1,
            all: false,
            jump_to: true,
            sort_permissions: Vec::new(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Qualify a bare field name with the pager's table. Names are expanded
    /// once, when they enter the state; stored names are always qualified.
    pub fn qualify_field(&self, field: &str) -> String {
        if field.contains('.') {
            field.to_string()
        } else {
            format!("{}.{}", self.table, field)
        }
    }

    /// Append a predicate under the (qualified) field key. Duplicates are
    /// legal and accumulate as AND-ed predicates for the same field.
    pub fn add_condition<I, V>(&mut self, field: &str, operator: &str, values: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = self.qualify_field(field);
        let condition = Condition::new(
            field.clone(),
            operator,
            values.into_iter().map(Into::into).collect(),
        )?;
        let entry = self
            .conditions
            .entry(field)
            .or_insert_with(|| ConditionEntry::Predicates(Vec::new()));
        if let ConditionEntry::Predicates(list) = entry {
            list.push(condition);
        }
        Ok(())
    }

    /// True iff an equal predicate already exists under the qualified field
    /// key. The search entry is never considered.
    pub fn has_condition<I, V>(&self, field: &str, operator: &str, values: I) -> bool
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = self.qualify_field(field);
        let Ok(probe) = Condition::new(
            field.clone(),
            operator,
            values.into_iter().map(Into::into).collect(),
        ) else {
            return false;
        };
        match self.conditions.get(&field) {
            Some(ConditionEntry::Predicates(list)) => list.iter().any(|c| *c == probe),
            _ => false,
        }
    }

    /// Drop all conditions, the search entry included. A sticky session
    /// slot held for this pager must be invalidated by the caller.
    pub fn clear_conditions(&mut self) {
        self.conditions.clear();
    }

    /// Drop the conditions stored under one field key.
    pub fn clear_condition(&mut self, key: &str) {
        if key == SEARCH_KEY {
            self.conditions.remove(SEARCH_KEY);
        } else {
            let key = self.qualify_field(key);
            self.conditions.remove(&key);
        }
    }

    /// Store the free-text search entry; each field is qualified.
    pub fn set_search(&mut self, query: impl Into<String>, fields: &[&str]) {
        let fields = fields.iter().map(|f| self.qualify_field(f)).collect();
        self.conditions.insert(
            SEARCH_KEY.to_string(),
            ConditionEntry::Search(SearchSpec {
                query: query.into(),
                fields,
            }),
        );
    }

    /// Current free-text search query, if one is set.
    pub fn search(&self) -> Option<&str> {
        match self.conditions.get(SEARCH_KEY) {
            Some(ConditionEntry::Search(spec)) => Some(&spec.query),
            _ => None,
        }
    }

    /// Add a join; `local_field` is qualified before storage.
    pub fn add_join(
        &mut self,
        remote_table: &str,
        remote_key: &str,
        local_field: &str,
        extra_conditions: Vec<Condition>,
    ) {
        let mut join = Join::new(remote_table, remote_key, self.qualify_field(local_field));
        for condition in extra_conditions {
            join.add_condition(condition);
        }
        self.joins.push(join);
    }

    /// Set the sort key. Field names are qualified; computed tokens are
    /// stored as-is.
    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = Some(self.qualify_sort(sort));
    }

    /// Append an allowed sort key. The first permission added becomes the
    /// default sort when none is set explicitly.
    pub fn add_sort_permission(&mut self, sort: SortKey) {
        let sort = self.qualify_sort(sort);
        self.sort_permissions.push(sort);
    }

    fn qualify_sort(&self, sort: SortKey) -> SortKey {
        match sort {
            SortKey::Field(name) => SortKey::Field(self.qualify_field(&name)),
            computed => computed,
        }
    }

    /// Default the sort to the first permission entry when unset.
    pub fn resolve_sort(&mut self) {
        if self.sort.is_none() {
            if let Some(first) = self.sort_permissions.first() {
                self.sort = Some(first.clone());
            }
        }
    }

    /// Reject a sort field that is absent from the permission list.
    /// Computed sorts bypass the check.
    pub fn validate_sort(&self) -> Result<(), Error> {
        match &self.sort {
            Some(key @ SortKey::Field(name)) => {
                if self.sort_permissions.iter().any(|p| p == key) {
                    Ok(())
                } else {
                    Err(Error::SortNotPermitted(name.clone()))
                }
            }
            _ => Ok(()),
        }
    }

    // Raw mutators used when restoring a decoded snapshot; keys and joins
    // coming off the wire are already qualified.
    pub(crate) fn insert_entry(&mut self, key: String, entry: ConditionEntry) {
        self.conditions.insert(key, entry);
    }

    pub(crate) fn replace_joins(&mut self, joins: Vec<Join>) {
        self.joins = joins;
    }

    pub(crate) fn unset_sort(&mut self) {
        self.sort = None;
    }

    pub fn set_page(&mut self, page: u64) {
        self.page = page;
    }

    pub fn set_direction(&mut self, direction: SortDir) {
        self.direction = direction;
    }

    pub fn set_jump_to(&mut self, jump_to: bool) {
        self.jump_to = jump_to;
    }

    /// When set, paging is bypassed and a fetch returns every matching row.
    pub fn set_all(&mut self, all: bool) {
        self.all = all;
    }

    pub fn conditions(&self) -> &BTreeMap<String, ConditionEntry> {
        &self.conditions
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn sort(&self) -> Option<&SortKey> {
        self.sort.as_ref()
    }

    pub fn direction(&self) -> SortDir {
        self.direction
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn all(&self) -> bool {
        self.all
    }

    pub fn jump_to(&self) -> bool {
        self.jump_to
    }

    pub fn sort_permissions(&self) -> &[SortKey] {
        &self.sort_permissions
    }
}
