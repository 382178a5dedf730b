//! Port to the query layer.

use std::collections::BTreeMap;

use pager_core::{ConditionEntry, Join, SortDir, SortKey};

/// Everything a data source needs to produce one page of rows.
#[derive(Clone, Debug)]
pub struct PageQuery<'a> {
    pub sort: Option<&'a SortKey>,
    pub direction: SortDir,
    /// 1-based page to fetch. Ignored when `all` is set.
    pub page: u64,
    pub page_size: u64,
    pub conditions: &'a BTreeMap<String, ConditionEntry>,
    /// When set, return every matching row in this one call.
    pub all: bool,
    pub joins: &'a [Join],
}

/// Port for the controller: the operations a paged listing needs from its
/// backing query layer.
///
/// Conditions and joins are passed through opaquely; translating them into
/// an actual query belongs to the implementor. Failures propagate to the
/// pagination cycle unchanged, without retries.
pub trait DataSource {
    type Row;

    /// Identity of this source: the table the pager is scoped to, and the
    /// qualifier prepended to bare field names.
    fn table(&self) -> &str;

    /// Fetch one page of rows, or all matching rows when `query.all`.
    fn get_paged(&self, query: &PageQuery<'_>) -> anyhow::Result<Vec<Self::Row>>;

    /// Count the rows matching the given conditions and joins.
    fn count(
        &self,
        conditions: &BTreeMap<String, ConditionEntry>,
        joins: &[Join],
    ) -> anyhow::Result<u64>;

    /// Sum a field over the matching rows.
    fn sum(
        &self,
        field: &str,
        conditions: &BTreeMap<String, ConditionEntry>,
        joins: &[Join],
    ) -> anyhow::Result<f64>;
}
