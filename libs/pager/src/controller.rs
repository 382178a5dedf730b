//! The pagination cycle.

use pager_core::{window, Condition, Error, PageItem, PagerState, SortDir, SortKey, TokenV1, Value};
use tracing::{debug, instrument};

use crate::context::{PageRequest, SessionStore};
use crate::fingerprint::sticky_fingerprint;
use crate::source::{DataSource, PageQuery};

/// Tuning for one pager instance.
#[derive(Clone, Debug)]
pub struct PagerConfig {
    /// Rows per page.
    pub page_size: u64,
    /// Persist state in a server-side session slot so it survives
    /// navigation within the same listing view without riding in the URL.
    pub sticky: bool,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            sticky: false,
        }
    }
}

/// The result of one pagination cycle.
#[derive(Clone, Debug)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub item_count: u64,
    pub total_pages: u64,
    /// Window descriptors for the renderer; empty when paging was bypassed
    /// or a single page covers everything.
    pub window: Vec<PageItem>,
    /// Token encoding the state this view was produced from.
    pub token: String,
}

/// Per-column sort metadata handed to the renderer. No markup here.
#[derive(Clone, Debug)]
pub struct SortHeader {
    /// The qualified sort key this header stands for.
    pub sort: SortKey,
    /// Direction a click on this header applies: a toggle when the column
    /// is already the active sort, ascending otherwise.
    pub direction: SortDir,
    /// Whether this column is the current sort.
    pub active: bool,
    /// Whether the permission list allows sorting on this column.
    pub permitted: bool,
    /// State token for that click.
    pub token: String,
}

/// Orchestrates pagination for one data source over one request.
pub struct Pager<S: DataSource> {
    source: S,
    state: PagerState,
    config: PagerConfig,
}

impl<S: DataSource> Pager<S> {
    pub fn new(source: S) -> Result<Self, Error> {
        Self::with_config(source, PagerConfig::default())
    }

    pub fn with_config(source: S, config: PagerConfig) -> Result<Self, Error> {
        let state = PagerState::new(source.table())?;
        Ok(Self {
            source,
            state,
            config,
        })
    }

    pub fn state(&self) -> &PagerState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // State setup, delegated to the aggregate.

    pub fn add_condition<I, V>(&mut self, field: &str, operator: &str, values: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.state.add_condition(field, operator, values)
    }

    pub fn has_condition<I, V>(&self, field: &str, operator: &str, values: I) -> bool
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.state.has_condition(field, operator, values)
    }

    pub fn clear_condition(&mut self, key: &str) {
        self.state.clear_condition(key);
    }

    /// Drop all conditions. When running sticky, use
    /// [`Pager::clear_conditions_sticky`] so the stored slot goes with them.
    pub fn clear_conditions(&mut self) {
        self.state.clear_conditions();
    }

    /// Drop all conditions and the sticky session slot for this view.
    pub fn clear_conditions_sticky(
        &mut self,
        request: &PageRequest,
        session: &mut dyn SessionStore,
    ) {
        self.state.clear_conditions();
        session.remove(&sticky_fingerprint(self.state.table(), request));
    }

    pub fn set_search(&mut self, query: impl Into<String>, fields: &[&str]) {
        self.state.set_search(query, fields);
    }

    pub fn search(&self) -> Option<&str> {
        self.state.search()
    }

    pub fn add_join(
        &mut self,
        remote_table: &str,
        remote_key: &str,
        local_field: &str,
        extra_conditions: Vec<Condition>,
    ) {
        self.state
            .add_join(remote_table, remote_key, local_field, extra_conditions);
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.state.set_sort(sort);
    }

    pub fn set_direction(&mut self, direction: SortDir) {
        self.state.set_direction(direction);
    }

    pub fn add_sort_permission(&mut self, sort: SortKey) {
        self.state.add_sort_permission(sort);
    }

    pub fn set_page(&mut self, page: u64) {
        self.state.set_page(page);
    }

    pub fn set_jump_to(&mut self, jump_to: bool) {
        self.state.set_jump_to(jump_to);
    }

    /// Run one stateless pagination cycle: state travels in the URL token
    /// only.
    #[instrument(name = "pager.page", skip_all, fields(table = %self.state.table()))]
    pub fn page(&mut self, request: &PageRequest) -> Result<PageView<S::Row>, Error> {
        self.run_cycle(request, None, false)
    }

    /// Run one sticky pagination cycle: state is restored from and written
    /// back to the session slot for this view.
    #[instrument(name = "pager.page_sticky", skip_all, fields(table = %self.state.table()))]
    pub fn page_sticky(
        &mut self,
        request: &PageRequest,
        session: &mut dyn SessionStore,
    ) -> Result<PageView<S::Row>, Error> {
        self.run_cycle(request, Some(session), false)
    }

    /// Export path: grant sort permission for the requested fields and
    /// return every matching row from a single fetch. Window and page
    /// computation are bypassed; formatting stays with the caller.
    #[instrument(name = "pager.export", skip_all, fields(table = %self.state.table()))]
    pub fn export_rows(&mut self, fields: &[&str]) -> Result<Vec<S::Row>, Error> {
        for field in fields {
            self.state
                .add_sort_permission(SortKey::Field((*field).to_string()));
        }
        let view = self.run_cycle(&PageRequest::default(), None, true)?;
        Ok(view.items)
    }

    /// Sum a field over the rows matching the current conditions.
    pub fn sum(&self, field: &str) -> Result<f64, Error> {
        let field = self.state.qualify_field(field);
        Ok(self
            .source
            .sum(&field, self.state.conditions(), self.state.joins())?)
    }

    /// Token a window descriptor should link to: current state with the
    /// page replaced.
    pub fn token_for_page(&self, page: u64) -> String {
        let mut snapshot = self.state.snapshot();
        snapshot.page = page;
        TokenV1::from_snapshot(snapshot).encode()
    }

    /// Sort metadata for one column header.
    pub fn sort_header(&self, sort: SortKey) -> SortHeader {
        let sort = match sort {
            SortKey::Field(name) => SortKey::Field(self.state.qualify_field(&name)),
            computed => computed,
        };
        let active = self.state.sort() == Some(&sort);
        let direction = if active {
            self.state.direction().toggled()
        } else {
            SortDir::Asc
        };
        let permitted = self.state.sort_permissions().iter().any(|p| *p == sort);

        let mut snapshot = self.state.snapshot();
        snapshot.sort = Some(sort.clone());
        snapshot.direction = direction;
        let token = TokenV1::from_snapshot(snapshot).encode();

        SortHeader {
            sort,
            direction,
            active,
            permitted,
            token,
        }
    }

    fn run_cycle(
        &mut self,
        request: &PageRequest,
        mut session: Option<&mut dyn SessionStore>,
        all: bool,
    ) -> Result<PageView<S::Row>, Error> {
        let fingerprint = sticky_fingerprint(self.state.table(), request);

        // 1. Resolve state. An explicit token wins and discards prior
        //    conditions; otherwise the sticky slot for this view applies.
        //    Unreadable or foreign tokens are recoverable: keep defaults.
        if let Some(raw) = &request.token {
            self.restore(raw);
        } else if self.config.sticky {
            if let Some(raw) = session
                .as_deref_mut()
                .and_then(|store| store.get(&fingerprint))
            {
                self.restore(&raw);
            }
        }

        // 2. Explicit page override from the request.
        if let Some(page) = request.page {
            self.state.set_page(page);
        }

        // 3. Default sort, then 4. permission policy — before any fetch.
        self.state.resolve_sort();
        self.state.validate_sort()?;

        self.state.set_all(all);

        // 5. Delegate the fetch.
        let query = PageQuery {
            sort: self.state.sort(),
            direction: self.state.direction(),
            page: self.state.page(),
            page_size: self.config.page_size,
            conditions: self.state.conditions(),
            all,
            joins: self.state.joins(),
        };
        let items = self.source.get_paged(&query)?;

        // 6. Window over the count; bypassed entirely for an export.
        let (item_count, total_pages, window) = if all {
            (items.len() as u64, 1, Vec::new())
        } else {
            let count = self
                .source
                .count(self.state.conditions(), self.state.joins())?;
            let total_pages = if self.config.page_size == 0 {
                0
            } else {
                count.div_ceil(self.config.page_size)
            };
            let window = window::plan(
                count,
                self.config.page_size,
                self.state.page(),
                self.state.jump_to(),
            );
            (count, total_pages, window)
        };

        // 7. Re-encode for the next navigation click.
        let token = self.state.encode_token();
        if self.config.sticky {
            if let Some(store) = session {
                store.set(&fingerprint, token.clone());
            }
        }

        debug!(
            item_count,
            page = self.state.page(),
            total_pages,
            "pagination cycle complete"
        );

        Ok(PageView {
            items,
            item_count,
            total_pages,
            window,
            token,
        })
    }

    /// Apply a decoded token, or keep current state when the token is
    /// unreadable or belongs to another pager.
    fn restore(&mut self, raw: &str) {
        match PagerState::decode_token(raw) {
            Ok(snapshot) if snapshot.table == self.state.table() => {
                self.state.apply_snapshot(snapshot);
            }
            Ok(snapshot) => {
                debug!(
                    found = %snapshot.table,
                    "state token issued for another pager, keeping defaults"
                );
            }
            Err(err) => {
                debug!(%err, "unreadable state token, keeping defaults");
            }
        }
    }
}
