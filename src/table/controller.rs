use crate::table::fetch::{FetchController, PendingFetch, Source};
use crate::table::presenter::{present, TableModel, TableSpec};
use crate::table::query::{DealType, FilterName, PageLimit, QueryError, QuerySnapshot, QueryState};
use crate::table::view::{reduce, FetchEvent, LoadingRows, Status, ViewState};
use tracing::{debug, info, warn};

/// User intents emitted by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SetFilters(Vec<(FilterName, String)>),
    SetPage(i64),
    SetTab(DealType),
    /// Date range `today..=today + days`.
    QuickRange(u32),
}

/// Owns one screen's query, view and fetcher.
///
/// Callers dispatch intents, wait on the returned [`PendingFetch`] without
/// holding any lock on the controller, then hand the outcome to [`complete`].
///
/// [`complete`]: TableController::complete
pub struct TableController<S: Source> {
    query: QueryState,
    view: ViewState,
    fetcher: FetchController<S>,
    last_snapshot: Option<QuerySnapshot>,
}

impl<S: Source> TableController<S> {
    pub fn new(query: QueryState, fetcher: FetchController<S>, loading_rows: LoadingRows) -> Self {
        Self {
            query,
            view: ViewState::new(loading_rows),
            fetcher,
            last_snapshot: None,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn source(&self) -> &S {
        self.fetcher.source()
    }

    pub fn present(&self, spec: &TableSpec) -> TableModel {
        present(&self.view, &self.query.filters().keyword, spec)
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<Option<PendingFetch>, QueryError> {
        self.dispatch_all(vec![intent])
    }

    /// Applies intents as one unit: either all of them land or the query is left untouched.
    /// At most one fetch is issued for the batch.
    pub fn dispatch_all(
        &mut self,
        intents: Vec<Intent>,
    ) -> Result<Option<PendingFetch>, QueryError> {
        let mut next = self.query.clone();
        let mut needs_fetch = false;
        let mut limit = self.view.page_limit();

        for intent in intents {
            match intent {
                Intent::SetFilters(updates) => {
                    let changed = next
                        .set_filters(updates.iter().map(|(name, value)| (*name, value.as_str())))?;
                    if changed {
                        needs_fetch = true;
                        limit = PageLimit::Unknown;
                    }
                }
                Intent::SetPage(page) => {
                    next.set_page(page, limit)?;
                    needs_fetch = true;
                }
                Intent::SetTab(deal_type) => {
                    next.set_tab(deal_type);
                    needs_fetch = true;
                    limit = PageLimit::Unknown;
                }
                Intent::QuickRange(days) => {
                    next.set_range_from_today(days)?;
                    needs_fetch = true;
                    limit = PageLimit::Unknown;
                }
            }
        }

        self.query = next;

        if needs_fetch {
            return Ok(self.issue(self.query.snapshot()));
        }
        Ok(None)
    }

    /// Issues the current query if nothing has been loaded yet.
    pub fn ensure_loaded(&mut self) -> Option<PendingFetch> {
        if self.view.status == Status::Idle && self.last_snapshot.is_none() {
            self.issue(self.query.snapshot())
        } else {
            None
        }
    }

    pub fn retry(&mut self) -> Option<PendingFetch> {
        let snapshot = self
            .last_snapshot
            .clone()
            .unwrap_or_else(|| self.query.snapshot());
        info!(
            source = self.fetcher.source().name(),
            page = snapshot.page,
            "retrying last query"
        );
        self.issue(snapshot)
    }

    /// Feeds a fetch outcome to the reducer. Returns whether it was applied.
    pub fn complete(&mut self, event: FetchEvent) -> bool {
        let source = self.fetcher.source().name();
        let request_id = event.request_id();
        let applied = self.view.accepts(&event);

        if applied {
            match &event {
                FetchEvent::Succeeded(result) => info!(
                    source,
                    request_id,
                    rows = result.rows.len(),
                    total = result.total.value(),
                    estimated = result.total.is_estimated(),
                    pages = result.total_pages,
                    "fetch applied"
                ),
                FetchEvent::Failed { error, .. } => {
                    warn!(source, request_id, error = %error, "fetch failed")
                }
                FetchEvent::Started { .. } => {}
            }
        } else {
            debug!(
                source,
                request_id,
                latest = ?self.view.latest_request,
                "discarding superseded fetch outcome"
            );
        }

        let current = std::mem::take(&mut self.view);
        self.view = reduce(current, event);
        applied
    }

    fn issue(&mut self, snapshot: QuerySnapshot) -> Option<PendingFetch> {
        self.last_snapshot = Some(snapshot.clone());
        match self.fetcher.issue(snapshot) {
            Some(pending) => {
                let started = FetchEvent::Started {
                    request_id: pending.request_id(),
                    page: pending.page(),
                };
                let current = std::mem::take(&mut self.view);
                self.view = reduce(current, started);
                Some(pending)
            }
            None => {
                debug!(
                    source = self.fetcher.source().name(),
                    "nothing to fetch for current query"
                );
                self.view = self.view.cleared();
                None
            }
        }
    }
}
