use crate::table::fetch::{FetchError, FetchResult, TotalCount};
use crate::table::query::PageLimit;
use crate::table::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What happens to the rows on screen while a new fetch is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingRows {
    /// Keep showing the previous rows, marked stale.
    Retain,
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    Started { request_id: u64, page: u32 },
    Succeeded(FetchResult),
    Failed { request_id: u64, error: FetchError },
}

impl FetchEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            FetchEvent::Started { request_id, .. } => *request_id,
            FetchEvent::Succeeded(result) => result.request_id,
            FetchEvent::Failed { request_id, .. } => *request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub status: Status,
    pub rows: Vec<Record>,
    pub total: Option<TotalCount>,
    pub total_pages: u32,
    pub current_page: u32,
    pub error_message: Option<String>,
    /// Id of the newest fetch started; only its outcome may be applied.
    pub latest_request: Option<u64>,
    pub loading_rows: LoadingRows,
    /// Rows belong to an earlier result while a new one loads.
    pub stale: bool,
    last_page_full: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(LoadingRows::Retain)
    }
}

impl ViewState {
    pub fn new(loading_rows: LoadingRows) -> Self {
        Self {
            status: Status::Idle,
            rows: Vec::new(),
            total: None,
            total_pages: 0,
            current_page: 1,
            error_message: None,
            latest_request: None,
            loading_rows,
            stale: false,
            last_page_full: false,
        }
    }

    /// Back to Idle with nothing on screen. Any in-flight result is discarded.
    pub fn cleared(&self) -> Self {
        Self {
            latest_request: self.latest_request,
            ..Self::new(self.loading_rows)
        }
    }

    /// How far a user may page based on what the last result proved.
    pub fn page_limit(&self) -> PageLimit {
        match self.total {
            None => PageLimit::Unknown,
            Some(TotalCount::Exact(_)) => PageLimit::Known(self.total_pages),
            Some(TotalCount::Estimated(_)) => PageLimit::Open {
                highest: self.current_page + u32::from(self.last_page_full),
            },
        }
    }

    /// True when `event` would be applied by [`reduce`].
    pub fn accepts(&self, event: &FetchEvent) -> bool {
        match event {
            FetchEvent::Started { .. } => true,
            _ => self.status == Status::Loading && self.latest_request == Some(event.request_id()),
        }
    }
}

/// Pure transition function for the table view.
///
/// Outcomes for anything other than the newest started fetch are dropped, so
/// a slow early response can never overwrite a later one.
pub fn reduce(state: ViewState, event: FetchEvent) -> ViewState {
    if !state.accepts(&event) {
        return state;
    }

    match event {
        FetchEvent::Started { request_id, .. } => {
            let (rows, stale) = match state.loading_rows {
                LoadingRows::Retain => {
                    let stale = !state.rows.is_empty();
                    (state.rows, stale)
                }
                LoadingRows::Clear => (Vec::new(), false),
            };
            ViewState {
                status: Status::Loading,
                rows,
                stale,
                error_message: None,
                latest_request: Some(request_id),
                ..state
            }
        }
        FetchEvent::Succeeded(result) => ViewState {
            status: Status::Loaded,
            last_page_full: result.rows.len() as u64 >= u64::from(result.page_size),
            rows: result.rows,
            total: Some(result.total),
            total_pages: result.total_pages,
            current_page: result.page,
            error_message: None,
            stale: false,
            ..state
        },
        FetchEvent::Failed { error, .. } => ViewState {
            status: Status::Failed,
            error_message: Some(error.to_string()),
            ..state
        },
    }
}
