use crate::table::query::QuerySnapshot;
use crate::table::transport::{
    authorize, CredentialProvider, OutboundRequest, RawResponse, Transport,
};
use crate::table::view::FetchEvent;
use crate::table::Record;
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Extra time a waiter allows beyond the transport timeout before giving up on a fetch.
const WAIT_GRACE: Duration = Duration::from_millis(500);

const TOTAL_COUNT_HEADER: &str = "x-total-count";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request failed{}: {message}", status_suffix(.status))]
    Network {
        status: Option<u16>,
        message: String,
    },
    #[error("Request timed out")]
    Timeout,
    #[error("Unexpected response: {0}")]
    Parse(String),
    /// The remote answered successfully but reported an error of its own.
    #[error("{0}")]
    Remote(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Network { status, .. } => *status,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalCount {
    Exact(u64),
    /// Derived as `rows * page` because the server did not say.
    Estimated(u64),
}

impl TotalCount {
    pub fn value(&self) -> u64 {
        match self {
            TotalCount::Exact(n) | TotalCount::Estimated(n) => *n,
        }
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, TotalCount::Estimated(_))
    }
}

/// Where pagination happens for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// The server receives limit/offset and returns one page.
    Server,
    /// The server returns everything; pages are cut locally.
    Client,
}

/// Endpoint-specific half of a fetch: parameter mapping and body decoding.
pub trait Source: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn paging(&self) -> Paging {
        Paging::Server
    }

    /// `None` when the snapshot does not warrant a request yet.
    fn build_request(&self, snapshot: &QuerySnapshot) -> Option<OutboundRequest>;

    fn decode(&self, body: Value, snapshot: &QuerySnapshot) -> Result<Vec<Record>, FetchError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub request_id: u64,
    pub snapshot: QuerySnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub request_id: u64,
    pub page: u32,
    pub page_size: u32,
    pub rows: Vec<Record>,
    pub total: TotalCount,
    pub total_pages: u32,
}

pub fn total_pages(total: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total.div_ceil(page_size);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Checks the status and parses the body as JSON.
pub fn expect_json(raw: &RawResponse) -> Result<Value, FetchError> {
    if !raw.is_success() {
        let mut message: String = raw.body.chars().take(200).collect();
        if message.trim().is_empty() {
            message = "empty response".into();
        }
        return Err(FetchError::Network {
            status: Some(raw.status),
            message,
        });
    }
    serde_json::from_str(&raw.body)
        .map_err(|e| FetchError::Parse(e.to_string()))
}

/// Accepts a collection of records, a single bare record, or `null`.
pub fn rows_from_value(value: Value) -> Result<Vec<Record>, FetchError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(FetchError::Parse(format!(
                    "row {i} is not an object: {other}"
                ))),
            })
            .collect(),
        Value::Object(record) => Ok(vec![record]),
        Value::Null => Ok(Vec::new()),
        other => Err(FetchError::Parse(format!(
            "expected a list of records, got {other}"
        ))),
    }
}

pub fn normalize<S: Source + ?Sized>(
    source: &S,
    request: &FetchRequest,
    raw: &RawResponse,
) -> Result<FetchResult, FetchError> {
    let body = expect_json(raw)?;
    let mut rows = source.decode(body, &request.snapshot)?;
    let snapshot = &request.snapshot;

    let total = match source.paging() {
        Paging::Server => match raw.header(TOTAL_COUNT_HEADER) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(n) => TotalCount::Exact(n),
                Err(_) => {
                    warn!(
                        source = source.name(),
                        header = value,
                        "unparseable total count, estimating"
                    );
                    estimate(rows.len(), snapshot.page)
                }
            },
            None => estimate(rows.len(), snapshot.page),
        },
        Paging::Client => {
            let total = rows.len() as u64;
            let offset = usize::try_from(snapshot.offset()).unwrap_or(usize::MAX);
            rows = rows
                .into_iter()
                .skip(offset)
                .take(snapshot.page_size as usize)
                .collect();
            TotalCount::Exact(total)
        }
    };

    Ok(FetchResult {
        request_id: request.request_id,
        page: snapshot.page,
        page_size: snapshot.page_size,
        total_pages: total_pages(total.value(), snapshot.page_size),
        rows,
        total,
    })
}

fn estimate(rows: usize, page: u32) -> TotalCount {
    TotalCount::Estimated(rows as u64 * u64::from(page))
}

/// Issues fetches for one source. Every fetch gets a fresh, strictly increasing id.
pub struct FetchController<S: Source> {
    source: Arc<S>,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    timeout: Duration,
    last_id: u64,
}

impl<S: Source> FetchController<S> {
    pub fn new(
        source: S,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            source: Arc::new(source),
            transport,
            credentials,
            timeout,
            last_id: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Starts a fetch on a worker thread and returns immediately.
    pub fn issue(&mut self, snapshot: QuerySnapshot) -> Option<PendingFetch> {
        let outbound = self.source.build_request(&snapshot)?;
        let outbound = authorize(outbound, self.credentials.as_ref());

        self.last_id += 1;
        let request = FetchRequest {
            request_id: self.last_id,
            snapshot,
        };
        let request_id = request.request_id;
        let page = request.snapshot.page;

        debug!(
            source = self.source.name(),
            request_id,
            page,
            request = %outbound.describe(),
            "fetch issued"
        );

        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        let transport = Arc::clone(&self.transport);
        let timeout = self.timeout;

        let spawned = thread::Builder::new()
            .name(format!("fetch-{}-{request_id}", self.source.name()))
            .spawn(move || {
                let outcome = transport
                    .execute(&outbound, timeout)
                    .and_then(|raw| normalize(source.as_ref(), &request, &raw));
                let event = match outcome {
                    Ok(result) => FetchEvent::Succeeded(result),
                    Err(error) => FetchEvent::Failed { request_id, error },
                };
                // The waiter may have given up already.
                let _ = tx.send(event);
            });
        if let Err(e) = spawned {
            let source = self.source.name();
            warn!(source, request_id, error = %e, "could not start fetch worker");
        }

        Some(PendingFetch {
            request_id,
            page,
            rx,
            deadline: Instant::now() + self.timeout + WAIT_GRACE,
        })
    }
}

/// Handle to an in-flight fetch.
pub struct PendingFetch {
    request_id: u64,
    page: u32,
    rx: Receiver<FetchEvent>,
    deadline: Instant,
}

impl PendingFetch {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Blocks until the fetch resolves or its deadline passes.
    pub fn wait(self) -> FetchEvent {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        match self.rx.recv_timeout(remaining) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => self.timed_out(),
            Err(RecvTimeoutError::Disconnected) => self.worker_lost(),
        }
    }

    fn timed_out(&self) -> FetchEvent {
        FetchEvent::Failed {
            request_id: self.request_id,
            error: FetchError::Timeout,
        }
    }

    fn worker_lost(&self) -> FetchEvent {
        FetchEvent::Failed {
            request_id: self.request_id,
            error: FetchError::Network {
                status: None,
                message: "fetch worker exited without a result".into(),
            },
        }
    }
}
