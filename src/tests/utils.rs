use crate::app::App;
use crate::config::AppConfig;
use crate::table::fetch::FetchError;
use crate::table::transport::{NoCredentials, OutboundRequest, RawResponse, Transport};
use astra::{Body, Response};
use chrono::NaiveDate;
use http::{Method, Request};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

struct Route {
    needle: String,
    outcome: Result<RawResponse, FetchError>,
    remaining: Option<usize>,
    gate: Option<Arc<Mutex<Receiver<()>>>>,
}

/// Scripted stand-in for the remote API.
///
/// A route answers every request whose `describe()` line contains its needle.
/// Routes are tried in registration order; exhausted `once` routes are skipped.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<OutboundRequest>>,
}

pub fn json_response(status: u16, body: Value) -> RawResponse {
    RawResponse {
        status,
        headers: HashMap::new(),
        body: body.to_string(),
    }
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(
        &self,
        needle: &str,
        outcome: Result<RawResponse, FetchError>,
        remaining: Option<usize>,
        gate: Option<Receiver<()>>,
    ) {
        self.routes.lock().unwrap().push(Route {
            needle: needle.to_string(),
            outcome,
            remaining,
            gate: gate.map(|rx| Arc::new(Mutex::new(rx))),
        });
    }

    pub fn on(&self, needle: &str, status: u16, body: Value) {
        self.push(needle, Ok(json_response(status, body)), None, None);
    }

    pub fn on_with_total(&self, needle: &str, body: Value, total: &str) {
        let mut raw = json_response(200, body);
        raw.headers.insert("x-total-count".into(), total.into());
        self.push(needle, Ok(raw), None, None);
    }

    /// Answers once, then falls through to later routes.
    pub fn on_once(&self, needle: &str, status: u16, body: Value) {
        self.push(needle, Ok(json_response(status, body)), Some(1), None);
    }

    pub fn on_error(&self, needle: &str, error: FetchError) {
        self.push(needle, Err(error), None, None);
    }

    /// Holds every matching response until the returned sender fires (or is dropped).
    pub fn on_gated(&self, needle: &str, status: u16, body: Value) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.push(needle, Ok(json_response(status, body)), None, Some(rx));
        tx
    }

    pub fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.describe().contains(needle))
            .count()
    }
}

impl Transport for MockTransport {
    fn execute(
        &self,
        request: &OutboundRequest,
        _timeout: Duration,
    ) -> Result<RawResponse, FetchError> {
        self.calls.lock().unwrap().push(request.clone());
        let line = request.describe();

        let (outcome, gate) = {
            let mut routes = self.routes.lock().unwrap();
            let Some(route) = routes
                .iter_mut()
                .find(|r| line.contains(&r.needle) && r.remaining != Some(0))
            else {
                let miss = serde_json::json!({ "message": format!("no mock route for {line}") });
                return Ok(json_response(404, miss));
            };
            if let Some(n) = route.remaining.as_mut() {
                *n -= 1;
            }
            (route.outcome.clone(), route.gate.clone())
        };

        // Block outside the routes lock so other requests still get answered.
        if let Some(gate) = gate {
            let _ = gate.lock().unwrap().recv();
        }
        outcome
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        api_base: "https://v2.test/v2/api".into(),
        legacy_api_base: "https://v1.test/v1/api".into(),
        graphql_url: "https://v1.test/v1/graphql".into(),
        origin: Some("https://web.test".into()),
        fetch_timeout: Duration::from_secs(2),
        ..AppConfig::default()
    }
}

pub fn test_app(mock: Arc<MockTransport>) -> App {
    App::with_transport(test_config(), mock, Arc::new(NoCredentials), fixed_today)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn read_body(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}
