use crate::router::handle;
use crate::tests::utils::{get, post, read_body, test_app, MockTransport};
use serde_json::{json, Value};

fn rows() -> Value {
    json!([
        { "id": 91, "symbol": "INFY", "client_name": "Client Alpha", "quantity": 1200, "slug": "infy" },
        { "id": 92, "symbol": "INFY", "client_name": "Client Beta", "quantity": 800, "slug": "infy" },
    ])
}

#[test]
fn first_visit_loads_last_week_of_bulk_deals() {
    let mock = MockTransport::new();
    mock.on("deals/bulkdeal", 200, rows());
    let app = test_app(mock.clone());

    let resp = handle(get("/deals"), &app).unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body = read_body(resp);

    assert!(body.contains("Client Alpha"));
    assert!(body.contains("Client Beta"));
    assert!(!body.contains(r#"data-key="id""#));
    assert!(!body.contains(r#"data-key="slug""#));

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    let sent = calls[0].body.clone().unwrap();
    assert_eq!(sent["startDate"], "20240607");
    assert_eq!(sent["endDate"], "20240614");
    assert_eq!(calls[0].header_value("Origin"), Some("https://web.test"));
}

#[test]
fn keyword_highlights_without_refetching() {
    let mock = MockTransport::new();
    mock.on("deals/bulkdeal", 200, rows());
    let app = test_app(mock.clone());

    let body = read_body(handle(get("/deals?q=beta"), &app).unwrap());
    assert!(body.contains("<mark>Beta</mark>"));
    assert!(!body.contains("Client Alpha"));

    let body = read_body(handle(get("/deals/table?q=alpha"), &app).unwrap());
    assert!(body.contains("<mark>Alpha</mark>"));
    assert!(!body.contains("<html"));

    assert_eq!(mock.calls().len(), 1);
}

#[test]
fn rejected_dates_answer_400_and_keep_the_query() {
    let mock = MockTransport::new();
    mock.on("deals/bulkdeal", 200, rows());
    let app = test_app(mock.clone());

    let resp = handle(get("/deals?startDate=2024-06-10&endDate=2024-06-01"), &app).unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body = read_body(resp);
    assert!(body.contains("Start date cannot be after end date"));

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body.as_ref().unwrap()["startDate"], "20240607");
}

#[test]
fn tab_switch_hits_the_insider_endpoint() {
    let mock = MockTransport::new();
    mock.on(
        "insidertrading",
        200,
        json!([{ "symbol": "TCS", "person_name": "A. Director" }]),
    );
    let app = test_app(mock.clone());

    let body = read_body(handle(get("/deals?tab=insider"), &app).unwrap());
    assert!(body.contains("A. Director"));
    assert_eq!(mock.calls_matching("insidertrading"), 1);
    assert_eq!(mock.calls_matching("bulkdeal"), 0);
}

#[test]
fn failure_offers_retry_that_resends_the_query() {
    let mock = MockTransport::new();
    mock.on_once("deals/bulkdeal", 503, json!({ "message": "maintenance" }));
    mock.on("deals/bulkdeal", 200, rows());
    let app = test_app(mock.clone());

    let body = read_body(handle(get("/deals?symbol=infy"), &app).unwrap());
    assert!(body.contains("Request failed with status 503"));
    assert!(body.contains(r#"action="/deals/retry""#));

    let resp = handle(post("/deals/retry"), &app).unwrap();
    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(
        resp.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/deals")
    );

    let body = read_body(handle(get("/deals"), &app).unwrap());
    assert!(body.contains("Client Alpha"));
    assert!(!body.contains("Request failed"));

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].body, calls[1].body);
}

#[test]
fn out_of_range_page_is_rejected() {
    let mock = MockTransport::new();
    mock.on_with_total("deals/bulkdeal", rows(), "2");
    let app = test_app(mock.clone());

    handle(get("/deals"), &app).unwrap();
    let resp = handle(get("/deals/table?page=5"), &app).unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    assert!(read_body(resp).contains("Page 5 is out of range"));
    assert_eq!(mock.calls().len(), 1);
}
