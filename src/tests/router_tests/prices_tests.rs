use crate::router::handle;
use crate::tests::utils::{get, read_body, test_app, MockTransport};
use serde_json::json;

#[test]
fn no_symbol_means_no_request() {
    let mock = MockTransport::new();
    let app = test_app(mock.clone());

    let resp = handle(get("/prices"), &app).unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert!(read_body(resp).contains("Choose filters to load data."));
    assert!(mock.calls().is_empty());
}

#[test]
fn symbol_loads_candles_with_trend_markers() {
    let mock = MockTransport::new();
    mock.on(
        "securities=EQ:INFY",
        200,
        json!({
            "data": {
                "ticks": {
                    "INFY": [
                        ["2024-06-10T00:00:00+05:30", 1500.0, 1540.0, 1490.0, 1530.0, 120000, 64000],
                        ["2024-06-03T00:00:00+05:30", 1520.0, 1525.0, 1480.0, 1500.0, 98000, 51000]
                    ]
                }
            }
        }),
    );
    let app = test_app(mock.clone());

    let resp = handle(get("/prices?symbol=infy&interval=1d"), &app).unwrap();
    let body = read_body(resp);
    assert!(body.contains("▲"));
    assert!(body.contains("▼"));

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].url.ends_with("/v2/api/equity/priceticks"));
    assert_eq!(calls[0].query_value("candleInterval"), Some("1d"));
    let call = &calls[0];
    assert_eq!(call.query_value("from"), Some("2023-12-14T00:00:00+05:30"));
    assert_eq!(call.query_value("to"), Some("2024-06-14T23:59:59+05:30"));
}

#[test]
fn default_interval_is_weekly() {
    let mock = MockTransport::new();
    mock.on("securities=EQ:TCS", 200, json!({ "TCS": [] }));
    let app = test_app(mock.clone());

    let body = read_body(handle(get("/prices?symbol=TCS"), &app).unwrap());
    assert!(body.contains("No records found for the selected filters."));
    assert_eq!(mock.calls()[0].query_value("candleInterval"), Some("1w"));
}

#[test]
fn unknown_interval_is_rejected() {
    let mock = MockTransport::new();
    let app = test_app(mock.clone());

    let resp = handle(get("/prices?symbol=TCS&interval=2h"), &app).unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    assert!(mock.calls().is_empty());
}

#[test]
fn ampersand_symbols_keep_their_full_name_in_links() {
    let mock = MockTransport::new();
    mock.on("securities=EQ:M&M", 200, json!({ "M&M": [] }));
    mock.on(
        "/quote/M&M",
        200,
        json!({ "quote": { "current_price": 2800.0 } }),
    );
    mock.on("/search?q=M&M", 200, json!({ "stocks": [] }));
    let app = test_app(mock.clone());

    let body = read_body(handle(get("/prices?symbol=M%26M"), &app).unwrap());
    assert!(body.contains(r#"hx-get="/prices/quote?symbol=M%26M""#));
    assert_eq!(mock.calls_matching("securities=EQ:M&M"), 1);

    let body = read_body(handle(get("/prices/quote?symbol=M%26M"), &app).unwrap());
    assert!(body.contains("M&amp;M"));
    assert!(mock.calls().iter().any(|c| c.url.ends_with("/quote/M&M")));
}
