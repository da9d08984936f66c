use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{get, read_body, test_app, MockTransport};
use serde_json::json;

#[test]
fn short_queries_do_not_search() {
    let mock = MockTransport::new();
    let app = test_app(mock.clone());

    let body = read_body(handle(get("/stocks/search?q=r"), &app).unwrap());
    assert!(!body.contains("No matching symbols."));
    assert!(mock.calls().is_empty());
}

#[test]
fn search_links_hits_to_price_history() {
    let mock = MockTransport::new();
    mock.on(
        "/search?q=reli",
        200,
        json!({
            "stocks": [
                { "symbol": "RELIANCE", "company_name": "Reliance Industries", "exchange_group": "A", "fno": true }
            ]
        }),
    );
    let app = test_app(mock.clone());

    let body = read_body(handle(get("/stocks/search?q=reli"), &app).unwrap());
    assert!(body.contains(r#"href="/prices?symbol=RELIANCE""#));
    assert!(body.contains("Reliance Industries"));
    assert!(body.contains("F&amp;O"));
    assert_eq!(mock.calls()[0].query_value("limit"), Some("10"));
}

#[test]
fn empty_search_says_so() {
    let mock = MockTransport::new();
    mock.on("/search?q=zzz", 200, json!({ "stocks": [] }));
    let app = test_app(mock);

    let body = read_body(handle(get("/stocks/search?q=zzz"), &app).unwrap());
    assert!(body.contains("No matching symbols."));
}

#[test]
fn quote_card_shows_circuit_band() {
    let mock = MockTransport::new();
    mock.on(
        "/quote/INFY",
        200,
        json!({ "quote": { "current_price": 1500.0, "change": 12.5 } }),
    );
    mock.on(
        "/search?q=INFY",
        200,
        json!({ "stocks": [{ "symbol": "INFY", "circuit_limit": 20.0 }] }),
    );
    let app = test_app(mock);

    let body = read_body(handle(get("/prices/quote?symbol=infy"), &app).unwrap());
    assert!(body.contains("1500.00"));
    assert!(body.contains("Circuit Limit 20% · Upper 1800.00 · Lower 1200.00"));
}

#[test]
fn quote_survives_a_failed_descriptor_lookup() {
    let mock = MockTransport::new();
    mock.on(
        "/quote/TCS",
        200,
        json!({ "quote": { "current_price": 4000.0 } }),
    );
    mock.on("/search?q=TCS", 500, json!({ "message": "boom" }));
    let app = test_app(mock);

    let body = read_body(handle(get("/prices/quote?symbol=TCS"), &app).unwrap());
    assert!(body.contains("Circuit Limit 10% · Upper 4400.00 · Lower 3600.00"));
}

#[test]
fn quote_requires_a_symbol() {
    let app = test_app(MockTransport::new());
    assert!(matches!(
        handle(get("/prices/quote?symbol=%20"), &app),
        Err(ServerError::BadRequest(_))
    ));
}

#[test]
fn suggestion_links_encode_the_symbol() {
    let mock = MockTransport::new();
    mock.on(
        "/search?q=j&k",
        200,
        json!({ "stocks": [{ "symbol": "J&KBANK" }] }),
    );
    let app = test_app(mock);

    let body = read_body(handle(get("/stocks/search?q=j%26k"), &app).unwrap());
    assert!(body.contains(r#"href="/prices?symbol=J%26KBANK""#));
}
