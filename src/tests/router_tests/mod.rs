mod deals_tests;
mod meetings_tests;
mod prices_tests;
mod stocks_tests;

use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{get, test_app, MockTransport};

#[test]
fn home_lists_every_screen() {
    let app = test_app(MockTransport::new());
    let resp = handle(get("/"), &app).unwrap();
    let body = crate::tests::utils::read_body(resp);
    assert!(body.contains(r#"href="/deals""#));
    assert!(body.contains(r#"href="/meetings""#));
    assert!(body.contains(r#"href="/prices""#));
}

#[test]
fn unknown_path_is_not_found() {
    let mock = MockTransport::new();
    let app = test_app(mock.clone());
    let outcome = handle(get("/nope"), &app);
    assert!(matches!(outcome, Err(ServerError::NotFound)));
    assert!(mock.calls().is_empty());
}

#[test]
fn pages_reference_no_local_static_assets() {
    let app = test_app(MockTransport::new());
    let body = crate::tests::utils::read_body(handle(get("/"), &app).unwrap());
    assert!(!body.contains("/static/"));
    assert!(body.contains("<style>"));
}
