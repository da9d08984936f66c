use crate::router::handle;
use crate::tests::utils::{get, read_body, test_app, MockTransport};
use serde_json::json;

fn meetings() -> serde_json::Value {
    json!({
        "data": {
            "meetings": [
                {
                    "company": { "name": "Zenith Mills", "__typename": "company" },
                    "meeting_date": "2024-06-21",
                    "purpose": "Dividend",
                    "remarks": null
                },
                {
                    "company": { "name": "Acme Steel", "__typename": "company" },
                    "meeting_date": "2024-06-18",
                    "purpose": "Quarterly Results",
                    "remarks": "Board to consider results"
                }
            ]
        }
    })
}

#[test]
fn quick_range_moves_the_window_from_today() {
    let mock = MockTransport::new();
    mock.on("GetBoardMeetings", 200, meetings());
    let app = test_app(mock.clone());

    let resp = handle(get("/meetings?range=10"), &app).unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body = read_body(resp);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    let vars = &calls[0].body.as_ref().unwrap()["variables"];
    assert_eq!(vars["start_date"], "2024-06-14");
    assert_eq!(vars["end_date"], "2024-06-24");
    assert!(vars["company_name"].is_null());
    assert!(vars["index_symbol"].is_null());

    assert!(body.contains("18-06-2024"));
    assert!(body.contains("21-06-2024"));
    assert!(body.contains("N/A"));
    let acme = body.find("Acme Steel").unwrap();
    let zenith = body.find("Zenith Mills").unwrap();
    assert!(acme < zenith, "rows are ordered by meeting date");
}

#[test]
fn company_and_index_filters_are_sent() {
    let mock = MockTransport::new();
    mock.on("GetBoardMeetings", 200, meetings());
    let app = test_app(mock.clone());

    handle(get("/meetings/table?company=Acme&index=all"), &app).unwrap();

    let calls = mock.calls();
    let vars = &calls[0].body.as_ref().unwrap()["variables"];
    assert_eq!(vars["company_name"], "Acme");
    assert!(vars["index_symbol"].is_null());
}

#[test]
fn future_end_dates_are_allowed_but_archive_start_is_enforced() {
    let mock = MockTransport::new();
    mock.on("GetBoardMeetings", 200, meetings());
    let app = test_app(mock.clone());

    let future = "/meetings?startDate=2024-06-14&endDate=2024-12-31";
    let resp = handle(get(future), &app).unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let too_early = "/meetings?startDate=2009-12-31&endDate=2024-06-14";
    let resp = handle(get(too_early), &app).unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body = read_body(resp);
    assert!(body.contains("Dates before 2010-01-01 are not available"));
    assert_eq!(mock.calls().len(), 1);
}

#[test]
fn graphql_errors_surface_in_the_table() {
    let mock = MockTransport::new();
    mock.on(
        "GetBoardMeetings",
        200,
        json!({ "errors": [{ "message": "field 'meetings' not found" }] }),
    );
    let app = test_app(mock);

    let body = read_body(handle(get("/meetings"), &app).unwrap());
    assert!(body.contains("not found"));
    assert!(body.contains(r#"action="/meetings/retry""#));
}
