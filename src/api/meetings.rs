use crate::table::fetch::{rows_from_value, FetchError, Paging, Source};
use crate::table::format::{parse_datetime, CellFormat, ColumnPolicy};
use crate::table::presenter::TableSpec;
use crate::table::query::{DateRules, QuerySnapshot};
use crate::table::transport::OutboundRequest;
use crate::table::Record;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::cmp::Ordering;

const OPERATION: &str = "GetBoardMeetings";

const QUERY: &str = r#"
query GetBoardMeetings($end_date: date, $start_date: date, $company_name: String, $index_symbol: String) {
  meetings: indiacharts_board_meeting_fun(
    order_by: {company: {name: asc}}
    args: {end_date: $end_date, start_date: $start_date, company_name: $company_name, index_symbol: $index_symbol}
  ) {
    company_code
    company_id
    meeting_date
    purpose
    remarks
    deleted
    updated_at
    company {
      name
    }
  }
}
"#;

pub const COLUMNS: &[&str] = &["company_name", "meeting_date", "purpose", "remarks"];

pub const TABLE: TableSpec = TableSpec {
    columns: ColumnPolicy::Only(COLUMNS),
    cells: CellFormat::MEETINGS,
    trend: None,
};

/// Shortcut ranges offered above the date pickers.
pub const QUICK_RANGES: &[(&str, u32)] = &[
    ("Next 1 Week", 7),
    ("Next 10 Days", 10),
    ("Next 15 Days", 15),
];

pub fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default()
}

/// Upcoming meetings may be searched past today, never before the archive starts.
pub fn date_rules() -> DateRules {
    DateRules {
        allow_future_end: true,
        min_date: Some(min_date()),
    }
}

pub struct MeetingsSource {
    url: String,
}

impl MeetingsSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

fn optional_filter(value: &str) -> Value {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

impl Source for MeetingsSource {
    fn name(&self) -> &'static str {
        "meetings"
    }

    fn paging(&self) -> Paging {
        Paging::Client
    }

    fn build_request(&self, snapshot: &QuerySnapshot) -> Option<OutboundRequest> {
        let filters = &snapshot.filters;
        let body = json!({
            "operationName": OPERATION,
            "query": QUERY,
            "variables": {
                "start_date": filters.start_date.format("%Y-%m-%d").to_string(),
                "end_date": filters.end_date.format("%Y-%m-%d").to_string(),
                "company_name": optional_filter(&filters.company),
                "index_symbol": optional_filter(&filters.index_symbol),
            }
        });
        Some(OutboundRequest::post_json(self.url.clone(), body))
    }

    fn decode(&self, body: Value, _snapshot: &QuerySnapshot) -> Result<Vec<Record>, FetchError> {
        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            if let Some(first) = errors.first() {
                let message = first
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("query failed");
                return Err(FetchError::Remote(message.to_string()));
            }
        }

        let meetings = body
            .pointer("/data/meetings")
            .cloned()
            .unwrap_or(Value::Null);

        let mut rows: Vec<Record> = rows_from_value(meetings)?
            .into_iter()
            .map(flatten)
            .collect();
        rows.sort_by(|a, b| {
            compare_meeting_dates(a.get("meeting_date"), b.get("meeting_date"))
        });
        Ok(rows)
    }
}

/// Lifts `company.name` to `company_name` and drops transport metadata.
fn flatten(row: Record) -> Record {
    let mut out = Record::new();
    for (key, value) in row {
        match key.as_str() {
            "__typename" => {}
            "company" => {
                let name = value.get("name").cloned().unwrap_or(Value::Null);
                out.insert("company_name".to_string(), name);
            }
            _ => {
                out.insert(key, value);
            }
        }
    }
    out.entry("company_name").or_insert(Value::Null);
    out
}

// Undated meetings sort last.
fn compare_meeting_dates(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.and_then(parse_datetime);
    let b = b.and_then(parse_datetime);
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
