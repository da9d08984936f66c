use crate::api::join_url;
use crate::table::fetch::{FetchError, Paging, Source};
use crate::table::format::{CellFormat, ColumnPolicy};
use crate::table::presenter::{TableSpec, Trend};
use crate::table::query::QuerySnapshot;
use crate::table::transport::OutboundRequest;
use crate::table::Record;
use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde_json::Value;

/// Positions of the candle tuple returned per security.
pub const TICK_FIELDS: [&str; 7] = [
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "delivery_volume",
];

pub const TABLE: TableSpec = TableSpec {
    columns: ColumnPolicy::Only(&TICK_FIELDS),
    cells: CellFormat::PRICES,
    trend: Some(close_trend),
};

/// ▲ when a candle closed above its open, ▼ when below.
pub fn close_trend(key: &str, row: &Record) -> Option<Trend> {
    if key != "close" {
        return None;
    }
    let open = row.get("open").and_then(Value::as_f64)?;
    let close = row.get("close").and_then(Value::as_f64)?;
    if close > open {
        Some(Trend::Up)
    } else if close < open {
        Some(Trend::Down)
    } else {
        None
    }
}

pub struct PricesSource {
    base: String,
    offset: FixedOffset,
}

impl PricesSource {
    pub fn new(base: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            base: base.into(),
            offset,
        }
    }

    fn stamp(&self, day: NaiveDate, time: NaiveTime) -> String {
        let local = day.and_time(time);
        match self.offset.from_local_datetime(&local).single() {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            None => format!("{}{}", local.format("%Y-%m-%dT%H:%M:%S"), self.offset),
        }
    }
}

fn security(symbol: &str) -> String {
    format!("EQ:{}", symbol.trim().to_uppercase())
}

impl Source for PricesSource {
    fn name(&self) -> &'static str {
        "prices"
    }

    fn paging(&self) -> Paging {
        Paging::Client
    }

    fn build_request(&self, snapshot: &QuerySnapshot) -> Option<OutboundRequest> {
        let filters = &snapshot.filters;
        if filters.symbol.trim().is_empty() {
            return None;
        }

        let start_of_day = NaiveTime::MIN;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);

        Some(
            OutboundRequest::get(join_url(&self.base, "equity/priceticks"))
                .with_query("candleInterval", filters.interval.code())
                .with_query("from", self.stamp(filters.start_date, start_of_day))
                .with_query("to", self.stamp(filters.end_date, end_of_day))
                .with_query("securities", security(&filters.symbol)),
        )
    }

    fn decode(&self, body: Value, snapshot: &QuerySnapshot) -> Result<Vec<Record>, FetchError> {
        let symbol = snapshot.filters.symbol.trim().to_uppercase();

        let ticks = body
            .pointer("/data/ticks")
            .and_then(|ticks| ticks.get(&symbol))
            .or_else(|| body.get(&symbol));

        let ticks = match ticks {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(FetchError::Parse(format!(
                    "ticks for {symbol} are not a list: {other}"
                )))
            }
        };

        ticks
            .iter()
            .enumerate()
            .map(|(i, tick)| tick_record(i, tick))
            .collect()
    }
}

fn tick_record(index: usize, tick: &Value) -> Result<Record, FetchError> {
    match tick {
        Value::Array(values) => Ok(TICK_FIELDS
            .iter()
            .enumerate()
            .map(|(pos, key)| {
                let value = values.get(pos).cloned().unwrap_or(Value::Null);
                (key.to_string(), value)
            })
            .collect()),
        // Some deployments already answer with keyed candles.
        Value::Object(record) => Ok(record.clone()),
        other => {
            let message = format!("tick {index} is not a candle: {other}");
            Err(FetchError::Parse(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::query::{Filters, Interval};
    use serde_json::json;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn snapshot(symbol: &str) -> QuerySnapshot {
        let mut filters = Filters::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
        );
        filters.symbol = symbol.into();
        filters.interval = Interval::Day1;
        QuerySnapshot {
            filters,
            page: 1,
            page_size: 250,
        }
    }

    #[test]
    fn no_symbol_means_no_request() {
        let source = PricesSource::new("https://v2.test/v2/api", ist());
        assert!(source.build_request(&snapshot("  ")).is_none());
    }

    #[test]
    fn query_carries_interval_range_and_security() {
        let source = PricesSource::new("https://v2.test/v2/api", ist());
        let req = source.build_request(&snapshot("infy")).unwrap();

        assert_eq!(req.url, "https://v2.test/v2/api/equity/priceticks");
        assert_eq!(req.query_value("candleInterval"), Some("1d"));
        assert_eq!(req.query_value("from"), Some("2024-01-01T00:00:00+05:30"));
        assert_eq!(req.query_value("to"), Some("2024-06-14T23:59:59+05:30"));
        assert_eq!(req.query_value("securities"), Some("EQ:INFY"));
    }

    #[test]
    fn tuples_become_named_records() {
        let body = json!({ "data": { "ticks": { "INFY": [
            ["2024-06-10T09:15:00+05:30", 1500.0, 1520.5, 1490.0, 1510.0, 120000, 64000],
            ["2024-06-11T09:15:00+05:30", 1510.0, 1512.0, 1480.0, 1495.5, 98000]
        ]}}});

        let rows = PricesSource::new("u", ist())
            .decode(body, &snapshot("INFY"))
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["close"], json!(1510.0));
        assert_eq!(rows[0]["delivery_volume"], json!(64000));
        assert_eq!(rows[1]["delivery_volume"], Value::Null);
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(keys, TICK_FIELDS.iter().collect::<Vec<_>>());
    }

    #[test]
    fn bare_symbol_mapping_is_accepted() {
        let body = json!({ "TCS": [["2024-06-10", 1, 2, 0.5, 1.5, 10, 5]] });
        let rows = PricesSource::new("u", ist())
            .decode(body, &snapshot("tcs"))
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn unknown_symbol_yields_no_rows() {
        let body = json!({ "data": { "ticks": {} } });
        let rows = PricesSource::new("u", ist())
            .decode(body, &snapshot("INFY"))
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn trend_compares_close_to_open() {
        let candle = |open: f64, close: f64| {
            json!({ "open": open, "close": close })
                .as_object()
                .cloned()
                .unwrap()
        };
        let (up, down, flat) = (candle(10.0, 12.0), candle(10.0, 9.0), candle(10.0, 10.0));

        assert_eq!(close_trend("close", &up), Some(Trend::Up));
        assert_eq!(close_trend("close", &down), Some(Trend::Down));
        assert_eq!(close_trend("close", &flat), None);
        assert_eq!(close_trend("open", &up), None);
    }
}
