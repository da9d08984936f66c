use crate::table::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

/// Which fields of a record become table columns.
#[derive(Debug, Clone, Copy)]
pub enum ColumnPolicy {
    /// Every field of the first row except these internal ones.
    Hide(&'static [&'static str]),
    /// Exactly these fields, in this order.
    Only(&'static [&'static str]),
}

impl ColumnPolicy {
    pub fn columns(&self, rows: &[&Record]) -> Vec<String> {
        match self {
            ColumnPolicy::Only(keys) => keys.iter().map(|k| k.to_string()).collect(),
            ColumnPolicy::Hide(hidden) => first_row_keys(rows, hidden),
        }
    }
}

fn first_row_keys(rows: &[&Record], hidden: &[&str]) -> Vec<String> {
    rows.first()
        .map(|row| {
            row.keys()
                .filter(|k| !hidden.contains(&k.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// `client_name` -> `Client Name`
pub fn header_title(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Per-screen display rules for cell values.
#[derive(Debug, Clone, Copy)]
pub struct CellFormat {
    /// strftime pattern for date-like fields.
    pub date_pattern: &'static str,
    /// Shown for missing, null or blank values.
    pub missing: &'static str,
}

impl CellFormat {
    pub const DEALS: CellFormat = CellFormat {
        date_pattern: "%d %b %Y %H:%M",
        missing: "-",
    };
    pub const MEETINGS: CellFormat = CellFormat {
        date_pattern: "%d-%m-%Y",
        missing: "N/A",
    };
    pub const PRICES: CellFormat = CellFormat {
        date_pattern: "%d/%m/%Y %H:%M",
        missing: "N/A",
    };

    pub fn format(&self, key: &str, value: Option<&Value>) -> String {
        let value = match value {
            None | Some(Value::Null) => return self.missing.to_string(),
            Some(Value::String(s)) if s.trim().is_empty() => return self.missing.to_string(),
            Some(v) => v,
        };

        if is_date_like(key) {
            if let Some(dt) = parse_datetime(value) {
                return dt.format(self.date_pattern).to_string();
            }
        }

        match value {
            Value::Number(n) => group_number(n),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            other => serde_json::to_string_pretty(other).unwrap_or_default(),
        }
    }
}

pub fn is_date_like(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("date") || key.contains("time")
}

/// Best-effort parse of the date shapes the remote API emits.
pub fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.naive_local());
            }
            for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
                    return Some(dt);
                }
            }
            for pattern in ["%Y-%m-%d", "%Y%m%d", "%d-%m-%Y"] {
                if let Ok(d) = NaiveDate::parse_from_str(s, pattern) {
                    return d.and_hms_opt(0, 0, 0);
                }
            }
            None
        }
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // Anything this large is milliseconds.
            let dt = if raw.abs() >= 100_000_000_000 {
                DateTime::from_timestamp_millis(raw)?
            } else {
                DateTime::from_timestamp(raw, 0)?
            };
            Some(dt.naive_utc())
        }
        _ => None,
    }
}

/// Thousands separators, at most three fraction digits.
pub fn group_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return signed(&i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return signed(&u.to_string());
    }
    let f = n.as_f64().unwrap_or_default();
    let fixed = format!("{f:.3}");
    signed(fixed.trim_end_matches('0').trim_end_matches('.'))
}

/// Groups the integer part. The sign is kept unless every digit is zero.
fn signed(fixed: &str) -> String {
    let (negative, body) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fixed),
    };
    let grouped = match body.split_once('.') {
        Some((int, frac)) => format!("{}.{frac}", group_digits(int)),
        None => group_digits(body),
    };
    if negative && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}
