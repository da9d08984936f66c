use chrono::{Local, NaiveDate};
use std::fmt;
use thiserror::Error;

const INVALID_DATES: &str = "Please enter valid dates";

/// Rejected user input. The query state is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("{0}")]
    Validation(String),
    #[error("Page {requested} is out of range")]
    Range { requested: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealType {
    Bulk,
    Block,
    Insider,
}

impl DealType {
    pub const ALL: [DealType; 3] = [DealType::Bulk, DealType::Block, DealType::Insider];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealType::Bulk => "bulk",
            DealType::Block => "block",
            DealType::Insider => "insider",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bulk" => Ok(DealType::Bulk),
            "block" => Ok(DealType::Block),
            "insider" => Ok(DealType::Insider),
            other => {
                let message = format!("Unknown deal type '{other}'");
                Err(QueryError::Validation(message))
            }
        }
    }
}

impl fmt::Display for DealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candle interval codes accepted by the price-history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Min1,
    Min3,
    Min5,
    Min15,
    Min30,
    Min45,
    Day1,
    Week1,
    Month1,
    Month3,
    Month6,
    Year1,
}

impl Interval {
    pub const ALL: [Interval; 12] = [
        Interval::Min1,
        Interval::Min3,
        Interval::Min5,
        Interval::Min15,
        Interval::Min30,
        Interval::Min45,
        Interval::Day1,
        Interval::Week1,
        Interval::Month1,
        Interval::Month3,
        Interval::Month6,
        Interval::Year1,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Interval::Min1 => "1m",
            Interval::Min3 => "3m",
            Interval::Min5 => "5m",
            Interval::Min15 => "15m",
            Interval::Min30 => "30m",
            Interval::Min45 => "45m",
            Interval::Day1 => "1d",
            Interval::Week1 => "1w",
            Interval::Month1 => "1M",
            Interval::Month3 => "3M",
            Interval::Month6 => "6M",
            Interval::Year1 => "1Y",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Interval::Min1 => "1 Minute",
            Interval::Min3 => "3 Minutes",
            Interval::Min5 => "5 Minutes",
            Interval::Min15 => "15 Minutes",
            Interval::Min30 => "30 Minutes",
            Interval::Min45 => "45 Minutes",
            Interval::Day1 => "1 Day",
            Interval::Week1 => "1 Week",
            Interval::Month1 => "1 Month",
            Interval::Month3 => "3 Months",
            Interval::Month6 => "6 Months",
            Interval::Year1 => "1 Year",
        }
    }

    /// Codes are case-sensitive: `1m` is a minute, `1M` a month.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let raw = raw.trim();
        Interval::ALL
            .iter()
            .copied()
            .find(|i| i.code() == raw)
            .ok_or_else(|| {
                QueryError::Validation(format!("Unknown interval '{raw}'"))
            })
    }
}

/// Names under which filters arrive from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterName {
    Symbol,
    StartDate,
    EndDate,
    DealType,
    Keyword,
    Interval,
    Company,
    IndexSymbol,
}

impl FilterName {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "symbol" => Some(FilterName::Symbol),
            "startDate" | "from" => Some(FilterName::StartDate),
            "endDate" | "to" => Some(FilterName::EndDate),
            "tab" | "dealType" => Some(FilterName::DealType),
            "q" | "keyword" => Some(FilterName::Keyword),
            "interval" => Some(FilterName::Interval),
            "company" => Some(FilterName::Company),
            "index" => Some(FilterName::IndexSymbol),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub deal_type: DealType,
    pub keyword: String,
    pub interval: Interval,
    pub company: String,
    pub index_symbol: String,
}

impl Filters {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            symbol: String::new(),
            start_date,
            end_date,
            deal_type: DealType::Bulk,
            keyword: String::new(),
            interval: Interval::Week1,
            company: String::new(),
            index_symbol: String::new(),
        }
    }

    fn apply(&mut self, name: FilterName, value: &str) -> Result<(), QueryError> {
        match name {
            FilterName::Symbol => self.symbol = value.trim().to_string(),
            FilterName::StartDate => self.start_date = parse_date(value)?,
            FilterName::EndDate => self.end_date = parse_date(value)?,
            FilterName::DealType => self.deal_type = DealType::parse(value)?,
            FilterName::Keyword => self.keyword = value.trim().to_string(),
            FilterName::Interval => self.interval = Interval::parse(value)?,
            FilterName::Company => self.company = value.trim().to_string(),
            FilterName::IndexSymbol => self.index_symbol = value.trim().to_string(),
        }
        Ok(())
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, QueryError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .map_err(|_| QueryError::Validation(INVALID_DATES.into()))
}

/// Date constraints that differ per screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRules {
    /// Upcoming-event screens may look past today.
    pub allow_future_end: bool,
    pub min_date: Option<NaiveDate>,
}

impl Default for DateRules {
    fn default() -> Self {
        Self {
            allow_future_end: false,
            min_date: None,
        }
    }
}

/// What the last fetch told us about how far pagination may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLimit {
    Unknown,
    Known(u32),
    /// The server gave no total; only pages up to `highest` are reachable.
    Open { highest: u32 },
}

/// Immutable copy of the query at the moment a fetch is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySnapshot {
    pub filters: Filters,
    pub page: u32,
    pub page_size: u32,
}

impl QuerySnapshot {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone)]
pub struct QueryState {
    filters: Filters,
    page: u32,
    page_size: u32,
    rules: DateRules,
    clock: fn() -> NaiveDate,
}

impl QueryState {
    pub fn new(filters: Filters, page_size: u32, rules: DateRules) -> Self {
        Self {
            filters,
            page: 1,
            page_size: page_size.max(1),
            rules,
            clock: local_today,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn rules(&self) -> DateRules {
        self.rules
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Applies a batch of filter updates atomically.
    ///
    /// The batch is validated as a whole, so a date range can be moved in one
    /// step even if an intermediate single-field update would be invalid.
    /// Returns `true` when a server-side filter changed; the page is then reset to 1.
    pub fn set_filters<'a, I>(&mut self, updates: I) -> Result<bool, QueryError>
    where
        I: IntoIterator<Item = (FilterName, &'a str)>,
    {
        let mut next = self.filters.clone();
        for (name, value) in updates {
            next.apply(name, value)?;
        }
        self.validate(&next)?;

        let server_side_changed = next.symbol != self.filters.symbol
            || next.start_date != self.filters.start_date
            || next.end_date != self.filters.end_date
            || next.deal_type != self.filters.deal_type
            || next.interval != self.filters.interval
            || next.company != self.filters.company
            || next.index_symbol != self.filters.index_symbol;

        self.filters = next;
        if server_side_changed {
            self.page = 1;
        }
        Ok(server_side_changed)
    }

    pub fn set_page(&mut self, requested: i64, limit: PageLimit) -> Result<(), QueryError> {
        let max = match limit {
            PageLimit::Unknown => u32::MAX,
            PageLimit::Known(total) => total.max(1),
            PageLimit::Open { highest } => highest.max(1),
        };
        if requested < 1 || requested > i64::from(max) {
            return Err(QueryError::Range { requested });
        }
        self.page = requested as u32;
        Ok(())
    }

    /// Switching data source makes the old pagination meaningless.
    pub fn set_tab(&mut self, deal_type: DealType) {
        self.filters.deal_type = deal_type;
        self.page = 1;
    }

    /// Moves the date range to `today..=today + days`, clamped to the minimum date.
    pub fn set_range_from_today(&mut self, days: u32) -> Result<bool, QueryError> {
        let mut start = self.today();
        if let Some(min) = self.rules.min_date {
            start = start.max(min);
        }
        let end = start + chrono::Duration::days(i64::from(days));
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        self.set_filters([
            (FilterName::StartDate, start.as_str()),
            (FilterName::EndDate, end.as_str()),
        ])
    }

    pub fn snapshot(&self) -> QuerySnapshot {
        QuerySnapshot {
            filters: self.filters.clone(),
            page: self.page,
            page_size: self.page_size,
        }
    }

    fn validate(&self, filters: &Filters) -> Result<(), QueryError> {
        if filters.start_date > filters.end_date {
            return Err(QueryError::Validation(
                "Start date cannot be after end date".into(),
            ));
        }
        if !self.rules.allow_future_end && filters.end_date > self.today() {
            return Err(QueryError::Validation(
                "End date cannot be in the future".into(),
            ));
        }
        if let Some(min) = self.rules.min_date {
            if filters.start_date < min {
                return Err(QueryError::Validation(format!(
                    "Dates before {} are not available",
                    min.format("%Y-%m-%d")
                )));
            }
        }
        Ok(())
    }
}
