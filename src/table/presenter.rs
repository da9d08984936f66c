use crate::table::format::{header_title, CellFormat, ColumnPolicy};
use crate::table::keyword::{filter_rows, highlight, Segment};
use crate::table::query::PageLimit;
use crate::table::view::{Status, ViewState};
use crate::table::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn glyph(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
        }
    }
}

/// Per-cell direction marker, given the column key and the whole row.
pub type TrendRule = fn(&str, &Record) -> Option<Trend>;

/// Static display rules for one screen's table.
#[derive(Clone, Copy)]
pub struct TableSpec {
    pub columns: ColumnPolicy,
    pub cells: CellFormat,
    pub trend: Option<TrendRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub segments: Vec<Segment>,
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationModel {
    pub current: u32,
    /// Never below 1 so an empty result still reads "Page 1 of 1".
    pub total_pages: u32,
    pub total_items: Option<u64>,
    pub estimated: bool,
    pub has_prev: bool,
    pub has_next: bool,
    /// Pages a user may jump to directly.
    pub window: Vec<u32>,
}

/// Everything a renderer needs; nothing it has to compute itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    pub status: Status,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
    pub fetched_rows: usize,
    pub keyword: String,
    pub pagination: PaginationModel,
    pub error: Option<String>,
    pub stale: bool,
}

impl TableModel {
    pub fn can_retry(&self) -> bool {
        self.status == Status::Failed
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn present(view: &ViewState, keyword: &str, spec: &TableSpec) -> TableModel {
    let visible = filter_rows(&view.rows, keyword);
    let columns: Vec<Column> = spec
        .columns
        .columns(&visible)
        .into_iter()
        .map(|key| Column {
            title: header_title(&key),
            key,
        })
        .collect();

    let rows = visible
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|col| {
                    let text = spec.cells.format(&col.key, record.get(&col.key));
                    Cell {
                        segments: highlight(&text, keyword),
                        trend: spec.trend.and_then(|rule| rule(&col.key, record)),
                        text,
                    }
                })
                .collect()
        })
        .collect();

    TableModel {
        status: view.status,
        columns,
        rows,
        fetched_rows: view.rows.len(),
        keyword: keyword.trim().to_string(),
        pagination: pagination(view),
        error: view.error_message.clone(),
        stale: view.stale,
    }
}

const WINDOW_RADIUS: u32 = 2;

fn pagination(view: &ViewState) -> PaginationModel {
    let current = view.current_page.max(1);
    let last = match view.page_limit() {
        PageLimit::Unknown => current,
        PageLimit::Known(total) => total.max(1),
        PageLimit::Open { highest } => highest.max(current),
    };

    let from = current.saturating_sub(WINDOW_RADIUS).max(1);
    let to = current.saturating_add(WINDOW_RADIUS).min(last);

    PaginationModel {
        current,
        total_pages: view.total_pages.max(1),
        total_items: view.total.map(|t| t.value()),
        estimated: view.total.map(|t| t.is_estimated()).unwrap_or(false),
        has_prev: current > 1,
        has_next: current < last,
        window: (from..=to).collect(),
    }
}
