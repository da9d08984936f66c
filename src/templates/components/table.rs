use crate::table::presenter::{Cell, PaginationModel, TableModel};
use crate::table::view::Status;
use crate::templates::components::{error_panel, validation_notice};
use maud::{html, Markup};

/// Where a screen's table lives and how its links are built.
pub struct TableTarget<'a> {
    /// Full-page path, e.g. `/deals`.
    pub page_path: &'a str,
    /// Fragment path for htmx swaps, e.g. `/deals/table`.
    pub partial_path: &'a str,
    pub retry_action: &'a str,
}

pub const TABLE_AREA_ID: &str = "table-area";

/// The swappable region: status line, error or notice, rows and pagination.
pub fn table_area(model: &TableModel, target: &TableTarget, notice: Option<&str>) -> Markup {
    html! {
        section id=(TABLE_AREA_ID) class="table-area" aria-busy=(if model.status == Status::Loading { "true" } else { "false" }) {
            @if let Some(message) = notice {
                (validation_notice(message))
            }
            (status_line(model))
            @if let Some(error) = &model.error {
                @if model.can_retry() {
                    (error_panel(error, target.retry_action))
                }
            }
            @if model.is_empty() {
                @if model.status == Status::Loaded {
                    p class="empty" {
                        @if model.keyword.is_empty() {
                            "No records found for the selected filters."
                        } @else {
                            "No records match \"" (model.keyword) "\"."
                        }
                    }
                }
            } @else {
                (data_table(model))
            }
            (pagination(&model.pagination, target))
        }
    }
}

fn status_line(model: &TableModel) -> Markup {
    html! {
        p class="status" {
            @match model.status {
                Status::Idle => "Choose filters to load data.",
                Status::Loading => "Loading…",
                Status::Loaded | Status::Failed => {
                    @if model.keyword.is_empty() {
                        (model.fetched_rows) " records on this page"
                    } @else {
                        (model.rows.len()) " of " (model.fetched_rows) " records match"
                    }
                    @if let Some(total) = model.pagination.total_items {
                        " · "
                        @if model.pagination.estimated { "at least " }
                        (total) " total"
                    }
                }
            }
            @if model.stale {
                span class="stale" { " (showing previous results)" }
            }
        }
    }
}

fn data_table(model: &TableModel) -> Markup {
    html! {
        div class="table-scroll" {
            table class="data-table" {
                thead {
                    tr {
                        @for col in &model.columns {
                            th scope="col" data-key=(col.key) { (col.title) }
                        }
                    }
                }
                tbody class=[model.stale.then_some("stale")] {
                    @for row in &model.rows {
                        tr {
                            @for cell in row {
                                td { (cell_content(cell)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn cell_content(cell: &Cell) -> Markup {
    html! {
        @for segment in &cell.segments {
            @if segment.matched {
                mark { (segment.text) }
            } @else {
                (segment.text)
            }
        }
        @if let Some(trend) = cell.trend {
            " "
            span class=(format!("trend trend-{trend:?}").to_lowercase()) { (trend.glyph()) }
        }
    }
}

pub fn pagination(p: &PaginationModel, target: &TableTarget) -> Markup {
    let link = |page: u32| format!("{}?page={page}", target.page_path);
    let swap = |page: u32| format!("{}?page={page}", target.partial_path);
    let selector = format!("#{TABLE_AREA_ID}");

    html! {
        nav class="pagination" aria-label="Pagination" {
            @if p.has_prev {
                a href=(link(p.current - 1)) hx-get=(swap(p.current - 1)) hx-target=(selector) hx-swap="outerHTML" { "‹ Prev" }
            } @else {
                span class="disabled" { "‹ Prev" }
            }

            @for page in &p.window {
                @if *page == p.current {
                    span class="current" aria-current="page" { (page) }
                } @else {
                    a href=(link(*page)) hx-get=(swap(*page)) hx-target=(selector) hx-swap="outerHTML" { (page) }
                }
            }

            @if p.has_next {
                a href=(link(p.current + 1)) hx-get=(swap(p.current + 1)) hx-target=(selector) hx-swap="outerHTML" { "Next ›" }
            } @else {
                span class="disabled" { "Next ›" }
            }

            span class="page-of" {
                "Page " (p.current) " of " (p.total_pages)
                @if p.estimated { "+" }
            }
        }
    }
}
