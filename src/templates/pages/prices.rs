use crate::api::stocks::{QuoteCard, StockDescriptor};
use crate::table::presenter::TableModel;
use crate::table::query::{Filters, Interval};
use crate::templates::components::{card, date_range, keyword_box, table_area, TableTarget};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub const TARGET: TableTarget<'static> = TableTarget {
    page_path: "/prices",
    partial_path: "/prices/table",
    retry_action: "/prices/retry",
};

pub struct PricesVm {
    pub model: TableModel,
    pub filters: Filters,
    pub today: String,
    pub notice: Option<String>,
}

/// `path?symbol=..` with the symbol percent-encoded, so `M&M` survives the round trip.
fn with_symbol(path: &str, symbol: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("symbol", symbol)
        .finish();
    format!("{path}?{query}")
}

pub fn prices_page(vm: &PricesVm) -> Markup {
    let symbol = vm.filters.symbol.as_str();

    desktop_layout(
        "Price History",
        "/prices",
        html! {
            h1 { "Price History" }

            div class="search-container" {
                label for="symbol-search" { "Search Symbol" }
                input
                    type="search"
                    id="symbol-search"
                    name="q"
                    value=(symbol)
                    autocomplete="off"
                    placeholder="Type at least 2 characters"
                    hx-get="/stocks/search"
                    hx-trigger="keyup changed delay:250ms"
                    hx-target="#suggestions"
                    hx-swap="innerHTML";
                div id="suggestions" {}
            }

            @if !symbol.is_empty() {
                div
                    id="quote-card"
                    hx-get=(with_symbol("/prices/quote", symbol))
                    hx-trigger="load"
                    hx-swap="innerHTML"
                {
                    p class="status" { "Loading quote…" }
                }
            }

            form class="filters" method="get" action="/prices" {
                input type="hidden" name="symbol" value=(symbol);
                label {
                    "Interval "
                    select name="interval" {
                        @for interval in Interval::ALL {
                            option value=(interval.code()) selected[interval == vm.filters.interval] {
                                (interval.label())
                            }
                        }
                    }
                }
                (date_range(
                    &vm.filters.start_date.format("%Y-%m-%d").to_string(),
                    &vm.filters.end_date.format("%Y-%m-%d").to_string(),
                    Some(&vm.today),
                ))
                button type="submit" class="btn" { "Apply" }
            }

            (keyword_box(TARGET.partial_path, &vm.filters.keyword))

            (table_area(&vm.model, &TARGET, vm.notice.as_deref()))
        },
    )
}

pub fn suggestions(query: &str, hits: &[StockDescriptor]) -> Markup {
    html! {
        @if hits.is_empty() {
            @if query.trim().chars().count() >= crate::api::stocks::MIN_SEARCH_LEN {
                p class="empty" { "No matching symbols." }
            }
        } @else {
            ul class="suggestions" role="listbox" {
                @for hit in hits {
                    li role="option" {
                        a href=(with_symbol("/prices", &hit.symbol)) {
                            strong { (hit.symbol) }
                            @if let Some(name) = &hit.company_name {
                                " " span class="company" { (name) }
                            }
                            @if let Some(group) = &hit.exchange_group {
                                " " span class="badge" { (group) }
                            }
                            @if hit.is_fno() {
                                " " span class="badge" { "F&O" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn price(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn quote_card(quote: Option<&QuoteCard>) -> Markup {
    let Some(qc) = quote else {
        return html! { p class="empty" { "No quote available." } };
    };
    let q = &qc.quote;
    let direction = match q.change {
        Some(c) if c > 0.0 => "up",
        Some(c) if c < 0.0 => "down",
        _ => "flat",
    };

    card(
        &qc.symbol,
        html! {
            @if let Some(name) = qc.descriptor.as_ref().and_then(|d| d.company_name.as_deref()) {
                p class="company" { (name) }
            }
            @if let Some(sector) = qc.descriptor.as_ref().and_then(|d| d.sector()) {
                p class="sector" { (sector) }
            }
            p class="price" {
                span class="current" { (price(q.current_price)) }
                " "
                span class=(format!("change {direction}")) {
                    (price(q.change))
                    @if let Some(pct) = q.change_percent {
                        " (" (format!("{pct:.2}")) "%)"
                    }
                }
            }
            dl class="stock-info" {
                dt { "Open" } dd { (price(q.open)) }
                dt { "High" } dd { (price(q.high)) }
                dt { "Low" } dd { (price(q.low)) }
                dt { "Volume" } dd {
                    (q.volume.map(|v| format!("{v:.0}")).unwrap_or_else(|| "N/A".into()))
                }
            }
            @if let Some(band) = qc.band {
                div class="circuit" {
                    "Circuit Limit " (format!("{:.0}", band.limit_percent)) "% · "
                    "Upper " (format!("{:.2}", band.upper)) " · "
                    "Lower " (format!("{:.2}", band.lower))
                }
            }
        },
    )
}
