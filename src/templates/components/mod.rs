use maud::{html, Markup};

pub mod error;
pub mod table;

pub use error::{error_page, error_panel, validation_notice};
pub use table::{table_area, TableTarget, TABLE_AREA_ID};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

/// Date inputs shared by every filter form.
pub fn date_range(start: &str, end: &str, max: Option<&str>) -> Markup {
    html! {
        label {
            "From "
            input type="date" name="startDate" value=(start) max=[max];
        }
        label {
            "To "
            input type="date" name="endDate" value=(end) max=[max];
        }
    }
}

/// Keyword box narrowing the loaded rows. Swaps only the table.
pub fn keyword_box(partial_path: &str, keyword: &str) -> Markup {
    html! {
        label class="keyword" {
            "Search in results "
            input
                type="search"
                name="q"
                value=(keyword)
                placeholder="Filter loaded rows…"
                hx-get=(partial_path)
                hx-trigger="keyup changed delay:300ms, search"
                hx-target=(format!("#{TABLE_AREA_ID}"))
                hx-swap="outerHTML";
        }
    }
}
