use crate::api::meetings::{min_date, QUICK_RANGES};
use crate::table::presenter::TableModel;
use crate::table::query::Filters;
use crate::templates::components::{date_range, keyword_box, table_area, TableTarget};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub const TARGET: TableTarget<'static> = TableTarget {
    page_path: "/meetings",
    partial_path: "/meetings/table",
    retry_action: "/meetings/retry",
};

pub struct MeetingsVm {
    pub model: TableModel,
    pub filters: Filters,
    pub notice: Option<String>,
}

pub fn meetings_page(vm: &MeetingsVm) -> Markup {
    desktop_layout(
        "Board Meetings",
        "/meetings",
        html! {
            h1 { "Board Meetings" }
            p class="lead" { "Upcoming and past board meetings. Records start " (min_date().format("%d-%m-%Y").to_string()) "." }

            div class="quick-ranges" {
                @for (label, days) in QUICK_RANGES {
                    a class="btn" href=(format!("/meetings?range={days}")) { (label) }
                }
            }

            form class="filters" method="get" action="/meetings" {
                label {
                    "Company "
                    input type="text" name="company" value=(vm.filters.company) placeholder="All companies";
                }
                label {
                    "Index "
                    input type="text" name="index" value=(vm.filters.index_symbol) placeholder="All";
                }
                (date_range(
                    &vm.filters.start_date.format("%Y-%m-%d").to_string(),
                    &vm.filters.end_date.format("%Y-%m-%d").to_string(),
                    None,
                ))
                button type="submit" class="btn" { "Apply" }
            }

            (keyword_box(TARGET.partial_path, &vm.filters.keyword))

            (table_area(&vm.model, &TARGET, vm.notice.as_deref()))
        },
    )
}
