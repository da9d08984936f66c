use crate::table::presenter::TableModel;
use crate::table::query::{DealType, Filters};
use crate::templates::components::{date_range, keyword_box, table_area, TableTarget};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub const TARGET: TableTarget<'static> = TableTarget {
    page_path: "/deals",
    partial_path: "/deals/table",
    retry_action: "/deals/retry",
};

pub struct DealsVm {
    pub model: TableModel,
    pub filters: Filters,
    pub today: String,
    pub notice: Option<String>,
}

fn tab_label(deal_type: DealType) -> &'static str {
    match deal_type {
        DealType::Bulk => "Bulk Deals",
        DealType::Block => "Block Deals",
        DealType::Insider => "Insider Trading",
    }
}

pub fn deals_page(vm: &DealsVm) -> Markup {
    desktop_layout(
        "Deals",
        "/deals",
        html! {
            h1 { "Deals" }

            nav class="tabs" {
                @for deal_type in DealType::ALL {
                    a
                        href=(format!("/deals?tab={deal_type}"))
                        class=[(deal_type == vm.filters.deal_type).then_some("active")]
                    { (tab_label(deal_type)) }
                }
            }

            form class="filters" method="get" action="/deals" {
                input type="hidden" name="tab" value=(vm.filters.deal_type.as_str());
                label {
                    "Symbol "
                    input type="text" name="symbol" value=(vm.filters.symbol) placeholder="e.g. RELIANCE";
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
