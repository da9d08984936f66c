use crate::templates::{components::card, desktop_layout};
use maud::{html, Markup};

pub fn home_page() -> Markup {
    desktop_layout(
        "Home",
        "/",
        html! {
            h1 { "Market dashboard" }

            (card("Deals", html! {
                p { "Bulk, block and insider deals by date range and symbol." }
                a href="/deals" { "Open deals" }
            }))

            (card("Board Meetings", html! {
                p { "Scheduled board meetings by company, index and date." }
                a href="/meetings" { "Open board meetings" }
            }))

            (card("Price History", html! {
                p { "Candles for any listed symbol, with a live quote and circuit band." }
                a href="/prices" { "Open price history" }
            }))
        },
    )
}
