use maud::{html, Markup, DOCTYPE};

/// Standalone error page, deliberately free of the dashboard layout.
pub fn error_page(status: u16, message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Error " (status) }
                style {
                    "body { font-family: system-ui, sans-serif; max-width: 720px; margin: 4rem auto; padding: 1rem; }"
                    "h1 { font-size: 2rem; margin-bottom: 1rem; }"
                    "p { font-size: 1.1rem; color: #444; }"
                }
            }
            body {
                h1 { "Error " (status) }
                p { (message) }
                p { a href="/" { "← Back to home" } }
            }
        }
    }
}

/// Inline panel for a failed fetch. Retry re-sends the last query unchanged.
pub fn error_panel(message: &str, retry_action: &str) -> Markup {
    html! {
        div class="error-panel" role="alert" {
            p { strong { "Could not load data. " } (message) }
            form method="post" action=(retry_action) {
                button type="submit" class="btn" { "Retry" }
            }
        }
    }
}

/// Rejected filter input. Nothing was fetched and the previous query stands.
pub fn validation_notice(message: &str) -> Markup {
    html! {
        div class="validation" role="status" { (message) }
    }
}
