use maud::{html, Markup, DOCTYPE};

const NAV: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/deals", "Deals"),
    ("/meetings", "Board Meetings"),
    ("/prices", "Price History"),
];

pub fn desktop_layout(title: &str, active: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · Strike Dash" }
                style {
                    "body { font-family: system-ui, sans-serif; margin: 0; color: #222; }"
                    "header nav ul { display: flex; gap: 1rem; list-style: none; }"
                    "header a.active { font-weight: 600; }"
                    "main.container { max-width: 1200px; margin: 0 auto; padding: 1rem; }"
                    ".data-table { border-collapse: collapse; width: 100%; }"
                    ".data-table th, .data-table td { border-bottom: 1px solid #ddd; padding: 0.35rem 0.5rem; text-align: left; }"
                    "tbody.stale { opacity: 0.5; }"
                    ".error-panel, .validation { border: 1px solid #c33; padding: 0.75rem; margin: 0.5rem 0; }"
                    ".trend-up { color: #18794e; } .trend-down { color: #c33; }"
                    ".pagination { display: flex; gap: 0.5rem; margin-top: 1rem; }"
                }
                script src="https://unpkg.com/htmx.org@1.9.12" defer {};
            }
            body {
              header class="flex items-center justify-between px-6 py-3 shadow" {
                  svg
                      xmlns="http://www.w3.org/2000/svg"
                      width="24"
                      height="24"
                      viewBox="0 0 24 24"
                      fill="none"
                      stroke="#524ed2"
                      stroke-width="2"
                      stroke-linecap="round"
                      stroke-linejoin="round"
                      class="icon icon-tabler icon-tabler-chart-line"
                  {
                      path stroke="none" d="M0 0h24v24H0z" fill="none" {}
                      path d="M4 19l16 0" {}
                      path d="M4 15l4 -6l4 2l4 -5l4 4" {}
                  }
                  h3 { "Strike Dash" }
                  nav {
                      ul {
                          @for (href, label) in NAV {
                              li {
                                  a href=(href) class=[(*href == active).then_some("active")] { (label) }
                              }
                          }
                      }
                  }
              }
                main class="container" {
                    (content)
                }
            }
        }
    }
}
