use crate::api::{deals, meetings, prices};
use crate::app::{App, Screen};
use crate::errors::ServerError;
use crate::responses::{html_response, html_response_with_status, redirect, ResultResp};
use crate::table::fetch::Source;
use crate::table::query::{DealType, FilterName, Filters, QueryError};
use crate::table::{Intent, TableController};
use crate::templates::components::{table_area, TableTarget};
use crate::templates::pages::{self, DealsVm, MeetingsVm, PricesVm};
use astra::Request;
use maud::{html, Markup};
use std::sync::MutexGuard;
use tracing::{debug, info};

type Params = Vec<(String, String)>;

/// Full page or the htmx-swappable table fragment.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Render {
    Page,
    Table,
}

pub fn handle(req: Request, app: &App) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();
    let params = parse_query(&req);

    debug!(method, path, "request");

    match (method, path) {
        ("GET", "/") => html_response(pages::home_page()),

        ("GET", "/deals") => deals_screen(app, &params, Render::Page),
        ("GET", "/deals/table") => deals_screen(app, &params, Render::Table),
        ("POST", "/deals/retry") => retry(&app.deals, "/deals"),

        ("GET", "/meetings") => meetings_screen(app, &params, Render::Page),
        ("GET", "/meetings/table") => meetings_screen(app, &params, Render::Table),
        ("POST", "/meetings/retry") => retry(&app.meetings, "/meetings"),

        ("GET", "/prices") => prices_screen(app, &params, Render::Page),
        ("GET", "/prices/table") => prices_screen(app, &params, Render::Table),
        ("POST", "/prices/retry") => retry(&app.prices, "/prices"),
        ("GET", "/prices/quote") => quote(app, &params),

        ("GET", "/stocks/search") => search(app, &params),

        _ => Err(ServerError::NotFound),
    }
}

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn parse_query(req: &Request) -> Params {
    req.uri()
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

fn lock<S: Source>(
    screen: &Screen<S>,
) -> Result<MutexGuard<'_, TableController<S>>, ServerError> {
    let name = std::any::type_name::<S>();
    screen
        .lock()
        .map_err(|_| ServerError::Internal(format!("{name} state poisoned")))
}

/// Turns query parameters into intents, in the order they must apply:
/// tab switch, filters, quick range, then page.
fn intents_from(params: &Params, current: &Filters) -> Result<Vec<Intent>, QueryError> {
    let mut tab = None;
    let mut filters = Vec::new();
    let mut range = None;
    let mut page = None;

    for (key, value) in params {
        match key.as_str() {
            "page" => {
                let n = value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| {
                        QueryError::Validation(format!("Invalid page '{value}'"))
                    })?;
                page = Some(Intent::SetPage(n));
            }
            "range" => {
                let days = value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| {
                        QueryError::Validation(format!("Invalid range '{value}'"))
                    })?;
                range = Some(Intent::QuickRange(days));
            }
            "tab" | "dealType" => {
                let deal_type = DealType::parse(value)?;
                if deal_type != current.deal_type {
                    tab = Some(Intent::SetTab(deal_type));
                }
            }
            other => {
                if let Some(name) = FilterName::parse(other) {
                    filters.push((name, value.clone()));
                }
            }
        }
    }

    let mut intents: Vec<Intent> = tab.into_iter().collect();
    if !filters.is_empty() {
        intents.push(Intent::SetFilters(filters));
    }
    intents.extend(range);
    intents.extend(page);
    Ok(intents)
}

/// Applies the request's intents to one screen and waits for any fetch they
/// started. The lock is released while waiting. Returns the validation
/// message when the input was rejected.
fn drive<S: Source>(screen: &Screen<S>, params: &Params) -> Result<Option<String>, ServerError> {
    let mut notice = None;

    let pending = {
        let mut ctl = lock(screen)?;
        let dispatched = intents_from(params, ctl.query().filters()).and_then(|intents| {
            if intents.is_empty() {
                Ok(None)
            } else {
                ctl.dispatch_all(intents)
            }
        });

        let pending = match dispatched {
            Ok(pending) => pending,
            Err(e) => {
                info!(source = ctl.source().name(), error = %e, "query rejected");
                notice = Some(e.to_string());
                None
            }
        };
        pending.or_else(|| ctl.ensure_loaded())
    };

    if let Some(pending) = pending {
        let event = pending.wait();
        lock(screen)?.complete(event);
    }

    Ok(notice)
}

fn respond(notice: &Option<String>, markup: Markup) -> ResultResp {
    match notice {
        Some(_) => html_response_with_status(400, markup),
        None => html_response(markup),
    }
}

fn iso(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn partial<S: Source>(
    ctl: &TableController<S>,
    spec: &crate::table::TableSpec,
    target: &TableTarget,
    notice: Option<&str>,
) -> Markup {
    table_area(&ctl.present(spec), target, notice)
}

fn deals_screen(app: &App, params: &Params, render: Render) -> ResultResp {
    let notice = drive(&app.deals, params)?;
    let ctl = lock(&app.deals)?;

    let markup = match render {
        Render::Table => partial(
            &*ctl,
            &deals::TABLE,
            &pages::deals::TARGET,
            notice.as_deref(),
        ),
        Render::Page => pages::deals_page(&DealsVm {
            model: ctl.present(&deals::TABLE),
            filters: ctl.query().filters().clone(),
            today: iso(ctl.query().today()),
            notice: notice.clone(),
        }),
    };
    respond(&notice, markup)
}

fn meetings_screen(app: &App, params: &Params, render: Render) -> ResultResp {
    let notice = drive(&app.meetings, params)?;
    let ctl = lock(&app.meetings)?;

    let markup = match render {
        Render::Table => partial(
            &*ctl,
            &meetings::TABLE,
            &pages::meetings::TARGET,
            notice.as_deref(),
        ),
        Render::Page => pages::meetings_page(&MeetingsVm {
            model: ctl.present(&meetings::TABLE),
            filters: ctl.query().filters().clone(),
            notice: notice.clone(),
        }),
    };
    respond(&notice, markup)
}

fn prices_screen(app: &App, params: &Params, render: Render) -> ResultResp {
    let notice = drive(&app.prices, params)?;
    let ctl = lock(&app.prices)?;

    let markup = match render {
        Render::Table => partial(
            &*ctl,
            &prices::TABLE,
            &pages::prices::TARGET,
            notice.as_deref(),
        ),
        Render::Page => pages::prices_page(&PricesVm {
            model: ctl.present(&prices::TABLE),
            filters: ctl.query().filters().clone(),
            today: iso(ctl.query().today()),
            notice: notice.clone(),
        }),
    };
    respond(&notice, markup)
}

fn retry<S: Source>(screen: &Screen<S>, back_to: &str) -> ResultResp {
    let pending = lock(screen)?.retry();
    if let Some(pending) = pending {
        let event = pending.wait();
        lock(screen)?.complete(event);
    }
    redirect(back_to)
}

fn search(app: &App, params: &Params) -> ResultResp {
    let query = param(params, "q").unwrap_or_default();
    let markup = match app.stocks.search(query) {
        Ok(hits) => pages::suggestions(query, &hits),
        Err(e) => {
            info!(query, error = %e, "symbol search failed");
            html! { p class="error" { "Search failed: " (e.to_string()) } }
        }
    };
    html_response(markup)
}

fn quote(app: &App, params: &Params) -> ResultResp {
    let symbol = param(params, "symbol").unwrap_or_default();
    if symbol.trim().is_empty() {
        return Err(ServerError::BadRequest("symbol is required".into()));
    }

    let markup = match app.stocks.quote_card(symbol) {
        Ok(card) => pages::quote_card(card.as_ref()),
        Err(e) => {
            info!(symbol, error = %e, "quote failed");
            html! { p class="error" { "Quote unavailable: " (e.to_string()) } }
        }
    };
    html_response(markup)
}
