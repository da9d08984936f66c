use crate::api::{meetings, DealsSource, MeetingsSource, PricesSource, StockDirectory};
use crate::config::AppConfig;
use crate::table::fetch::{FetchController, FetchError, Source};
use crate::table::query::{local_today, DateRules, Filters, Interval, QueryState};
use crate::table::transport::{CredentialProvider, EnvCredentials, HttpTransport, Transport};
use crate::table::view::LoadingRows;
use crate::table::TableController;
use chrono::{Duration, Months, NaiveDate};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

const CONNECT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// One screen's controller. The lock is held only to dispatch, complete and render.
pub type Screen<S> = Mutex<TableController<S>>;

/// Shared state behind every request.
pub struct App {
    pub config: AppConfig,
    pub deals: Screen<DealsSource>,
    pub meetings: Screen<MeetingsSource>,
    pub prices: Screen<PricesSource>,
    pub stocks: StockDirectory,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self, FetchError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(CONNECT_TIMEOUT)?);
        let credentials: Arc<dyn CredentialProvider> =
            Arc::new(EnvCredentials::new(config.token_var.clone()));
        Ok(Self::with_transport(
            config,
            transport,
            credentials,
            local_today,
        ))
    }

    /// Wires every screen against the given transport, credentials and clock.
    pub fn with_transport(
        config: AppConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        clock: fn() -> NaiveDate,
    ) -> Self {
        let today = clock();
        let timeout = config.fetch_timeout;

        let wire = Wiring {
            transport: &transport,
            credentials: &credentials,
            timeout,
        };

        let deals = screen(
            QueryState::new(
                Filters::new(today - Duration::days(7), today),
                config.deals_page_size,
                DateRules::default(),
            )
            .with_clock(clock),
            wire.fetcher(DealsSource::new(
                config.legacy_api_base.clone(),
                config.origin.clone(),
            )),
            LoadingRows::Retain,
        );

        let meetings = screen(
            QueryState::new(
                Filters::new(today, today),
                config.table_page_size,
                meetings::date_rules(),
            )
            .with_clock(clock),
            wire.fetcher(MeetingsSource::new(config.graphql_url.clone())),
            LoadingRows::Retain,
        );

        let mut price_filters = Filters::new(
            today.checked_sub_months(Months::new(6)).unwrap_or(today),
            today,
        );
        price_filters.interval = Interval::Week1;
        let prices = screen(
            QueryState::new(price_filters, config.table_page_size, DateRules::default())
                .with_clock(clock),
            wire.fetcher(PricesSource::new(
                config.api_base.clone(),
                config.market_offset,
            )),
            LoadingRows::Clear,
        );

        let stocks = StockDirectory::new(
            config.legacy_api_base.clone(),
            transport,
            credentials,
            timeout,
        );

        Self {
            config,
            deals,
            meetings,
            prices,
            stocks,
        }
    }
}

struct Wiring<'a> {
    transport: &'a Arc<dyn Transport>,
    credentials: &'a Arc<dyn CredentialProvider>,
    timeout: StdDuration,
}

impl Wiring<'_> {
    fn fetcher<S: Source>(&self, source: S) -> FetchController<S> {
        FetchController::new(
            source,
            Arc::clone(self.transport),
            Arc::clone(self.credentials),
            self.timeout,
        )
    }
}

fn screen<S: Source>(
    query: QueryState,
    fetcher: FetchController<S>,
    loading_rows: LoadingRows,
) -> Screen<S> {
    Mutex::new(TableController::new(query, fetcher, loading_rows))
}
