//! Endpoint contracts of the remote market-data API.

pub mod deals;
pub mod meetings;
pub mod prices;
pub mod stocks;

pub use deals::DealsSource;
pub use meetings::MeetingsSource;
pub use prices::PricesSource;
pub use stocks::StockDirectory;

/// Joins a base URL and a path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
