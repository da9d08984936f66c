//! Remote paginated table: query state, fetching, view reduction and the
//! render contract shared by every data screen.

pub mod controller;
pub mod fetch;
pub mod format;
pub mod keyword;
pub mod presenter;
pub mod query;
pub mod transport;
pub mod view;

/// A server-defined row. Field order is preserved as received.
pub type Record = serde_json::Map<String, serde_json::Value>;

pub use controller::{Intent, TableController};
pub use presenter::TableSpec;
