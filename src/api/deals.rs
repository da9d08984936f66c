use crate::api::join_url;
use crate::table::fetch::{rows_from_value, FetchError, Paging, Source};
use crate::table::format::{CellFormat, ColumnPolicy};
use crate::table::presenter::TableSpec;
use crate::table::query::{DealType, QuerySnapshot};
use crate::table::transport::OutboundRequest;
use crate::table::Record;
use serde_json::{json, Value};

/// Bookkeeping fields the deals endpoints return that mean nothing to a reader.
pub const HIDDEN_FIELDS: &[&str] = &[
    "id",
    "security_code",
    "stock_id",
    "deleted",
    "company_id",
    "slug",
    "buy",
    "sell",
    "buy_unit",
    "sell_unit",
    "modified_at",
    "ticker",
];

pub const TABLE: TableSpec = TableSpec {
    columns: ColumnPolicy::Hide(HIDDEN_FIELDS),
    cells: CellFormat::DEALS,
    trend: None,
};

/// Bulk, block and insider deals. The active tab picks the endpoint.
pub struct DealsSource {
    base: String,
    origin: Option<String>,
}

impl DealsSource {
    pub fn new(base: impl Into<String>, origin: Option<String>) -> Self {
        Self {
            base: base.into(),
            origin,
        }
    }

    pub fn endpoint(&self, deal_type: DealType) -> String {
        let path = match deal_type {
            DealType::Bulk => "deals/bulkdeal",
            DealType::Block => "deals/blockdeal",
            DealType::Insider => "insidertrading",
        };
        join_url(&self.base, path)
    }
}

impl Source for DealsSource {
    fn name(&self) -> &'static str {
        "deals"
    }

    fn paging(&self) -> Paging {
        Paging::Server
    }

    fn build_request(&self, snapshot: &QuerySnapshot) -> Option<OutboundRequest> {
        let filters = &snapshot.filters;

        let mut body = json!({
            "limit": snapshot.page_size,
            "offset": snapshot.offset(),
            "startDate": filters.start_date.format("%Y%m%d").to_string(),
            "endDate": filters.end_date.format("%Y%m%d").to_string(),
        });
        let symbol = filters.symbol.trim();
        if !symbol.is_empty() {
            body["symbol"] = Value::String(symbol.to_uppercase());
        }

        let mut req = OutboundRequest::post_json(self.endpoint(filters.deal_type), body);
        if let Some(origin) = &self.origin {
            req = req.with_header("Origin", origin.as_str());
        }
        Some(req)
    }

    fn decode(&self, body: Value, _snapshot: &QuerySnapshot) -> Result<Vec<Record>, FetchError> {
        rows_from_value(body)
    }
}
