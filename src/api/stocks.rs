use crate::api::join_url;
use crate::table::fetch::{expect_json, FetchError};
use crate::table::transport::{authorize, CredentialProvider, OutboundRequest, Transport};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Used when the exchange publishes no band for a security, or publishes zero.
pub const DEFAULT_CIRCUIT_LIMIT: f64 = 10.0;

pub const MIN_SEARCH_LEN: usize = 2;
const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IndustrySector {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub industry_group: Option<String>,
    #[serde(default)]
    pub industry_sub_group: Option<String>,
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockDescriptor {
    pub symbol: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub exchange_group: Option<String>,
    #[serde(default)]
    pub industry_sector: Option<IndustrySector>,
    #[serde(default)]
    pub circuit_limit: Option<f64>,
    #[serde(default)]
    pub fno: Option<bool>,
    #[serde(default)]
    pub fno_stock: Option<bool>,
}

impl StockDescriptor {
    pub fn is_fno(&self) -> bool {
        self.fno.unwrap_or(false) || self.fno_stock.unwrap_or(false)
    }

    pub fn sector(&self) -> Option<&str> {
        self.industry_sector.as_ref()?.sector.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub change_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitBand {
    pub limit_percent: f64,
    pub upper: f64,
    pub lower: f64,
}

pub fn circuit_band(price: f64, circuit_limit: Option<f64>) -> CircuitBand {
    let limit = match circuit_limit {
        Some(p) if p != 0.0 => p,
        _ => DEFAULT_CIRCUIT_LIMIT,
    };
    let delta = price * limit / 100.0;
    CircuitBand {
        limit_percent: limit,
        upper: price + delta,
        lower: price - delta,
    }
}

/// Everything shown in the quote card above the price table.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteCard {
    pub symbol: String,
    pub descriptor: Option<StockDescriptor>,
    pub quote: Quote,
    pub band: Option<CircuitBand>,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(default)]
    stocks: Vec<StockDescriptor>,
}

#[derive(Deserialize)]
struct QuoteBody {
    #[serde(default)]
    quote: Option<Quote>,
}

/// Symbol search and live quotes. Not tabular, so it talks to the transport directly.
pub struct StockDirectory {
    base: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    timeout: Duration,
}

impl StockDirectory {
    pub fn new(
        base: impl Into<String>,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            base: base.into(),
            transport,
            credentials,
            timeout,
        }
    }

    fn call(&self, request: OutboundRequest) -> Result<Value, FetchError> {
        let request = authorize(request, self.credentials.as_ref());
        debug!(request = %request.describe(), "stock directory call");
        let raw = self.transport.execute(&request, self.timeout)?;
        expect_json(&raw)
    }

    /// Up to ten suggestions. Queries shorter than two characters never reach the server.
    pub fn search(&self, query: &str) -> Result<Vec<StockDescriptor>, FetchError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }

        let request = OutboundRequest::get(join_url(&self.base, "search"))
            .with_query("q", query)
            .with_query("limit", SEARCH_LIMIT.to_string())
            .with_query("skip", "0");

        let body: SearchBody = serde_json::from_value(self.call(request)?)
            .map_err(|e| FetchError::Parse(e.to_string()))?;
        Ok(body.stocks)
    }

    pub fn quote(&self, symbol: &str) -> Result<Option<Quote>, FetchError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Ok(None);
        }

        let mut url = url::Url::parse(&join_url(&self.base, "quote"))
            .map_err(|e| FetchError::Parse(format!("bad quote url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Parse("quote url cannot take a path".into()))?
            .push(&symbol);

        let raw = self.call(OutboundRequest::get(url.as_str()))?;
        let body: QuoteBody = serde_json::from_value(raw)
            .map_err(|e| FetchError::Parse(e.to_string()))?;
        Ok(body.quote)
    }

    /// Quote plus the descriptor that carries the circuit limit.
    pub fn quote_card(&self, symbol: &str) -> Result<Option<QuoteCard>, FetchError> {
        let symbol = symbol.trim().to_uppercase();
        let Some(quote) = self.quote(&symbol)? else {
            return Ok(None);
        };

        // The card still renders without a descriptor; the band then uses the default limit.
        let descriptor = match self.search(&symbol) {
            Ok(hits) => hits
                .into_iter()
                .find(|d| d.symbol.eq_ignore_ascii_case(&symbol)),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "descriptor lookup failed");
                None
            }
        };

        let band = quote.current_price.map(|price| {
            circuit_band(price, descriptor.as_ref().and_then(|d| d.circuit_limit))
        });
        info!(symbol = %symbol, has_descriptor = descriptor.is_some(), "quote loaded");

        Ok(Some(QuoteCard {
            symbol,
            descriptor,
            quote,
            band,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_or_missing_limit_uses_default() {
        let band = circuit_band(200.0, Some(0.0));
        assert_eq!(band.limit_percent, 10.0);
        assert_eq!(band.upper, 220.0);
        assert_eq!(band.lower, 180.0);

        assert_eq!(circuit_band(200.0, None).limit_percent, 10.0);
    }

    #[test]
    fn published_limit_is_used() {
        let band = circuit_band(100.0, Some(5.0));
        assert_eq!(band.upper, 105.0);
        assert_eq!(band.lower, 95.0);
    }

    #[test]
    fn descriptor_tolerates_sparse_fields() {
        let d: StockDescriptor = serde_json::from_value(json!({
            "symbol": "INFY",
            "company_name": "Infosys Ltd",
            "industry_sector": { "sector": "IT" },
            "fno_stock": true
        }))
        .unwrap();

        assert_eq!(d.sector(), Some("IT"));
        assert!(d.is_fno());
        assert_eq!(d.circuit_limit, None);
    }
}
