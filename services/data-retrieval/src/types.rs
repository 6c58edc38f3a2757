use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the market-cap ranked listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub id: String,                     // "bitcoin"
    pub symbol: String,                 // "btc"
    pub name: String,                   // "Bitcoin"
    pub current_price: Decimal,         // always > 0
    pub price_change_pct_24h: Decimal,  // signed, in percent
}

/// Price sample from a history series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

/// Error types for data retrieval
#[derive(Debug, Clone, thiserror::Error)]
pub enum DataRetrievalError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),
}

/// Result type for data retrieval operations
pub type Result<T> = std::result::Result<T, DataRetrievalError>;

/// Trait for market data sources
#[async_trait::async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Top `count` instruments by market capitalization, with 24h change
    async fn top_markets(&self, vs_currency: &str, count: usize) -> Result<Vec<MarketSnapshot>>;

    /// Chronological price history for one instrument over the last `days` days
    async fn price_history(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>>;

    /// Source name
    fn name(&self) -> &str;
}
