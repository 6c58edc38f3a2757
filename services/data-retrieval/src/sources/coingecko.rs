use crate::normalizers::{normalize_chart, normalize_market};
use crate::types::*;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Largest page the markets endpoint serves
pub const MAX_MARKETS_PER_PAGE: usize = 250;

/// CoinGecko API client
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    /// Free tier works without a key; a pro key raises the limits
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create client against a specific base URL (for testing)
    pub fn with_base_url(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| DataRetrievalError::ApiError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build request with optional API key
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self.client.get(&url);

        if let Some(key) = &self.api_key {
            req = req.header("x-cg-pro-api-key", key);
        }

        req
    }

    /// Per-request timeout (10 seconds for individual API calls)
    const REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Single-attempt request with per-request timeout
    async fn request<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!("CoinGecko GET {}", endpoint);

        let request_future = self.build_request(endpoint).send();
        let response = match tokio::time::timeout(
            Duration::from_secs(Self::REQUEST_TIMEOUT_SECS),
            request_future,
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => return Err(DataRetrievalError::ApiError(e.to_string())),
            Err(_) => {
                return Err(DataRetrievalError::ApiError(format!(
                    "CoinGecko request to {} timed out after {}s",
                    endpoint,
                    Self::REQUEST_TIMEOUT_SECS
                )));
            }
        };

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataRetrievalError::AssetNotFound(endpoint.to_string()));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DataRetrievalError::ApiError(format!(
                "CoinGecko API error ({}): {}",
                status, text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DataRetrievalError::InvalidResponse(e.to_string()))
    }

    /// Top instruments by market cap with 24h price change
    ///
    /// Uses `/coins/markets`, first page only. `count` is clamped to the
    /// provider's page size.
    pub async fn top_markets(&self, vs_currency: &str, count: usize) -> Result<Vec<MarketSnapshot>> {
        let per_page = count.clamp(1, MAX_MARKETS_PER_PAGE);
        let endpoint = format!(
            "/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page=1&price_change_percentage=24h",
            vs_currency.to_lowercase(),
            per_page
        );

        let rows: Vec<MarketRow> = self.request(&endpoint).await?;
        let total = rows.len();

        let snapshots: Vec<MarketSnapshot> = rows
            .into_iter()
            .filter_map(|row| {
                normalize_market(
                    &row.id,
                    &row.symbol,
                    &row.name,
                    row.current_price,
                    row.price_change_percentage_24h,
                )
            })
            .collect();

        if snapshots.len() < total {
            debug!(
                "Dropped {} market rows without price or 24h change",
                total - snapshots.len()
            );
        }

        Ok(snapshots)
    }

    /// Price history from `/coins/{id}/market_chart`
    ///
    /// Response format: `{"prices": [[timestamp_ms, price], ...], ...}`.
    /// Granularity is automatic: 1 day gives ~5 minute samples.
    pub async fn price_history(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>> {
        let endpoint = format!(
            "/coins/{}/market_chart?vs_currency={}&days={}",
            coin_id,
            vs_currency.to_lowercase(),
            days.max(1)
        );

        let response: MarketChartResponse = self.request(&endpoint).await?;
        Ok(normalize_chart(&response.prices))
    }
}

// Response types for CoinGecko API
#[derive(Debug, serde::Deserialize)]
struct MarketRow {
    id: String,
    symbol: String,
    name: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, serde::Deserialize)]
struct MarketChartResponse {
    prices: Vec<[f64; 2]>,
}

#[async_trait::async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn top_markets(&self, vs_currency: &str, count: usize) -> Result<Vec<MarketSnapshot>> {
        CoinGeckoClient::top_markets(self, vs_currency, count).await
    }

    async fn price_history(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>> {
        CoinGeckoClient::price_history(self, coin_id, vs_currency, days).await
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}
