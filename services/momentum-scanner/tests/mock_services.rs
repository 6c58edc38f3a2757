//! Mocked market data and reasoning services for testing without network access

#![allow(dead_code)]

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use data_retrieval::{DataRetrievalError, MarketDataSource, MarketSnapshot, PricePoint};
use momentum_scanner::{extract_structured_payload, ReasoningService, ScanError};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Build a snapshot with a unit price
pub fn snapshot(id: &str, change: &str) -> MarketSnapshot {
    MarketSnapshot {
        id: id.to_string(),
        symbol: id.to_string(),
        name: id.to_uppercase(),
        current_price: Decimal::from(100),
        price_change_pct_24h: Decimal::from_str_exact(change).unwrap(),
    }
}

/// `len` five-minute samples around 100
pub fn history(len: usize) -> Vec<PricePoint> {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    (0..len)
        .map(|i| PricePoint {
            timestamp: start + ChronoDuration::minutes(5 * i as i64),
            price: Decimal::from(100 + (i % 7) as i64),
        })
        .collect()
}

/// Canned price-history answers per instrument id
pub enum HistoryReply {
    Points(usize),
    Fail,
}

pub struct MockMarket {
    markets: Vec<MarketSnapshot>,
    histories: HashMap<String, HistoryReply>,
    fail_listing: bool,
    pub listing_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
}

impl MockMarket {
    pub fn new(markets: Vec<MarketSnapshot>) -> Self {
        Self {
            markets,
            histories: HashMap::new(),
            fail_listing: false,
            listing_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_history(mut self, id: &str, reply: HistoryReply) -> Self {
        self.histories.insert(id.to_string(), reply);
        self
    }

    pub fn with_failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }
}

#[async_trait::async_trait]
impl MarketDataSource for MockMarket {
    async fn top_markets(
        &self,
        _vs_currency: &str,
        count: usize,
    ) -> data_retrieval::Result<Vec<MarketSnapshot>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(DataRetrievalError::ApiError("listing down".to_string()));
        }
        Ok(self.markets.iter().take(count).cloned().collect())
    }

    async fn price_history(
        &self,
        coin_id: &str,
        _vs_currency: &str,
        _days: u32,
    ) -> data_retrieval::Result<Vec<PricePoint>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        match self.histories.get(coin_id) {
            Some(HistoryReply::Fail) => Err(DataRetrievalError::ApiError(
                "connection reset".to_string(),
            )),
            Some(HistoryReply::Points(n)) => Ok(history(*n)),
            None => Ok(history(120)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Canned reasoning answers per instrument symbol
#[derive(Clone)]
pub enum ReasoningReply {
    /// Free text run through the real fenced-block extractor
    Text(String),
    Error(ScanError),
}

impl ReasoningReply {
    pub fn verdict(json: serde_json::Value) -> Self {
        ReasoningReply::Text(format!("Assessment below.\n```json\n{}\n```\n", json))
    }
}

pub struct MockReasoning {
    replies: HashMap<String, ReasoningReply>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    pub credentials: Mutex<Vec<String>>,
}

impl MockReasoning {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            delays: HashMap::new(),
            default_delay: Duration::from_millis(10),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(mut self, symbol: &str, reply: ReasoningReply) -> Self {
        self.replies.insert(symbol.to_uppercase(), reply);
        self
    }

    pub fn delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_uppercase(), delay);
        self
    }

    /// Symbol named in a rubric prompt: "Instrument: NAME (SYMBOL)"
    fn symbol_of(prompt: &str) -> String {
        prompt
            .lines()
            .find_map(|l| l.strip_prefix("Instrument: "))
            .and_then(|l| l.rsplit_once('('))
            .map(|(_, rest)| rest.trim_end_matches(')').to_string())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ReasoningService for MockReasoning {
    async fn evaluate(
        &self,
        prompt: &str,
        credential: &str,
    ) -> momentum_scanner::Result<serde_json::Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.credentials.lock().unwrap().push(credential.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let symbol = Self::symbol_of(prompt);
        let delay = self
            .delays
            .get(&symbol)
            .copied()
            .unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.replies.get(&symbol).cloned() {
            Some(ReasoningReply::Text(text)) => extract_structured_payload(&text),
            Some(ReasoningReply::Error(e)) => Err(e),
            None => extract_structured_payload(
                "```json\n{\"isValid\": false, \"entry\": null, \"stopLoss\": null, \"rationale\": \"no displacement\"}\n```",
            ),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
