//! Core types for the candidate analysis pipeline

use chrono::{DateTime, Utc};
use data_retrieval::MarketSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScanError;

/// Momentum direction of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    /// Trade side a candidate of this direction produces
    pub fn trade_direction(self) -> TradeDirection {
        match self {
            Direction::Bullish => TradeDirection::Long,
            Direction::Bearish => TradeDirection::Short,
        }
    }

    /// Lowercase label used in prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Bullish => "bullish",
            Direction::Bearish => "bearish",
        }
    }
}

/// Trade side of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Long,
    Short,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Long => write!(f, "LONG"),
            TradeDirection::Short => write!(f, "SHORT"),
        }
    }
}

/// A snapshot that cleared the momentum threshold
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub snapshot: MarketSnapshot,
    pub direction: Direction,
}

/// The reasoning service's judgement, after coercion
///
/// `entry` and `stop_loss` are `Some` only when the payload carried a
/// finite, strictly positive number for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_valid: bool,
    pub entry: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub rationale: String,
}

impl Verdict {
    /// Read a verdict out of a structured payload.
    ///
    /// Unknown keys are ignored. `isValid` counts only as a literal boolean.
    pub fn from_payload(payload: &serde_json::Value) -> Self {
        let is_valid = payload
            .get("isValid")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let rationale = payload
            .get("rationale")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        Self {
            is_valid,
            entry: positive_decimal(payload.get("entry")),
            stop_loss: positive_decimal(payload.get("stopLoss")),
            rationale,
        }
    }

    /// Entry and stop when the verdict is usable for trade derivation
    pub fn levels(&self) -> Option<(Decimal, Decimal)> {
        if !self.is_valid {
            return None;
        }
        Some((self.entry?, self.stop_loss?))
    }
}

fn positive_decimal(value: Option<&serde_json::Value>) -> Option<Decimal> {
    let parsed = match value? {
        serde_json::Value::Number(n) => {
            let f = n.as_f64()?;
            if !f.is_finite() {
                return None;
            }
            Decimal::try_from(f).ok()?
        }
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok()?,
        _ => return None,
    };

    (parsed > Decimal::ZERO).then_some(parsed)
}

/// Terminal output record for a valid candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub name: String,
    pub symbol: String,
    pub direction: TradeDirection,
    pub entry: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub lot_size: Decimal,
    pub risk_reward_ratio: Decimal,
    pub rationale: String,
}

impl fmt::Display for TradePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[{}] {} ({})",
            self.direction,
            self.name,
            self.symbol.to_uppercase()
        )?;
        writeln!(f, "  entry:       {:.5}", self.entry)?;
        writeln!(f, "  stop loss:   {:.5}", self.stop_loss)?;
        writeln!(f, "  take profit: {:.5}", self.take_profit)?;
        writeln!(f, "  lot size:    {:.4}", self.lot_size)?;
        writeln!(f, "  R:R          1:{}", self.risk_reward_ratio)?;
        write!(f, "  rationale:   {}", self.rationale)
    }
}

/// Why a candidate produced no trade and no error
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Price history could not be fetched
    PriceHistoryUnavailable(String),
    /// Fewer price points than the analysis needs
    InsufficientData { points: usize },
    /// Verdict invalid, or its levels unusable
    InvalidVerdict(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PriceHistoryUnavailable(e) => write!(f, "price history unavailable: {}", e),
            SkipReason::InsufficientData { points } => {
                write!(f, "insufficient data: {} price points", points)
            }
            SkipReason::InvalidVerdict(detail) => write!(f, "invalid verdict: {}", detail),
        }
    }
}

/// Per-candidate result, consumed once by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Trade(TradePlan),
    Skipped(SkipReason),
    Failed(ScanError),
}

/// Reported per-candidate failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReason {
    pub symbol: String,
    pub message: String,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.symbol.to_uppercase(), self.message)
    }
}

/// Progress signal emitted as each candidate settles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    pub analyzed: usize,
    pub total: usize,
    pub symbol: String,
}

/// Informational classification of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// No snapshot cleared the momentum threshold
    NoCandidates,
    /// Candidates were analysed but none yielded a trade
    NoTrades,
    Trades,
}

/// Final partitioned result set
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub candidates: usize,
    pub longs: Vec<TradePlan>,
    pub shorts: Vec<TradePlan>,
    pub errors: Vec<FailureReason>,
    pub generated_at: DateTime<Utc>,
}

impl ScanReport {
    /// Report with no candidates, stamped now
    pub fn empty() -> Self {
        Self {
            candidates: 0,
            longs: Vec::new(),
            shorts: Vec::new(),
            errors: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    /// Long plus short plans
    pub fn trade_count(&self) -> usize {
        self.longs.len() + self.shorts.len()
    }

    /// Classify the run for the summary line
    pub fn status(&self) -> ScanStatus {
        if self.candidates == 0 {
            ScanStatus::NoCandidates
        } else if self.trade_count() == 0 {
            ScanStatus::NoTrades
        } else {
            ScanStatus::Trades
        }
    }
}
