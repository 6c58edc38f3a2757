//! Analysis engine - one evaluation per candidate
//!
//! Fetches price history, asks the reasoning service for a verdict and turns
//! a usable verdict into a trade plan. Data problems are skips; reasoning
//! service problems are failures.

use data_retrieval::{closes, MarketDataSource};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::prompt::build_rubric_prompt;
use crate::reasoning::ReasoningService;
use crate::types::{AnalysisOutcome, Candidate, Direction, SkipReason, TradePlan, Verdict};

/// Minimum history length worth sending to the reasoning service
pub const MIN_PRICE_POINTS: usize = 50;

/// Display precision for prices
pub const PRICE_DP: u32 = 5;

/// Display precision for lot size
pub const LOT_DP: u32 = 4;

/// Per-candidate analysis
pub struct AnalysisEngine {
    market: Arc<dyn MarketDataSource>,
    reasoning: Arc<dyn ReasoningService>,
    vs_currency: String,
    history_days: u32,
}

impl AnalysisEngine {
    pub fn new(market: Arc<dyn MarketDataSource>, reasoning: Arc<dyn ReasoningService>) -> Self {
        Self {
            market,
            reasoning,
            vs_currency: "usd".to_string(),
            history_days: 1,
        }
    }

    /// Quote currency and lookback used for price history
    pub fn with_history(mut self, vs_currency: &str, days: u32) -> Self {
        self.vs_currency = vs_currency.to_string();
        self.history_days = days;
        self
    }

    /// Analyze one candidate
    pub async fn analyze(
        &self,
        candidate: &Candidate,
        risk_amount: Decimal,
        rr_ratio: Decimal,
        credential: &str,
    ) -> AnalysisOutcome {
        let snapshot = &candidate.snapshot;

        let history = match self
            .market
            .price_history(&snapshot.id, &self.vs_currency, self.history_days)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                debug!("Skipping {}: price history fetch failed: {}", snapshot.symbol, e);
                return AnalysisOutcome::Skipped(SkipReason::PriceHistoryUnavailable(e.to_string()));
            }
        };

        if history.len() < MIN_PRICE_POINTS {
            debug!(
                "Skipping {}: only {} price points",
                snapshot.symbol,
                history.len()
            );
            return AnalysisOutcome::Skipped(SkipReason::InsufficientData {
                points: history.len(),
            });
        }

        let prompt = build_rubric_prompt(candidate, &closes(&history));

        let payload = match self.reasoning.evaluate(&prompt, credential).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Analysis of {} failed: {}", snapshot.symbol, e);
                return AnalysisOutcome::Failed(e);
            }
        };

        let verdict = Verdict::from_payload(&payload);

        match derive_trade_plan(candidate, &verdict, risk_amount, rr_ratio) {
            Ok(plan) => {
                debug!(
                    "{} {}: entry={} stop={} tp={}",
                    plan.direction, plan.symbol, plan.entry, plan.stop_loss, plan.take_profit
                );
                AnalysisOutcome::Trade(plan)
            }
            Err(reason) => {
                debug!("Skipping {}: {}", snapshot.symbol, reason);
                AnalysisOutcome::Skipped(reason)
            }
        }
    }
}

/// Derive entry, stop, target and size from a verdict.
///
/// Intermediate math is unrounded; only the emitted fields are rounded.
pub fn derive_trade_plan(
    candidate: &Candidate,
    verdict: &Verdict,
    risk_amount: Decimal,
    rr_ratio: Decimal,
) -> std::result::Result<TradePlan, SkipReason> {
    if !verdict.is_valid {
        let detail = if verdict.rationale.is_empty() {
            "setup rejected".to_string()
        } else {
            verdict.rationale.clone()
        };
        return Err(SkipReason::InvalidVerdict(detail));
    }

    let (entry, stop_loss) = verdict.levels().ok_or_else(|| {
        SkipReason::InvalidVerdict("entry or stopLoss missing, non-numeric or zero".to_string())
    })?;

    let sl_distance = (entry - stop_loss).abs();
    if sl_distance.is_zero() {
        return Err(SkipReason::InvalidVerdict(
            "stop loss equals entry".to_string(),
        ));
    }

    let reward = sl_distance
        .checked_mul(rr_ratio)
        .ok_or_else(|| overflow("take profit"))?;
    let take_profit = match candidate.direction {
        Direction::Bullish => entry.checked_add(reward),
        Direction::Bearish => entry.checked_sub(reward),
    }
    .ok_or_else(|| overflow("take profit"))?;
    if take_profit <= Decimal::ZERO {
        return Err(SkipReason::InvalidVerdict(format!(
            "take profit {} is not positive",
            take_profit
        )));
    }

    let risk_pct = sl_distance
        .checked_div(entry)
        .ok_or_else(|| overflow("risk percent"))?;
    let position_notional = risk_amount
        .checked_div(risk_pct)
        .ok_or_else(|| overflow("position notional"))?;
    let lot_size = position_notional
        .checked_div(entry)
        .ok_or_else(|| overflow("lot size"))?;

    let snapshot = &candidate.snapshot;

    Ok(TradePlan {
        name: snapshot.name.clone(),
        symbol: snapshot.symbol.clone(),
        direction: candidate.direction.trade_direction(),
        entry: round_price(entry),
        stop_loss: round_price(stop_loss),
        take_profit: round_price(take_profit),
        lot_size: lot_size.round_dp_with_strategy(LOT_DP, RoundingStrategy::MidpointAwayFromZero),
        risk_reward_ratio: rr_ratio,
        rationale: verdict.rationale.clone(),
    })
}

fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_DP, RoundingStrategy::MidpointAwayFromZero)
}

fn overflow(what: &str) -> SkipReason {
    SkipReason::InvalidVerdict(format!("{} out of range", what))
}
