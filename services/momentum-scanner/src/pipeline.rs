//! Pipeline orchestration
//!
//! Fans every candidate out to the analysis engine at once, waits for all of
//! them to settle and partitions the outcomes into a report.

use data_retrieval::{MarketDataSource, MarketSnapshot};
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{require_credential, validate_scan_parameters, Settings};
use crate::engine::AnalysisEngine;
use crate::error::{Result, ScanError};
use crate::selector::select_candidates;
use crate::types::{
    AnalysisOutcome, FailureReason, ScanProgress, ScanReport, TradeDirection,
};

/// Runs the analysis engine over a candidate set
pub struct PipelineOrchestrator {
    engine: AnalysisEngine,
    max_concurrency: Option<usize>,
}

impl PipelineOrchestrator {
    pub fn new(engine: AnalysisEngine) -> Self {
        Self {
            engine,
            max_concurrency: None,
        }
    }

    /// Bound simultaneous analyses; `None` runs one per candidate
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.filter(|l| *l > 0);
        self
    }

    /// Select candidates and analyze them all concurrently.
    ///
    /// Argument ranges and the credential are checked before selection.
    /// Per-candidate failures never abort the batch. `on_progress` is called
    /// once per settled candidate, in settle order. Trade plans keep their
    /// settle order within each direction.
    pub async fn run<F>(
        &self,
        snapshots: &[MarketSnapshot],
        threshold: Decimal,
        risk_amount: Decimal,
        rr_ratio: Decimal,
        credential: &str,
        mut on_progress: F,
    ) -> Result<ScanReport>
    where
        F: FnMut(ScanProgress),
    {
        let credential = require_credential(Some(credential))?;
        validate_scan_parameters(threshold, risk_amount, rr_ratio)?;

        let candidates = select_candidates(snapshots, threshold);
        let total = candidates.len();
        let mut report = ScanReport::empty();
        report.candidates = total;

        if total == 0 {
            return Ok(report);
        }

        let limit = self.max_concurrency.unwrap_or(total).min(total);
        info!("Analyzing {} candidates (concurrency {})", total, limit);

        let engine = &self.engine;
        let mut outcomes = stream::iter(candidates)
            .map(move |candidate| async move {
                let outcome = engine
                    .analyze(&candidate, risk_amount, rr_ratio, credential)
                    .await;
                (candidate, outcome)
            })
            .buffer_unordered(limit);

        let mut analyzed = 0;
        while let Some((candidate, outcome)) = outcomes.next().await {
            analyzed += 1;
            let symbol = candidate.snapshot.symbol.clone();

            match outcome {
                AnalysisOutcome::Trade(plan) => match plan.direction {
                    TradeDirection::Long => report.longs.push(plan),
                    TradeDirection::Short => report.shorts.push(plan),
                },
                AnalysisOutcome::Skipped(reason) => {
                    debug!("{} skipped: {}", symbol, reason);
                }
                AnalysisOutcome::Failed(e) => {
                    report.errors.push(FailureReason {
                        symbol: symbol.clone(),
                        message: e.to_string(),
                    });
                }
            }

            debug!("Analyzed {}/{} ({})", analyzed, total, symbol);
            on_progress(ScanProgress {
                analyzed,
                total,
                symbol,
            });
        }

        if !report.errors.is_empty() {
            warn!("{} of {} candidates failed", report.errors.len(), total);
        }
        info!(
            "Scan finished: {} long, {} short, {} errors",
            report.longs.len(),
            report.shorts.len(),
            report.errors.len()
        );

        Ok(report)
    }
}

/// Market listing plus orchestrator, driven by [`Settings`]
pub struct Scanner {
    market: Arc<dyn MarketDataSource>,
    orchestrator: PipelineOrchestrator,
}

impl Scanner {
    pub fn new(
        market: Arc<dyn MarketDataSource>,
        reasoning: Arc<dyn crate::reasoning::ReasoningService>,
        settings: &Settings,
    ) -> Self {
        let engine = AnalysisEngine::new(Arc::clone(&market), reasoning)
            .with_history(&settings.vs_currency, settings.history_days);
        let orchestrator =
            PipelineOrchestrator::new(engine).with_max_concurrency(settings.max_concurrency);

        Self {
            market,
            orchestrator,
        }
    }

    /// Validate settings, fetch the market universe and run the pipeline.
    ///
    /// Configuration problems are reported before any request is made.
    pub async fn scan<F>(&self, settings: &Settings, on_progress: F) -> Result<ScanReport>
    where
        F: FnMut(ScanProgress),
    {
        settings.validate()?;
        let credential = settings.credential()?;

        info!(
            "Fetching top {} markets from {}",
            settings.coin_count,
            self.market.name()
        );
        let snapshots = self
            .market
            .top_markets(&settings.vs_currency, settings.coin_count)
            .await
            .map_err(ScanError::from)?;

        self.orchestrator
            .run(
                &snapshots,
                settings.momentum_threshold,
                settings.risk_amount,
                settings.rr_ratio,
                credential,
                on_progress,
            )
            .await
    }
}
