//! Momentum Scanner Library
//!
//! Candidate analysis pipeline: momentum selection, per-candidate evaluation
//! by a reasoning service and trade plan derivation.

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod reasoning;
pub mod selector;
pub mod types;

// Re-export main types for convenience
pub use config::Settings;
pub use engine::{derive_trade_plan, AnalysisEngine, MIN_PRICE_POINTS};
pub use error::{Result, ScanError};
pub use pipeline::{PipelineOrchestrator, Scanner};
pub use reasoning::{extract_structured_payload, GeminiClient, ReasoningService};
pub use selector::select_candidates;
pub use types::{
    AnalysisOutcome, Candidate, Direction, FailureReason, ScanProgress, ScanReport, ScanStatus,
    SkipReason, TradeDirection, TradePlan, Verdict,
};
