//! Rubric prompt for the reasoning service

use rust_decimal::Decimal;

use crate::types::{Candidate, Direction};

/// Most recent closes embedded in a prompt
pub const PROMPT_CLOSES: usize = 100;

/// Build the evaluation prompt for one candidate.
///
/// Only the last [`PROMPT_CLOSES`] closes are embedded; shorter series are
/// embedded whole.
pub fn build_rubric_prompt(candidate: &Candidate, closes: &[Decimal]) -> String {
    let snapshot = &candidate.snapshot;
    let recent = &closes[closes.len().saturating_sub(PROMPT_CLOSES)..];
    let series = recent
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let (bias, zone, structure) = match candidate.direction {
        Direction::Bullish => (
            "BULLISH",
            "discount",
            "a break of a recent swing high",
        ),
        Direction::Bearish => (
            "BEARISH",
            "premium",
            "a break of a recent swing low",
        ),
    };

    let mut prompt = String::with_capacity(2048 + series.len());

    prompt.push_str("You are a disciplined price-action analyst.\n\n");
    prompt.push_str(&format!(
        "Instrument: {} ({})\nMomentum bias: {}\nCurrent price: {}\n24h change: {}%\n\n",
        snapshot.name,
        snapshot.symbol.to_uppercase(),
        bias,
        snapshot.current_price,
        snapshot.price_change_pct_24h,
    ));
    prompt.push_str(&format!(
        "Most recent {} closes, oldest first:\n[{}]\n\n",
        recent.len(),
        series
    ));

    prompt.push_str("Judge the setup VALID only if ALL of the following hold:\n");
    prompt.push_str(&format!(
        "1. Market structure shift: {} confirms a {} shift.\n",
        structure,
        candidate.direction.as_str()
    ));
    prompt.push_str("2. Displacement: the shift came from an impulsive move that left an imbalance (fair value gap).\n");
    prompt.push_str(&format!(
        "3. Retracement: price has pulled back into the {} zone of that displacement and has not traded beyond the zone.\n",
        zone
    ));
    prompt.push_str("4. Point of interest: a concrete fair value gap or order block defines the entry zone.\n\n");

    prompt.push_str("If valid, set entry inside the point of interest and stopLoss just beyond it.\n");
    prompt.push_str("If any condition fails, set isValid to false, entry and stopLoss to null, and explain which condition failed.\n\n");
    prompt.push_str("Answer ONLY with a single fenced JSON block of exactly this shape:\n");
    prompt.push_str("```json\n");
    prompt.push_str("{\"isValid\": true, \"entry\": 0.0, \"stopLoss\": 0.0, \"rationale\": \"...\"}\n");
    prompt.push_str("```\n");

    prompt
}
