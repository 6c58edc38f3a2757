//! Momentum-based candidate selection

use data_retrieval::MarketSnapshot;
use rust_decimal::Decimal;
use tracing::info;

use crate::types::{Candidate, Direction};

/// Partition snapshots into bullish and bearish candidates.
///
/// The threshold is exclusive on both sides. Bullish candidates come first,
/// then bearish ones, each in input order. Only the magnitude of
/// `threshold` is used, so no snapshot can be both.
pub fn select_candidates(snapshots: &[MarketSnapshot], threshold: Decimal) -> Vec<Candidate> {
    let threshold = threshold.abs();
    let bullish = snapshots
        .iter()
        .filter(|s| s.price_change_pct_24h > threshold)
        .map(|s| Candidate {
            snapshot: s.clone(),
            direction: Direction::Bullish,
        });

    let bearish = snapshots
        .iter()
        .filter(|s| s.price_change_pct_24h < -threshold)
        .map(|s| Candidate {
            snapshot: s.clone(),
            direction: Direction::Bearish,
        });

    let candidates: Vec<Candidate> = bullish.chain(bearish).collect();

    if candidates.is_empty() {
        info!(
            "No candidates: no instrument moved more than {}% in 24h",
            threshold
        );
    } else {
        info!(
            "Selected {} candidates from {} snapshots (threshold {}%)",
            candidates.len(),
            snapshots.len(),
            threshold
        );
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(id: &str, change: &str) -> MarketSnapshot {
        MarketSnapshot {
            id: id.to_string(),
            symbol: id.to_string(),
            name: id.to_uppercase(),
            current_price: Decimal::from(1),
            price_change_pct_24h: Decimal::from_str_exact(change).unwrap(),
        }
    }

    fn ids(candidates: &[Candidate]) -> Vec<(&str, Direction)> {
        candidates
            .iter()
            .map(|c| (c.snapshot.id.as_str(), c.direction))
            .collect()
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let snapshots = vec![snap("up", "3"), snap("down", "-3"), snap("flat", "0")];
        assert!(select_candidates(&snapshots, Decimal::from(3)).is_empty());
    }

    #[test]
    fn test_bullish_then_bearish_in_input_order() {
        let snapshots = vec![
            snap("a", "-5"),
            snap("b", "4"),
            snap("c", "2.9"),
            snap("d", "-3.01"),
            snap("e", "10"),
        ];
        let candidates = select_candidates(&snapshots, Decimal::from(3));
        assert_eq!(
            ids(&candidates),
            vec![
                ("b", Direction::Bullish),
                ("e", Direction::Bullish),
                ("a", Direction::Bearish),
                ("d", Direction::Bearish),
            ]
        );
    }

    #[test]
    fn test_zero_threshold_never_duplicates() {
        let snapshots = vec![snap("a", "0"), snap("b", "0.1"), snap("c", "-0.1")];
        let candidates = select_candidates(&snapshots, Decimal::ZERO);
        assert_eq!(
            ids(&candidates),
            vec![("b", Direction::Bullish), ("c", Direction::Bearish)]
        );
    }

    #[test]
    fn test_negative_threshold_uses_magnitude() {
        let snapshots = vec![snap("flat", "0"), snap("up", "2"), snap("down", "-1.5")];
        let candidates = select_candidates(&snapshots, Decimal::from(-1));
        assert_eq!(
            ids(&candidates),
            vec![("up", Direction::Bullish), ("down", Direction::Bearish)]
        );
    }

    #[test]
    fn test_selection_is_idempotent() {
        let snapshots = vec![snap("a", "7"), snap("b", "-8"), snap("c", "1")];
        let first = select_candidates(&snapshots, Decimal::from(3));
        let second = select_candidates(&snapshots, Decimal::from(3));
        assert_eq!(first, second);
    }
}
