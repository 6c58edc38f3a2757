// Normalization of raw provider rows into the crate's data model
use crate::types::*;
use chrono::DateTime;
use rust_decimal::Decimal;

/// Normalize one market listing row.
///
/// Returns `None` when the provider left the price or the 24h change empty,
/// or the price is not positive; such rows cannot be evaluated for momentum.
pub fn normalize_market(
    id: &str,
    symbol: &str,
    name: &str,
    current_price: Option<f64>,
    price_change_pct_24h: Option<f64>,
) -> Option<MarketSnapshot> {
    // JSON numbers arrive as f64, the intermediate is unavoidable
    let price = Decimal::try_from(current_price?).ok()?;
    let change = Decimal::try_from(price_change_pct_24h?).ok()?;

    let snapshot = MarketSnapshot {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        current_price: price,
        price_change_pct_24h: change,
    };

    validate_snapshot(&snapshot).ok()?;
    Some(snapshot)
}

/// Normalize `[timestamp_ms, price]` pairs, keeping chronological order.
pub fn normalize_chart(prices: &[[f64; 2]]) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = prices
        .iter()
        .filter_map(|pair| {
            let timestamp = DateTime::from_timestamp_millis(pair[0] as i64)?;
            let price = Decimal::try_from(pair[1]).ok()?;
            Some(PricePoint { timestamp, price })
        })
        .collect();

    points.sort_by_key(|p| p.timestamp);
    points
}

/// Close sequence of a price history
pub fn closes(points: &[PricePoint]) -> Vec<Decimal> {
    points.iter().map(|p| p.price).collect()
}

/// Validate that a snapshot carries a usable price
pub fn validate_snapshot(snapshot: &MarketSnapshot) -> Result<()> {
    if snapshot.current_price <= Decimal::ZERO {
        return Err(DataRetrievalError::InvalidResponse(format!(
            "Price must be positive for {}",
            snapshot.id
        )));
    }

    Ok(())
}
