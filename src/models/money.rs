use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Balances at or below this are treated as paid off.
pub const ZERO_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Round to cents, ties away from zero (`0.005` → `0.01`, `-0.005` → `-0.01`).
pub fn round2(val: Decimal) -> Decimal {
    val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn is_effectively_zero(val: Decimal) -> bool {
    val <= ZERO_THRESHOLD
}

/// Parse user-entered money such as `"$1,234.50"` or `"-12"`.
/// The result is not rounded; callers decide whether the value is currency.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
