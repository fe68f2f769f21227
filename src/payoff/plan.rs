use rust_decimal::Decimal;

use super::simulate::extra_payment;
use super::{PayoffError, Strategy};
use crate::models::{Debt, ZERO_THRESHOLD};

/// What to pay on one debt this month under a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRow {
    pub debt: Debt,
    pub payment: Decimal,
    pub receives_extra: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyPreview {
    pub strategy: Strategy,
    pub total_payment: Decimal,
    pub total_minimums: Decimal,
    pub extra: Decimal,
    pub rows: Vec<PreviewRow>,
}

/// Order debts for a strategy and say where this month's extra goes: every
/// debt gets its minimum, the first in line also gets all of the extra.
pub fn strategy_preview(
    debts: &[Debt],
    strategy: Strategy,
    total_payment: Decimal,
) -> Result<StrategyPreview, PayoffError> {
    let extra = extra_payment(debts, total_payment)?;

    let mut ordered: Vec<Debt> = debts.to_vec();
    ordered.sort_by(|a, b| strategy.display_order(a, b));

    let rows = ordered
        .into_iter()
        .enumerate()
        .map(|(i, debt)| {
            let receives_extra = i == 0 && extra > ZERO_THRESHOLD;
            let payment = if receives_extra {
                debt.minimum_payment + extra
            } else {
                debt.minimum_payment
            };
            PreviewRow {
                debt,
                payment,
                receives_extra,
            }
        })
        .collect();

    Ok(StrategyPreview {
        strategy,
        total_payment,
        total_minimums: total_payment - extra,
        extra,
        rows,
    })
}
