use rust_decimal::Decimal;

use crate::models::{BudgetEntry, ZERO_THRESHOLD};

/// Budget categories that duplicate obligations already counted as minimum
/// debt payments. Matched case-insensitively.
pub const DEBT_OVERLAP_CATEGORIES: &[&str] = &[
    "credit card payment",
    "auto payment",
    "student loan payment",
    "financial",
];

#[derive(Debug, Clone, PartialEq)]
pub struct AffordabilityResult {
    pub estimated_income: Decimal,
    pub total_budgeted_expenses: Decimal,
    /// Budget lines that were subtracted, with their limits.
    pub overlapping: Vec<(String, Decimal)>,
    pub overlap_total: Decimal,
    pub adjusted_budgeted_expenses: Decimal,
    pub total_minimum_debt_payments: Decimal,
    /// May be negative.
    pub surplus: Decimal,
}

impl AffordabilityResult {
    pub fn has_surplus(&self) -> bool {
        self.surplus > ZERO_THRESHOLD
    }
}

pub fn is_debt_overlap_category(name: &str) -> bool {
    let lower = name.to_lowercase();
    DEBT_OVERLAP_CATEGORIES.contains(&lower.as_str())
}

/// Monthly surplus after budgeted expenses and minimum debt payments, with
/// debt-service budget lines removed so they are not counted twice.
pub fn check_affordability(
    estimated_income: Decimal,
    total_budgeted_expenses: Decimal,
    entries: &[BudgetEntry],
    total_minimum_debt_payments: Decimal,
) -> AffordabilityResult {
    let overlapping: Vec<(String, Decimal)> = entries
        .iter()
        .filter(|b| is_debt_overlap_category(&b.category_name))
        .map(|b| (b.category_name.clone(), b.monthly_limit))
        .collect();
    let overlap_total: Decimal = overlapping.iter().map(|(_, amt)| *amt).sum();

    let adjusted = (total_budgeted_expenses - overlap_total).max(Decimal::ZERO);
    let surplus = estimated_income - adjusted - total_minimum_debt_payments;

    AffordabilityResult {
        estimated_income,
        total_budgeted_expenses,
        overlapping,
        overlap_total,
        adjusted_budgeted_expenses: adjusted,
        total_minimum_debt_payments,
        surplus,
    }
}
