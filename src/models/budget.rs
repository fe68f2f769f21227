use rust_decimal::Decimal;

/// A monthly spending limit joined with its category name.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetEntry {
    pub id: Option<i64>,
    pub category_id: i64,
    pub category_name: String,
    pub monthly_limit: Decimal,
}

impl BudgetEntry {
    pub fn new(category_id: i64, category_name: String, monthly_limit: Decimal) -> Self {
        Self {
            id: None,
            category_id,
            category_name,
            monthly_limit,
        }
    }

    pub fn total(entries: &[BudgetEntry]) -> Decimal {
        entries.iter().map(|b| b.monthly_limit).sum()
    }
}
