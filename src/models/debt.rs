use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::money::round2;

pub type DebtId = i64;

/// A persisted debt. Money fields are kept at cents; `interest_rate` is an
/// APR in percent at whatever precision it was entered with.
#[derive(Debug, Clone, PartialEq)]
pub struct Debt {
    pub id: DebtId,
    pub name: String,
    pub lender: Option<String>,
    pub current_balance: Decimal,
    pub interest_rate: Decimal,
    pub minimum_payment: Decimal,
    pub last_updated: NaiveDate,
}

impl Debt {
    pub fn lender_label(&self) -> &str {
        self.lender.as_deref().unwrap_or("N/A")
    }

    pub fn total_minimums(debts: &[Debt]) -> Decimal {
        debts.iter().map(|d| d.minimum_payment).sum()
    }

    /// Find a debt by name (case-insensitive).
    pub fn find_by_name<'a>(debts: &'a [Debt], name: &str) -> Option<&'a Debt> {
        let lower = name.to_lowercase();
        debts.iter().find(|d| d.name.to_lowercase() == lower)
    }
}

/// User-supplied fields for a new debt. The database assigns the id and date.
#[derive(Debug, Clone)]
pub struct DebtInput {
    pub name: String,
    pub lender: Option<String>,
    pub current_balance: Decimal,
    pub interest_rate: Decimal,
    pub minimum_payment: Decimal,
}

impl DebtInput {
    pub fn new(
        name: String,
        current_balance: Decimal,
        interest_rate: Decimal,
        minimum_payment: Decimal,
    ) -> Self {
        Self {
            name,
            lender: None,
            current_balance: round2(current_balance),
            interest_rate,
            minimum_payment: round2(minimum_payment),
        }
    }

    pub fn with_lender(mut self, lender: Option<String>) -> Self {
        self.lender = lender.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.name.trim().is_empty(), "Debt name cannot be empty");
        validate_figures(
            self.current_balance,
            self.interest_rate,
            self.minimum_payment,
        )
    }
}

/// New figures for an existing debt.
#[derive(Debug, Clone)]
pub struct DebtUpdate {
    pub current_balance: Decimal,
    pub interest_rate: Decimal,
    pub minimum_payment: Decimal,
    /// `None` keeps the current lender, `Some("")` clears it.
    pub lender: Option<String>,
}

impl DebtUpdate {
    pub fn new(current_balance: Decimal, interest_rate: Decimal, minimum_payment: Decimal) -> Self {
        Self {
            current_balance: round2(current_balance),
            interest_rate,
            minimum_payment: round2(minimum_payment),
            lender: None,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_figures(
            self.current_balance,
            self.interest_rate,
            self.minimum_payment,
        )
    }
}

fn validate_figures(balance: Decimal, rate: Decimal, minimum: Decimal) -> anyhow::Result<()> {
    anyhow::ensure!(balance >= Decimal::ZERO, "Balance cannot be negative");
    anyhow::ensure!(rate >= Decimal::ZERO, "Interest rate cannot be negative");
    anyhow::ensure!(
        minimum >= Decimal::ZERO,
        "Minimum payment cannot be negative"
    );
    Ok(())
}
