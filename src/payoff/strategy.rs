use std::cmp::Ordering;
use std::str::FromStr;

use super::PayoffError;
use crate::models::Debt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Smallest balance first.
    #[default]
    Snowball,
    /// Highest interest rate first.
    Avalanche,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snowball => "snowball",
            Self::Avalanche => "avalanche",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Snowball => "Snowball",
            Self::Avalanche => "Avalanche",
        }
    }

    pub fn all() -> &'static [Strategy] {
        &[Self::Snowball, Self::Avalanche]
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Snowball => Self::Avalanche,
            Self::Avalanche => Self::Snowball,
        }
    }

    /// Order used when allocating extra payment inside a simulated month.
    ///
    /// Snowball: balance ascending, then rate descending.
    /// Avalanche: rate descending, then balance ascending.
    pub fn allocation_order(&self, a: &Debt, b: &Debt) -> Ordering {
        match self {
            Self::Snowball => a
                .current_balance
                .cmp(&b.current_balance)
                .then_with(|| b.interest_rate.cmp(&a.interest_rate)),
            Self::Avalanche => b
                .interest_rate
                .cmp(&a.interest_rate)
                .then_with(|| a.current_balance.cmp(&b.current_balance)),
        }
    }

    /// Order used when listing debts for the user. Snowball breaks balance
    /// ties by name so the listing is stable.
    pub fn display_order(&self, a: &Debt, b: &Debt) -> Ordering {
        match self {
            Self::Snowball => a
                .current_balance
                .cmp(&b.current_balance)
                .then_with(|| a.name.cmp(&b.name)),
            Self::Avalanche => b
                .interest_rate
                .cmp(&a.interest_rate)
                .then_with(|| a.current_balance.cmp(&b.current_balance)),
        }
    }
}

impl FromStr for Strategy {
    type Err = PayoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snowball" => Ok(Self::Snowball),
            "avalanche" => Ok(Self::Avalanche),
            _ => Err(PayoffError::UnknownStrategy(s.trim().to_string())),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}
