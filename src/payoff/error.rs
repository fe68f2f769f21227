use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayoffError {
    #[error("Total payment (${offered:.2}) is less than the total of minimum payments (${required:.2})")]
    InsufficientPayment { required: Decimal, offered: Decimal },
    #[error("Debts were not paid off within {months} months")]
    NonConvergent { months: u32 },
    #[error("Unknown strategy: '{0}' (expected snowball or avalanche)")]
    UnknownStrategy(String),
}
