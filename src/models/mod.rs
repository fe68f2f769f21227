mod budget;
mod category;
mod debt;
pub mod money;
mod profile;

pub use budget::BudgetEntry;
pub use category::Category;
pub use debt::{Debt, DebtId, DebtInput, DebtUpdate};
pub use money::{is_effectively_zero, parse_amount, round2, ZERO_THRESHOLD};
pub use profile::ProfileId;
