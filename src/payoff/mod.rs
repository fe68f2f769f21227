//! Debt payoff core: affordability, strategy ordering, month-by-month
//! simulation and report shaping. Pure computation; no I/O and no logging.

mod affordability;
mod error;
mod plan;
mod report;
mod simulate;
mod strategy;

pub use affordability::{check_affordability, is_debt_overlap_category, AffordabilityResult};
pub use error::PayoffError;
pub use plan::{strategy_preview, PreviewRow, StrategyPreview};
pub use report::{render_text, PayoffReport, ReportMonth, ReportRow, DEFAULT_MAX_DISPLAY_MONTHS};
pub use simulate::{
    extra_payment, simulate_payoff, MonthSnapshot, PayoffPlan, SummaryStats,
    MAX_SIMULATION_MONTHS,
};
pub use strategy::Strategy;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod tests;
