use rust_decimal::Decimal;
use std::collections::HashMap;

use super::simulate::{PayoffPlan, SummaryStats};
use super::Strategy;
use crate::models::{Debt, DebtId};

/// Presentation cap on schedule months. Independent of the simulator bound.
pub const DEFAULT_MAX_DISPLAY_MONTHS: usize = 240;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub debt_id: DebtId,
    pub name: String,
    pub start_balance: Decimal,
    pub payment: Decimal,
    pub end_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportMonth {
    pub month: u32,
    pub interest: Decimal,
    /// Sorted by debt name.
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayoffReport {
    pub strategy: Strategy,
    pub monthly_payment: Decimal,
    pub summary: SummaryStats,
    pub months: Vec<ReportMonth>,
    /// True when the schedule had more months than were kept.
    pub truncated: bool,
}

impl PayoffReport {
    /// `debts` are the caller's original records, used only for names.
    pub fn build(plan: &PayoffPlan, debts: &[Debt], max_months: usize) -> Self {
        let names: HashMap<DebtId, &str> =
            debts.iter().map(|d| (d.id, d.name.as_str())).collect();

        let months = plan
            .schedule
            .iter()
            .take(max_months)
            .map(|snapshot| {
                let mut rows: Vec<ReportRow> = snapshot
                    .payments
                    .iter()
                    .map(|(&id, &payment)| ReportRow {
                        debt_id: id,
                        name: names
                            .get(&id)
                            .map_or_else(|| format!("ID {id}"), |n| n.to_string()),
                        start_balance: snapshot
                            .balances_before
                            .get(&id)
                            .copied()
                            .unwrap_or(Decimal::ZERO),
                        payment,
                        end_balance: snapshot
                            .balances_after
                            .get(&id)
                            .copied()
                            .unwrap_or(Decimal::ZERO),
                    })
                    .collect();
                rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.debt_id.cmp(&b.debt_id)));
                ReportMonth {
                    month: snapshot.month,
                    interest: snapshot.interest_paid,
                    rows,
                }
            })
            .collect();

        Self {
            strategy: plan.strategy,
            monthly_payment: plan.monthly_payment,
            summary: plan.summary,
            months,
            truncated: plan.schedule.len() > max_months,
        }
    }

    pub fn summary_lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Strategy", self.strategy.title().to_string()),
            ("Monthly Payment", format!("${:.2}", self.monthly_payment)),
            (
                "Payoff Time",
                format!("{} months", self.summary.total_months),
            ),
            (
                "Total Interest",
                format!("${:.2}", self.summary.total_interest),
            ),
            (
                "Total Principal",
                format!("${:.2}", self.summary.total_principal()),
            ),
            ("Total Paid", format!("${:.2}", self.summary.total_paid)),
        ]
    }
}

/// Fixed-width text rendering. The monthly table is included when `details`.
pub fn render_text(report: &PayoffReport, details: bool) -> String {
    let rule = |width: usize| "─".repeat(width);
    fn table_row(month: &str, name: &str, start: &str, payment: &str, end: &str) -> String {
        format!("{month:<5} | {name:<25} | {start:>13} | {payment:>12} | {end:>13}")
    }

    let mut lines = vec!["Payoff Simulation Results".to_string(), rule(40)];
    for (label, value) in report.summary_lines() {
        lines.push(format!("  {:<18} {value}", format!("{label}:")));
    }

    if details {
        lines.push(String::new());
        lines.push(table_row(
            "Month",
            "Debt Name",
            "Start Balance",
            "Payment",
            "End Balance",
        ));
        lines.push(rule(80));
        for month in &report.months {
            for (i, row) in month.rows.iter().enumerate() {
                let label = if i == 0 {
                    month.month.to_string()
                } else {
                    String::new()
                };
                lines.push(table_row(
                    &label,
                    &row.name,
                    &format!("${:.2}", row.start_balance),
                    &format!("${:.2}", row.payment),
                    &format!("${:.2}", row.end_balance),
                ));
            }
            lines.push(table_row(
                "",
                "--- Month Totals --->",
                "",
                "Interest:",
                &format!("${:.2}", month.interest),
            ));
            lines.push(rule(80));
        }
        if report.truncated {
            lines.push(format!(
                "... (truncated after {} months) ...",
                report.months.len()
            ));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
