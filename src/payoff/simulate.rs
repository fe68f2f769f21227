use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::{PayoffError, Strategy};
use crate::models::{is_effectively_zero, round2, Debt, DebtId, ZERO_THRESHOLD};

/// Upper bound on simulated months before a run is abandoned.
pub const MAX_SIMULATION_MONTHS: u32 = 1000;

/// APR percent → monthly fraction.
const MONTHLY_RATE_DIVISOR: Decimal = Decimal::from_parts(1200, 0, 0, false, 0);

/// One simulated month. Debts paid off in an earlier month do not appear.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSnapshot {
    pub month: u32,
    pub interest_paid: Decimal,
    pub payments: BTreeMap<DebtId, Decimal>,
    /// After this month's interest, before this month's payment.
    pub balances_before: BTreeMap<DebtId, Decimal>,
    pub balances_after: BTreeMap<DebtId, Decimal>,
}

impl MonthSnapshot {
    pub fn total_payment(&self) -> Decimal {
        self.payments.values().copied().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryStats {
    pub total_months: u32,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
}

impl SummaryStats {
    pub fn total_principal(&self) -> Decimal {
        self.total_paid - self.total_interest
    }

    fn from_schedule(schedule: &[MonthSnapshot], total_interest: Decimal) -> Self {
        let total_paid: Decimal = schedule.iter().map(MonthSnapshot::total_payment).sum();
        Self {
            total_months: schedule.len() as u32,
            total_interest: round2(total_interest),
            total_paid: round2(total_paid),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayoffPlan {
    pub strategy: Strategy,
    pub monthly_payment: Decimal,
    pub schedule: Vec<MonthSnapshot>,
    pub summary: SummaryStats,
}

/// Check that `total_payment` covers every minimum and return the extra.
pub fn extra_payment(debts: &[Debt], total_payment: Decimal) -> Result<Decimal, PayoffError> {
    let required = Debt::total_minimums(debts);
    if total_payment < required {
        return Err(PayoffError::InsufficientPayment {
            required,
            offered: total_payment,
        });
    }
    Ok(total_payment - required)
}

/// Simulate paying `total_payment` every month against `debts` until all of
/// them reach zero. Returns `Ok(None)` when there is nothing to simulate.
///
/// The caller's records are never touched: the run works on its own copies,
/// so concurrent runs over the same slice are independent.
pub fn simulate_payoff(
    debts: &[Debt],
    strategy: Strategy,
    total_payment: Decimal,
) -> Result<Option<PayoffPlan>, PayoffError> {
    if debts.is_empty() {
        return Ok(None);
    }
    extra_payment(debts, total_payment)?;

    let mut ledger = SimulationLedger::new(debts);
    while !ledger.active.is_empty() {
        if ledger.month() >= MAX_SIMULATION_MONTHS {
            return Err(PayoffError::NonConvergent {
                months: MAX_SIMULATION_MONTHS,
            });
        }
        ledger.advance(strategy, total_payment)?;
    }

    let summary = SummaryStats::from_schedule(&ledger.schedule, ledger.total_interest);
    Ok(Some(PayoffPlan {
        strategy,
        monthly_payment: total_payment,
        schedule: ledger.schedule,
        summary,
    }))
}

/// Scratch state for a single run.
struct SimulationLedger {
    active: Vec<Debt>,
    total_interest: Decimal,
    schedule: Vec<MonthSnapshot>,
}

impl SimulationLedger {
    fn new(debts: &[Debt]) -> Self {
        Self {
            active: debts.to_vec(),
            total_interest: Decimal::ZERO,
            schedule: Vec::new(),
        }
    }

    fn month(&self) -> u32 {
        self.schedule.len() as u32
    }

    /// Runs one month. Balances that grow past what `Decimal` can hold are
    /// reported as non-convergent rather than overflowing.
    fn advance(&mut self, strategy: Strategy, total_payment: Decimal) -> Result<(), PayoffError> {
        let month = self.month() + 1;
        let overflow = PayoffError::NonConvergent { months: month };
        let mut interest_this_month = Decimal::ZERO;
        let mut payments: BTreeMap<DebtId, Decimal> =
            self.active.iter().map(|d| (d.id, Decimal::ZERO)).collect();
        let mut balances_before = BTreeMap::new();

        for debt in &mut self.active {
            if debt.current_balance > ZERO_THRESHOLD {
                let monthly_rate = debt.interest_rate / MONTHLY_RATE_DIVISOR;
                let interest = debt
                    .current_balance
                    .checked_mul(monthly_rate)
                    .map(round2)
                    .ok_or_else(|| overflow.clone())?;
                debt.current_balance = debt
                    .current_balance
                    .checked_add(interest)
                    .ok_or_else(|| overflow.clone())?;
                interest_this_month = interest_this_month
                    .checked_add(interest)
                    .ok_or_else(|| overflow.clone())?;
            }
            balances_before.insert(debt.id, debt.current_balance);
        }
        self.total_interest = self
            .total_interest
            .checked_add(interest_this_month)
            .ok_or(overflow)?;

        // Minimums walk the working set in its current order. The pool always
        // covers them, so the order cannot change the outcome.
        let mut pool = total_payment;
        for debt in &mut self.active {
            let due = debt
                .minimum_payment
                .min(debt.current_balance)
                .max(Decimal::ZERO);
            let paid = due.min(pool);
            pay(&mut payments, debt, paid);
            pool -= paid;
        }

        if pool > ZERO_THRESHOLD {
            self.active.sort_by(|a, b| strategy.allocation_order(a, b));
            for debt in &mut self.active {
                if pool <= ZERO_THRESHOLD {
                    break;
                }
                let paid = pool.min(debt.current_balance.max(Decimal::ZERO));
                pay(&mut payments, debt, paid);
                pool -= paid;
            }
        }

        let balances_after = self
            .active
            .iter()
            .map(|d| (d.id, d.current_balance))
            .collect();
        self.schedule.push(MonthSnapshot {
            month,
            interest_paid: interest_this_month,
            payments,
            balances_before,
            balances_after,
        });

        self.active.retain(|d| !is_effectively_zero(d.current_balance));
        Ok(())
    }
}

fn pay(payments: &mut BTreeMap<DebtId, Decimal>, debt: &mut Debt, amount: Decimal) {
    *payments.entry(debt.id).or_insert(Decimal::ZERO) += amount;
    debt.current_balance -= amount;
}
