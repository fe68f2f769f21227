use anyhow::Result;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::db::{Database, SETTING_INCOME, SETTING_MONTHLY_PAYMENT, SETTING_STRATEGY};
use crate::models::*;
use crate::payoff::{
    check_affordability, simulate_payoff, strategy_preview, AffordabilityResult, PayoffError,
    PayoffReport, Strategy, StrategyPreview,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Debts,
    Payoff,
    Budgets,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Debts, Self::Payoff, Self::Budgets]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debts => write!(f, "Debts"),
            Self::Payoff => write!(f, "Payoff"),
            Self::Budgets => write!(f, "Budgets"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingAction {
    DeleteDebt { id: DebtId, name: String },
    DeleteBudget { id: i64, name: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    pub(crate) profile: ProfileId,
    pub(crate) profile_name: String,
    pub(crate) max_display_months: usize,

    // Debts
    pub(crate) debts: Vec<Debt>,
    pub(crate) debt_index: usize,
    pub(crate) debt_scroll: usize,

    // Payoff
    pub(crate) strategy: Strategy,
    /// Stored monthly payment; the total of minimums is used when unset.
    pub(crate) monthly_payment: Option<Decimal>,
    pub(crate) preview: Option<StrategyPreview>,
    pub(crate) report: Option<PayoffReport>,
    pub(crate) payoff_error: Option<PayoffError>,
    pub(crate) schedule_scroll: usize,

    // Budgets
    pub(crate) categories: Vec<Category>,
    pub(crate) budgets: Vec<BudgetEntry>,
    pub(crate) budget_index: usize,
    pub(crate) budget_scroll: usize,
    pub(crate) income: Option<Decimal>,
    pub(crate) affordability: Option<AffordabilityResult>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(profile: ProfileId, profile_name: String, max_display_months: usize) -> Self {
        Self {
            running: true,
            screen: Screen::Debts,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,

            profile,
            profile_name,
            max_display_months,

            debts: Vec::new(),
            debt_index: 0,
            debt_scroll: 0,

            strategy: Strategy::default(),
            monthly_payment: None,
            preview: None,
            report: None,
            payoff_error: None,
            schedule_scroll: 0,

            categories: Vec::new(),
            budgets: Vec::new(),
            budget_index: 0,
            budget_scroll: 0,
            income: None,
            affordability: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Load stored settings and every tab's data.
    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.strategy = match db.get_setting(self.profile, SETTING_STRATEGY)? {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(error = %e, "ignoring stored strategy");
                Strategy::default()
            }),
            None => Strategy::default(),
        };
        self.monthly_payment = db
            .get_decimal_setting(self.profile, SETTING_MONTHLY_PAYMENT)?
            .map(round2);
        self.income = db
            .get_decimal_setting(self.profile, SETTING_INCOME)?
            .map(round2);
        self.categories = db.get_categories()?;
        self.refresh_debts(db)?;
        self.refresh_budgets(db)?;
        Ok(())
    }

    /// Reload debts, then recompute everything derived from them.
    pub(crate) fn refresh_debts(&mut self, db: &Database) -> Result<()> {
        self.debts = db.get_debts(self.profile)?;
        if self.debt_index >= self.debts.len() {
            self.debt_index = self.debts.len().saturating_sub(1);
        }
        self.debt_scroll = self.debt_scroll.min(self.debt_index);
        self.refresh_payoff();
        self.refresh_affordability();
        Ok(())
    }

    pub(crate) fn refresh_budgets(&mut self, db: &Database) -> Result<()> {
        self.budgets = db.get_budget_entries(self.profile)?;
        if self.budget_index >= self.budgets.len() {
            self.budget_index = self.budgets.len().saturating_sub(1);
        }
        self.budget_scroll = self.budget_scroll.min(self.budget_index);
        self.refresh_affordability();
        Ok(())
    }

    pub(crate) fn total_minimums(&self) -> Decimal {
        Debt::total_minimums(&self.debts)
    }

    pub(crate) fn effective_payment(&self) -> Decimal {
        self.monthly_payment
            .unwrap_or_else(|| self.total_minimums())
    }

    /// Recompute the strategy preview and payoff schedule for the current
    /// debts, strategy and payment. Failures are kept for display.
    pub(crate) fn refresh_payoff(&mut self) {
        self.preview = None;
        self.report = None;
        self.payoff_error = None;
        self.schedule_scroll = 0;
        if self.debts.is_empty() {
            return;
        }

        let payment = self.effective_payment();
        match strategy_preview(&self.debts, self.strategy, payment) {
            Ok(preview) => self.preview = Some(preview),
            Err(e) => {
                self.payoff_error = Some(e);
                return;
            }
        }

        match simulate_payoff(&self.debts, self.strategy, payment) {
            Ok(Some(plan)) => {
                debug!(
                    strategy = self.strategy.as_str(),
                    %payment,
                    months = plan.summary.total_months,
                    "payoff recomputed"
                );
                self.report = Some(PayoffReport::build(
                    &plan,
                    &self.debts,
                    self.max_display_months,
                ));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "payoff simulation failed");
                self.payoff_error = Some(e);
            }
        }
    }

    pub(crate) fn refresh_affordability(&mut self) {
        self.affordability = self.income.map(|income| {
            check_affordability(
                income,
                BudgetEntry::total(&self.budgets),
                &self.budgets,
                self.total_minimums(),
            )
        });
    }

    pub(crate) fn set_strategy(&mut self, db: &Database, strategy: Strategy) -> Result<()> {
        db.set_setting(self.profile, SETTING_STRATEGY, strategy.as_str())?;
        self.strategy = strategy;
        self.refresh_payoff();
        Ok(())
    }

    /// Stores the payment rounded to cents; returns the stored value.
    pub(crate) fn set_monthly_payment(&mut self, db: &Database, payment: Decimal) -> Result<Decimal> {
        let payment = round2(payment);
        db.set_setting(self.profile, SETTING_MONTHLY_PAYMENT, &payment.to_string())?;
        self.monthly_payment = Some(payment);
        self.refresh_payoff();
        Ok(payment)
    }

    pub(crate) fn set_income(&mut self, db: &Database, income: Decimal) -> Result<Decimal> {
        let income = round2(income);
        db.set_setting(self.profile, SETTING_INCOME, &income.to_string())?;
        self.income = Some(income);
        self.refresh_affordability();
        Ok(income)
    }

    pub(crate) fn selected_debt(&self) -> Option<&Debt> {
        self.debts.get(self.debt_index)
    }

    pub(crate) fn selected_budget(&self) -> Option<&BudgetEntry> {
        self.budgets.get(self.budget_index)
    }

    /// Lines in the schedule table: one per debt row plus a totals line per month.
    pub(crate) fn schedule_line_count(&self) -> usize {
        self.report
            .as_ref()
            .map_or(0, |r| r.months.iter().map(|m| m.rows.len() + 1).sum())
    }

    // ── Page sizes (rows visible inside each screen's frame) ──

    pub(crate) fn debt_page(&self) -> usize {
        self.visible_rows.saturating_sub(3).max(1)
    }

    pub(crate) fn budget_page(&self) -> usize {
        self.visible_rows.saturating_sub(2).max(1)
    }

    /// Below the summary cards, minus borders and header.
    pub(crate) fn schedule_page(&self) -> usize {
        self.visible_rows.saturating_sub(8).max(1)
    }

    pub(crate) fn confirm(&mut self, action: PendingAction) {
        self.confirm_message = match &action {
            PendingAction::DeleteDebt { name, .. } => format!("Delete debt '{name}'?"),
            PendingAction::DeleteBudget { name, .. } => format!("Delete budget for '{name}'?"),
        };
        self.pending_action = Some(action);
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
