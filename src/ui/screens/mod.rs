pub(crate) mod budgets;
pub(crate) mod debts;
pub(crate) mod payoff;
