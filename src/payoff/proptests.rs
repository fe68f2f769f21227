#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{simulate_payoff, MonthSnapshot, Strategy as PayoffStrategy, MAX_SIMULATION_MONTHS};
use crate::models::{round2, Debt, ZERO_THRESHOLD};

/// A debt whose minimum covers its own interest plus 0.5% of the starting
/// balance, so every run pays off well inside the month bound.
fn make_debt(id: i64, balance_cents: i64, rate_hundredths: i64, pad_cents: i64) -> Debt {
    let balance = Decimal::new(balance_cents, 2);
    let rate = Decimal::new(rate_hundredths, 2);
    let floor = round2(balance * rate / dec!(1200) + balance / dec!(200));
    Debt {
        id,
        name: format!("Debt {id}"),
        lender: None,
        current_balance: balance,
        interest_rate: rate,
        minimum_payment: floor + dec!(0.01) + Decimal::new(pad_cents, 2),
        last_updated: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    }
}

fn arb_debts() -> impl Strategy<Value = Vec<Debt>> {
    prop::collection::vec((0i64..=1_000_000, 0i64..=3_500, 0i64..=5_000), 1..=5).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (b, r, p))| make_debt(i as i64 + 1, b, r, p))
                .collect()
        },
    )
}

fn arb_strategy() -> impl Strategy<Value = PayoffStrategy> {
    prop_oneof![
        Just(PayoffStrategy::Snowball),
        Just(PayoffStrategy::Avalanche)
    ]
}

fn total_payment(debts: &[Debt], extra_cents: i64) -> Decimal {
    Debt::total_minimums(debts) + Decimal::new(extra_cents, 2)
}

proptest! {
    #[test]
    fn prop_terminates_with_everything_paid(
        debts in arb_debts(),
        strategy in arb_strategy(),
        extra_cents in 0i64..=50_000,
    ) {
        let payment = total_payment(&debts, extra_cents);
        let plan = simulate_payoff(&debts, strategy, payment).unwrap().unwrap();
        prop_assert!(plan.summary.total_months <= MAX_SIMULATION_MONTHS);
        let last = plan.schedule.last().unwrap();
        prop_assert!(last.balances_after.values().all(|b| *b <= ZERO_THRESHOLD));
    }

    #[test]
    fn prop_balances_strictly_decrease_until_paid(
        debts in arb_debts(),
        strategy in arb_strategy(),
        extra_cents in 0i64..=50_000,
    ) {
        let payment = total_payment(&debts, extra_cents);
        let plan = simulate_payoff(&debts, strategy, payment).unwrap().unwrap();
        for pair in plan.schedule.windows(2) {
            for (id, after) in &pair[1].balances_after {
                let prev = pair[0].balances_after[id];
                prop_assert!(*after < prev, "debt {} went {} -> {}", id, prev, after);
            }
        }
        for month in &plan.schedule {
            prop_assert!(month.balances_after.values().all(|b| *b >= Decimal::ZERO));
            prop_assert!(month.payments.values().all(|p| *p >= Decimal::ZERO));
        }
    }

    #[test]
    fn prop_payments_conserved(
        debts in arb_debts(),
        strategy in arb_strategy(),
        extra_cents in 0i64..=50_000,
    ) {
        let payment = total_payment(&debts, extra_cents);
        let plan = simulate_payoff(&debts, strategy, payment).unwrap().unwrap();
        let (last, rest) = plan.schedule.split_last().unwrap();
        for month in rest {
            prop_assert_eq!(month.total_payment(), payment);
        }
        prop_assert!(last.total_payment() <= payment);
    }

    #[test]
    fn prop_total_paid_is_principal_plus_interest(
        debts in arb_debts(),
        strategy in arb_strategy(),
        extra_cents in 0i64..=50_000,
    ) {
        let payment = total_payment(&debts, extra_cents);
        let plan = simulate_payoff(&debts, strategy, payment).unwrap().unwrap();
        let principal: Decimal = debts.iter().map(|d| d.current_balance).sum();
        let interest: Decimal = plan.schedule.iter().map(|m| m.interest_paid).sum();
        let paid: Decimal = plan.schedule.iter().map(MonthSnapshot::total_payment).sum();
        prop_assert_eq!(plan.summary.total_interest, round2(interest));
        prop_assert_eq!(plan.summary.total_paid, round2(paid));
        prop_assert_eq!(plan.summary.total_paid, principal + plan.summary.total_interest);
    }

    #[test]
    fn prop_round2_idempotent(mantissa in any::<i64>(), scale in 0u32..=10) {
        let val = Decimal::new(mantissa, scale);
        let once = round2(val);
        prop_assert_eq!(round2(once), once);
        prop_assert!(once.scale() <= 2);
        prop_assert!((once - val).abs() <= ZERO_THRESHOLD);
    }
}
