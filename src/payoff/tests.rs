#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{BudgetEntry, Debt};

fn debt(id: i64, name: &str, balance: Decimal, rate: Decimal, min: Decimal) -> Debt {
    Debt {
        id,
        name: name.into(),
        lender: None,
        current_balance: balance,
        interest_rate: rate,
        minimum_payment: min,
        last_updated: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    }
}

fn run(debts: &[Debt], strategy: Strategy, payment: Decimal) -> PayoffPlan {
    simulate_payoff(debts, strategy, payment).unwrap().unwrap()
}

// ── Strategy ──────────────────────────────────────────────────

#[test]
fn test_strategy_parse() {
    assert_eq!("snowball".parse::<Strategy>().unwrap(), Strategy::Snowball);
    assert_eq!(" AVALANCHE ".parse::<Strategy>().unwrap(), Strategy::Avalanche);
    assert_eq!(
        "debt-free".parse::<Strategy>(),
        Err(PayoffError::UnknownStrategy("debt-free".into()))
    );
}

#[test]
fn test_strategy_roundtrip() {
    for s in Strategy::all() {
        assert_eq!(s.as_str().parse::<Strategy>().unwrap(), *s);
    }
}

#[test]
fn test_strategy_toggle_and_display() {
    assert_eq!(Strategy::Snowball.toggle(), Strategy::Avalanche);
    assert_eq!(Strategy::Avalanche.toggle(), Strategy::Snowball);
    assert_eq!(format!("{}", Strategy::Avalanche), "Avalanche");
    assert_eq!(Strategy::default(), Strategy::Snowball);
}

#[test]
fn test_snowball_tie_breaks_on_higher_rate() {
    let mut debts = vec![
        debt(1, "Low", dec!(100), dec!(5), dec!(0)),
        debt(2, "High", dec!(100), dec!(25), dec!(0)),
        debt(3, "Small", dec!(40), dec!(1), dec!(0)),
    ];
    debts.sort_by(|a, b| Strategy::Snowball.allocation_order(a, b));
    let ids: Vec<i64> = debts.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[test]
fn test_avalanche_tie_breaks_on_smaller_balance() {
    let mut debts = vec![
        debt(1, "Big", dec!(900), dec!(18), dec!(0)),
        debt(2, "Little", dec!(100), dec!(18), dec!(0)),
        debt(3, "Cheap", dec!(10), dec!(3), dec!(0)),
    ];
    debts.sort_by(|a, b| Strategy::Avalanche.allocation_order(a, b));
    let ids: Vec<i64> = debts.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![2, 1, 3]);
}

// ── Simulation ────────────────────────────────────────────────

#[test]
fn test_no_debts_produces_no_schedule() {
    assert_eq!(
        simulate_payoff(&[], Strategy::Snowball, dec!(100)).unwrap(),
        None
    );
}

#[test]
fn test_insufficient_payment() {
    let debts = vec![debt(1, "Visa", dec!(500), dec!(18), dec!(50))];
    let err = simulate_payoff(&debts, Strategy::Snowball, dec!(40)).unwrap_err();
    assert_eq!(
        err,
        PayoffError::InsufficientPayment {
            required: dec!(50),
            offered: dec!(40),
        }
    );
    assert_eq!(
        err.to_string(),
        "Total payment ($40.00) is less than the total of minimum payments ($50.00)"
    );
}

#[test]
fn test_single_debt_exact_sequence() {
    let debts = vec![debt(1, "Card", dec!(120.00), dec!(12), dec!(20))];
    let plan = run(&debts, Strategy::Snowball, dec!(20));

    let expected = [
        (dec!(1.20), dec!(121.20), dec!(20), dec!(101.20)),
        (dec!(1.01), dec!(102.21), dec!(20), dec!(82.21)),
        (dec!(0.82), dec!(83.03), dec!(20), dec!(63.03)),
        (dec!(0.63), dec!(63.66), dec!(20), dec!(43.66)),
        (dec!(0.44), dec!(44.10), dec!(20), dec!(24.10)),
        (dec!(0.24), dec!(24.34), dec!(20), dec!(4.34)),
        (dec!(0.04), dec!(4.38), dec!(4.38), dec!(0)),
    ];
    assert_eq!(plan.schedule.len(), expected.len());
    for (i, (interest, before, paid, after)) in expected.iter().enumerate() {
        let m = &plan.schedule[i];
        assert_eq!(m.month, i as u32 + 1);
        assert_eq!(m.interest_paid, *interest, "month {}", m.month);
        assert_eq!(m.balances_before[&1], *before, "month {}", m.month);
        assert_eq!(m.payments[&1], *paid, "month {}", m.month);
        assert_eq!(m.balances_after[&1], *after, "month {}", m.month);
    }

    assert_eq!(plan.summary.total_months, 7);
    assert_eq!(plan.summary.total_interest, dec!(4.38));
    assert_eq!(plan.summary.total_paid, dec!(124.38));
    assert_eq!(plan.summary.total_principal(), dec!(120.00));
}

#[test]
fn test_snowball_sends_extra_to_smallest_balance() {
    let debts = vec![
        debt(1, "Big", dec!(100), dec!(20), dec!(10)),
        debt(2, "Small", dec!(50), dec!(10), dec!(10)),
    ];
    let plan = run(&debts, Strategy::Snowball, dec!(21));
    let first = &plan.schedule[0];
    assert_eq!(first.payments[&1], dec!(10));
    assert_eq!(first.payments[&2], dec!(11));
}

#[test]
fn test_avalanche_sends_extra_to_highest_rate() {
    let debts = vec![
        debt(1, "Big", dec!(100), dec!(20), dec!(10)),
        debt(2, "Small", dec!(50), dec!(10), dec!(10)),
    ];
    let plan = run(&debts, Strategy::Avalanche, dec!(21));
    let first = &plan.schedule[0];
    assert_eq!(first.payments[&1], dec!(11));
    assert_eq!(first.payments[&2], dec!(10));
}

#[test]
fn test_interest_rounded_before_added() {
    // 100 * 20 / 1200 = 1.6666.. → 1.67
    let debts = vec![debt(1, "Card", dec!(100), dec!(20), dec!(10))];
    let plan = run(&debts, Strategy::Avalanche, dec!(10));
    assert_eq!(plan.schedule[0].interest_paid, dec!(1.67));
    assert_eq!(plan.schedule[0].balances_before[&1], dec!(101.67));
}

#[test]
fn test_rate_keeps_full_precision() {
    // 1000 * 19.99 / 1200 = 16.6583.. → 16.66; a rate rounded to 20 would give 16.67
    let debts = vec![debt(1, "Card", dec!(1000), dec!(19.99), dec!(100))];
    let plan = run(&debts, Strategy::Snowball, dec!(100));
    assert_eq!(plan.schedule[0].interest_paid, dec!(16.66));
}

#[test]
fn test_extra_spills_to_next_debt() {
    let debts = vec![
        debt(1, "Small", dec!(30), dec!(0), dec!(10)),
        debt(2, "Large", dec!(100), dec!(0), dec!(10)),
    ];
    let plan = run(&debts, Strategy::Snowball, dec!(60));

    let m1 = &plan.schedule[0];
    assert_eq!(m1.payments[&1], dec!(30));
    assert_eq!(m1.payments[&2], dec!(30));
    assert_eq!(m1.balances_after[&1], dec!(0));
    assert_eq!(m1.balances_after[&2], dec!(70));

    let m2 = &plan.schedule[1];
    assert!(!m2.payments.contains_key(&1));
    assert_eq!(m2.payments[&2], dec!(60));

    assert_eq!(plan.summary.total_months, 3);
    assert_eq!(plan.summary.total_paid, dec!(130));
    assert_eq!(plan.summary.total_interest, dec!(0));
}

#[test]
fn test_minimums_only_zero_rate_terminates() {
    let debts = vec![
        debt(1, "A", dec!(100), dec!(0), dec!(25)),
        debt(2, "B", dec!(30), dec!(0), dec!(10)),
    ];
    let plan = run(&debts, Strategy::Avalanche, dec!(35));
    assert_eq!(plan.summary.total_months, 4);
    assert_eq!(plan.summary.total_paid, dec!(130));

    // B is gone in month 4; A takes its last minimum
    let last = plan.schedule.last().unwrap();
    assert!(!last.payments.contains_key(&2));
    assert!(!last.balances_before.contains_key(&2));
    assert_eq!(last.payments[&1], dec!(25));
}

#[test]
fn test_zero_balance_debt_gets_nothing_and_drops_out() {
    let debts = vec![
        debt(1, "Settled", dec!(0), dec!(22), dec!(15)),
        debt(2, "Open", dec!(100), dec!(0), dec!(20)),
    ];
    let plan = run(&debts, Strategy::Snowball, dec!(35));

    let m1 = &plan.schedule[0];
    assert_eq!(m1.interest_paid, dec!(0));
    assert_eq!(m1.payments[&1], dec!(0));
    assert_eq!(m1.balances_before[&1], dec!(0));
    assert_eq!(m1.payments[&2], dec!(35));

    assert!(plan.schedule[1..]
        .iter()
        .all(|m| !m.payments.contains_key(&1)));
}

#[test]
fn test_residue_below_threshold_accrues_no_interest() {
    let debts = vec![debt(1, "Dust", dec!(0.004), dec!(29.99), dec!(5))];
    let plan = run(&debts, Strategy::Snowball, dec!(5));
    assert_eq!(plan.summary.total_months, 1);
    assert_eq!(plan.schedule[0].interest_paid, dec!(0));
    assert_eq!(plan.schedule[0].payments[&1], dec!(0.004));
}

#[test]
fn test_non_convergent_run_fails() {
    // 10,000 at 24% accrues $200/month against a $1 payment
    let debts = vec![debt(1, "Loan", dec!(10000), dec!(24), dec!(1))];
    assert_eq!(
        simulate_payoff(&debts, Strategy::Snowball, dec!(1)),
        Err(PayoffError::NonConvergent {
            months: MAX_SIMULATION_MONTHS
        })
    );
}

#[test]
fn test_runaway_balance_reported_as_non_convergent() {
    // 400% APR compounds a third per month; the balance outgrows Decimal
    // long before the month bound.
    let debts = vec![debt(1, "Payday", dec!(1000), dec!(400), dec!(10))];
    match simulate_payoff(&debts, Strategy::Snowball, dec!(10)) {
        Err(PayoffError::NonConvergent { months }) => {
            assert!(months > 1);
            assert!(months < MAX_SIMULATION_MONTHS);
        }
        other => panic!("expected NonConvergent, got {other:?}"),
    }
}

#[test]
fn test_caller_records_untouched() {
    let debts = vec![
        debt(1, "A", dec!(500), dec!(18), dec!(25)),
        debt(2, "B", dec!(200), dec!(9), dec!(15)),
    ];
    let before = debts.clone();
    let _ = run(&debts, Strategy::Avalanche, dec!(100));
    assert_eq!(debts, before);
}

#[test]
fn test_payments_never_exceed_total() {
    let debts = vec![
        debt(1, "A", dec!(2500), dec!(22.9), dec!(75)),
        debt(2, "B", dec!(800), dec!(6.5), dec!(30)),
        debt(3, "C", dec!(12000), dec!(4.25), dec!(210)),
    ];
    for strategy in Strategy::all() {
        let plan = run(&debts, *strategy, dec!(450));
        let (last, rest) = plan.schedule.split_last().unwrap();
        for m in rest {
            assert_eq!(m.total_payment(), dec!(450), "month {}", m.month);
        }
        assert!(last.total_payment() <= dec!(450));
        assert!(last.balances_after.values().all(|b| *b <= dec!(0.005)));
    }
}

#[test]
fn test_avalanche_pays_less_interest_than_snowball() {
    let debts = vec![
        debt(1, "Store Card", dec!(600), dec!(8), dec!(20)),
        debt(2, "Visa", dec!(4000), dec!(27.99), dec!(90)),
    ];
    let snowball = run(&debts, Strategy::Snowball, dec!(400));
    let avalanche = run(&debts, Strategy::Avalanche, dec!(400));
    assert!(avalanche.summary.total_interest < snowball.summary.total_interest);
}

#[test]
fn test_summary_matches_schedule() {
    let debts = vec![
        debt(1, "A", dec!(1500), dec!(15), dec!(40)),
        debt(2, "B", dec!(300), dec!(21), dec!(25)),
    ];
    let plan = run(&debts, Strategy::Snowball, dec!(150));
    let interest: Decimal = plan.schedule.iter().map(|m| m.interest_paid).sum();
    let paid: Decimal = plan.schedule.iter().map(MonthSnapshot::total_payment).sum();
    assert_eq!(plan.summary.total_months as usize, plan.schedule.len());
    assert_eq!(plan.summary.total_interest, round(interest));
    assert_eq!(plan.summary.total_paid, round(paid));
    assert_eq!(plan.summary.total_paid, dec!(1800) + plan.summary.total_interest);
}

fn round(val: Decimal) -> Decimal {
    crate::models::round2(val)
}

#[test]
fn test_extra_payment() {
    let debts = vec![
        debt(1, "A", dec!(100), dec!(0), dec!(25)),
        debt(2, "B", dec!(100), dec!(0), dec!(10)),
    ];
    assert_eq!(extra_payment(&debts, dec!(50)).unwrap(), dec!(15));
    assert_eq!(extra_payment(&debts, dec!(35)).unwrap(), dec!(0));
    assert!(extra_payment(&debts, dec!(34.99)).is_err());
}

// ── Affordability ─────────────────────────────────────────────

fn entry(name: &str, limit: Decimal) -> BudgetEntry {
    BudgetEntry::new(0, name.into(), limit)
}

#[test]
fn test_affordability_subtracts_overlap() {
    let entries = vec![
        entry("Credit Card Payment", dec!(200)),
        entry("Groceries", dec!(600)),
        entry("Rent/Mortgage", dec!(2200)),
    ];
    let result = check_affordability(dec!(4000), dec!(3000), &entries, dec!(300));
    assert_eq!(result.overlap_total, dec!(200));
    assert_eq!(result.adjusted_budgeted_expenses, dec!(2800));
    assert_eq!(result.total_minimum_debt_payments, dec!(300));
    assert_eq!(result.surplus, dec!(900));
    assert!(result.has_surplus());
    assert_eq!(
        result.overlapping,
        vec![("Credit Card Payment".to_string(), dec!(200))]
    );
}

#[test]
fn test_affordability_matches_case_insensitively() {
    let entries = vec![
        entry("FINANCIAL", dec!(50)),
        entry("auto payment", dec!(300)),
        entry("Student Loan Payment", dec!(150)),
        entry("Financial Planning", dec!(75)),
    ];
    let result = check_affordability(dec!(3000), dec!(1000), &entries, dec!(0));
    assert_eq!(result.overlap_total, dec!(500));
    assert_eq!(result.overlapping.len(), 3);
    assert_eq!(result.adjusted_budgeted_expenses, dec!(500));
}

#[test]
fn test_affordability_floors_adjusted_expenses() {
    let entries = vec![entry("Credit Card Payment", dec!(400))];
    let result = check_affordability(dec!(1000), dec!(250), &entries, dec!(100));
    assert_eq!(result.adjusted_budgeted_expenses, dec!(0));
    assert_eq!(result.surplus, dec!(900));
}

#[test]
fn test_affordability_deficit() {
    let result = check_affordability(dec!(2000), dec!(1800), &[], dec!(350));
    assert!(result.overlapping.is_empty());
    assert_eq!(result.surplus, dec!(-150));
    assert!(!result.has_surplus());
}

#[test]
fn test_affordability_tiny_surplus_is_not_surplus() {
    let result = check_affordability(dec!(100.004), dec!(100), &[], dec!(0));
    assert!(!result.has_surplus());
}

#[test]
fn test_overlap_category_names() {
    assert!(is_debt_overlap_category("Credit Card Payment"));
    assert!(is_debt_overlap_category("financial"));
    assert!(!is_debt_overlap_category("Credit Card"));
}

// ── Strategy preview ──────────────────────────────────────────

#[test]
fn test_preview_snowball_orders_by_balance_then_name() {
    let debts = vec![
        debt(1, "Zeta", dec!(300), dec!(10), dec!(20)),
        debt(2, "Alpha", dec!(300), dec!(5), dec!(20)),
        debt(3, "Mid", dec!(100), dec!(30), dec!(10)),
    ];
    let preview = strategy_preview(&debts, Strategy::Snowball, dec!(80)).unwrap();
    let names: Vec<&str> = preview.rows.iter().map(|r| r.debt.name.as_str()).collect();
    assert_eq!(names, vec!["Mid", "Alpha", "Zeta"]);
    assert_eq!(preview.extra, dec!(30));
    assert_eq!(preview.total_minimums, dec!(50));
    assert!(preview.rows[0].receives_extra);
    assert_eq!(preview.rows[0].payment, dec!(40));
    assert_eq!(preview.rows[1].payment, dec!(20));
    assert!(!preview.rows[2].receives_extra);
}

#[test]
fn test_preview_avalanche_orders_by_rate() {
    let debts = vec![
        debt(1, "Car", dec!(9000), dec!(6.9), dec!(250)),
        debt(2, "Visa", dec!(2000), dec!(24.9), dec!(60)),
        debt(3, "Store", dec!(500), dec!(24.9), dec!(25)),
    ];
    let preview = strategy_preview(&debts, Strategy::Avalanche, dec!(400)).unwrap();
    let ids: Vec<i64> = preview.rows.iter().map(|r| r.debt.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert_eq!(preview.rows[0].payment, dec!(90));
}

#[test]
fn test_preview_without_extra() {
    let debts = vec![debt(1, "Card", dec!(100), dec!(10), dec!(20))];
    let preview = strategy_preview(&debts, Strategy::Snowball, dec!(20)).unwrap();
    assert!(!preview.rows[0].receives_extra);
    assert_eq!(preview.rows[0].payment, dec!(20));
}

#[test]
fn test_preview_insufficient_payment() {
    let debts = vec![debt(1, "Card", dec!(100), dec!(10), dec!(20))];
    assert!(matches!(
        strategy_preview(&debts, Strategy::Avalanche, dec!(10)),
        Err(PayoffError::InsufficientPayment { .. })
    ));
}

// ── Report ────────────────────────────────────────────────────

#[test]
fn test_report_rows_sorted_by_name() {
    let debts = vec![
        debt(1, "Visa", dec!(100), dec!(0), dec!(10)),
        debt(2, "Auto Loan", dec!(100), dec!(0), dec!(10)),
    ];
    let plan = run(&debts, Strategy::Snowball, dec!(20));
    let report = PayoffReport::build(&plan, &debts, DEFAULT_MAX_DISPLAY_MONTHS);
    let names: Vec<&str> = report.months[0].rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Auto Loan", "Visa"]);
    assert_eq!(report.months[0].rows[0].start_balance, dec!(100));
    assert_eq!(report.months[0].rows[0].end_balance, dec!(90));
    assert!(!report.truncated);
}

#[test]
fn test_report_unknown_debt_uses_id_label() {
    let debts = vec![debt(42, "Card", dec!(50), dec!(0), dec!(50))];
    let plan = run(&debts, Strategy::Snowball, dec!(50));
    let report = PayoffReport::build(&plan, &[], DEFAULT_MAX_DISPLAY_MONTHS);
    assert_eq!(report.months[0].rows[0].name, "ID 42");
}

#[test]
fn test_report_caps_months() {
    let debts = vec![debt(1, "Slow", dec!(100), dec!(0), dec!(1))];
    let plan = run(&debts, Strategy::Snowball, dec!(1));
    assert_eq!(plan.summary.total_months, 100);

    let report = PayoffReport::build(&plan, &debts, 12);
    assert_eq!(report.months.len(), 12);
    assert!(report.truncated);
    assert_eq!(report.summary.total_months, 100);
    assert!(render_text(&report, true).contains("truncated after 12 months"));
}

#[test]
fn test_report_summary_lines() {
    let debts = vec![debt(1, "Card", dec!(120), dec!(12), dec!(20))];
    let plan = run(&debts, Strategy::Snowball, dec!(20));
    let report = PayoffReport::build(&plan, &debts, DEFAULT_MAX_DISPLAY_MONTHS);
    let lines = report.summary_lines();
    assert!(lines.contains(&("Payoff Time", "7 months".to_string())));
    assert!(lines.contains(&("Total Interest", "$4.38".to_string())));
    assert!(lines.contains(&("Total Principal", "$120.00".to_string())));
    assert!(lines.contains(&("Total Paid", "$124.38".to_string())));
}

#[test]
fn test_render_text_details_toggle() {
    let debts = vec![debt(1, "Card", dec!(120), dec!(12), dec!(20))];
    let plan = run(&debts, Strategy::Snowball, dec!(20));
    let report = PayoffReport::build(&plan, &debts, DEFAULT_MAX_DISPLAY_MONTHS);

    let short = render_text(&report, false);
    assert!(short.contains("Payoff Time:"));
    assert!(!short.contains("Start Balance"));

    let full = render_text(&report, true);
    assert!(full.contains("Start Balance"));
    assert!(full.contains("$121.20"));
    assert!(full.contains("$101.20"));
    assert!(full.contains("Interest:"));
}
