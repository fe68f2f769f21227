use anyhow::Result;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{Database, SETTING_INCOME, SETTING_MONTHLY_PAYMENT, SETTING_STRATEGY};
use crate::models::{parse_amount, round2, Category, Debt, DebtInput, DebtUpdate, ProfileId};
use crate::payoff::{
    check_affordability, render_text, simulate_payoff, strategy_preview, PayoffReport, Strategy,
    StrategyPreview,
};

pub(crate) fn as_cli(
    args: &[String],
    db: &mut Database,
    profile: ProfileId,
    config: &Config,
) -> Result<()> {
    let rest = &args[2..];
    match args[1].as_str() {
        "debts" | "d" => cli_debts(db, profile),
        "add-debt" => cli_add_debt(rest, db, profile),
        "update-debt" => cli_update_debt(rest, db, profile),
        "remove-debt" => cli_remove_debt(rest, db, profile),
        "categories" => cli_categories(db),
        "add-category" => cli_add_category(rest, db),
        "budgets" | "b" => cli_budgets(db, profile),
        "budget" => cli_budget(rest, db, profile),
        "remove-budget" => cli_remove_budget(rest, db, profile),
        "afford" | "a" => cli_afford(rest, db, profile),
        "plan" | "p" => cli_plan(rest, db, profile),
        "simulate" | "s" => cli_simulate(rest, db, profile, config),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("debtui {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("DebTUI - local-only debt payoff planner");
    println!();
    println!("Usage: debtui [--profile <name>] [--data-dir <path>] [--max-months <n>] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                     Launch interactive TUI");
    println!("  debts                                      List debts");
    println!("  add-debt <name> <balance> <rate> <min>     Add a debt");
    println!("    --lender <name>                          Lender (optional)");
    println!("  update-debt <id> <balance> <rate> <min>    Update a debt's figures");
    println!("    --lender <name>                          New lender (\"\" clears it)");
    println!("  remove-debt <id>                           Remove a debt");
    println!("  categories                                 List budget categories");
    println!("  add-category <name>                        Create a budget category");
    println!("  budgets                                    List monthly budget limits");
    println!("  budget <category> <amount>                 Set a category's monthly limit");
    println!("  remove-budget <category>                   Remove a category's limit");
    println!("  afford [income]                            Check monthly surplus for extra payments");
    println!("  plan <payment>                             Show snowball and avalanche order");
    println!("  simulate <snowball|avalanche> <payment>    Simulate payoff month by month");
    println!("    --details                                Include the monthly breakdown");
    println!("  --help, -h                                 Show this help");
    println!("  --version, -V                              Show version");
}

// ── Debts ─────────────────────────────────────────────────────

fn cli_debts(db: &Database, profile: ProfileId) -> Result<()> {
    let debts = db.get_debts(profile)?;
    if debts.is_empty() {
        println!("No debts entered yet");
        return Ok(());
    }

    println!(
        "{:>3} | {:<25} | {:<15} | {:>13} | {:>7} | {:>13} | Last Updated",
        "ID", "Name", "Lender", "Balance", "Rate %", "Min Payment"
    );
    println!("{}", "─".repeat(98));
    for d in &debts {
        println!(
            "{:>3} | {:<25} | {:<15} | {:>13} | {:>6.2}% | {:>13} | {}",
            d.id,
            d.name,
            d.lender_label(),
            format!("${:.2}", d.current_balance),
            d.interest_rate,
            format!("${:.2}", d.minimum_payment),
            d.last_updated,
        );
    }
    println!("{}", "─".repeat(98));
    println!(
        "Total minimum monthly payment: ${:.2}",
        Debt::total_minimums(&debts)
    );
    Ok(())
}

fn cli_add_debt(args: &[String], db: &Database, profile: ProfileId) -> Result<()> {
    let (lender, positional) = split_lender(args)?;
    let [name, balance, rate, minimum] = positional.as_slice() else {
        anyhow::bail!("Usage: debtui add-debt <name> <balance> <rate> <minimum> [--lender <name>]");
    };

    let input = DebtInput::new(
        name.to_string(),
        money_arg(balance, "balance")?,
        amount_arg(rate, "rate")?,
        money_arg(minimum, "minimum payment")?,
    )
    .with_lender(lender);
    input.validate()?;

    let debt = db.insert_debt(profile, &input)?;
    println!("Added debt '{}' (ID {})", debt.name, debt.id);
    Ok(())
}

fn cli_update_debt(args: &[String], db: &Database, profile: ProfileId) -> Result<()> {
    let (lender, positional) = split_lender(args)?;
    let [id, balance, rate, minimum] = positional.as_slice() else {
        anyhow::bail!(
            "Usage: debtui update-debt <id> <balance> <rate> <minimum> [--lender <name>]"
        );
    };
    let id = id_arg(id)?;

    let mut update = DebtUpdate::new(
        money_arg(balance, "balance")?,
        amount_arg(rate, "rate")?,
        money_arg(minimum, "minimum payment")?,
    );
    update.lender = lender;
    update.validate()?;

    if !db.update_debt(profile, id, &update)? {
        anyhow::bail!("Debt ID {id} not found");
    }
    println!("Updated debt ID {id}");
    Ok(())
}

fn cli_remove_debt(args: &[String], db: &Database, profile: ProfileId) -> Result<()> {
    let Some(id) = args.first() else {
        anyhow::bail!("Usage: debtui remove-debt <id>");
    };
    let id = id_arg(id)?;

    let name = db
        .get_debt_by_id(profile, id)?
        .map(|d| d.name)
        .ok_or_else(|| anyhow::anyhow!("Debt ID {id} not found"))?;
    db.delete_debt(profile, id)?;
    println!("Removed debt '{name}'");
    Ok(())
}

/// Pull `--lender <name>` out of the argument list. An explicit empty name is
/// kept so updates can clear the lender.
fn split_lender(args: &[String]) -> Result<(Option<String>, Vec<&str>)> {
    let mut lender = None;
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--lender" {
            let value = iter
                .next()
                .ok_or_else(|| anyhow::anyhow!("Missing value for --lender"))?;
            lender = Some(value.trim().to_string());
        } else {
            positional.push(arg.as_str());
        }
    }
    Ok((lender, positional))
}

fn amount_arg(raw: &str, what: &str) -> Result<Decimal> {
    parse_amount(raw).ok_or_else(|| anyhow::anyhow!("Invalid {what}: {raw}"))
}

/// A currency figure, rounded to cents.
fn money_arg(raw: &str, what: &str) -> Result<Decimal> {
    amount_arg(raw, what).map(round2)
}

fn id_arg(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| anyhow::anyhow!("Invalid debt ID: {raw}"))
}

// ── Budgets ───────────────────────────────────────────────────

fn cli_categories(db: &Database) -> Result<()> {
    for cat in db.get_categories()? {
        println!("  {cat}");
    }
    Ok(())
}

fn cli_add_category(args: &[String], db: &Database) -> Result<()> {
    let name = args.join(" ").trim().to_string();
    if name.is_empty() {
        anyhow::bail!("Usage: debtui add-category <name>");
    }
    if let Some(existing) = Category::find_by_name(&db.get_categories()?, &name) {
        anyhow::bail!("Category '{}' already exists", existing.name);
    }
    db.insert_category(&Category::new(name.clone()))?;
    info!(category = %name, "category created");
    println!("Created category: {name}");
    Ok(())
}

fn cli_budgets(db: &Database, profile: ProfileId) -> Result<()> {
    let entries = db.get_budget_entries(profile)?;
    if entries.is_empty() {
        println!("No budget limits set");
        return Ok(());
    }

    for entry in &entries {
        println!("  {:<24} ${:>10.2}", entry.category_name, entry.monthly_limit);
    }
    println!("{}", "─".repeat(38));
    println!(
        "  {:<24} ${:>10.2}",
        "Total",
        db.total_budgeted_expenses(profile)?
    );
    Ok(())
}

fn cli_budget(args: &[String], db: &Database, profile: ProfileId) -> Result<()> {
    // Last token is the amount, everything before is the category name
    let Some((amount, name_parts)) = args.split_last().filter(|(_, rest)| !rest.is_empty()) else {
        anyhow::bail!("Usage: debtui budget <category> <amount>");
    };
    let category_name = name_parts.join(" ");
    let limit = money_arg(amount, "amount")?;

    let categories = db.get_categories()?;
    let cat = Category::find_by_name(&categories, &category_name)
        .ok_or_else(|| anyhow::anyhow!("Category '{category_name}' not found"))?;
    let cat_id = cat
        .id
        .ok_or_else(|| anyhow::anyhow!("Category has no ID"))?;

    let stored = db.upsert_budget(profile, cat_id, limit)?;
    println!("Budget set: {} = ${stored:.2}/month", cat.name);
    Ok(())
}

fn cli_remove_budget(args: &[String], db: &Database, profile: ProfileId) -> Result<()> {
    if args.is_empty() {
        anyhow::bail!("Usage: debtui remove-budget <category>");
    }
    let category_name = args.join(" ");
    let entries = db.get_budget_entries(profile)?;
    let entry = entries
        .iter()
        .find(|b| b.category_name.to_lowercase() == category_name.to_lowercase())
        .ok_or_else(|| anyhow::anyhow!("No budget set for '{category_name}'"))?;
    let id = entry
        .id
        .ok_or_else(|| anyhow::anyhow!("Budget has no ID"))?;

    db.delete_budget(profile, id)?;
    println!("Removed budget for {}", entry.category_name);
    Ok(())
}

// ── Payoff ────────────────────────────────────────────────────

fn cli_afford(args: &[String], db: &Database, profile: ProfileId) -> Result<()> {
    let income = match args.first() {
        Some(raw) => money_arg(raw, "income")?,
        None => db
            .get_decimal_setting(profile, SETTING_INCOME)?
            .ok_or_else(|| anyhow::anyhow!("Usage: debtui afford <income> (no stored income yet)"))?,
    };
    if income < Decimal::ZERO {
        anyhow::bail!("Income cannot be negative");
    }
    db.set_setting(profile, SETTING_INCOME, &income.to_string())?;

    let entries = db.get_budget_entries(profile)?;
    let result = check_affordability(
        income,
        db.total_budgeted_expenses(profile)?,
        &entries,
        db.total_minimum_debt_payments(profile)?,
    );

    println!("Debt Strategy Affordability Check");
    println!("{}", "─".repeat(40));
    println!(
        "Total Budgeted Expenses:        ${:.2}",
        result.total_budgeted_expenses
    );
    if result.overlapping.is_empty() {
        println!("No budget categories overlap with minimum debt payments");
    } else {
        let names: Vec<&str> = result.overlapping.iter().map(|(n, _)| n.as_str()).collect();
        println!("Overlapping debt categories:    {}", names.join(", "));
        println!("Overlap removed from budget:   -${:.2}", result.overlap_total);
    }
    println!("{}", "─".repeat(40));
    println!("Estimated Monthly Income:       ${:.2}", result.estimated_income);
    println!(
        "Adjusted Budgeted Expenses:    -${:.2}",
        result.adjusted_budgeted_expenses
    );
    println!(
        "Total Minimum Debt Payments:   -${:.2}",
        result.total_minimum_debt_payments
    );
    println!("{}", "─".repeat(40));
    println!("Estimated Surplus/Deficit:      ${:.2}", result.surplus);
    println!();
    if result.has_surplus() {
        println!(
            "You could put up to ${:.2} extra toward debt each month.",
            result.surplus
        );
    } else {
        println!("No surplus. Review income or budget limits before planning extra payments.");
    }
    Ok(())
}

fn cli_plan(args: &[String], db: &Database, profile: ProfileId) -> Result<()> {
    let Some(raw) = args.first() else {
        anyhow::bail!("Usage: debtui plan <payment>");
    };
    let payment = money_arg(raw, "payment")?;

    let debts = db.get_debts(profile)?;
    if debts.is_empty() {
        println!("No debts entered yet");
        return Ok(());
    }

    println!(
        "Total Minimum Monthly Payment: ${:.2}",
        Debt::total_minimums(&debts)
    );
    for &strategy in Strategy::all() {
        let preview = strategy_preview(&debts, strategy, payment)?;
        if strategy == Strategy::Snowball {
            println!("Extra payment available: ${:.2}", preview.extra);
        }
        print_preview(&preview);
    }
    db.set_setting(profile, SETTING_MONTHLY_PAYMENT, &payment.to_string())?;
    Ok(())
}

fn print_preview(preview: &StrategyPreview) {
    let heading = match preview.strategy {
        Strategy::Snowball => "SNOWBALL (Lowest Balance First)",
        Strategy::Avalanche => "AVALANCHE (Highest Interest Rate First)",
    };
    println!();
    println!("{heading}");
    println!(
        "{:<25} | {:>13} | {:>7} | {:>13} | Action",
        "Name", "Balance", "Rate %", "Min Payment"
    );
    println!("{}", "─".repeat(80));
    for row in &preview.rows {
        let action = if row.receives_extra {
            format!("-> PAY ${:.2} (Min + Extra)", row.payment)
        } else {
            format!("-> Pay ${:.2} (Minimum)", row.payment)
        };
        println!(
            "{:<25} | {:>13} | {:>6.2}% | {:>13} | {action}",
            row.debt.name,
            format!("${:.2}", row.debt.current_balance),
            row.debt.interest_rate,
            format!("${:.2}", row.debt.minimum_payment),
        );
    }
    println!("{}", "─".repeat(80));
}

fn cli_simulate(
    args: &[String],
    db: &Database,
    profile: ProfileId,
    config: &Config,
) -> Result<()> {
    let details = args.iter().any(|a| a == "--details");
    let positional: Vec<&String> = args.iter().filter(|a| *a != "--details").collect();
    let [strategy, payment] = positional.as_slice() else {
        anyhow::bail!("Usage: debtui simulate <snowball|avalanche> <payment> [--details]");
    };
    let strategy: Strategy = strategy.parse()?;
    let payment = money_arg(payment, "payment")?;

    let debts = db.get_debts(profile)?;
    info!(profile = %profile, strategy = strategy.as_str(), %payment, debts = debts.len(), "simulating payoff");

    let plan = match simulate_payoff(&debts, strategy, payment) {
        Ok(Some(plan)) => plan,
        Ok(None) => {
            println!("No debts to simulate");
            return Ok(());
        }
        Err(e) => {
            warn!(error = %e, "simulation failed");
            return Err(e.into());
        }
    };
    info!(months = plan.summary.total_months, interest = %plan.summary.total_interest, "simulation finished");

    db.set_setting(profile, SETTING_STRATEGY, strategy.as_str())?;
    db.set_setting(profile, SETTING_MONTHLY_PAYMENT, &payment.to_string())?;

    let report = PayoffReport::build(&plan, &debts, config.max_display_months);
    print!("{}", render_text(&report, details));
    Ok(())
}
