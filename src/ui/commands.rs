use std::collections::HashMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use tracing::info;

use super::app::{App, PendingAction, Screen};
use crate::db::Database;
use crate::models::{parse_amount, Category, DebtInput, DebtUpdate};
use crate::payoff::Strategy;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit DebTUI", cmd_quit, r);
    register_command!("quit", "Quit DebTUI", cmd_quit, r);
    register_command!("d", "Go to Debts", cmd_debts, r);
    register_command!("debts", "Go to Debts", cmd_debts, r);
    register_command!("p", "Go to Payoff", cmd_payoff, r);
    register_command!("payoff", "Go to Payoff", cmd_payoff, r);
    register_command!("b", "Go to Budgets", cmd_budgets, r);
    register_command!("budgets", "Go to Budgets", cmd_budgets, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "debt",
        "Add debt (e.g. :debt Visa 2500 19.99 75)",
        cmd_debt,
        r
    );
    register_command!(
        "update",
        "Update selected debt (e.g. :update 2400 19.99 75)",
        cmd_update,
        r
    );
    register_command!(
        "lender",
        "Set lender of selected debt (empty clears)",
        cmd_lender,
        r
    );
    register_command!(
        "delete-debt",
        "Delete selected debt",
        cmd_delete_debt,
        r
    );
    register_command!(
        "pay",
        "Set total monthly payment (e.g. :pay 650)",
        cmd_pay,
        r
    );
    register_command!(
        "strategy",
        "Set strategy (snowball or avalanche; no argument toggles)",
        cmd_strategy,
        r
    );
    register_command!(
        "budget",
        "Set budget (e.g. :budget Groceries 450)",
        cmd_budget,
        r
    );
    register_command!(
        "category",
        "Create a budget category (e.g. :category Hobbies)",
        cmd_category,
        r
    );
    register_command!(
        "delete-budget",
        "Delete selected budget",
        cmd_delete_budget,
        r
    );
    register_command!(
        "income",
        "Set estimated monthly income (e.g. :income 4200)",
        cmd_income,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        // Try fuzzy match
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

pub(crate) fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_debts(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Debts;
    app.refresh_debts(db)?;
    Ok(())
}

fn cmd_payoff(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Payoff;
    app.refresh_payoff();
    Ok(())
}

fn cmd_budgets(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Budgets;
    app.refresh_budgets(db)?;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_debt(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    const USAGE: &str = "Usage: :debt <name> <balance> <rate> <minimum>";

    // Last three tokens are figures, everything before is the name
    let parts: Vec<&str> = args.rsplitn(4, ' ').collect();
    let [minimum, rate, balance, name] = parts.as_slice() else {
        app.set_status(USAGE);
        return Ok(());
    };
    let (Some(balance), Some(rate), Some(minimum)) =
        (parse_amount(balance), parse_amount(rate), parse_amount(minimum))
    else {
        app.set_status(USAGE);
        return Ok(());
    };

    let input = DebtInput::new(name.trim().to_string(), balance, rate, minimum);
    if let Err(e) = input.validate() {
        app.set_status(e.to_string());
        return Ok(());
    }

    match db.insert_debt(app.profile, &input) {
        Ok(debt) => {
            app.refresh_debts(db)?;
            if let Some(idx) = app.debts.iter().position(|d| d.id == debt.id) {
                app.debt_index = idx;
            }
            app.screen = Screen::Debts;
            app.set_status(format!("Added debt: {}", debt.name));
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

fn cmd_update(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    const USAGE: &str = "Usage: :update <balance> <rate> <minimum>";

    let Some(debt) = app.selected_debt().cloned() else {
        app.set_status("Select a debt on the Debts tab first");
        return Ok(());
    };
    let figures: Vec<Decimal> = args.split_whitespace().filter_map(parse_amount).collect();
    let [balance, rate, minimum] = figures.as_slice() else {
        app.set_status(USAGE);
        return Ok(());
    };
    if figures.len() != args.split_whitespace().count() {
        app.set_status(USAGE);
        return Ok(());
    }

    let update = DebtUpdate::new(*balance, *rate, *minimum);
    if let Err(e) = update.validate() {
        app.set_status(e.to_string());
        return Ok(());
    }

    if db.update_debt(app.profile, debt.id, &update)? {
        app.refresh_debts(db)?;
        app.set_status(format!("Updated: {}", debt.name));
    } else {
        app.set_status(format!("Debt '{}' no longer exists", debt.name));
    }
    Ok(())
}

fn cmd_lender(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(debt) = app.selected_debt().cloned() else {
        app.set_status("Select a debt on the Debts tab first");
        return Ok(());
    };

    let mut update = DebtUpdate::new(
        debt.current_balance,
        debt.interest_rate,
        debt.minimum_payment,
    );
    update.lender = Some(args.to_string());
    db.update_debt(app.profile, debt.id, &update)?;
    app.refresh_debts(db)?;
    if args.is_empty() {
        app.set_status(format!("Cleared lender for {}", debt.name));
    } else {
        app.set_status(format!("Lender for {} set to {args}", debt.name));
    }
    Ok(())
}

fn cmd_delete_debt(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Debts {
        app.set_status("Navigate to Debts and select one first");
        return Ok(());
    }
    let action = app.selected_debt().map(|d| PendingAction::DeleteDebt {
        id: d.id,
        name: d.name.clone(),
    });
    match action {
        Some(action) => app.confirm(action),
        None => app.set_status("No debt selected"),
    }
    Ok(())
}

fn cmd_pay(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(amount) = parse_amount(args) else {
        app.set_status(format!(
            "Usage: :pay <amount>. Minimums total ${:.2}",
            app.total_minimums()
        ));
        return Ok(());
    };
    if amount < Decimal::ZERO {
        app.set_status("Payment cannot be negative");
        return Ok(());
    }

    let stored = app.set_monthly_payment(db, amount)?;
    app.screen = Screen::Payoff;
    match app.payoff_error.as_ref().map(ToString::to_string) {
        Some(msg) => app.set_status(msg),
        None => app.set_status(format!("Monthly payment set to ${stored:.2}")),
    }
    Ok(())
}

fn cmd_strategy(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let strategy = if args.is_empty() {
        app.strategy.toggle()
    } else {
        match args.parse::<Strategy>() {
            Ok(s) => s,
            Err(e) => {
                app.set_status(e.to_string());
                return Ok(());
            }
        }
    };

    app.set_strategy(db, strategy)?;
    app.screen = Screen::Payoff;
    info!(strategy = strategy.as_str(), "strategy changed");
    app.set_status(format!("Strategy: {strategy}"));
    Ok(())
}

fn cmd_budget(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :budget <category_name> <amount>. Example: :budget Groceries 450");
        return Ok(());
    }

    // Last token is the amount, everything before is the category name
    let parts: Vec<&str> = args.rsplitn(2, ' ').collect();
    if parts.len() < 2 {
        app.set_status("Usage: :budget <category_name> <amount>");
        return Ok(());
    }

    let amount_str = parts[0];
    let category_name = parts[1].trim();

    let Some(amount) = parse_amount(amount_str) else {
        app.set_status(format!("Invalid amount: {amount_str}"));
        return Ok(());
    };

    let found = Category::find_by_name(&app.categories, category_name).map(|c| (c.id, c.name.clone()));
    if let Some((id, name)) = found {
        let Some(cat_id) = id else {
            app.set_status("Category has no ID (this shouldn't happen)");
            return Ok(());
        };
        let stored = db.upsert_budget(app.profile, cat_id, amount)?;
        app.refresh_budgets(db)?;
        app.screen = Screen::Budgets;
        app.set_status(format!("Budget set: {name} = ${stored:.2}/month"));
    } else {
        app.set_status(format!("Category '{category_name}' not found"));
    }

    Ok(())
}

fn cmd_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :category <name>");
        return Ok(());
    }
    if let Some(existing) = Category::find_by_name(&app.categories, args) {
        let msg = format!("Category '{}' already exists", existing.name);
        app.set_status(msg);
        return Ok(());
    }
    db.insert_category(&Category::new(args.to_string()))?;
    app.categories = db.get_categories()?;
    app.set_status(format!("Created category: {args}"));
    Ok(())
}

fn cmd_delete_budget(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Budgets {
        app.set_status("Navigate to Budgets and select one first");
        return Ok(());
    }
    let action = app.selected_budget().and_then(|b| {
        b.id.map(|id| PendingAction::DeleteBudget {
            id,
            name: b.category_name.clone(),
        })
    });
    match action {
        Some(action) => app.confirm(action),
        None => app.set_status("No budget selected"),
    }
    Ok(())
}

fn cmd_income(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    match parse_amount(args) {
        Some(income) if income >= Decimal::ZERO => {
            let income = app.set_income(db, income)?;
            app.screen = Screen::Budgets;
            let surplus = app.affordability.as_ref().map(|a| a.surplus);
            match surplus {
                Some(s) => app.set_status(format!("Income ${income:.2}. Surplus: ${s:.2}")),
                None => app.set_status(format!("Income ${income:.2}")),
            }
        }
        _ => app.set_status("Usage: :income <monthly amount>"),
    }
    Ok(())
}
