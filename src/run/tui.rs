use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{error, info};

use crate::config::Config;
use crate::db::Database;
use crate::models::ProfileId;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up, scroll_view};

pub(crate) fn as_tui(db: &mut Database, profile: ProfileId, config: &Config) -> Result<()> {
    let mut app = App::new(profile, config.profile.clone(), config.max_display_months);
    app.refresh_all(db)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        error!(error = %e, "tui exited with error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Confirm => handle_confirm_input(key, app, db)?,
            }
        }
    }
    info!("tui closed");
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('1') => switch_screen(app, db, Screen::Debts)?,
        KeyCode::Char('2') => switch_screen(app, db, Screen::Payoff)?,
        KeyCode::Char('3') => switch_screen(app, db, Screen::Budgets)?,
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, db, screens[next])?;
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, db, screens[prev])?;
        }
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('s') if app.screen == Screen::Payoff => {
            let next = app.strategy.toggle();
            app.set_strategy(db, next)?;
            app.set_status(format!("Strategy: {next}"));
        }
        KeyCode::Char('D') if app.screen == Screen::Debts => {
            commands::handle_command("delete-debt", app, db)?;
        }
        KeyCode::Char('D') if app.screen == Screen::Budgets => {
            commands::handle_command("delete-budget", app, db)?;
        }
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                execute_pending(action, app, db)?;
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        _ => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
    }
    Ok(())
}

fn execute_pending(action: PendingAction, app: &mut App, db: &mut Database) -> Result<()> {
    match action {
        PendingAction::DeleteDebt { id, name } => {
            if db.delete_debt(app.profile, id)? {
                info!(debt = %name, "debt deleted");
                app.set_status(format!("Deleted debt: {name}"));
            } else {
                app.set_status(format!("Debt '{name}' no longer exists"));
            }
            app.refresh_debts(db)?;
        }
        PendingAction::DeleteBudget { id, name } => {
            if db.delete_budget(app.profile, id)? {
                app.set_status(format!("Deleted budget: {name}"));
            } else {
                app.set_status(format!("Budget for '{name}' no longer exists"));
            }
            app.refresh_budgets(db)?;
        }
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, db: &mut Database, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Debts => app.refresh_debts(db)?,
        Screen::Payoff => app.refresh_payoff(),
        Screen::Budgets => app.refresh_budgets(db)?,
    }
    app.set_status(format!("{screen}"));
    Ok(())
}

fn handle_move_down(app: &mut App) {
    match app.screen {
        Screen::Debts => {
            let page = app.debt_page();
            scroll_down(
                &mut app.debt_index,
                &mut app.debt_scroll,
                app.debts.len(),
                page,
            );
        }
        Screen::Payoff => {
            let (len, page) = (app.schedule_line_count(), app.schedule_page());
            scroll_view(&mut app.schedule_scroll, 1, len, page);
        }
        Screen::Budgets => {
            let page = app.budget_page();
            scroll_down(
                &mut app.budget_index,
                &mut app.budget_scroll,
                app.budgets.len(),
                page,
            );
        }
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Debts => scroll_up(&mut app.debt_index, &mut app.debt_scroll),
        Screen::Payoff => {
            let (len, page) = (app.schedule_line_count(), app.schedule_page());
            scroll_view(&mut app.schedule_scroll, -1, len, page);
        }
        Screen::Budgets => scroll_up(&mut app.budget_index, &mut app.budget_scroll),
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Debts => scroll_to_top(&mut app.debt_index, &mut app.debt_scroll),
        Screen::Payoff => app.schedule_scroll = 0,
        Screen::Budgets => scroll_to_top(&mut app.budget_index, &mut app.budget_scroll),
    }
}

fn handle_goto_bottom(app: &mut App) {
    match app.screen {
        Screen::Debts => {
            let page = app.debt_page();
            scroll_to_bottom(
                &mut app.debt_index,
                &mut app.debt_scroll,
                app.debts.len(),
                page,
            );
        }
        Screen::Payoff => {
            let (len, page) = (app.schedule_line_count(), app.schedule_page());
            scroll_view(&mut app.schedule_scroll, isize::MAX, len, page);
        }
        Screen::Budgets => {
            let page = app.budget_page();
            scroll_to_bottom(
                &mut app.budget_index,
                &mut app.budget_scroll,
                app.budgets.len(),
                page,
            );
        }
    }
}
