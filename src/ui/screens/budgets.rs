use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::BudgetEntry;
use crate::payoff::{is_debt_overlap_category, AffordabilityResult};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    if app.budgets.is_empty() {
        render_empty(f, chunks[0]);
    } else {
        render_list(f, chunks[0], app);
    }
    render_affordability(f, chunks[1], app);
}

fn render_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .budgets
        .iter()
        .enumerate()
        .skip(app.budget_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, budget)| {
            let style = if i == app.budget_index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let overlap = is_debt_overlap_category(&budget.category_name);
            let marker = if overlap { "*" } else { " " };
            let display_name = truncate(&budget.category_name, 23);

            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker}{display_name:<24}"), style),
                Span::styled(
                    format!("{:>14}", format_amount(budget.monthly_limit)),
                    if overlap {
                        theme::dim_style()
                    } else {
                        Style::default().fg(theme::YELLOW)
                    },
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(
                    " Monthly Budgets | total {} | * counted as debt ",
                    format_amount(BudgetEntry::total(&app.budgets))
                ),
                theme::title_style(),
            )),
    );
    f.render_widget(list, area);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No budget limits set", theme::dim_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Use :budget <category> <amount> to set a monthly limit",
            theme::dim_style(),
        )),
    ])
    .centered()
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                " Monthly Budgets ",
                theme::title_style(),
            )),
    );
    f.render_widget(msg, area);
}

fn render_affordability(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            " Affordability ",
            theme::title_style(),
        ));

    let Some(result) = &app.affordability else {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No income estimate yet", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Use :income <amount> to check your monthly surplus",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    };

    f.render_widget(Paragraph::new(breakdown_lines(result)).block(block), area);
}

fn breakdown_lines(result: &AffordabilityResult) -> Vec<Line<'static>> {
    let row = |label: &str, value: String, style: Style| {
        Line::from(vec![
            Span::styled(format!("  {label:<26}"), theme::dim_style()),
            Span::styled(format!("{value:>14}"), style),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        row(
            "Estimated income",
            format_amount(result.estimated_income),
            theme::surplus_style(),
        ),
        row(
            "Budgeted expenses",
            format_amount(result.total_budgeted_expenses),
            theme::normal_style(),
        ),
    ];
    if !result.overlapping.is_empty() {
        lines.push(row(
            "Less debt categories",
            format!("-{}", format_amount(result.overlap_total)),
            theme::dim_style(),
        ));
    }
    lines.push(row(
        "Adjusted expenses",
        format!("-{}", format_amount(result.adjusted_budgeted_expenses)),
        theme::debt_style(),
    ));
    lines.push(row(
        "Minimum debt payments",
        format!("-{}", format_amount(result.total_minimum_debt_payments)),
        theme::debt_style(),
    ));
    lines.push(Line::from(Span::styled(
        format!("  {}", "─".repeat(40)),
        theme::dim_style(),
    )));

    let (label, style) = if result.has_surplus() {
        ("Surplus", theme::surplus_style().add_modifier(Modifier::BOLD))
    } else {
        ("Deficit", theme::debt_style().add_modifier(Modifier::BOLD))
    };
    lines.push(row(label, format_amount(result.surplus), style));
    lines.push(Line::from(""));
    let verdict = if result.has_surplus() {
        format!(
            "  Up to {} could go toward debt each month.",
            format_amount(result.surplus)
        )
    } else {
        "  No room for extra payments. Review income or budgets.".to_string()
    };
    lines.push(Line::from(Span::styled(verdict, theme::normal_style())));
    lines
}
