use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::payoff::{PayoffError, PayoffReport, StrategyPreview};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_duration, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.debts.is_empty() {
        render_message(
            f,
            area,
            " Payoff ",
            vec![
                Line::from(Span::styled("No debts to plan", theme::dim_style())),
                Line::from(""),
                Line::from(Span::styled(
                    "Add debts on the Debts tab, then set a payment with :pay <amount>",
                    theme::dim_style(),
                )),
            ],
        );
        return;
    }

    if let Some(err) = &app.payoff_error {
        render_error(f, area, app, err);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Summary cards
            Constraint::Min(5),    // Order + schedule
        ])
        .split(area);

    if let Some(report) = &app.report {
        render_summary_cards(f, chunks[0], report);
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    if let Some(preview) = &app.preview {
        render_preview(f, body[0], preview);
    }
    if let Some(report) = &app.report {
        render_schedule(f, body[1], app, report);
    }
}

fn render_summary_cards(f: &mut Frame, area: Rect, report: &PayoffReport) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ])
        .split(area);

    let summary = &report.summary;
    let entries = [
        ("Strategy", report.strategy.title().to_string(), theme::ACCENT),
        (
            "Monthly Payment",
            format_amount(report.monthly_payment),
            theme::TEXT,
        ),
        (
            "Payoff Time",
            format_duration(summary.total_months),
            theme::YELLOW,
        ),
        (
            "Total Interest",
            format_amount(summary.total_interest),
            theme::RED,
        ),
        ("Total Paid", format_amount(summary.total_paid), theme::GREEN),
    ];

    for ((title, value, color), card) in entries.into_iter().zip(cards.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" {title} "),
                theme::title_style(),
            ));
        let text = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        ])
        .centered()
        .block(block);
        f.render_widget(text, *card);
    }
}

fn render_preview(f: &mut Frame, area: Rect, preview: &StrategyPreview) {
    let header = Row::new(
        ["#", "Debt", "Pay This Month"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = preview
        .rows
        .iter()
        .enumerate()
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, row)| {
            let style = if row.receives_extra {
                Style::default()
                    .fg(theme::GREEN)
                    .add_modifier(Modifier::BOLD)
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(truncate(&row.debt.name, 24)),
                Cell::from(format_amount(row.payment)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(12),
        Constraint::Length(15),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(
                    " {} order | extra {} ",
                    preview.strategy,
                    format_amount(preview.extra)
                ),
                theme::title_style(),
            )),
    );
    f.render_widget(table, area);
}

fn render_schedule(f: &mut Frame, area: Rect, app: &App, report: &PayoffReport) {
    let header = Row::new(
        ["Month", "Debt", "Start", "Payment", "End"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let mut lines: Vec<Row> = Vec::with_capacity(app.schedule_line_count());
    for month in &report.months {
        for (i, row) in month.rows.iter().enumerate() {
            let label = if i == 0 {
                month.month.to_string()
            } else {
                String::new()
            };
            let end_style = if row.end_balance.is_zero() {
                theme::surplus_style()
            } else {
                theme::normal_style()
            };
            lines.push(Row::new(vec![
                Cell::from(label),
                Cell::from(truncate(&row.name, 20)),
                Cell::from(format_amount(row.start_balance)),
                Cell::from(format_amount(row.payment)),
                Cell::from(Span::styled(format_amount(row.end_balance), end_style)),
            ]));
        }
        lines.push(
            Row::new(vec![
                Cell::from(""),
                Cell::from("interest"),
                Cell::from(""),
                Cell::from(""),
                Cell::from(format_amount(month.interest)),
            ])
            .style(theme::dim_style()),
        );
    }

    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = lines
        .into_iter()
        .skip(app.schedule_scroll)
        .take(visible)
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Min(12),
        Constraint::Length(13),
        Constraint::Length(12),
        Constraint::Length(13),
    ];

    let title = if report.truncated {
        format!(
            " Schedule (first {} of {} months) ",
            report.months.len(),
            report.summary.total_months
        )
    } else {
        format!(" Schedule ({} months) ", report.summary.total_months)
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                title,
                theme::title_style(),
            )),
    );
    f.render_widget(table, area);
}

fn render_error(f: &mut Frame, area: Rect, app: &App, err: &PayoffError) {
    let hint = match err {
        PayoffError::InsufficientPayment { required, .. } => format!(
            "Set at least {} with :pay <amount>",
            format_amount(*required)
        ),
        PayoffError::NonConvergent { .. } => {
            "Payments barely cover interest. Raise the payment with :pay <amount>".to_string()
        }
        PayoffError::UnknownStrategy(_) => "Use :strategy snowball or :strategy avalanche".into(),
    };
    render_message(
        f,
        area,
        &format!(" Payoff | {} ", app.strategy),
        vec![
            Line::from(Span::styled(
                err.to_string(),
                theme::error_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(hint, theme::dim_style())),
        ],
    );
}

fn render_message(f: &mut Frame, area: Rect, title: &str, mut body: Vec<Line>) {
    body.insert(0, Line::from(""));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            title.to_string(),
            theme::title_style(),
        ));
    f.render_widget(Paragraph::new(body).centered().block(block), area);
}
