use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.debts.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("No debts entered yet", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Add one with :debt <name> <balance> <rate> <minimum>",
                theme::dim_style(),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                " Debts (0) ",
                theme::title_style(),
            ));
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["Name", "Lender", "Balance", "Rate", "Minimum", "Updated"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .debts
        .iter()
        .enumerate()
        .skip(app.debt_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, debt)| {
            let style = if i == app.debt_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            Row::new(vec![
                Cell::from(truncate(&debt.name, 30)),
                Cell::from(truncate(debt.lender_label(), 18)),
                Cell::from(Span::styled(
                    format_amount(debt.current_balance),
                    theme::debt_style(),
                )),
                Cell::from(format!("{:.2}%", debt.interest_rate)),
                Cell::from(format_amount(debt.minimum_payment)),
                Cell::from(debt.last_updated.to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(18),
        Constraint::Length(14),
        Constraint::Length(9),
        Constraint::Length(12),
        Constraint::Length(11),
    ];

    let total_balance: rust_decimal::Decimal =
        app.debts.iter().map(|d| d.current_balance).sum();

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(
                    " Debts ({}) | owed {} | minimums {}/month ",
                    app.debts.len(),
                    format_amount(total_balance),
                    format_amount(app.total_minimums()),
                ),
                theme::title_style(),
            )),
    );

    f.render_widget(table, area);
}
