use chrono::Datelike;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::panel;
use crate::chart::PaymentMethodChart;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_signed, truncate};

const CHART_HEIGHT: u16 = 12;

/// Table rows that fit under the filter line and chart, for paging.
pub(crate) fn table_rows(content_height: u16) -> usize {
    // Filter line, chart, table borders and header.
    content_height.saturating_sub(1 + CHART_HEIGHT + 3) as usize
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(CHART_HEIGHT),
            Constraint::Min(4),
        ])
        .split(area);

    render_filters(f, chunks[0], app);
    match app.chart.as_ref() {
        Some(chart) => render_chart(f, chunks[1], chart),
        None => f.render_widget(panel("Daily Expenses"), chunks[1]),
    }
    render_table(f, chunks[2], app);
}

fn render_filters(f: &mut Frame, area: Rect, app: &App) {
    let filters = &app.filters;
    let mut spans = vec![
        Span::styled(" Range ", theme::dim_style()),
        Span::styled(filters.range.to_string(), theme::normal_style()),
        Span::styled(format!(" ({} days)", filters.range.len_days()), theme::dim_style()),
    ];

    if !filters.payment_methods.is_empty() {
        let methods: Vec<&str> = filters.payment_methods.iter().map(|m| m.label()).collect();
        spans.push(Span::styled("  Methods ", theme::dim_style()));
        spans.push(Span::styled(methods.join(", "), theme::normal_style()));
    }
    if !filters.category_ids.is_empty() {
        let names: Vec<String> = filters
            .category_ids
            .iter()
            .map(|id| {
                app.category_name(Some(id))
                    .map_or_else(|| id.to_string(), str::to_string)
            })
            .collect();
        spans.push(Span::styled("  Categories ", theme::dim_style()));
        spans.push(Span::styled(names.join(", "), theme::normal_style()));
    }
    if let Some(search) = &filters.search {
        spans.push(Span::styled("  Search ", theme::dim_style()));
        spans.push(Span::styled(
            format!("'{search}'"),
            Style::default().fg(theme::YELLOW),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_chart(f: &mut Frame, area: Rect, chart: &PaymentMethodChart) {
    let title = "Daily Expenses by Payment Method";
    if chart.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No expenses in this range", theme::dim_style())),
        ])
        .centered()
        .block(panel(title));
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    // Methods with nothing spent in the range would only widen the groups.
    let active: Vec<_> = chart
        .series
        .iter()
        .filter(|s| chart.series_total(&s.method) > Decimal::ZERO)
        .collect();

    let mut bar_chart = BarChart::default()
        .block(panel(title))
        .bar_width(1)
        .bar_gap(0)
        .group_gap(1);

    for (i, day) in chart.days.iter().enumerate() {
        let bars: Vec<Bar> = active
            .iter()
            .map(|s| {
                let cents = s.values.get(i).map_or(0, |v| bar_value(*v));
                Bar::default()
                    .value(cents)
                    .text_value(String::new())
                    .style(Style::default().fg(theme::method_color(&s.method)))
            })
            .collect();
        bar_chart = bar_chart.data(
            BarGroup::default()
                .label(Line::from(day.day().to_string()))
                .bars(&bars),
        );
    }
    f.render_widget(bar_chart, chunks[0]);

    let mut legend = vec![Span::raw(" ")];
    for s in &active {
        legend.push(Span::styled(
            "■ ",
            Style::default().fg(theme::method_color(&s.method)),
        ));
        legend.push(Span::styled(
            format!("{} {}   ", s.method.label(), format_amount(chart.series_total(&s.method))),
            theme::dim_style(),
        ));
    }
    legend.push(Span::styled(
        format!("peak day {}", format_amount(chart.max_day_total())),
        theme::dim_style(),
    ));
    f.render_widget(Paragraph::new(Line::from(legend)), chunks[1]);
}

/// Bar height in cents, capped so the chart's own scaling arithmetic stays in range.
pub(crate) fn bar_value(amount: Decimal) -> u64 {
    const CAP: u64 = u32::MAX as u64;
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map_or(CAP, |cents| cents.to_u64().unwrap_or(0).min(CAP))
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("Transactions ({})", app.transactions.len());

    if app.transactions.is_empty() {
        let hint = if app.filters.is_filtered() {
            "Nothing matches the current filters. Press c or :clear to reset"
        } else {
            "Add one with :add-txn or import a CSV with :import"
        };
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No transactions", theme::dim_style())),
            Line::from(Span::styled(hint, theme::dim_style())),
        ])
        .centered()
        .block(panel(title));
        f.render_widget(msg, area);
        return;
    }

    let header = Row::new(
        ["Date", "Description", "Category", "Method", "Amount"]
            .into_iter()
            .map(|h| Cell::from(h).style(theme::header_style())),
    );

    let rows: Vec<Row> = app
        .transactions
        .iter()
        .enumerate()
        .skip(app.transaction_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, txn)| {
            let style = if i == app.transaction_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let amount_style = if txn.is_income() {
                theme::income_style()
            } else if txn.is_expense() {
                theme::expense_style()
            } else {
                theme::dim_style()
            };

            Row::new(vec![
                Cell::from(format!(" {}", txn.transaction_date)),
                Cell::from(truncate(&txn.description, 40)),
                Cell::from(app.category_name(txn.category_id.as_ref()).unwrap_or("—")),
                Cell::from(Span::styled(
                    txn.payment_method.label().to_string(),
                    Style::default().fg(theme::method_color(&txn.payment_method)),
                )),
                Cell::from(Span::styled(format_signed(txn), amount_style)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(18),
        Constraint::Length(13),
        Constraint::Length(15),
    ];

    f.render_widget(
        Table::new(rows, widths).header(header).block(panel(title)),
        area,
    );
}
