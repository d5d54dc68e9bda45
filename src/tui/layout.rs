//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Gauge, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap,
};

use super::runtime::App;
use super::style;
use crate::grid::metrics::RiskPrediction;
use crate::grid::upload::UploadStatus;
use crate::view::{AlertLine, DeviceGauge, MetricCard, PageView, Route};

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // tabs
            Constraint::Min(8),    // page
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);
    render_page(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

/// Navigation bar with the active route highlighted.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Route::ALL
        .iter()
        .enumerate()
        .map(|(i, r)| Line::from(format!("{}:{}", i + 1, r.title())))
        .collect();
    let snapshot = app.snapshot();
    let title = format!(
        " GRIDWATCH │ {} readings │ gen {} ",
        snapshot.dataset.len(),
        snapshot.generation
    );
    let tabs = Tabs::new(titles)
        .block(Block::default().title(title).borders(Borders::ALL))
        .select(app.route.index())
        .style(Style::default().fg(style::HEADER_FG))
        .highlight_style(
            Style::default()
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_page(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", app.route.heading()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.page() {
        PageView::NoData { message, .. } => {
            let notice = Paragraph::new(Span::styled(message, Style::default().fg(style::INFO)))
                .wrap(Wrap { trim: true });
            frame.render_widget(notice, inner);
        }
        PageView::Overview { cards } => render_cards(frame, &cards, inner),
        PageView::Devices { devices } => render_devices(frame, &devices, inner),
        PageView::Analytics { predictions } => render_predictions(frame, &predictions, inner),
        PageView::Alerts { alerts, notice } => {
            render_alerts(frame, &alerts, notice, app.selected_alert, inner);
        }
        PageView::Data {
            upload,
            hint,
            rows_loaded,
        } => render_data(frame, app, &upload, hint, rows_loaded, inner),
    }
}

/// Four metric cards side by side, bordered in their severity color.
fn render_cards(frame: &mut Frame, cards: &[MetricCard], area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)]);

    for (card, column) in cards.iter().zip(columns.iter()) {
        let color = style::variant_color(card.variant);
        let value = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                card.value.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(format!(" {} ", card.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        frame.render_widget(value, rows.split(*column)[0]);
    }
}

/// One load gauge per device.
fn render_devices(frame: &mut Frame, devices: &[DeviceGauge], area: Rect) {
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            devices
                .iter()
                .map(|_| Constraint::Length(3))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(area);

    for (device, slot) in devices.iter().zip(slots.iter()) {
        let state_color = style::variant_color(device.variant);
        let gauge_color = if device.over_capacity {
            style::variant_color("danger")
        } else {
            style::GAUGE_PRIMARY
        };
        let title = Line::from(vec![
            Span::raw(format!(" {} ", device.name)),
            Span::styled(
                format!("[{:?}] ", device.state),
                Style::default().fg(state_color).add_modifier(Modifier::BOLD),
            ),
        ]);
        let gauge = Gauge::default()
            .block(Block::default().title(title).borders(Borders::ALL))
            .gauge_style(Style::default().fg(gauge_color))
            .ratio(device.ratio)
            .label(device.label.clone());
        frame.render_widget(gauge, *slot);
    }
}

/// Risk table: area, level, forecast and recommended action.
fn render_predictions(frame: &mut Frame, predictions: &[RiskPrediction], area: Rect) {
    let header = Row::new(["Area", "Risk Level", "Forecast", "Recommended Action"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = predictions.iter().map(|p| {
        Row::new([
            Cell::from(p.area),
            Cell::from(Span::styled(
                format!("{:?}", p.risk),
                Style::default().fg(style::variant_color(p.risk.variant())),
            )),
            Cell::from(p.forecast),
            Cell::from(p.action),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Percentage(40),
            Constraint::Percentage(40),
        ],
    )
    .header(header)
    .column_spacing(2);
    frame.render_widget(table, area);
}

/// Alert list; acknowledged entries are struck through.
fn render_alerts(
    frame: &mut Frame,
    alerts: &[AlertLine],
    notice: Option<&str>,
    selected: usize,
    area: Rect,
) {
    if let Some(notice) = notice {
        let ok = Paragraph::new(Span::styled(
            notice,
            Style::default().fg(style::variant_color("success")),
        ));
        frame.render_widget(ok, area);
        return;
    }

    let items: Vec<ListItem> = alerts
        .iter()
        .map(|a| {
            let line_style = if a.acknowledged {
                Style::default()
                    .fg(style::MUTED)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(style::variant_color("danger"))
            };
            ListItem::new(Line::from(Span::styled(a.message.clone(), line_style)))
        })
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Path input, progress bar and outcome of the last upload.
fn render_data(
    frame: &mut Frame,
    app: &App,
    upload: &UploadStatus,
    hint: Option<&str>,
    rows_loaded: usize,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // path
            Constraint::Length(3), // progress
            Constraint::Min(1),    // message
        ])
        .split(area);

    let (path_text, path_style) = match &app.input {
        Some(input) => (
            format!("{input}_"),
            Style::default().fg(style::HEADER_FG),
        ),
        None => (
            app.last_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "press e to choose a CSV file".to_string()),
            Style::default().fg(style::FOOTER_FG),
        ),
    };
    let path = Paragraph::new(Span::styled(path_text, path_style))
        .block(Block::default().title(" CSV file ").borders(Borders::ALL));
    frame.render_widget(path, chunks[0]);

    if let UploadStatus::Parsing { .. } = upload {
        let progress = Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(style::GAUGE_PRIMARY))
            .ratio(1.0)
            .label(hint.unwrap_or_default());
        frame.render_widget(progress, chunks[1]);
    }

    let mut lines = Vec::new();
    match upload {
        UploadStatus::Failed { message, .. } => lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(style::variant_color("danger")),
        ))),
        UploadStatus::Loaded { file_name, rows } => lines.push(Line::from(Span::styled(
            format!("Loaded {rows} readings from {file_name}"),
            Style::default().fg(style::variant_color("success")),
        ))),
        UploadStatus::Idle => {
            if let Some(hint) = hint {
                lines.push(Line::from(hint));
            }
        }
        UploadStatus::Parsing { .. } => {}
    }
    lines.push(Line::from(format!("Readings loaded: {rows_loaded}")));
    let message = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(message, chunks[2]);
}

/// Footer with keybinding hints for the active page.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match (app.route, app.input.is_some()) {
        (Route::Data, true) => " Enter:Upload  Esc:Cancel  Backspace:Delete",
        (Route::Data, false) => " q:Quit  1-5/Tab:Page  e:Choose file  r:Reload",
        (Route::Alerts, _) => " q:Quit  1-5/Tab:Page  j/k:Select  a:Acknowledge  r:Reload",
        _ => " q:Quit  1-5/Tab:Page  r:Reload",
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hints,
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
