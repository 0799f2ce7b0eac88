//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, Paragraph};

use super::runtime::App;
use super::style;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(10),   // chart
            Constraint::Length(3), // charge gauge
            Constraint::Length(5), // status panel
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
    render_charge_gauge(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);
    render_footer(frame, chunks[4]);
}

/// Header bar: preset, policy, step progress, speed, run state.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (state_icon, state_label) = if app.error.is_some() {
        ("✗", "ERROR")
    } else if app.is_finished() {
        ("■", "DONE")
    } else if app.paused {
        ("‖", "PAUSED")
    } else {
        ("▶", "RUNNING")
    };

    let header = Line::from(vec![
        Span::styled(
            " BATTERY-ENV ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            &app.preset_name,
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " │ {} │ t={}/{} │ {}ms │ {} {} ",
            app.policy_name(),
            app.timestep(),
            app.total_steps(),
            app.tick_interval_ms(),
            state_icon,
            state_label,
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Realised rate and stored charge over the episode.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let rate_data: Vec<(f64, f64)> = app
        .history
        .iter()
        .map(|r| (r.step as f64, r.rate))
        .collect();

    let charge_data: Vec<(f64, f64)> = app
        .history
        .iter()
        .map(|r| (r.step as f64, r.new_charge))
        .collect();

    let y_bounds = style::auto_bounds_y(&rate_data, &charge_data);

    let x_lo = rate_data.first().map_or(0.0, |p| p.0);
    let x_hi = rate_data.last().map_or(1.0, |p| p.0).max(x_lo + 1.0);

    let datasets = vec![
        Dataset::default()
            .name("Rate (MW)")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::RATE_COLOR))
            .data(&rate_data),
        Dataset::default()
            .name("Charge (MWh)")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::CHARGE_COLOR))
            .data(&charge_data),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Rate vs Stored Charge ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("step")
                .bounds([x_lo, x_hi])
                .labels(vec![format!("{}", x_lo as u32), format!("{}", x_hi as u32)]),
        )
        .y_axis(
            Axis::default()
                .bounds(y_bounds)
                .labels(vec![
                    format!("{:.2}", y_bounds[0]),
                    format!("{:.2}", y_bounds[1]),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Stored charge as a fraction of capacity.
fn render_charge_gauge(frame: &mut Frame, app: &App, area: Rect) {
    let capacity = app.capacity();
    let charge = app.charge();
    let fraction = if capacity > 0.0 {
        (charge / capacity).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(Block::default().title(" Charge ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(style::charge_color(fraction)))
        .ratio(fraction)
        .label(format!("{charge:.3} / {capacity:.1} MWh"));
    frame.render_widget(gauge, area);
}

/// Status panel: market state, action, reward.
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = if let Some(r) = app.last_result() {
        vec![
            Line::from(format!(
                "  price={:>8.2} $/MWh  demand={:>6.3} MW  adjusted={:>6.3} MW",
                r.electricity_price, r.electricity_demand, r.adjusted_demand,
            )),
            Line::from(format!(
                "  action=({:.3}, {:.3})  rate={:>7.3} MW  losses={:.5} MWh",
                r.action.charge_rate, r.action.discharge_rate, r.rate, r.losses,
            )),
            Line::from(format!(
                "  reward={:>9.3}  cumulative={:>10.3}",
                r.reward, app.cumulative_reward,
            )),
        ]
    } else {
        vec![Line::from("  Waiting for first step...")]
    };
    if let Some(err) = &app.error {
        lines.push(Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(style::ERROR_FG),
        )));
    }

    let block = Block::default().title(" Status ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Footer with keybinding hints.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        " q:Quit  Space:Pause  +/-:Speed  1/2/3:Preset  r:Restart",
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
