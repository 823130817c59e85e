use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block, BorderType, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Sparkline, Table, Tabs,
        Wrap,
    },
};

use crate::core::chemistry::{self, AtomSite, Element};
use crate::core::domain::{AtomRadii, LatticeKind};
use crate::engine::kinetics::{KineticsKnobs, Regime};
use crate::interface::state::{AppMode, AppState};

// --- Color Palette ---
const COL_BG: Color = Color::Reset;
const COL_FG: Color = Color::White;
const COL_HIGHLIGHT: Color = Color::Yellow;
const COL_ACCENT: Color = Color::Cyan;
const COL_COPPER: Color = Color::Rgb(184, 115, 51);
const COL_OXYGEN: Color = Color::LightRed;
const COL_HYDROGEN: Color = Color::White;
const COL_BOND: Color = Color::DarkGray;
const COL_GROUND: Color = Color::Gray;
const COL_SUCCESS: Color = Color::Green;
const COL_FAIL: Color = Color::Red;
const COL_HEADER: Color = Color::Magenta;

pub fn draw(f: &mut Frame, app: &AppState) {
    if f.area().width < 40 || f.area().height < 10 {
        let p = Paragraph::new("Terminal too small.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(p, f.area());
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    match app.mode {
        AppMode::Reactor => draw_reactor(f, app, chunks[1]),
        AppMode::Kinetics => draw_kinetics_table(f, app, chunks[1]),
        AppMode::Help => draw_help(f, chunks[1]),
    }

    draw_footer(f, app, chunks[2]);
}

fn draw_header(f: &mut Frame, app: &AppState, area: Rect) {
    let titles = vec![" 1:Reactor ", " 2:Kinetics ", " 3:Help "];
    let idx = match app.mode {
        AppMode::Reactor => 0,
        AppMode::Kinetics => 1,
        AppMode::Help => 2,
    };

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::BOTTOM).title(" CuO + H2 -> Cu + H2O "))
        .select(idx)
        .highlight_style(Style::default().fg(COL_HIGHLIGHT).add_modifier(Modifier::BOLD));

    f.render_widget(tabs, area);
}

fn draw_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let controls = &app.sim.controls;
    let (status, color) = if controls.paused {
        ("PAUSED", COL_HIGHLIGHT)
    } else if app.sim.state().is_exhausted() {
        ("DONE", COL_FG)
    } else {
        ("RUNNING", COL_SUCCESS)
    };

    let text = Line::from(vec![
        Span::styled(format!(" {:<8}", status), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled(format!("T: {:.0} °C", controls.temperature), Style::default().fg(COL_ACCENT)),
        Span::raw(" | "),
        Span::raw(format!("Level x{}", app.sim.level_multiplier())),
        Span::raw(" | "),
        Span::raw(format!("Trap: {}", if controls.trap_mode { "ON" } else { "OFF" })),
        Span::raw(" | "),
        Span::raw(format!("Ticks/s: {:<4.0}", app.ticks_per_second)),
        Span::raw(" | [Q]uit [Space]Pause [R]estart [?]Help"),
    ]);

    let p = Paragraph::new(text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(p, area);
}

fn draw_reactor(f: &mut Frame, app: &AppState, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(area);

    draw_scene(f, app, cols[0]);

    let right_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Length(3),
            Constraint::Length(11),
            Constraint::Min(3),
        ])
        .split(cols[1]);

    draw_counts(f, app, right_rows[0]);
    draw_conversion(f, app, right_rows[1]);
    draw_history(f, app, right_rows[2]);
    draw_logs(f, app, right_rows[3]);
}

/// Canvas with the pile and the gas. The canvas `y` axis points up, the
/// simulation's points down, so every `y` is flipped against the height.
fn draw_scene(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .title(" Reactor ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width < 1 || inner.height < 1 {
        return;
    }

    let params = app.sim.params();
    let (w, h) = (params.domain.width, params.domain.height);
    let radii = &params.radii;
    let ground_y = params.lattice.ground_y(&params.bounds()) + radii.copper;
    let temperature = app.sim.controls.temperature;
    let labels = app.show_labels;

    let canvas = Canvas::default()
        .background_color(COL_BG)
        .marker(Marker::Braille)
        .x_bounds([0.0, w])
        .y_bounds([0.0, h])
        .paint(|ctx| {
            ctx.draw(&CanvasLine {
                x1: 0.0,
                y1: h - ground_y,
                x2: w,
                y2: h - ground_y,
                color: COL_GROUND,
            });

            let lattice: Vec<_> = app
                .sim
                .lattice()
                .iter()
                .map(|u| (u.jittered_position(temperature), chemistry::lattice_atoms(u.kind(), radii)))
                .collect();
            let diatomic = chemistry::diatomic_atoms(radii);
            let triatomic = chemistry::triatomic_atoms(radii);

            for (p, atoms) in &lattice {
                draw_molecule(ctx, radii, atoms, p.x, h - p.y);
            }
            for gas in app.sim.diatomic() {
                let p = gas.body.position;
                draw_molecule(ctx, radii, &diatomic, p.x, h - p.y);
            }
            for gas in app.sim.triatomic() {
                let p = gas.body.position;
                draw_molecule(ctx, radii, &triatomic, p.x, h - p.y);
            }

            if labels {
                ctx.layer();
                for (p, atoms) in &lattice {
                    print_labels(ctx, atoms, p.x, h - p.y);
                }
                for gas in app.sim.diatomic() {
                    let p = gas.body.position;
                    print_labels(ctx, &diatomic, p.x, h - p.y);
                }
                for gas in app.sim.triatomic() {
                    let p = gas.body.position;
                    print_labels(ctx, &triatomic, p.x, h - p.y);
                }
            }
        });

    f.render_widget(canvas, inner);

    if app.show_diagnostics {
        draw_diagnostics_overlay(f, app, inner);
    }
}

fn element_color(element: Element) -> Color {
    match element {
        Element::H => COL_HYDROGEN,
        Element::O => COL_OXYGEN,
        Element::Cu => COL_COPPER,
    }
}

// Canvas y grows upward, so offsets flip sign on that axis.
fn draw_molecule(ctx: &mut Context, radii: &AtomRadii, atoms: &[AtomSite], x: f64, y: f64) {
    if let Some((hub, rest)) = atoms.split_first() {
        for atom in rest {
            ctx.draw(&CanvasLine {
                x1: x + hub.offset.x,
                y1: y - hub.offset.y,
                x2: x + atom.offset.x,
                y2: y - atom.offset.y,
                color: COL_BOND,
            });
        }
    }
    for atom in atoms {
        ctx.draw(&Circle {
            x: x + atom.offset.x,
            y: y - atom.offset.y,
            radius: atom.element.radius(radii),
            color: element_color(atom.element),
        });
    }
}

fn print_labels(ctx: &mut Context, atoms: &[AtomSite], x: f64, y: f64) {
    for atom in atoms {
        let style = Style::default().fg(element_color(atom.element));
        ctx.print(x + atom.offset.x, y - atom.offset.y, Span::styled(atom.element.symbol(), style));
    }
}

fn draw_diagnostics_overlay(f: &mut Frame, app: &AppState, area: Rect) {
    let k = app.sim.kinetic_state();
    let regime = match k.regime {
        Regime::Active => "active",
        Regime::Cold => "cold",
        Regime::Trapped => "trapped",
    };
    let contacts = app.last_stats.map(|s| s.contacts).unwrap_or(0);

    let lines = vec![
        Line::from(format!("t      {:>7.1} s", app.sim.state().elapsed)),
        Line::from(format!("tick   {:>7}", app.sim.ticks())),
        Line::from(format!("speed  {:>7.2}", k.speed)),
        Line::from(format!("p      {:>7.4}", k.probability)),
        Line::from(format!("boost  {:>7.1}", k.boost)),
        Line::from(format!("regime {:>7}", regime)),
        Line::from(format!("hits   {:>7}", contacts)),
    ];

    let overlay = Rect {
        x: area.x,
        y: area.y,
        width: area.width.min(18),
        height: area.height.min(lines.len() as u16),
    };
    let p = Paragraph::new(lines).style(Style::default().fg(COL_ACCENT).add_modifier(Modifier::DIM));
    f.render_widget(p, overlay);
}

fn draw_counts(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default().title(" Counts ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let census = app.sim.census();
    let controls = &app.sim.controls;

    let kv = |k: &str, v: String, color: Color| -> Line {
        Line::from(vec![
            Span::styled(format!("{:<12}", k), Style::default().fg(Color::Gray)),
            Span::styled(v, Style::default().fg(color)),
        ])
    };

    let text = vec![
        kv(
            &format!("{} left:", LatticeKind::Reactant.formula()),
            format!("{} / {}", census.reactant, census.initial_lattice),
            COL_OXYGEN,
        ),
        kv(&format!("{} formed:", LatticeKind::Product.formula()), census.product.to_string(), COL_COPPER),
        kv("H2 left:", format!("{} / {}", census.diatomic, census.initial_gas), COL_HYDROGEN),
        kv("H2O formed:", census.triatomic.to_string(), COL_ACCENT),
        kv("Reactions:", census.reaction_events.to_string(), COL_HIGHLIGHT),
        kv(
            "Next run:",
            format!("{} H2, {} CuO", controls.gas_count, controls.lattice_count),
            Color::DarkGray,
        ),
    ];

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}

fn draw_conversion(f: &mut Frame, app: &AppState, area: Rect) {
    let ratio = app.sim.census().conversion();
    let g = Gauge::default()
        .block(Block::default().title(" Conversion ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(COL_COPPER).bg(Color::DarkGray))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{:.0}%", ratio * 100.0));
    f.render_widget(g, area);
}

fn draw_history(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default().title(" History ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
        .split(inner);

    let width = inner.width as usize;
    let tail = |series: &std::collections::VecDeque<u64>| -> Vec<u64> {
        let skip = series.len().saturating_sub(width);
        series.iter().skip(skip).copied().collect()
    };

    let events = tail(&app.telemetry.events_history);
    let spark = Sparkline::default()
        .block(Block::default().title("Reactions").borders(Borders::NONE))
        .style(Style::default().fg(COL_HIGHLIGHT))
        .data(&events);
    f.render_widget(spark, chunks[0]);

    let gas = tail(&app.telemetry.gas_history);
    let spark_gas = Sparkline::default()
        .block(Block::default().title("H2 remaining").borders(Borders::NONE))
        .style(Style::default().fg(COL_HYDROGEN))
        .data(&gas);
    f.render_widget(spark_gas, chunks[1]);

    // Sparklines take integers: plot p in thousandths.
    let skip = app.telemetry.probability_history.len().saturating_sub(width);
    let probability: Vec<u64> = app
        .telemetry
        .probability_history
        .iter()
        .skip(skip)
        .map(|p| (p * 1000.0).round() as u64)
        .collect();
    let spark_p = Sparkline::default()
        .block(Block::default().title("p per contact").borders(Borders::NONE))
        .style(Style::default().fg(COL_ACCENT))
        .data(&probability);
    f.render_widget(spark_p, chunks[2]);
}

fn draw_logs(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default().title(" Event Log ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .map(|line| {
            let style = if line.contains("capped") {
                Style::default().fg(COL_FAIL)
            } else if line.contains(">>>") {
                Style::default().fg(COL_SUCCESS)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(Line::from(line.as_str())).style(style)
        })
        .collect();

    f.render_widget(List::new(items), inner);
}

/// Speed and probability across the temperature range, at restart and
/// at steady state, for the current level and trap setting.
fn draw_kinetics_table(f: &mut Frame, app: &AppState, area: Rect) {
    let model = app.sim.kinetics_model();
    let k = model.params();
    let knobs = KineticsKnobs {
        level: app.sim.controls.level,
        trap_mode: app.sim.controls.trap_mode,
    };
    let steady = k.boost_schedule.last().map(|b| b.until).unwrap_or(0.0);
    let (slowest, fastest) = model.speed_range();

    let header_cells = ["T (°C)", "T (K)", "Speed", "p (t=0)", "p (steady)", "Regime"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(COL_HEADER)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let current = app.sim.controls.temperature;
    let step = 10.0;
    let n = ((k.temperature_max - k.temperature_min) / step).floor() as usize;

    let rows = (0..=n).map(|i| {
        let t = k.temperature_min + i as f64 * step;
        let start = model.evaluate(t, 0.0, knobs);
        let late = model.evaluate(t, steady, knobs);
        let style = if (t - current).abs() < step / 2.0 {
            Style::default().fg(COL_HIGHLIGHT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(format!("{:.0}", t)),
            Cell::from(format!("{:.1}", t + crate::core::domain::ABSOLUTE_ZERO_OFFSET)),
            Cell::from(format!("{:.2}", start.speed)),
            Cell::from(format!("{:.4}", start.probability)),
            Cell::from(format!("{:.4}", late.probability)),
            Cell::from(format!("{:?}", late.regime)),
        ])
        .style(style)
    });

    let t = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Min(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(
                " Kinetics (Ea = {:.0} kJ/mol, cap {:.2}, speed {:.2}-{:.2}) ",
                k.activation_energy / 1000.0,
                k.probability_cap,
                slowest,
                fastest
            )),
    );

    f.render_widget(t, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let keys = [
        ("Space", "Pause / resume"),
        ("r", "Restart with the current counts"),
        ("+ / -", "Temperature up / down (5 °C)"),
        ("g / G", "H2 count down / up (next restart)"),
        ("c / C", "CuO count down / up (next restart)"),
        ("l", "Cycle reaction speed level"),
        ("t", "Toggle low-temperature trap mode"),
        ("d", "Toggle diagnostics overlay"),
        ("a", "Toggle atom labels"),
        ("1 2 3", "Reactor / Kinetics / Help"),
        ("q, Esc", "Quit"),
    ];

    let items: Vec<ListItem> = keys
        .iter()
        .map(|(k, v)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<10}", k), Style::default().fg(COL_ACCENT)),
                Span::raw(*v),
            ]))
        })
        .collect();

    f.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(" Keys ")),
        area,
    );
}
