use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Serialize;

use cuo_reduction::core::domain::Params;
use cuo_reduction::interface::state::AppState;
use cuo_reduction::interface::ui;
use cuo_reduction::simulation::runner::Simulation;
use cuo_reduction::simulation::Controls;

// --- CLI Definitions ---

#[derive(Parser, Debug)]
#[command(author, version, about = "CuO + H2 -> Cu + H2O: particle view of a solid-gas reduction", long_about = None)]
struct Args {
    /// Temperature in °C (10-120)
    #[arg(short, long, default_value_t = 65.0)]
    temperature: f64,

    /// Number of H2 molecules
    #[arg(short, long, default_value_t = 10)]
    gas: usize,

    /// Number of CuO units in the pile
    #[arg(short, long, default_value_t = 10)]
    lattice: usize,

    /// Reaction speed level (index into the presets)
    #[arg(long)]
    level: Option<usize>,

    /// Start with low-temperature trap mode on
    #[arg(long)]
    trap: bool,

    /// RNG seed for a reproducible run (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file overriding the default parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run without the TUI and print a CSV time series to stdout
    #[arg(long)]
    headless: bool,

    /// Ticks to simulate in headless mode
    #[arg(long, default_value_t = 1800)]
    ticks: usize,

    /// Seconds per tick in headless mode
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,
}

// --- Terminal Guard (RAII) ---

struct TuiContext {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TuiContext {
    fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to setup terminal alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal backend")?;
        Ok(Self { terminal })
    }
}

impl Drop for TuiContext {
    fn drop(&mut self) {
        // Best-effort restoration of terminal state
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = self.terminal.show_cursor();
    }
}

// --- Initialization Helpers ---

fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Forcefully restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));
}

fn load_params(args: &Args) -> Result<Params> {
    let mut params = match &args.config {
        Some(path) => Params::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Params::default(),
    };
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    Ok(params)
}

fn build_simulation(args: &Args) -> Result<Simulation> {
    let params = load_params(args)?;
    let k = &params.kinetics;

    let controls = Controls {
        temperature: args.temperature.clamp(k.temperature_min, k.temperature_max),
        gas_count: args.gas,
        lattice_count: args.lattice,
        paused: false,
        level: args.level.unwrap_or(k.default_level),
        trap_mode: args.trap,
    };

    Simulation::new(params, controls).context("Invalid simulation parameters")
}

// --- Headless Mode ---

#[derive(Serialize)]
struct CsvRow {
    tick: u64,
    time: f64,
    temperature: f64,
    speed: f64,
    probability: f64,
    boost: f64,
    cuo: usize,
    cu: usize,
    h2: usize,
    h2o: usize,
    events: usize,
}

fn run_headless(mut sim: Simulation, ticks: usize, dt: f64) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());

    for _ in 0..ticks {
        let Some(stats) = sim.advance(dt) else { break };
        let census = sim.census();
        wtr.serialize(CsvRow {
            tick: stats.tick,
            time: stats.elapsed,
            temperature: sim.controls.temperature,
            speed: stats.kinetics.speed,
            probability: stats.kinetics.probability,
            boost: stats.kinetics.boost,
            cuo: census.reactant,
            cu: census.product,
            h2: census.diatomic,
            h2o: census.triatomic,
            events: census.reaction_events,
        })
        .context("Failed to write CSV row")?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

// --- Main ---

fn main() -> Result<()> {
    let args = Args::parse();

    if args.headless {
        let sim = build_simulation(&args)?;
        return run_headless(sim, args.ticks, args.dt);
    }

    // 1. Safety & Logging
    setup_panic_hook();
    // Library log records go to the in-memory logger, never to the screen.
    tui_logger::init_logger(log::LevelFilter::Debug)
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    // 2. Initialize Simulation
    let sim = build_simulation(&args)?;

    // 3. Setup TUI & App State
    let tick_rate = Duration::from_millis(33);
    let mut tui = TuiContext::new().context("Failed to initialize TUI")?;
    let mut app = AppState::new(sim, tick_rate.as_secs_f64());

    // 4. Event Loop
    let mut last_tick = Instant::now();

    while !app.should_quit {
        // Draw
        tui.terminal.draw(|f| ui::draw(f, &app))?;

        // Handle Input
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == event::KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char(c) => app.on_key(c),
                        KeyCode::Esc => app.should_quit = true,
                        _ => {}
                    }
                }
            }
        }

        // Logic Tick
        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
