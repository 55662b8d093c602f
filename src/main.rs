use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, MouseEventKind};
use crossterm::execute;
use tokio::sync::mpsc;

use satmap::action::Action;
use satmap::amount;
use satmap::app::App;
use satmap::config::{self, load_config, load_config_from_path};
use satmap::event::{Event, EventHandler};
use satmap::price::{self, Currency};
use satmap::ui;

#[derive(Parser)]
#[command(name = "satmap", about = "TUI treemap visualizer for Bitcoin amounts")]
struct Cli {
    /// File with one BTC amount per line
    amounts: Option<PathBuf>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wallet export JSON to import on startup
    #[arg(long)]
    import: Option<PathBuf>,

    /// Fiat currency for the price reference: eur, usd
    #[arg(long)]
    currency: Option<String>,

    /// Color mode: size, label, mono
    #[arg(long)]
    color_mode: Option<String>,

    /// Color support: auto, 256, truecolor, mono
    #[arg(long)]
    color: Option<String>,

    /// Disable the background price fetch entirely.
    #[arg(long, default_value_t = false)]
    no_price: bool,

    /// Run headless performance capture without interactive terminal.
    #[arg(long, default_value_t = false)]
    perf_capture: bool,

    /// Number of capture iterations for perf mode.
    #[arg(long, default_value_t = 120)]
    perf_iterations: usize,

    /// Headless terminal width for perf mode.
    #[arg(long, default_value_t = 160)]
    perf_width: u16,

    /// Headless terminal height for perf mode.
    #[arg(long, default_value_t = 50)]
    perf_height: u16,

    /// Perf tracing output file (JSON lines).
    #[arg(long, default_value = "target/perf/perf_spans.jsonl")]
    perf_output: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    if cli.perf_capture {
        return run_perf_capture(config, &cli);
    }

    let mut app = App::new(config.clone());
    load_startup_amounts(&mut app, &cli)?;

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(std::io::stdout(), DisableMouseCapture);
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, app, &config, cli.no_price).await;

    execute!(stdout(), DisableMouseCapture)?;
    ratatui::restore();

    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    mut app: App,
    config: &config::Config,
    no_price: bool,
) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_secs(1));

    if !no_price && config.general.fetch_price {
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        app.price_refresh = Some(refresh_tx);
        price::spawn_price_task(
            events.sender(),
            refresh_rx,
            Currency::from_str_config(&config.general.currency),
            Duration::from_secs(config.general.price_refresh_secs.max(1)),
        );
    }

    terminal.draw(|frame| ui::draw(frame, &mut app))?;

    while app.running {
        if let Some(event) = events.next().await {
            let mut should_draw = false;
            match event {
                Event::Key(key) => {
                    if key.kind == crossterm::event::KeyEventKind::Press {
                        let action = app.map_key(key);
                        app.dispatch(action);
                        should_draw = true;
                    }
                }
                Event::Mouse(mouse) => {
                    if mouse.kind == MouseEventKind::Down(crossterm::event::MouseButton::Left) {
                        app.dispatch(Action::SelectAt(mouse.column, mouse.row));
                        should_draw = true;
                    }
                }
                Event::Price(result) => {
                    app.apply_price(result);
                    should_draw = true;
                }
                Event::Tick => {
                    app.expire_status();
                    should_draw = true;
                }
                Event::Animate => {
                    if app.is_animating() {
                        app.tick_animation();
                        should_draw = true;
                    }
                }
                Event::Resize => {
                    app.on_resize();
                    should_draw = true;
                }
            }
            if should_draw {
                terminal.draw(|frame| ui::draw(frame, &mut app))?;
            }
        }
    }

    Ok(())
}

fn load_startup_amounts(app: &mut App, cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.amounts {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let entries = amount::parse_amounts(&contents)
            .wrap_err_with(|| format!("invalid amounts in {}", path.display()))?;
        app.set_amounts(entries.iter().map(|e| e.sats).collect());
    }

    if let Some(path) = &cli.import {
        let sats = amount::import::load_wallet_export(path)
            .wrap_err_with(|| format!("failed to import {}", path.display()))?;
        app.append_amounts(&sats);
    }

    // Nothing loaded: seed the demo amounts so the screen is not blank
    if app.entries.is_empty() {
        app.set_amounts(amount::demo_sats());
    }
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(ref currency) = cli.currency {
        config.general.currency = currency.clone();
    }
    if let Some(ref mode) = cli.color_mode {
        config.general.default_color_mode = mode.clone();
    }
    if let Some(ref support) = cli.color {
        config.general.color_support = support.clone();
    }
    if cli.no_price {
        config.general.fetch_price = false;
    }

    config
}

fn run_perf_capture(config: config::Config, cli: &Cli) -> Result<()> {
    #[cfg(not(feature = "perf-tracing"))]
    {
        let _ = (config, cli);
        Err(eyre!(
            "--perf-capture requires the `perf-tracing` feature; run with `cargo run --features perf-tracing -- --perf-capture`"
        ))
    }

    #[cfg(feature = "perf-tracing")]
    {
        if cli.perf_iterations == 0 {
            return Err(eyre!("--perf-iterations must be greater than 0"));
        }
        if cli.perf_width == 0 || cli.perf_height == 0 {
            return Err(eyre!(
                "--perf-width and --perf-height must be greater than 0"
            ));
        }

        if cli.perf_output.exists() {
            std::fs::remove_file(&cli.perf_output)?;
        }
        satmap::perf::init_tracing_json(&cli.perf_output)?;

        let mut app = App::new(config);
        app.set_amounts((0..500).map(|i| (i + 1) * 1_000).collect());

        let backend = ratatui::backend::TestBackend::new(cli.perf_width, cli.perf_height);
        let mut terminal = ratatui::Terminal::new(backend)?;

        for _ in 0..cli.perf_iterations {
            app.on_resize();
            terminal.draw(|frame| ui::draw(frame, &mut app))?;
        }

        let stats_path = satmap::perf::write_span_stats(&cli.perf_output, cli.perf_iterations)?;

        println!("Perf capture written:");
        println!(" - {}", cli.perf_output.display());
        println!(" - {}", stats_path.display());
        Ok(())
    }
}
