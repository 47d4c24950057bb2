//! # pbrun CLI Entry Point
//!
//! Terminal panel for running Ansible playbooks, on the host or inside a
//! podman execution environment image.
//!
//! ## Usage
//!
//! ```bash
//! # Playbooks from /opt/playbooks (or the configured folder)
//! pbrun
//!
//! # Another folder, escalating through sudo
//! pbrun --folder ./playbooks --escalate sudo
//!
//! # Print the playbooks and execution environment images, then exit
//! pbrun --list
//! ```
//!
//! ## Logging
//!
//! Logs go to `pbrun.log` in the platform data directory (stderr with
//! `--list`). The filter is read from `PBRUN_LOG` and defaults to `info`.
//!
//! See [`pbrun::ui::keys`] for the key bindings.

use pbrun::playbook;
use pbrun::spawn::{Escalation, HostSpawner, ProcessSpawner};
use pbrun::ui::{self, config::Config, keys, theme::Theme, App};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Trait for reading terminal events (allows dependency injection for testing)
trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(
                event::read().context("Failed to read keyboard event")?,
            ))
        } else {
            Ok(None)
        }
    }
}

/// pbrun - run Ansible playbooks from a terminal panel
#[derive(Parser, Debug)]
#[command(name = "pbrun")]
#[command(author = "Luckystrike561")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run Ansible playbooks on the host or in an execution environment", long_about = None)]
struct Args {
    /// Folder to list playbooks from
    #[arg(short, long, value_name = "DIR")]
    folder: Option<String>,

    /// Color theme (e.g. "Catppuccin Mocha", "Nord")
    #[arg(short, long, value_name = "NAME")]
    theme: Option<String>,

    /// How to acquire superuser rights for listings and runs
    #[arg(short, long, value_enum, value_name = "MODE")]
    escalate: Option<Escalation>,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the playbooks and images, then exit
    #[arg(long)]
    list: bool,
}

/// Settings after merging the config file with command-line flags
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    folder: String,
    theme: Theme,
    escalation: Escalation,
    scrollback_lines: usize,
}

impl Settings {
    fn resolve(config: Config, args: &Args) -> Self {
        let theme_name = args.theme.clone().unwrap_or(config.theme);
        let theme = match Theme::by_name(&theme_name) {
            Some(theme) => theme.clone(),
            None => {
                warn!(theme = %theme_name, "unknown theme, using the default");
                Theme::default_theme().clone()
            }
        };

        Self {
            folder: args.folder.clone().unwrap_or(config.playbook_folder),
            theme,
            escalation: args.escalate.unwrap_or(config.escalation),
            scrollback_lines: config.scrollback_lines,
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Send logs to stderr, or to a file while the terminal belongs to the panel.
fn init_tracing(to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("PBRUN_LOG")
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if to_stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return Ok(());
    }

    let dirs = directories::ProjectDirs::from("", "", "pbrun")
        .context("Could not determine data directory")?;
    let log_dir = dirs.data_dir();
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    let log_path = log_dir.join("pbrun.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.list) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    let _ = panic::take_hook();

    result
}

async fn run_application(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let settings = Settings::resolve(config, &args);
    let spawner = HostSpawner::new(settings.escalation);

    info!(
        folder = %settings.folder,
        escalation = ?settings.escalation,
        theme = %settings.theme.name,
        "starting pbrun"
    );

    if args.list {
        return print_listing(&spawner, &settings.folder);
    }

    enable_raw_mode().context("Failed to enable raw mode for terminal")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(settings.folder, settings.theme, settings.scrollback_lines);
    app.mount(&spawner);

    // Run the app and ensure cleanup happens even on error
    let mut event_reader = CrosstermEventReader;
    let run_result = run_app(&mut terminal, &mut app, &spawner, &mut event_reader);

    app.shutdown();

    // Restore terminal (always runs, even if run_app failed)
    let cleanup_result = cleanup_terminal(&mut terminal);

    run_result?;
    cleanup_result?;

    Ok(())
}

/// Non-interactive `--list` output
fn print_listing(spawner: &dyn ProcessSpawner, folder: &str) -> Result<()> {
    let playbooks = playbook::list_playbooks(spawner, folder)?;
    println!("Playbooks in {}:", folder);
    for name in &playbooks {
        println!("  {}", name);
    }

    match playbook::list_images(spawner) {
        Ok(images) => {
            println!("Execution environment images:");
            for image in &images {
                println!("  {}", image);
            }
        }
        Err(e) => warn!(error = %format!("{:#}", e), "error fetching images"),
    }

    Ok(())
}

/// Clean up terminal state
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}

fn run_app<B>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    spawner: &dyn ProcessSpawner,
    event_reader: &mut dyn EventReader,
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    loop {
        app.poll_run();

        terminal
            .draw(|f| ui::render(f, app))
            .context("Failed to draw terminal UI")?;

        // Redraw often while output is streaming in
        let poll_timeout = if app.is_running() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };

        let Some(event) = event_reader.read_event(poll_timeout)? else {
            continue;
        };

        if let Event::Key(key) = event {
            let size = terminal.size().context("Failed to read terminal size")?;
            let pane = ui::render::output_pane_size(size.width, size.height);
            keys::handle_key(app, key, spawner, pane);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
