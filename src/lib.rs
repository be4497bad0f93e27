use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

mod app;
mod config;
mod keybinds;
mod locator;
mod logging;
mod persistence;
mod project;
mod theme;
mod types;
mod ui;
mod util;
use app::App;
use config::{LocatorConfig, load_config};
use keybinds::load_keybindings;
use locator::matching_files;
use logging::init_logging;
use persistence::load_persisted_state;
use project::Project;
use ui::draw;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    List { target: PathBuf, query: String },
    Run { target: PathBuf },
}

fn parse_args<I: IntoIterator<Item = String>>(args: I, cwd: PathBuf) -> Result<Command, String> {
    let mut target: Option<PathBuf> = None;
    let mut query: Option<String> = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--list" => match args.next() {
                Some(q) => query = Some(q),
                None => return Err("--list requires a QUERY argument".to_string()),
            },
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {flag}")),
            path => {
                if target.is_some() {
                    return Err(format!("Unexpected argument: {path}"));
                }
                target = Some(PathBuf::from(path));
            }
        }
    }
    let target = target.unwrap_or(cwd);
    Ok(match query {
        Some(query) => Command::List { target, query },
        None => Command::Run { target },
    })
}

fn print_help() {
    println!("Usage: locator [OPTIONS] [PATH]");
    println!();
    println!("Arguments:");
    println!("  [PATH]          Project directory or .files manifest (default: current directory)");
    println!();
    println!("Options:");
    println!("  --list QUERY    Print the project files whose name contains QUERY and exit");
    println!("  --help          Show this help message");
}

pub fn run() -> io::Result<()> {
    let command = match parse_args(std::env::args().skip(1), std::env::current_dir()?) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("Try 'locator --help' for more information.");
            return Ok(());
        }
    };
    let target = match command {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::List { target, query } => {
            return write_matches(&target, &query, &load_config(), &mut io::stdout().lock());
        }
        Command::Run { target } => target,
    };
    let target = std::fs::canonicalize(&target).unwrap_or(target);

    if let Err(err) = init_logging() {
        eprintln!("Logging disabled: {err}");
    }
    let config = load_config();
    let keybinds = load_keybindings();
    let mut app = match App::new(&target, config, keybinds) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("Cannot open {}: {err}", target.display());
            return Ok(());
        }
    };
    app.attach_clipboard();
    app.start_fs_watcher();
    if let Some(state) = load_persisted_state() {
        app.restore_persisted_state(&state);
    }
    tracing::info!(root = %target.display(), files = app.project.len(), "locator started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    let result = run_app(terminal, &mut app);

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    app.persist_state();
    result
}

/// Write the project files matching `query`, one name per line.
fn write_matches<W: Write>(
    target: &Path,
    query: &str,
    config: &LocatorConfig,
    out: &mut W,
) -> io::Result<()> {
    let project = Project::open(target, &config.ignore_dirs)?;
    for name in matching_files(&project, query, config.case_sensitive, config.max_suggestions) {
        writeln!(out, "{name}")?;
    }
    out.flush()
}

fn run_app(mut terminal: Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        if let Err(err) = app.poll_fs_changes() {
            app.set_status(format!("Filesystem update error: {err}"));
        }
        terminal.draw(|f| draw(app, f))?;
        if app.quit {
            return Ok(());
        }
        if event::poll(Duration::from_millis(100))? {
            // Drain pending events before the next draw.
            loop {
                let ev = event::read()?;
                match ev {
                    Event::Key(key) => {
                        if let Err(err) = app.handle_key(key) {
                            tracing::warn!(%err, "key action failed");
                            app.set_status(format!("Action failed: {err}"));
                        }
                    }
                    Event::Mouse(mouse) => {
                        if let Err(err) = app.handle_mouse(mouse) {
                            tracing::warn!(%err, "mouse action failed");
                            app.set_status(format!("Action failed: {err}"));
                        }
                    }
                    _ => {}
                }
                if app.quit {
                    return Ok(());
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}
