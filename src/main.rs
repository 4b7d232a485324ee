use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use termatch::{
    app::{App, AppAction},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, RuntimeSettings},
    deck::Deck,
    error::DeckError,
    history::HistoryDb,
    logging,
    pair::DuplicatePolicy,
    runtime::{CrosstermEventSource, FixedTicker, MatchEvent, Runner},
    ui::screen,
};
use tracing::{info, warn};

const DEFAULT_DECK: &str = "rust-ownership";

/// match terms to their definitions against the clock
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal matching game: pair every term with its definition as fast as you can. Wrong matches add a time penalty."
)]
pub struct Cli {
    /// deck file to play (.json array of {term, definition} objects, or .csv with a term,definition header)
    deck: Option<PathBuf>,

    /// play one of the decks compiled into the binary
    #[clap(short = 'b', long, conflicts_with = "deck")]
    bundled: Option<String>,

    /// list the bundled decks and exit
    #[clap(long)]
    list_decks: bool,

    /// seed for the definition shuffle, for reproducible boards
    #[clap(long)]
    seed: Option<u64>,

    /// seconds added to the clock for each wrong match
    #[clap(long)]
    penalty: Option<f64>,

    /// how long a judged match stays highlighted, in milliseconds
    #[clap(long)]
    reveal_delay_ms: Option<u64>,

    /// clock and redraw interval in milliseconds
    #[clap(long)]
    tick_rate_ms: Option<u64>,

    /// refuse decks that repeat a term or a definition
    #[clap(long)]
    reject_duplicates: bool,

    /// do not record finished games
    #[clap(long)]
    no_history: bool,

    /// store the effective settings (including the deck) as the new defaults
    #[clap(long)]
    save_config: bool,

    /// debug-level logging to the log file
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the stored config
    fn to_runtime_settings(&self, cfg: &Config) -> RuntimeSettings {
        let mut settings = RuntimeSettings::from(cfg);
        if let Some(p) = self.penalty {
            settings.penalty_secs = p;
        }
        if let Some(ms) = self.reveal_delay_ms {
            settings.reveal_delay_ms = ms;
        }
        if let Some(ms) = self.tick_rate_ms {
            settings.tick_rate_ms = ms;
        }
        if self.reject_duplicates {
            settings.duplicates = DuplicatePolicy::Reject;
        }
        if self.no_history {
            settings.record_history = false;
        }
        if let Some(path) = &self.deck {
            settings.deck = Some(path.display().to_string());
        } else if let Some(name) = &self.bundled {
            settings.deck = Some(name.clone());
        }
        settings.seed = self.seed;
        settings
    }
}

/// A deck setting is a file path if such a file exists, otherwise a bundled deck name
fn resolve_deck(settings: &RuntimeSettings) -> Result<Deck, DeckError> {
    match settings.deck.as_deref() {
        Some(deck) if Path::new(deck).is_file() => Deck::from_path(deck),
        Some(name) => Deck::bundled(name),
        None => Deck::bundled(DEFAULT_DECK),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_decks {
        for name in Deck::bundled_names() {
            println!("{name}");
        }
        return Ok(());
    }

    if let Some(log_path) = AppDirs::log_path() {
        // logging is optional; the game runs without it
        let _ = logging::init(&log_path, cli.verbose);
    }

    let store = FileConfigStore::new();
    let settings = cli.to_runtime_settings(&store.load());

    let deck = match resolve_deck(&settings) {
        Ok(deck) => deck,
        Err(e) => Cli::command().error(ErrorKind::InvalidValue, e).exit(),
    };
    if let Err(e) = deck.validate(settings.duplicates) {
        Cli::command().error(ErrorKind::InvalidValue, e).exit();
    }

    if cli.save_config {
        store.save(&Config::from(&settings))?;
        info!(path = %store.path().display(), "saved config");
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let history = if settings.record_history {
        match HistoryDb::open_default() {
            Ok(db) => Some(db),
            Err(e) => {
                warn!("history unavailable: {e}");
                None
            }
        }
    } else {
        None
    };

    info!(deck = %deck.name, pairs = deck.pairs.len(), "starting game");
    let mut app = App::new(deck, &settings, history)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, settings.tick_rate());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(tick_rate));
    app.start(Instant::now());

    loop {
        terminal.draw(|f| screen::draw(app, f))?;

        let event = runner.step_until(app.reveal.deadline(), Instant::now());
        let now = Instant::now();
        // every step advances the clock, so key bursts cannot starve it
        app.on_tick(now);

        if let MatchEvent::Key(key) = event {
            if app.handle_key(key, now) == AppAction::Quit {
                break;
            }
        }
    }

    Ok(())
}
