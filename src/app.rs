use crate::config::RuntimeSettings;
use crate::deck::Deck;
use crate::error::MatchError;
use crate::history::{GameRecord, HistoryDb};
use crate::runtime::RevealTimer;
use crate::session::{Completion, MatchSession, SelectResult};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::warn;

const HISTORY_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Summary,
    History,
}

/// Which column the keyboard cursor is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Terms,
    Definitions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

#[derive(Debug, Default)]
pub struct HistoryState {
    pub scroll_offset: usize,
    pub records: Vec<GameRecord>,
}

/// Result shown on the summary screen
#[derive(Debug, Clone, PartialEq)]
pub struct Finish {
    pub completion: Completion,
    pub previous_best: Option<f64>,
}

impl Finish {
    pub fn is_new_best(&self) -> bool {
        self.previous_best
            .map_or(true, |best| self.completion.elapsed_secs < best)
    }
}

#[derive(Debug)]
pub struct App {
    pub session: MatchSession,
    pub deck_name: String,
    pub state: AppState,
    pub focus: Column,
    pub term_cursor: usize,
    pub definition_cursor: usize,
    /// Card positions of the current selection; values may repeat across cards
    pub picked_term: Option<usize>,
    pub picked_definition: Option<usize>,
    pub reveal: RevealTimer,
    pub history: Option<HistoryDb>,
    pub history_state: HistoryState,
    pub finish: Option<Finish>,
    last_tick: Option<Instant>,
}

impl App {
    pub fn new(
        deck: Deck,
        settings: &RuntimeSettings,
        history: Option<HistoryDb>,
    ) -> Result<Self, MatchError> {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = MatchSession::with_options(deck.pairs, settings.rules(), rng)?;

        Ok(Self {
            session,
            deck_name: deck.name,
            state: AppState::Playing,
            focus: Column::Terms,
            term_cursor: 0,
            definition_cursor: 0,
            picked_term: None,
            picked_definition: None,
            reveal: RevealTimer::new(settings.reveal_delay()),
            history,
            history_state: HistoryState::default(),
            finish: None,
            last_tick: None,
        })
    }

    /// Start the wall clock; time before this call is not charged to the player
    pub fn start(&mut self, now: Instant) {
        self.last_tick = Some(now);
    }

    pub fn restart(&mut self, now: Instant) {
        self.session.reset();
        self.reveal.cancel();
        self.state = AppState::Playing;
        self.focus = Column::Terms;
        self.term_cursor = 0;
        self.definition_cursor = 0;
        self.picked_term = None;
        self.picked_definition = None;
        self.finish = None;
        self.last_tick = Some(now);
    }

    /// Charge elapsed wall time to the session and clear a judged attempt once its reveal is over
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(last) = self.last_tick {
            let delta = now.saturating_duration_since(last).as_secs_f64();
            if let Err(e) = self.session.tick(delta) {
                warn!("dropped clock tick: {e}");
            }
        }
        self.last_tick = Some(now);

        if self.reveal.due(now) {
            self.picked_term = None;
            self.picked_definition = None;
            if let Some(completion) = self.session.resolve() {
                self.on_complete(completion);
            }
            self.clamp_cursors();
        }
    }

    fn on_complete(&mut self, completion: Completion) {
        let mut previous_best = None;
        if let Some(db) = &self.history {
            match db.best_time(&self.deck_name) {
                Ok(best) => previous_best = best,
                Err(e) => warn!("failed to read best time: {e}"),
            }
            let record = GameRecord::from_completion(&self.deck_name, &completion);
            if let Err(e) = db.record(&record) {
                warn!("failed to record finished game: {e}");
            }
        }
        self.finish = Some(Finish {
            completion,
            previous_best,
        });
        self.state = AppState::Summary;
    }

    fn clamp_cursors(&mut self) {
        let terms = self.session.remaining().len();
        let definitions = self.session.definitions().len();
        self.term_cursor = self.term_cursor.min(terms.saturating_sub(1));
        self.definition_cursor = self.definition_cursor.min(definitions.saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return AppAction::Quit,
                KeyCode::Char('r') => {
                    self.restart(now);
                    return AppAction::Continue;
                }
                _ => {}
            }
        }

        if key.code == KeyCode::Esc {
            return AppAction::Quit;
        }

        match self.state {
            AppState::Playing => self.handle_playing_key(key.code, now),
            AppState::Summary => match key.code {
                KeyCode::Char('q') => return AppAction::Quit,
                KeyCode::Char('r') => self.restart(now),
                KeyCode::Char('s') => self.open_history(),
                _ => {}
            },
            AppState::History => self.handle_history_key(key.code, now),
        }
        AppAction::Continue
    }

    fn handle_playing_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.focus = Column::Terms,
            KeyCode::Right | KeyCode::Char('l') => self.focus = Column::Definitions,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Column::Terms => Column::Definitions,
                    Column::Definitions => Column::Terms,
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let cursor = self.cursor_mut();
                *cursor = cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.column_len(self.focus);
                let cursor = self.cursor_mut();
                if *cursor + 1 < len {
                    *cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.select_under_cursor(now);
            }
            _ => {}
        }
    }

    fn handle_history_key(&mut self, code: KeyCode, now: Instant) {
        let offset = self.history_state.scroll_offset;
        match code {
            KeyCode::Char('b') | KeyCode::Backspace => {
                self.state = if self.finish.is_some() {
                    AppState::Summary
                } else {
                    AppState::Playing
                };
            }
            KeyCode::Char('r') => self.restart(now),
            KeyCode::Up => self.history_state.scroll_offset = offset.saturating_sub(1),
            // upper bound is clamped by the renderer
            KeyCode::Down => self.history_state.scroll_offset = offset + 1,
            KeyCode::PageUp => self.history_state.scroll_offset = offset.saturating_sub(10),
            KeyCode::PageDown => self.history_state.scroll_offset = offset + 10,
            KeyCode::Home => self.history_state.scroll_offset = 0,
            _ => {}
        }
    }

    pub fn open_history(&mut self) {
        self.history_state.scroll_offset = 0;
        self.history_state.records = match &self.history {
            Some(db) => db.recent(HISTORY_LIMIT).unwrap_or_else(|e| {
                warn!("failed to load history: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.state = AppState::History;
    }

    /// Select whatever card the cursor is on, scheduling the reveal if an attempt was judged
    pub fn select_under_cursor(&mut self, now: Instant) -> SelectResult {
        let result = match self.focus {
            Column::Terms => match self.session.remaining().get(self.term_cursor) {
                Some(pair) => {
                    let term = pair.term.clone();
                    self.session.select_term(&term)
                }
                None => SelectResult::Ignored,
            },
            Column::Definitions => match self.session.definitions().get(self.definition_cursor) {
                Some(definition) => {
                    let definition = definition.clone();
                    self.session.select_definition(&definition)
                }
                None => SelectResult::Ignored,
            },
        };

        if result != SelectResult::Ignored {
            match self.focus {
                Column::Terms => self.picked_term = Some(self.term_cursor),
                Column::Definitions => self.picked_definition = Some(self.definition_cursor),
            }
        }

        match result {
            SelectResult::Evaluated(_) => self.reveal.schedule(now),
            // jump to the other column to pick the missing half
            SelectResult::Selected => {
                self.focus = match self.focus {
                    Column::Terms => Column::Definitions,
                    Column::Definitions => Column::Terms,
                }
            }
            SelectResult::Ignored => {}
        }
        result
    }

    fn column_len(&self, column: Column) -> usize {
        match column {
            Column::Terms => self.session.remaining().len(),
            Column::Definitions => self.session.definitions().len(),
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.focus {
            Column::Terms => &mut self.term_cursor,
            Column::Definitions => &mut self.definition_cursor,
        }
    }
}
