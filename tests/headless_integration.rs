use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use termatch::app::{App, AppAction, AppState, Column};
use termatch::config::RuntimeSettings;
use termatch::deck::Deck;
use termatch::history::HistoryDb;
use termatch::runtime::{FixedTicker, MatchEvent, Runner, TestEventSource};
use termatch::Pair;

fn key(code: KeyCode) -> MatchEvent {
    MatchEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn settings(reveal_delay_ms: u64) -> RuntimeSettings {
    RuntimeSettings {
        reveal_delay_ms,
        seed: Some(3),
        ..RuntimeSettings::default()
    }
}

/// Key presses that move the cursors onto every pair in turn and select both halves
fn solving_keys(app: &App) -> Vec<MatchEvent> {
    let mut definitions: Vec<String> = app.session.definitions().to_vec();
    let mut events = Vec::new();

    for pair in app.session.remaining() {
        // matched terms leave from the top, so the term cursor stays at 0
        events.push(key(KeyCode::Left));
        events.push(key(KeyCode::Enter));

        let index = definitions
            .iter()
            .position(|d| *d == pair.definition)
            .unwrap();
        for _ in 0..definitions.len() {
            events.push(key(KeyCode::Up));
        }
        for _ in 0..index {
            events.push(key(KeyCode::Down));
        }
        events.push(key(KeyCode::Enter));
        events.push(MatchEvent::Tick);
        definitions.remove(index);
    }
    events
}

// Headless game using the runtime + App without a TTY.
// Drives a whole deck through Runner/TestEventSource and checks the summary.
#[test]
fn headless_game_reaches_summary() {
    let deck = Deck::new(
        "headless",
        vec![
            Pair::new("borrow", "temporary access"),
            Pair::new("move", "transfer of ownership"),
            Pair::new("drop", "runs at end of scope"),
        ],
    );
    let mut app = App::new(deck, &settings(0), None).unwrap();

    let (tx, rx) = mpsc::channel();
    for event in solving_keys(&app) {
        tx.send(event).unwrap();
    }

    let es = TestEventSource::new(rx);
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));

    let start = Instant::now();
    app.start(start);
    for _ in 0..200u32 {
        let now = Instant::now();
        app.on_tick(now);
        match runner.step() {
            MatchEvent::Key(key) => {
                assert_eq!(app.handle_key(key, now), AppAction::Continue);
            }
            MatchEvent::Tick | MatchEvent::Resize => {}
        }
        if app.state == AppState::Summary {
            break;
        }
    }

    assert_eq!(app.state, AppState::Summary);
    let finish = app.finish.as_ref().unwrap();
    assert_eq!(finish.completion.pairs, 3);
    assert_eq!(finish.completion.wrong_attempts, 0);
    assert!(finish.completion.elapsed_secs >= 0.0);
    assert!(app.session.is_complete());
}

#[test]
fn headless_wrong_match_adds_penalty_and_blocks_input() {
    let deck = Deck::new("pair", vec![Pair::new("A", "1"), Pair::new("B", "2")]);
    let mut app = App::new(deck, &settings(1000), None).unwrap();
    let t0 = Instant::now();
    app.start(t0);

    app.term_cursor = app
        .session
        .remaining()
        .iter()
        .position(|p| p.term == "A")
        .unwrap();
    app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), t0);
    assert_eq!(app.focus, Column::Definitions);

    app.definition_cursor = app
        .session
        .definitions()
        .iter()
        .position(|d| d == "2")
        .unwrap();
    app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), t0);
    assert_eq!(app.session.wrong_attempts(), 1);
    assert_eq!(app.session.elapsed_secs(), 2.0);

    // pressing keys while the verdict is shown does not select anything
    app.focus = Column::Terms;
    app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), t0);
    assert_eq!(app.session.selected_term(), Some("A"));
    assert_eq!(app.session.selected_definition(), Some("2"));

    app.on_tick(t0 + Duration::from_millis(1000));
    assert_eq!(app.session.selected_term(), None);
    assert_eq!(app.session.remaining().len(), 2);
    assert!((app.session.elapsed_secs() - 3.0).abs() < 1e-9);
}

#[test]
fn headless_history_records_each_finished_game() {
    let db = HistoryDb::open_in_memory().unwrap();
    let deck = Deck::new("solo", vec![Pair::new("ping", "echo request")]);
    let mut app = App::new(deck, &settings(0), Some(db)).unwrap();
    let t0 = Instant::now();

    for round in 0..2u32 {
        let now = t0 + Duration::from_secs(10 * u64::from(round));
        app.start(now);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(enter, now);
        app.handle_key(enter, now);
        app.on_tick(now + Duration::from_secs(1));
        assert_eq!(app.state, AppState::Summary);
        app.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE), now);
    }

    let db = app.history.as_ref().unwrap();
    assert_eq!(db.count().unwrap(), 2);
    assert_eq!(db.best_time("solo").unwrap(), Some(1.0));
}
