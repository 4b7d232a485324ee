use ratatui::Frame;

use crate::{
    app::{App, AppState},
    ui::history::render_history,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

/// Board screen - the two card columns with clock and progress
pub struct BoardScreen;

impl Screen for BoardScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

/// Summary screen - completion message, rendered by the App widget
pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

/// History screen - uses dedicated renderer
pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_history(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Playing => Box::new(BoardScreen),
        AppState::Summary => Box::new(SummaryScreen),
        AppState::History => Box::new(HistoryScreen),
    }
}

/// Draw whatever the app's current state calls for
pub fn draw(app: &mut App, f: &mut Frame) {
    let state = app.state;
    current_screen(&state).render(app, f);
}
