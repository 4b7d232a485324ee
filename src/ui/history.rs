use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::{app::App, history::GameRecord, util::format_secs};

/// Pure presenter for a single history row
pub fn present_row(game: &GameRecord, best: Option<f64>) -> Row<'static> {
    let is_best = best.is_some_and(|b| (game.elapsed_secs - b).abs() < f64::EPSILON);

    let time_style = if is_best {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let wrong_style = match game.wrong_attempts {
        0 => Style::default().fg(Color::Green),
        1..=2 => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Red),
    };

    Row::new(vec![
        Cell::from(game.finished_at.format("%Y-%m-%d %H:%M").to_string()),
        Cell::from(game.deck.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(game.pairs.to_string()),
        Cell::from(format_secs(game.elapsed_secs)).style(time_style),
        Cell::from(game.wrong_attempts.to_string()).style(wrong_style),
    ])
}

/// Render the game history screen
pub fn render_history(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // History table
            Constraint::Length(3), // Instructions
        ])
        .split(area);

    let title = Paragraph::new(format!("Finished games · now playing {}", app.deck_name))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let records = &app.history_state.records;
    if records.is_empty() {
        let message = if app.history.is_some() {
            "No finished games yet.\nComplete a game to see it here!"
        } else {
            "History is disabled for this run."
        };
        let no_data = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL).title("No Data"))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(no_data, chunks[1]);
    } else {
        // Account for borders and header
        let table_height = chunks[1].height.saturating_sub(3) as usize;
        let total_rows = records.len();
        let max_scroll = total_rows.saturating_sub(table_height);
        if app.history_state.scroll_offset > max_scroll {
            app.history_state.scroll_offset = max_scroll;
        }
        let offset = app.history_state.scroll_offset;

        let best = app
            .history
            .as_ref()
            .and_then(|db| db.best_time(&app.deck_name).ok().flatten());

        let header = Row::new(vec![
            Cell::from("Finished"),
            Cell::from("Deck"),
            Cell::from("Pairs"),
            Cell::from("Time"),
            Cell::from("Wrong"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = records
            .iter()
            .skip(offset)
            .take(table_height)
            .map(|game| present_row(game, best.filter(|_| game.deck == app.deck_name)))
            .collect();

        let scroll_info = if total_rows > table_height {
            format!(" ({}/{} rows)", offset + rows.len(), total_rows)
        } else {
            String::new()
        };

        let table = Table::new(
            rows,
            [
                Constraint::Length(18),
                Constraint::Min(12),
                Constraint::Length(6),
                Constraint::Length(9),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Recent games{scroll_info}")),
        );

        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new("↑/↓ PgUp/PgDn Home scroll | (r)estart | (b)ack | (esc)ape")
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::config::RuntimeSettings;
    use crate::deck::Deck;
    use crate::history::HistoryDb;
    use crate::pair::Pair;
    use chrono::Local;
    use ratatui::{backend::TestBackend, Terminal};

    fn game(deck: &str, secs: f64) -> GameRecord {
        GameRecord {
            deck: deck.to_string(),
            pairs: 2,
            elapsed_secs: secs,
            wrong_attempts: 1,
            finished_at: Local::now(),
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn renders_rows_and_clamps_scroll() {
        let db = HistoryDb::open_in_memory().unwrap();
        for i in 0..30 {
            db.record(&game("demo", 10.0 + i as f64)).unwrap();
        }
        let deck = Deck::new("demo", vec![Pair::new("A", "1")]);
        let mut app = App::new(deck, &RuntimeSettings::default(), Some(db)).unwrap();
        app.open_history();
        assert_eq!(app.state, AppState::History);
        app.history_state.scroll_offset = 1000;

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| render_history(&mut app, f)).unwrap();

        assert!(app.history_state.scroll_offset < 30);
        let text = screen_text(&terminal);
        assert!(text.contains("Recent games"));
        assert!(text.contains("demo"));
    }

    #[test]
    fn renders_disabled_message_without_db() {
        let deck = Deck::new("demo", vec![Pair::new("A", "1")]);
        let mut app = App::new(deck, &RuntimeSettings::default(), None).unwrap();
        app.open_history();

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| render_history(&mut app, f)).unwrap();
        assert!(screen_text(&terminal).contains("History is disabled"));
    }
}
