pub mod history;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::{
    app::{App, AppState, Column},
    session::Outcome,
    util::{format_secs, wrap_to_width},
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const CURSOR_MARKER: &str = "> ";

/// Colour of a card given whether it is part of the current selection
pub fn card_style(selected: bool, outcome: Option<Outcome>) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match (selected, outcome) {
        (true, Some(Outcome::Correct)) => bold.fg(Color::Green),
        (true, Some(Outcome::Incorrect)) => bold.fg(Color::Red),
        (true, None) => bold.fg(Color::Blue),
        (false, _) => Style::default(),
    }
}

/// Lines for one column plus the line index where the cursor's card starts
fn column_lines<'a>(
    cards: impl Iterator<Item = &'a str>,
    selected: Option<usize>,
    outcome: Option<Outcome>,
    cursor: Option<usize>,
    width: usize,
) -> (Vec<Line<'static>>, usize) {
    let text_width = width.saturating_sub(CURSOR_MARKER.len()).max(1);
    let mut lines = Vec::new();
    let mut cursor_line = 0;

    for (idx, card) in cards.enumerate() {
        let at_cursor = cursor == Some(idx);
        if at_cursor {
            cursor_line = lines.len();
        }

        let mut style = card_style(selected == Some(idx), outcome);
        if at_cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }

        for (n, text) in wrap_to_width(card, text_width).into_iter().enumerate() {
            let marker = if at_cursor && n == 0 { CURSOR_MARKER } else { "  " };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(text, style),
            ]));
        }
        lines.push(Line::default());
    }

    (lines, cursor_line)
}

fn render_column(
    title: &str,
    lines: Vec<Line<'static>>,
    cursor_line: usize,
    focused: bool,
    area: Rect,
    buf: &mut Buffer,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    // keep the cursor's card in view
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = cursor_line.saturating_sub(visible.saturating_sub(3));

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title.to_string()),
        )
        .scroll((scroll as u16, 0))
        .render(area, buf);
}

impl App {
    fn render_board(&self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // clock and progress
                Constraint::Min(3),    // columns
                Constraint::Length(1), // legend
            ])
            .split(area);

        let (done, total) = session.progress();
        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                format!(
                    "Time: {} | Wrong Attempts: {}",
                    format_secs(session.elapsed_secs()),
                    session.wrong_attempts()
                ),
                bold_style,
            )),
            Line::from(Span::styled(
                format!("{} · matched {}/{}", self.deck_name, done, total),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .alignment(Alignment::Center);
        header.render(chunks[0], buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        for (column, area) in [(Column::Terms, columns[0]), (Column::Definitions, columns[1])] {
            let focused = self.focus == column;
            let inner_width = area.width.saturating_sub(2) as usize;
            let (title, lines, cursor_line) = match column {
                Column::Terms => {
                    let (lines, cursor_line) = column_lines(
                        session.remaining().iter().map(|p| p.term.as_str()),
                        self.picked_term.filter(|_| session.selected_term().is_some()),
                        session.outcome(),
                        focused.then_some(self.term_cursor),
                        inner_width,
                    );
                    ("Terms", lines, cursor_line)
                }
                Column::Definitions => {
                    let (lines, cursor_line) = column_lines(
                        session.definitions().iter().map(String::as_str),
                        self.picked_definition
                            .filter(|_| session.selected_definition().is_some()),
                        session.outcome(),
                        focused.then_some(self.definition_cursor),
                        inner_width,
                    );
                    ("Definitions", lines, cursor_line)
                }
            };
            render_column(title, lines, cursor_line, focused, area, buf);
        }

        let legend = Paragraph::new(Span::styled(
            "←/→ column  ↑/↓ move  (enter) select  (ctrl-r) restart  (esc)ape",
            italic_style,
        ))
        .alignment(Alignment::Center);
        legend.render(chunks[2], buf);
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let Some(finish) = &self.finish else {
            return;
        };

        let title_style = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let best_line = if finish.is_new_best() {
            Line::from(Span::styled(
                format!("New best time for {}!", self.deck_name),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(format!(
                "Best time for {}: {}",
                self.deck_name,
                format_secs(finish.previous_best.unwrap_or_default())
            ))
        };

        let mut lines = vec![
            Line::from(Span::styled("Congratulations!", title_style)),
            Line::default(),
            Line::from(finish.completion.summary()),
            Line::default(),
        ];
        if self.history.is_some() {
            lines.push(best_line);
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            "(r)estart / (s)tats history / (esc)ape",
            italic_style,
        )));

        let height = lines.len() as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(area.height.saturating_sub(height) / 2),
                Constraint::Length(height),
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Summary => self.render_summary(area, buf),
            AppState::Playing | AppState::History => self.render_board(area, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeSettings;
    use crate::deck::Deck;
    use crate::history::HistoryDb;
    use crate::pair::Pair;
    use std::time::{Duration, Instant};

    fn app_with(history: Option<HistoryDb>) -> App {
        let deck = Deck::new("demo", vec![Pair::new("A", "1"), Pair::new("B", "2")]);
        let settings = RuntimeSettings {
            seed: Some(5),
            ..RuntimeSettings::default()
        };
        App::new(deck, &settings, history).unwrap()
    }

    fn app() -> App {
        app_with(None)
    }

    fn render_to_string(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_card_style() {
        assert_eq!(card_style(false, Some(Outcome::Correct)), Style::default());
        assert_eq!(card_style(true, None).fg, Some(Color::Blue));
        assert_eq!(card_style(true, Some(Outcome::Correct)).fg, Some(Color::Green));
        assert_eq!(card_style(true, Some(Outcome::Incorrect)).fg, Some(Color::Red));
    }

    #[test]
    fn test_column_lines_marks_cursor() {
        let (lines, cursor_line) = column_lines(
            ["alpha", "beta"].into_iter(),
            Some(1),
            None,
            Some(1),
            20,
        );
        // each card is followed by a blank spacer line
        assert_eq!(lines.len(), 4);
        assert_eq!(cursor_line, 2);
        assert_eq!(lines[2].spans[0].content, CURSOR_MARKER);
        assert_eq!(lines[2].spans[1].style.fg, Some(Color::Blue));
        assert_eq!(lines[0].spans[0].content, "  ");
    }

    #[test]
    fn test_column_lines_styles_only_picked_duplicate() {
        let (lines, _) = column_lines(["same", "same", "other"].into_iter(), Some(1), None, None, 20);
        assert_eq!(lines[0].spans[1].style, Style::default());
        assert_eq!(lines[2].spans[1].style.fg, Some(Color::Blue));
        assert_eq!(lines[4].spans[1].style, Style::default());
    }

    #[test]
    fn test_board_shows_header_and_cards() {
        let app = app();
        let screen = render_to_string(&app, 80, 20);
        assert!(screen.contains("Time: 0.0s | Wrong Attempts: 0"));
        assert!(screen.contains("matched 0/2"));
        assert!(screen.contains("Terms"));
        assert!(screen.contains("Definitions"));
    }

    #[test]
    fn test_summary_screen() {
        let mut app = app_with(Some(HistoryDb::open_in_memory().unwrap()));
        let now = Instant::now();
        app.start(now);
        for (term, definition) in [("A", "1"), ("B", "2")] {
            app.session.select_term(term);
            app.session.select_definition(definition);
            app.reveal.schedule(now);
            app.on_tick(now + Duration::from_secs(1));
        }
        assert_eq!(app.state, AppState::Summary);

        let screen = render_to_string(&app, 100, 20);
        assert!(screen.contains("Congratulations!"));
        assert!(screen.contains("New best time for demo!"));

        let without_history = {
            let mut app = app_with(None);
            app.finish = app_finish(&app);
            app.state = AppState::Summary;
            render_to_string(&app, 100, 20)
        };
        assert!(without_history.contains("Congratulations!"));
        assert!(!without_history.contains("best time"));
    }

    fn app_finish(app: &App) -> Option<crate::app::Finish> {
        Some(crate::app::Finish {
            completion: crate::session::Completion {
                elapsed_secs: 3.0,
                wrong_attempts: 0,
                pairs: app.session.pairs().len(),
            },
            previous_best: None,
        })
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        let app = app();
        let _ = render_to_string(&app, 4, 3);
    }
}
