use crate::app_dirs::AppDirs;
use crate::session::Completion;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

/// One finished game
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub deck: String,
    pub pairs: usize,
    pub elapsed_secs: f64,
    pub wrong_attempts: u32,
    pub finished_at: DateTime<Local>,
}

impl GameRecord {
    pub fn from_completion(deck: &str, completion: &Completion) -> Self {
        Self {
            deck: deck.to_string(),
            pairs: completion.pairs,
            elapsed_secs: completion.elapsed_secs,
            wrong_attempts: completion.wrong_attempts,
            finished_at: Local::now(),
        }
    }
}

/// Database of completed games
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open the history under the state directory
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("termatch_history.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                deck TEXT NOT NULL,
                pairs INTEGER NOT NULL,
                elapsed_secs REAL NOT NULL,
                wrong_attempts INTEGER NOT NULL,
                finished_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_games_deck ON games(deck)",
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    pub fn record(&self, game: &GameRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO games (deck, pairs, elapsed_secs, wrong_attempts, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                game.deck,
                game.pairs as i64,
                game.elapsed_secs,
                game.wrong_attempts,
                game.finished_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recently recorded games first
    pub fn recent(&self, limit: usize) -> Result<Vec<GameRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT deck, pairs, elapsed_secs, wrong_attempts, finished_at
            FROM games
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let finished_at: String = row.get(4)?;
            let finished_at = DateTime::parse_from_rfc3339(&finished_at)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        4,
                        "finished_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(GameRecord {
                deck: row.get(0)?,
                pairs: row.get::<_, i64>(1)? as usize,
                elapsed_secs: row.get(2)?,
                wrong_attempts: row.get(3)?,
                finished_at,
            })
        })?;

        let games = rows.collect::<Result<Vec<_>>>()?;
        Ok(games)
    }

    /// Fastest completion recorded for a deck
    pub fn best_time(&self, deck: &str) -> Result<Option<f64>> {
        self.conn.query_row(
            "SELECT MIN(elapsed_secs) FROM games WHERE deck = ?1",
            [deck],
            |row| row.get(0),
        )
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM games", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn record(deck: &str, secs: f64, wrong: u32, minutes_ago: i64) -> GameRecord {
        GameRecord {
            deck: deck.to_string(),
            pairs: 6,
            elapsed_secs: secs,
            wrong_attempts: wrong,
            finished_at: Local::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn records_and_lists_recent_first() {
        let db = HistoryDb::open_in_memory().unwrap();
        db.record(&record("a", 30.0, 1, 10)).unwrap();
        db.record(&record("b", 20.0, 0, 5)).unwrap();
        db.record(&record("a", 25.5, 2, 1)).unwrap();

        let recent = db.recent(10).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].elapsed_secs, 25.5);
        assert_eq!(recent[0].wrong_attempts, 2);
        assert_eq!(recent[2].deck, "a");
        assert_eq!(recent[2].pairs, 6);

        assert_eq!(db.recent(1).unwrap().len(), 1);
        assert_eq!(db.count().unwrap(), 3);
    }

    #[test]
    fn recent_follows_recording_order_not_timestamp_text() {
        let db = HistoryDb::open_in_memory().unwrap();
        // a clock or zone change can stamp a later game with an earlier-looking time
        db.record(&record("a", 10.0, 0, 0)).unwrap();
        db.record(&record("a", 11.0, 0, 90)).unwrap();

        let recent = db.recent(10).unwrap();
        assert_eq!(recent[0].elapsed_secs, 11.0);
        assert_eq!(recent[1].elapsed_secs, 10.0);
    }

    #[test]
    fn best_time_per_deck() {
        let db = HistoryDb::open_in_memory().unwrap();
        assert_eq!(db.best_time("a").unwrap(), None);

        db.record(&record("a", 30.0, 1, 3)).unwrap();
        db.record(&record("a", 22.0, 0, 2)).unwrap();
        db.record(&record("b", 5.0, 0, 1)).unwrap();

        assert_eq!(db.best_time("a").unwrap(), Some(22.0));
        assert_eq!(db.best_time("b").unwrap(), Some(5.0));
    }

    #[test]
    fn clear_removes_everything() {
        let db = HistoryDb::open_in_memory().unwrap();
        db.record(&record("a", 1.0, 0, 0)).unwrap();
        db.clear().unwrap();
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("history.db");
        {
            let db = HistoryDb::open(&path).unwrap();
            db.record(&record("deck", 12.5, 1, 0)).unwrap();
        }
        let db = HistoryDb::open(&path).unwrap();
        assert_eq!(db.best_time("deck").unwrap(), Some(12.5));
    }

    #[test]
    fn from_completion_copies_score() {
        let completion = Completion {
            elapsed_secs: 9.5,
            wrong_attempts: 3,
            pairs: 4,
        };
        let game = GameRecord::from_completion("bio", &completion);
        assert_eq!(game.deck, "bio");
        assert_eq!(game.pairs, 4);
        assert_eq!(game.elapsed_secs, 9.5);
        assert_eq!(game.wrong_attempts, 3);
    }
}
