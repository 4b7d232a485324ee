// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod deck;
pub mod error;
pub mod history;
pub mod logging;
pub mod pair;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod util;

pub use error::{DeckError, InputProblem, MatchError};
pub use pair::{DuplicatePolicy, Pair};
pub use session::{Completion, MatchSession, Outcome, Phase, SelectResult, SessionRules};
