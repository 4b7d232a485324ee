use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the matching engine itself
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// The pair set cannot be played; no session is produced
    #[error("invalid pair set: {0}")]
    InvalidInput(InputProblem),

    /// A caller passed a value the engine refuses (negative tick, bad penalty)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Why a pair set was refused at construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputProblem {
    #[error("no pairs were supplied")]
    Empty,
    #[error("pair {index} has an empty term")]
    EmptyTerm { index: usize },
    #[error("pair {index} has an empty definition")]
    EmptyDefinition { index: usize },
    #[error("term {term:?} appears more than once")]
    DuplicateTerm { term: String },
    #[error("definition {definition:?} appears more than once")]
    DuplicateDefinition { definition: String },
}

impl From<InputProblem> for MatchError {
    fn from(problem: InputProblem) -> Self {
        MatchError::InvalidInput(problem)
    }
}

/// Errors raised while reading a deck of pairs
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("failed to read deck: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON deck: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed CSV deck: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported deck format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("no bundled deck named {0:?}")]
    UnknownBundled(String),

    #[error(transparent)]
    Invalid(#[from] MatchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_problem_converts_into_match_error() {
        let err: MatchError = InputProblem::EmptyTerm { index: 3 }.into();
        assert_eq!(
            err,
            MatchError::InvalidInput(InputProblem::EmptyTerm { index: 3 })
        );
        assert_eq!(err.to_string(), "invalid pair set: pair 3 has an empty term");
    }

    #[test]
    fn deck_error_messages() {
        let err = DeckError::UnsupportedFormat(PathBuf::from("deck.txt"));
        assert_eq!(err.to_string(), "unsupported deck format: deck.txt");

        let err = DeckError::from(MatchError::from(InputProblem::Empty));
        assert_eq!(err.to_string(), "invalid pair set: no pairs were supplied");
    }
}
