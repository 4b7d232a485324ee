use crate::error::{InputProblem, MatchError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One term/definition unit of game content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub term: String,
    pub definition: String,
}

impl Pair {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// How repeated terms or definitions are treated when a pair set is built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// Keep duplicates; lookups resolve to the first remaining pair
    #[default]
    Allow,
    /// Refuse any pair set that repeats a term or a definition
    Reject,
}

/// An ordered, validated, non-empty sequence of pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSet {
    pairs: Vec<Pair>,
}

impl PairSet {
    pub fn new(pairs: Vec<Pair>, policy: DuplicatePolicy) -> Result<Self, MatchError> {
        if pairs.is_empty() {
            return Err(InputProblem::Empty.into());
        }

        for (index, pair) in pairs.iter().enumerate() {
            if pair.term.is_empty() {
                return Err(InputProblem::EmptyTerm { index }.into());
            }
            if pair.definition.is_empty() {
                return Err(InputProblem::EmptyDefinition { index }.into());
            }
        }

        if policy == DuplicatePolicy::Reject {
            if let Some(term) = first_duplicate(pairs.iter().map(|p| p.term.as_str())) {
                return Err(InputProblem::DuplicateTerm { term }.into());
            }
            if let Some(definition) = first_duplicate(pairs.iter().map(|p| p.definition.as_str()))
            {
                return Err(InputProblem::DuplicateDefinition { definition }.into());
            }
        }

        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Always false for a constructed set; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn definitions(&self) -> Vec<String> {
        self.pairs.iter().map(|p| p.definition.clone()).collect()
    }
}

fn first_duplicate<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    values
        .duplicates()
        .next()
        .map(|value| value.to_string())
}
