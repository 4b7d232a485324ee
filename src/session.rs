//! The matching-game engine.
//!
//! A [`MatchSession`] owns one player's game over a fixed pair set. It is
//! purely reactive: the caller feeds it selections, clock ticks and the
//! "reveal delay elapsed" signal ([`MatchSession::resolve`]), and reads back
//! state to render. Nothing in here sleeps or spawns.

use crate::error::MatchError;
use crate::pair::{DuplicatePolicy, Pair, PairSet};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

/// Seconds added to the clock for every wrong match
pub const PENALTY_SECS: f64 = 2.0;

/// How long a resolved attempt stays on screen before it clears
pub const REVEAL_DELAY_MS: u64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Where the session is in its state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    AwaitingBoth,
    AwaitingOne,
    ShowingOutcome(Outcome),
    Complete,
}

/// What a selection call did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectResult {
    /// Input was locked, the game was over, or the value is not on the board
    Ignored,
    /// Stored; the other half is still missing
    Selected,
    /// Both halves were present and an attempt was judged
    Evaluated(Outcome),
}

/// Final score, surfaced once when the last pair is matched
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub elapsed_secs: f64,
    pub wrong_attempts: u32,
    pub pairs: usize,
}

impl Completion {
    pub fn summary(&self) -> String {
        format!(
            "Congratulations! You completed the game in {:.1} seconds with {} wrong attempts.",
            self.elapsed_secs, self.wrong_attempts
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionRules {
    pub penalty_secs: f64,
    pub duplicates: DuplicatePolicy,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            penalty_secs: PENALTY_SECS,
            duplicates: DuplicatePolicy::Allow,
        }
    }
}

#[derive(Debug)]
pub struct MatchSession {
    pairs: PairSet,
    rules: SessionRules,
    rng: StdRng,
    remaining: Vec<Pair>,
    matched: Vec<Pair>,
    definitions: Vec<String>,
    selected_term: Option<String>,
    selected_definition: Option<String>,
    outcome: Option<Outcome>,
    // index into `remaining` of the pair judged by the last evaluation
    judged: Option<usize>,
    elapsed_secs: f64,
    wrong_attempts: u32,
    running: bool,
    completion: Option<Completion>,
}

impl MatchSession {
    pub fn new(pairs: Vec<Pair>) -> Result<Self, MatchError> {
        Self::with_options(pairs, SessionRules::default(), StdRng::from_entropy())
    }

    pub fn with_seed(pairs: Vec<Pair>, seed: u64) -> Result<Self, MatchError> {
        Self::with_options(pairs, SessionRules::default(), StdRng::seed_from_u64(seed))
    }

    pub fn with_options(
        pairs: Vec<Pair>,
        rules: SessionRules,
        rng: StdRng,
    ) -> Result<Self, MatchError> {
        if !rules.penalty_secs.is_finite() || rules.penalty_secs < 0.0 {
            return Err(MatchError::InvalidArgument(format!(
                "penalty must be a non-negative number of seconds, got {}",
                rules.penalty_secs
            )));
        }

        let pairs = PairSet::new(pairs, rules.duplicates)?;
        let mut session = Self {
            remaining: Vec::with_capacity(pairs.len()),
            matched: Vec::with_capacity(pairs.len()),
            definitions: Vec::with_capacity(pairs.len()),
            pairs,
            rules,
            rng,
            selected_term: None,
            selected_definition: None,
            outcome: None,
            judged: None,
            elapsed_secs: 0.0,
            wrong_attempts: 0,
            running: true,
            completion: None,
        };
        session.restart();
        info!(pairs = session.pairs.len(), "match session created");
        Ok(session)
    }

    pub fn select_term(&mut self, term: &str) -> SelectResult {
        if self.input_locked() || !self.remaining.iter().any(|p| p.term == term) {
            return SelectResult::Ignored;
        }
        self.selected_term = Some(term.to_string());
        self.evaluate_if_ready()
    }

    pub fn select_definition(&mut self, definition: &str) -> SelectResult {
        if self.input_locked() || !self.definitions.iter().any(|d| d == definition) {
            return SelectResult::Ignored;
        }
        self.selected_definition = Some(definition.to_string());
        self.evaluate_if_ready()
    }

    /// Apply the transition deferred by the last evaluation.
    ///
    /// The caller invokes this once the reveal delay has elapsed. Returns the
    /// completion when this call matched the final pair.
    pub fn resolve(&mut self) -> Option<Completion> {
        let outcome = self.outcome?;

        if outcome == Outcome::Correct {
            if let Some(index) = self.judged {
                let pair = self.remaining.remove(index);
                if let Some(pos) = self.definitions.iter().position(|d| *d == pair.definition) {
                    self.definitions.remove(pos);
                }
                self.matched.push(pair);
            }
        }
        self.clear_attempt();

        if outcome == Outcome::Correct && self.remaining.is_empty() {
            self.running = false;
            let completion = Completion {
                elapsed_secs: self.elapsed_secs,
                wrong_attempts: self.wrong_attempts,
                pairs: self.pairs.len(),
            };
            info!(
                elapsed_secs = completion.elapsed_secs,
                wrong_attempts = completion.wrong_attempts,
                "match session complete"
            );
            self.completion = Some(completion.clone());
            return Some(completion);
        }
        None
    }

    pub fn tick(&mut self, delta_secs: f64) -> Result<(), MatchError> {
        if !delta_secs.is_finite() || delta_secs < 0.0 {
            return Err(MatchError::InvalidArgument(format!(
                "tick delta must be a non-negative number of seconds, got {delta_secs}"
            )));
        }
        if self.running {
            self.elapsed_secs += delta_secs;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.restart();
        debug!("match session reset");
    }

    fn restart(&mut self) {
        self.remaining = self.pairs.pairs().to_vec();
        self.matched.clear();
        self.definitions = self.pairs.definitions();
        self.definitions.shuffle(&mut self.rng);
        self.clear_attempt();
        self.elapsed_secs = 0.0;
        self.wrong_attempts = 0;
        self.running = true;
        self.completion = None;
    }

    fn input_locked(&self) -> bool {
        self.outcome.is_some() || self.remaining.is_empty()
    }

    fn evaluate_if_ready(&mut self) -> SelectResult {
        let (Some(term), Some(definition)) = (&self.selected_term, &self.selected_definition)
        else {
            return SelectResult::Selected;
        };

        // first remaining pair with this term decides
        let judged = self.remaining.iter().position(|p| p.term == *term);
        let correct = judged.is_some_and(|i| self.remaining[i].definition == *definition);
        debug!(term = %term, definition = %definition, correct, "evaluated attempt");

        let outcome = if correct {
            self.judged = judged;
            Outcome::Correct
        } else {
            self.wrong_attempts += 1;
            self.elapsed_secs += self.rules.penalty_secs;
            Outcome::Incorrect
        };
        self.outcome = Some(outcome);
        SelectResult::Evaluated(outcome)
    }

    fn clear_attempt(&mut self) {
        self.selected_term = None;
        self.selected_definition = None;
        self.outcome = None;
        self.judged = None;
    }

    pub fn pairs(&self) -> &[Pair] {
        self.pairs.pairs()
    }

    pub fn rules(&self) -> SessionRules {
        self.rules
    }

    pub fn remaining(&self) -> &[Pair] {
        &self.remaining
    }

    pub fn matched(&self) -> &[Pair] {
        &self.matched
    }

    /// Definitions still on the board, in presentation order
    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }

    pub fn selected_term(&self) -> Option<&str> {
        self.selected_term.as_deref()
    }

    pub fn selected_definition(&self) -> Option<&str> {
        self.selected_definition.as_deref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn phase(&self) -> Phase {
        if self.remaining.is_empty() {
            return Phase::Complete;
        }
        match (self.outcome, &self.selected_term, &self.selected_definition) {
            (Some(outcome), _, _) => Phase::ShowingOutcome(outcome),
            (None, None, None) => Phase::AwaitingBoth,
            _ => Phase::AwaitingOne,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn wrong_attempts(&self) -> u32 {
        self.wrong_attempts
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// (matched, total)
    pub fn progress(&self) -> (usize, usize) {
        (self.matched.len(), self.pairs.len())
    }
}
