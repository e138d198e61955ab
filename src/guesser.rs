use crate::learning::LearningState;
use crate::normalize::{normalize_letter, normalize_word};
use crate::solver::{HIDDEN, best_letter};
use crate::store::LearningStore;
use crate::{debug_log, info_log};
use std::collections::BTreeSet;

/// Result of playing one letter against the secret word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Positions revealed by this letter.
    Hit(Vec<usize>),
    Miss,
    AlreadyUsed,
}

/// Per-game state. Reset on every [`Guesser::start`].
#[derive(Clone, Debug, Default)]
struct Session {
    secret: Vec<char>,
    revealed: Vec<char>,
    used: BTreeSet<char>,
    attempts: usize,
    misses: usize,
}

/// Hangman letter guesser with learning that carries over between games.
pub struct Guesser<S: LearningStore> {
    session: Session,
    learning: LearningState,
    store: S,
}

impl<S: LearningStore> Guesser<S> {
    /// Builds a guesser, loading prior learning from `store`.
    ///
    /// Missing or unreadable learning data means starting from scratch.
    pub fn new(mut store: S) -> Self {
        let learning = match store.load() {
            Ok(Some(state)) => {
                info_log!(
                    "Loaded learning state: {} words, {} positions",
                    state.words.len(),
                    state.frequencies.len()
                );
                state
            }
            Ok(None) => {
                info_log!("No learning state found, starting fresh");
                LearningState::new()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable learning state: {e}");
                LearningState::new()
            }
        };
        Self {
            session: Session::default(),
            learning,
            store,
        }
    }

    /// Starts a new game for `secret`. Returns `false` and changes nothing if it is empty.
    pub fn start(&mut self, secret: &str) -> bool {
        if secret.is_empty() {
            debug_log!("start() - empty secret ignored");
            return false;
        }
        let normalized: Vec<char> = normalize_word(secret).chars().collect();
        self.session = Session {
            revealed: vec![HIDDEN; normalized.len()],
            secret: normalized,
            ..Session::default()
        };
        debug_log!("start() - new game, {} letters", self.session.secret.len());
        true
    }

    /// Picks the best unused letter and marks it used. `None` once all 26 are used.
    ///
    /// This does not reveal anything; pass the letter to [`Self::reveal`].
    pub fn guess_next_letter(&mut self) -> Option<char> {
        let (letter, _score) =
            best_letter(&self.session.revealed, &self.session.used, &self.learning)?;
        self.session.used.insert(letter);
        debug_log!("guess_next_letter() - '{}' scored {}", letter, _score);
        Some(letter)
    }

    /// Plays `letter` against the secret and reveals every matching position.
    pub fn reveal(&mut self, letter: char) -> GuessOutcome {
        let letter = normalize_letter(letter);
        self.session.used.insert(letter);
        self.session.attempts += 1;

        let positions: Vec<usize> = self
            .session
            .secret
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == letter)
            .map(|(i, _)| i)
            .collect();

        if positions.is_empty() {
            self.session.misses += 1;
            return GuessOutcome::Miss;
        }
        for &pos in &positions {
            self.session.revealed[pos] = letter;
        }
        GuessOutcome::Hit(positions)
    }

    /// A player's guess: rejects letters already used, otherwise [`Self::reveal`]s.
    pub fn try_letter(&mut self, letter: char) -> GuessOutcome {
        let letter = normalize_letter(letter.to_lowercase().next().unwrap_or(letter));
        if self.session.used.contains(&letter) {
            return GuessOutcome::AlreadyUsed;
        }
        self.reveal(letter)
    }

    /// True once a game is running and no position is hidden.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.session.revealed.is_empty() && !self.session.revealed.contains(&HIDDEN)
    }

    /// Learns from a finished word and writes the learning state back.
    ///
    /// A failed write is logged and otherwise ignored.
    pub fn record_completed_word(&mut self, word: &str) {
        self.learning.record_word(word);
        info_log!(
            "Recorded '{}', {} words learned",
            word,
            self.learning.words.len()
        );
        if let Err(e) = self.store.save(&self.learning) {
            log::warn!("Could not save learning state, keeping it in memory: {e}");
        }
    }

    #[must_use]
    pub fn revealed(&self) -> &[char] {
        &self.session.revealed
    }

    #[must_use]
    pub fn used_letters(&self) -> &BTreeSet<char> {
        &self.session.used
    }

    #[must_use]
    pub fn attempts(&self) -> usize {
        self.session.attempts
    }

    #[must_use]
    pub fn misses(&self) -> usize {
        self.session.misses
    }

    /// The normalized secret of the current game.
    #[must_use]
    pub fn secret(&self) -> String {
        self.session.secret.iter().collect()
    }

    #[must_use]
    pub fn learning(&self) -> &LearningState {
        &self.learning
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
