use crate::normalize::normalize_word;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Observed letter counts per word position, accumulated over completed games.
pub type FrequencyTable = BTreeMap<usize, BTreeMap<char, u32>>;

/// Everything the guesser learns across games.
///
/// This is the exact record written to and read from a [`crate::store::LearningStore`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningState {
    /// Raw completed words in the order they were played.
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub frequencies: FrequencyTable,
}

impl LearningState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Learned count for `letter` at `position`, 0 when never seen.
    #[must_use]
    pub fn count(&self, position: usize, letter: char) -> u32 {
        self.frequencies
            .get(&position)
            .and_then(|letters| letters.get(&letter))
            .copied()
            .unwrap_or(0)
    }

    /// Appends `word` to the history and counts each normalized letter at its position.
    pub fn record_word(&mut self, word: &str) {
        self.words.push(word.to_string());
        for (position, letter) in normalize_word(word).chars().enumerate() {
            let count = self
                .frequencies
                .entry(position)
                .or_default()
                .entry(letter)
                .or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    /// Most frequent letter at `position`; the alphabetically first one wins ties.
    #[must_use]
    pub fn most_common(&self, position: usize) -> Option<(char, u32)> {
        self.frequencies.get(&position).and_then(|letters| {
            letters
                .iter()
                .fold(None, |best: Option<(char, u32)>, (&letter, &count)| match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((letter, count)),
                })
        })
    }
}
