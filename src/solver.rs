use crate::learning::LearningState;
use crate::normalize::can_bear_accent;
use std::collections::{BTreeSet, HashSet};

pub const HIDDEN: char = '_';
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";
pub const VOWELS: &str = "aeiou";

pub const START_LETTERS: &str = "capemdtsfr";
pub const MIDDLE_LETTERS: &str = "aeiorstndml";
pub const END_LETTERS: &str = "aosremldiu";

const BIGRAMS: [&str; 9] = ["ar", "er", "os", "as", "do", "es", "de", "ra", "ao"];

const SYLLABLES: [&str; 24] = [
    "ca", "co", "ce", "ci", "ta", "to", "te", "ti", "pa", "po", "pe", "pi", "ma", "mo", "me", "mi",
    "da", "do", "de", "di", "ra", "ro", "re", "ri",
];

const POSITION_EDGE_BONUS: u32 = 3;
const POSITION_MIDDLE_BONUS: u32 = 2;
const LEARNED_WEIGHT: u32 = 2;
const PATTERN_BONUS: u32 = 4;
const LONG_WORD_VOWEL_BONUS: u32 = 2;
const LONG_WORD_THRESHOLD: usize = 8;
const ACCENT_BONUS: u32 = 1;

fn is_vowel(letter: char) -> bool {
    VOWELS.contains(letter)
}

// Pairs are two ASCII letters.
fn halves(pair: &str) -> (char, char) {
    let bytes = pair.as_bytes();
    (char::from(bytes[0]), char::from(bytes[1]))
}

/// Letters the current revealed state points towards.
///
/// Three rules feed the set: bigram adjacency next to revealed letters,
/// syllable pairing, and all vowels once any consonant is showing.
///
/// Known imprecision: the syllable rule only asks whether the flat pattern
/// contains a letter and a blank *anywhere*, not next to each other.
#[must_use]
pub fn pattern_predicted(revealed: &[char]) -> HashSet<char> {
    let mut likely = HashSet::new();

    for window in revealed.windows(2) {
        let (left, right) = (window[0], window[1]);
        if left != HIDDEN && right == HIDDEN {
            for (first, second) in BIGRAMS.iter().map(|b| halves(b)) {
                if first == left {
                    likely.insert(second);
                }
            }
        } else if left == HIDDEN && right != HIDDEN {
            for (first, second) in BIGRAMS.iter().map(|b| halves(b)) {
                if second == right {
                    likely.insert(first);
                }
            }
        }
    }

    let has_blank = revealed.contains(&HIDDEN);
    if has_blank {
        for (first, second) in SYLLABLES.iter().map(|s| halves(s)) {
            if revealed.contains(&first) {
                likely.insert(second);
            } else if revealed.contains(&second) {
                likely.insert(first);
            }
        }
    }

    if revealed.iter().any(|&c| c != HIDDEN && !is_vowel(c)) {
        likely.extend(VOWELS.chars());
    }

    likely
}

/// Score of guessing `letter` for the hidden slot at `position`.
#[must_use]
pub fn score_letter(
    letter: char,
    position: usize,
    word_len: usize,
    learned: &LearningState,
    predicted: &HashSet<char>,
) -> u32 {
    let mut score: u32 = 0;

    if position == 0 && START_LETTERS.contains(letter) {
        score += POSITION_EDGE_BONUS;
    } else if position + 1 == word_len && END_LETTERS.contains(letter) {
        score += POSITION_EDGE_BONUS;
    } else if MIDDLE_LETTERS.contains(letter) {
        score += POSITION_MIDDLE_BONUS;
    }

    // Learned counts come from disk and may be arbitrarily large.
    score = score.saturating_add(learned.count(position, letter).saturating_mul(LEARNED_WEIGHT));

    if predicted.contains(&letter) {
        score = score.saturating_add(PATTERN_BONUS);
    }

    if is_vowel(letter) && word_len > LONG_WORD_THRESHOLD {
        score = score.saturating_add(LONG_WORD_VOWEL_BONUS);
    }

    if can_bear_accent(letter) {
        score = score.saturating_add(ACCENT_BONUS);
    }

    score
}

/// Sum of [`score_letter`] over every hidden position of `revealed`.
#[must_use]
pub fn total_score(
    letter: char,
    revealed: &[char],
    learned: &LearningState,
    predicted: &HashSet<char>,
) -> u32 {
    revealed
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == HIDDEN)
        .map(|(pos, _)| score_letter(letter, pos, revealed.len(), learned, predicted))
        .fold(0, u32::saturating_add)
}

/// Highest scoring unused letter, scanning `a..=z` so the first maximum wins ties.
#[must_use]
pub fn best_letter(
    revealed: &[char],
    used: &BTreeSet<char>,
    learned: &LearningState,
) -> Option<(char, u32)> {
    let predicted = pattern_predicted(revealed);
    let mut best: Option<(char, u32)> = None;
    for letter in ALPHABET.chars().filter(|c| !used.contains(c)) {
        let score = total_score(letter, revealed, learned, &predicted);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((letter, score)),
        }
    }
    best
}
