/// Base letters and the accented variants that count as the same letter.
pub const ACCENT_TABLE: [(char, &str); 7] = [
    ('a', "áàâãä"),
    ('e', "éèêë"),
    ('i', "íìîï"),
    ('o', "óòôõö"),
    ('u', "úùûü"),
    ('c', "ç"),
    ('n', "ñ"),
];

/// Maps an accented letter to its base letter. Anything else is returned as-is.
#[must_use]
pub fn normalize_letter(letter: char) -> char {
    ACCENT_TABLE
        .iter()
        .find(|(_, variants)| variants.contains(letter))
        .map_or(letter, |&(base, _)| base)
}

/// Lower-cases `word` and folds every accented letter to its base letter.
///
/// The result is the internal matching representation of a secret word and
/// `normalize_word(normalize_word(w)) == normalize_word(w)` always holds.
#[must_use]
pub fn normalize_word(word: &str) -> String {
    word.to_lowercase().chars().map(normalize_letter).collect()
}

/// True for base letters that have accented variants in [`ACCENT_TABLE`].
#[must_use]
pub fn can_bear_accent(letter: char) -> bool {
    ACCENT_TABLE.iter().any(|&(base, _)| base == letter)
}
