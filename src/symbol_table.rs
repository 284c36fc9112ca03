/// International Morse Code lookup table
///
/// The table is built once on first access and never mutated afterwards. Keys are
/// uppercase; lookups normalize the input character first.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// One audible element of a character code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Dot,
    Dash,
}

impl Mark {
    pub fn as_char(self) -> char {
        match self {
            Mark::Dot => '.',
            Mark::Dash => '-',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Mark::Dot),
            '-' => Some(Mark::Dash),
            _ => None,
        }
    }
}

/// Table entry for a single character
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterCode {
    /// Non-empty dot/dash sequence for a letter or digit
    Marks(Vec<Mark>),
    /// The space character separates words
    WordGap,
}

impl CharacterCode {
    /// Dot/dash pattern as text, e.g. `.-` for `A` and a single space for the word gap
    pub fn pattern(&self) -> String {
        match self {
            CharacterCode::Marks(marks) => marks.iter().map(|m| m.as_char()).collect(),
            CharacterCode::WordGap => " ".to_string(),
        }
    }
}

impl fmt::Display for CharacterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern())
    }
}

// Canonical order, used for printing the dictionary
const CANONICAL: &[(char, &str)] = &[
    ('A', ".-"), ('B', "-..."), ('C', "-.-."), ('D', "-.."), ('E', "."), ('F', "..-."),
    ('G', "--."), ('H', "...."), ('I', ".."), ('J', ".---"), ('K', "-.-"), ('L', ".-.."),
    ('M', "--"), ('N', "-."), ('O', "---"), ('P', ".--."), ('Q', "--.-"), ('R', ".-."),
    ('S', "..."), ('T', "-"), ('U', "..-"), ('V', "...-"), ('W', ".--"), ('X', "-..-"),
    ('Y', "-.--"), ('Z', "--.."), ('0', "-----"), ('1', ".----"), ('2', "..---"),
    ('3', "...--"), ('4', "....-"), ('5', "....."), ('6', "-...."), ('7', "--..."),
    ('8', "---.."), ('9', "----."), (' ', " "),
];

static TABLE: LazyLock<HashMap<char, CharacterCode>> = LazyLock::new(|| {
    CANONICAL
        .iter()
        .map(|&(key, pattern)| {
            let code = if key == ' ' {
                CharacterCode::WordGap
            } else {
                CharacterCode::Marks(pattern.chars().filter_map(Mark::from_char).collect())
            };
            (key, code)
        })
        .collect()
});

/// Look up the code for a character (case-insensitive)
///
/// Returns `None` for anything outside A–Z, 0–9 and space; the encoder turns that
/// into `MorseError::UnsupportedCharacter` with the character's position.
pub fn lookup(character: char) -> Option<&'static CharacterCode> {
    TABLE.get(&character.to_ascii_uppercase())
}

/// All table entries in canonical order (A–Z, 0–9, space)
pub fn entries() -> impl Iterator<Item = (char, &'static CharacterCode)> {
    CANONICAL
        .iter()
        .filter_map(|&(key, _)| TABLE.get(&key).map(|code| (key, code)))
}
