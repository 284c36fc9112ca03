/// Text to Morse symbol encoding
///
/// Encoding is pure: the same text always yields the same `EncodedMessage`, and an
/// unsupported character fails the whole message before anything is played.

use crate::error::MorseError;
use crate::symbol_table::{self, CharacterCode, Mark};

/// One unit of an encoded message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Dot,
    Dash,
    /// Separator after every letter or digit
    LetterGap,
    /// Separator produced by a space
    WordGap,
}

impl Symbol {
    /// Progress character for console rendering
    pub fn as_char(self) -> char {
        match self {
            Symbol::Dot => '.',
            Symbol::Dash => '-',
            Symbol::LetterGap => '|',
            Symbol::WordGap => ' ',
        }
    }

    pub fn is_tone(self) -> bool {
        matches!(self, Symbol::Dot | Symbol::Dash)
    }
}

impl From<Mark> for Symbol {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Dot => Symbol::Dot,
            Mark::Dash => Symbol::Dash,
        }
    }
}

/// A symbol together with the input character that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEvent {
    pub symbol: Symbol,
    pub source: char,
    /// Character (not byte) index of `source` in the input text
    pub index: usize,
}

/// Ordered, immutable symbol sequence for one input text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedMessage {
    events: Vec<SymbolEvent>,
}

impl EncodedMessage {
    pub fn events(&self) -> &[SymbolEvent] {
        &self.events
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.events.iter().map(|e| e.symbol)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of dots and dashes in the message
    pub fn tone_count(&self) -> usize {
        self.symbols().filter(|s| s.is_tone()).count()
    }

    /// Compact one-line rendering, e.g. ` ...|---|...|` for "SOS"
    pub fn morse_line(&self) -> String {
        let mut line = String::with_capacity(self.events.len() + 1);
        line.push(' ');
        line.extend(self.symbols().map(Symbol::as_char));
        line
    }
}

impl IntoIterator for EncodedMessage {
    type Item = SymbolEvent;
    type IntoIter = std::vec::IntoIter<SymbolEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

/// Encode text into Morse symbols
///
/// Each letter or digit contributes its dot/dash sequence followed by a `LetterGap`;
/// each space contributes a single `WordGap`.
///
/// # Examples
///
/// ```
/// use morse_player::encoder::{encode, Symbol};
///
/// let message = encode("Et").unwrap();
/// let symbols: Vec<Symbol> = message.symbols().collect();
/// assert_eq!(symbols, vec![Symbol::Dot, Symbol::LetterGap, Symbol::Dash, Symbol::LetterGap]);
/// ```
pub fn encode(text: &str) -> Result<EncodedMessage, MorseError> {
    let mut events = Vec::with_capacity(text.len() * 5);

    for (index, source) in text.chars().enumerate() {
        let code = symbol_table::lookup(source)
            .ok_or(MorseError::UnsupportedCharacter { character: source, index })?;

        match code {
            CharacterCode::WordGap => events.push(SymbolEvent { symbol: Symbol::WordGap, source, index }),
            CharacterCode::Marks(marks) => {
                events.extend(marks.iter().map(|&mark| SymbolEvent { symbol: mark.into(), source, index }));
                events.push(SymbolEvent { symbol: Symbol::LetterGap, source, index });
            }
        }
    }

    Ok(EncodedMessage { events })
}

/// Per-character breakdown, e.g. ` | S ... | O ---` for "SO"
pub fn letter_breakdown(text: &str) -> Result<String, MorseError> {
    let mut breakdown = String::new();

    for (index, source) in text.chars().enumerate() {
        let code = symbol_table::lookup(source)
            .ok_or(MorseError::UnsupportedCharacter { character: source, index })?;
        breakdown.push_str(&format!(" | {} {}", source, code));
    }

    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        let message = encode("").unwrap();
        assert!(message.is_empty());
        assert_eq!(message.tone_count(), 0);
    }

    #[test]
    fn test_sos_line() {
        let message = encode("SOS").unwrap();
        assert_eq!(message.morse_line(), " ...|---|...|");
        assert_eq!(message.tone_count(), 9);
    }

    #[test]
    fn test_space_is_single_word_gap() {
        let message = encode("A B").unwrap();
        let symbols: Vec<Symbol> = message.symbols().collect();
        assert_eq!(
            symbols,
            vec![
                Symbol::Dot, Symbol::Dash, Symbol::LetterGap,
                Symbol::WordGap,
                Symbol::Dash, Symbol::Dot, Symbol::Dot, Symbol::Dot, Symbol::LetterGap,
            ]
        );
    }

    #[test]
    fn test_events_carry_source_and_index() {
        let message = encode("hi").unwrap();
        let last = message.events().last().unwrap();
        assert_eq!(last.symbol, Symbol::LetterGap);
        assert_eq!(last.source, 'i');
        assert_eq!(last.index, 1);
    }

    #[test]
    fn test_unsupported_character_index() {
        let err = encode("Hello!").unwrap_err();
        assert_eq!(err, MorseError::UnsupportedCharacter { character: '!', index: 5 });
    }

    #[test]
    fn test_index_counts_characters_not_bytes() {
        let err = encode("ABé").unwrap_err();
        assert_eq!(err, MorseError::UnsupportedCharacter { character: 'é', index: 2 });
    }

    #[test]
    fn test_letter_breakdown() {
        assert_eq!(letter_breakdown("So 1").unwrap(), " | S ... | o --- |     | 1 .----");
    }
}
