use thiserror::Error;

/// Errors raised by the encoding and playback core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MorseError {
    #[error("Unsupported character {character:?} at index {index}")]
    UnsupportedCharacter { character: char, index: usize },

    #[error("Invalid timing config: {parameter} must be a positive number (got {value})")]
    InvalidTimingConfig { parameter: &'static str, value: f64 },

    #[error("Audio device unavailable: {0}")]
    AudioDeviceUnavailable(String),
}
