// Library exports for testing
pub mod audio;
pub mod config;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod symbol_table;
pub mod synth;

pub use error::MorseError;
