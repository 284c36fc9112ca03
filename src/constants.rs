/// Application-wide constants for tone synthesis and Morse timing

pub mod audio {
    /// Sample rate of every synthesized tone buffer
    pub const SAMPLE_RATE: u32 = 44100;

    /// Tone buffers are interleaved stereo (left, right)
    pub const CHANNELS: u16 = 2;
}

pub mod timing {
    /// Length of a dash in dot units
    pub const DASH_UNITS: u32 = 3;

    /// Silence after every dot or dash
    pub const INTRA_SYMBOL_UNITS: u32 = 1;

    /// Extra silence added by a letter gap on top of the post-symbol gap (3 units total)
    pub const LETTER_GAP_EXTRA_UNITS: u32 = 2;

    /// Extra silence added by a word gap on top of the post-symbol gap (7 units total)
    pub const WORD_GAP_EXTRA_UNITS: u32 = 6;

    /// Longest single silence the scheduler ever waits out
    pub const WORD_GAP_TOTAL_UNITS: u32 = INTRA_SYMBOL_UNITS + WORD_GAP_EXTRA_UNITS;

    /// Upper bound on the dot duration, keeps a dash buffer to a sane allocation
    pub const MAX_DOT_DURATION_MS: f64 = 60_000.0;

    /// A gap_scale of this value maps one silence unit to exactly one dot duration
    pub const NEUTRAL_GAP_SCALE: f64 = 1000.0;
}

pub mod defaults {
    /// Dot duration in milliseconds
    pub const DOT_DURATION_MS: f64 = 42.0;

    /// Tone pitch in Hz
    pub const PITCH_HZ: f64 = 2000.0;

    /// Silence stretch divisor (1000 = textbook timing, lower = longer silences)
    pub const GAP_SCALE: f64 = 300.0;

    pub const TEXT: &str = "This is a morse code program written in 2024 as a bit of fun and a learning tool";
}
