/// Sine tone synthesis for dots and dashes
///
/// Every buffer starts at phase 0, so consecutive tones are not phase-continuous and a
/// faint click can be heard at each onset. Buffers are regenerated for every tone.

use std::f64::consts::PI;

use crate::config::TimingConfig;
use crate::constants::audio::{CHANNELS, SAMPLE_RATE};
use crate::constants::timing::DASH_UNITS;
use crate::error::MorseError;
use crate::symbol_table::Mark;

/// Interleaved 16-bit samples for a single tone
#[derive(Debug, Clone, PartialEq)]
pub struct ToneBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl ToneBuffer {
    /// Interleaved samples (L, R, L, R, ...)
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_ms(&self) -> f64 {
        self.frames() as f64 * 1000.0 / self.sample_rate as f64
    }
}

pub struct ToneSynthesizer {
    sample_rate: u32,
    amplitude: f64,
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ToneSynthesizer {
    /// Create a synthesizer at the fixed 44.1 kHz rate; `amplitude` is clamped to 0..=1
    pub fn new(amplitude: f64) -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            amplitude: amplitude.clamp(0.0, 1.0),
        }
    }

    /// Frame count for a duration, truncated to whole frames
    pub fn frames_for(&self, duration_ms: f64) -> usize {
        (self.sample_rate as f64 * duration_ms / 1000.0) as usize
    }

    /// Generate a stereo sine tone of the given frequency and duration
    pub fn synthesize(&self, frequency_hz: f64, duration_ms: f64) -> Result<ToneBuffer, MorseError> {
        check_positive("pitch_hz", frequency_hz)?;
        check_positive("duration_ms", duration_ms)?;
        Ok(self.render(frequency_hz, self.frames_for(duration_ms)))
    }

    /// Tone for one dot or dash
    ///
    /// The dash is rendered as exactly three dot lengths of frames, so rounding never
    /// skews the 1:3 ratio.
    pub fn tone_for(&self, mark: Mark, timing: &TimingConfig) -> Result<ToneBuffer, MorseError> {
        timing.validate()?;
        let dot_frames = self.frames_for(timing.dot_duration_ms);
        let frames = match mark {
            Mark::Dot => dot_frames,
            Mark::Dash => dot_frames * DASH_UNITS as usize,
        };
        Ok(self.render(timing.pitch_hz, frames))
    }

    fn render(&self, frequency_hz: f64, frames: usize) -> ToneBuffer {
        let channels = CHANNELS as usize;
        let scale = i16::MAX as f64 * self.amplitude;
        let step = 2.0 * PI * frequency_hz / self.sample_rate as f64;

        let mut samples = Vec::with_capacity(frames * channels);
        for n in 0..frames {
            let value = ((step * n as f64).sin() * scale) as i16;
            samples.extend(std::iter::repeat(value).take(channels));
        }

        ToneBuffer {
            samples,
            sample_rate: self.sample_rate,
            channels: CHANNELS,
        }
    }
}

fn check_positive(parameter: &'static str, value: f64) -> Result<(), MorseError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MorseError::InvalidTimingConfig { parameter, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_for_42ms() {
        let synth = ToneSynthesizer::default();
        let tone = synth.synthesize(2000.0, 42.0).unwrap();
        assert_eq!(tone.frames(), 1852);
        assert_eq!(tone.samples().len(), 1852 * 2);
        assert_eq!(tone.sample_rate(), 44100);
        assert!((tone.duration_ms() - 42.0).abs() < 0.03);
    }

    #[test]
    fn test_starts_at_phase_zero() {
        let synth = ToneSynthesizer::default();
        let tone = synth.synthesize(1000.0, 10.0).unwrap();
        assert_eq!(tone.samples()[0], 0);
        assert_eq!(tone.samples()[1], 0);
    }

    #[test]
    fn test_channels_are_identical() {
        let synth = ToneSynthesizer::default();
        let tone = synth.synthesize(700.0, 20.0).unwrap();
        for frame in tone.samples().chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn test_full_scale_peak() {
        let synth = ToneSynthesizer::default();
        // 441 Hz at 44.1 kHz puts a sample exactly on the quarter period
        let tone = synth.synthesize(441.0, 100.0).unwrap();
        let peak = tone.samples().iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak >= 32766, "peak was {}", peak);
    }

    #[test]
    fn test_amplitude_scaling() {
        let synth = ToneSynthesizer::new(0.5);
        let tone = synth.synthesize(441.0, 100.0).unwrap();
        let peak = tone.samples().iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak <= 16384, "peak was {}", peak);
        assert!(peak >= 16382, "peak was {}", peak);
    }

    #[test]
    fn test_rejects_non_positive_input() {
        let synth = ToneSynthesizer::default();
        assert!(matches!(
            synth.synthesize(0.0, 42.0),
            Err(MorseError::InvalidTimingConfig { parameter: "pitch_hz", .. })
        ));
        assert!(matches!(
            synth.synthesize(2000.0, -1.0),
            Err(MorseError::InvalidTimingConfig { parameter: "duration_ms", .. })
        ));
        assert!(synth.synthesize(f64::NAN, 42.0).is_err());
    }
}
