/// Playback state machine for encoded Morse messages
///
/// The scheduler turns an `EncodedMessage` into an ordered list of steps (tones and
/// silences) and can drive them against an audio output. Stepping is separate from
/// running so the timing can be inspected without sleeping or producing sound.

use std::iter::Peekable;
use std::time::Duration;

use anyhow::Result;

use crate::audio::AudioOutput;
use crate::config::{TimingConfig, WordGapMode};
use crate::constants::timing::{
    INTRA_SYMBOL_UNITS, LETTER_GAP_EXTRA_UNITS, WORD_GAP_EXTRA_UNITS, WORD_GAP_TOTAL_UNITS,
};
use crate::encoder::{EncodedMessage, Symbol, SymbolEvent};
use crate::error::MorseError;
use crate::symbol_table::Mark;
use crate::synth::ToneSynthesizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    EmittingTone(Mark),
    PausingIntraSymbol,
    PausingLetter,
    PausingWord,
    Done,
}

/// A single unit of scheduled work
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Play a tone and wait its nominal duration
    Tone {
        event: SymbolEvent,
        mark: Mark,
        duration: Duration,
    },
    /// Wait in silence. `event` is `None` for the automatic gap after each tone.
    Silence {
        event: Option<SymbolEvent>,
        units: u32,
        duration: Duration,
    },
}

impl Step {
    pub fn event(&self) -> Option<&SymbolEvent> {
        match self {
            Step::Tone { event, .. } => Some(event),
            Step::Silence { event, .. } => event.as_ref(),
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Step::Tone { duration, .. } | Step::Silence { duration, .. } => *duration,
        }
    }
}

/// Blocks the playback thread between steps
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

/// Real-time pacing with `std::thread::sleep`
#[derive(Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Totals for a completed playback
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackSummary {
    pub tones: usize,
    pub tone_time: Duration,
    pub silence_time: Duration,
}

impl PlaybackSummary {
    pub fn total_time(&self) -> Duration {
        self.tone_time + self.silence_time
    }
}

pub struct PlaybackScheduler {
    symbols: Peekable<std::vec::IntoIter<SymbolEvent>>,
    timing: TimingConfig,
    state: PlaybackState,
    /// Silence units elapsed since the end of the last tone
    units_since_tone: u32,
}

impl PlaybackScheduler {
    /// Take ownership of a message for playback; fails if the timing is invalid
    pub fn new(message: EncodedMessage, timing: TimingConfig) -> Result<Self, MorseError> {
        timing.validate()?;
        Ok(Self {
            symbols: message.into_iter().peekable(),
            timing,
            state: PlaybackState::Idle,
            units_since_tone: 0,
        })
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Advance the state machine by one step; `None` once the message is exhausted
    pub fn next_step(&mut self) -> Option<Step> {
        match self.state {
            PlaybackState::Done => return None,
            PlaybackState::EmittingTone(_) => {
                self.state = PlaybackState::PausingIntraSymbol;
                return Some(self.silence(None, INTRA_SYMBOL_UNITS));
            }
            _ => {}
        }

        let Some(event) = self.symbols.next() else {
            self.state = PlaybackState::Done;
            return None;
        };

        let step = match event.symbol {
            Symbol::Dot | Symbol::Dash => {
                let mark = if event.symbol == Symbol::Dot { Mark::Dot } else { Mark::Dash };
                self.state = PlaybackState::EmittingTone(mark);
                self.units_since_tone = 0;
                Step::Tone {
                    event,
                    mark,
                    duration: self.timing.tone_duration(mark),
                }
            }
            Symbol::LetterGap => {
                self.state = PlaybackState::PausingLetter;
                // Nothing follows the final letter gap, so it stays silent for zero time
                let units = if self.symbols.peek().is_none() { 0 } else { LETTER_GAP_EXTRA_UNITS };
                self.silence(Some(event), units)
            }
            Symbol::WordGap => {
                self.state = PlaybackState::PausingWord;
                let units = match self.timing.word_gap {
                    WordGapMode::Additive => WORD_GAP_EXTRA_UNITS,
                    WordGapMode::Absolute => WORD_GAP_TOTAL_UNITS.saturating_sub(self.units_since_tone),
                };
                self.silence(Some(event), units)
            }
        };

        Some(step)
    }

    fn silence(&mut self, event: Option<SymbolEvent>, units: u32) -> Step {
        self.units_since_tone = self.units_since_tone.saturating_add(units);
        Step::Silence {
            event,
            units,
            duration: self.timing.silence(units),
        }
    }

    /// Play the whole message
    ///
    /// Each tone is synthesized fresh, handed to `output`, and then waited out for its
    /// nominal duration; silences are waited out without touching the output.
    /// `on_event` sees every symbol as it is reached; a word gap is reported once its
    /// silence has elapsed.
    pub fn run<O, P, F>(
        mut self,
        synth: &ToneSynthesizer,
        output: &mut O,
        pacer: &mut P,
        mut on_event: F,
    ) -> Result<PlaybackSummary>
    where
        O: AudioOutput + ?Sized,
        P: Pacer + ?Sized,
        F: FnMut(&SymbolEvent),
    {
        let mut summary = PlaybackSummary::default();

        while let Some(step) = self.next_step() {
            let report_after = matches!(step.event(), Some(e) if e.symbol == Symbol::WordGap);
            if !report_after {
                if let Some(event) = step.event() {
                    on_event(event);
                }
            }

            match step {
                Step::Tone { mark, duration, .. } => {
                    let buffer = synth.tone_for(mark, &self.timing)?;
                    output.play(buffer)?;
                    pacer.pause(duration);
                    summary.tones += 1;
                    summary.tone_time += duration;
                }
                Step::Silence { duration, .. } => {
                    if !duration.is_zero() {
                        pacer.pause(duration);
                    }
                    summary.silence_time += duration;
                }
            }

            if report_after {
                if let Some(event) = step.event() {
                    on_event(event);
                }
            }
        }

        log::debug!(
            "Playback done: {} tones, {:?} tone, {:?} silence",
            summary.tones, summary.tone_time, summary.silence_time
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;

    fn neutral_timing() -> TimingConfig {
        TimingConfig::new(42.0, 2000.0, 1000.0).unwrap()
    }

    fn steps(text: &str, timing: TimingConfig) -> Vec<Step> {
        let mut scheduler = PlaybackScheduler::new(encode(text).unwrap(), timing).unwrap();
        std::iter::from_fn(|| scheduler.next_step()).collect()
    }

    #[test]
    fn test_empty_message_goes_straight_to_done() {
        let mut scheduler = PlaybackScheduler::new(encode("").unwrap(), neutral_timing()).unwrap();
        assert_eq!(scheduler.state(), PlaybackState::Idle);
        assert_eq!(scheduler.next_step(), None);
        assert_eq!(scheduler.state(), PlaybackState::Done);
        assert_eq!(scheduler.next_step(), None);
    }

    #[test]
    fn test_state_transitions_for_single_dot() {
        let mut scheduler = PlaybackScheduler::new(encode("E").unwrap(), neutral_timing()).unwrap();

        assert!(matches!(scheduler.next_step(), Some(Step::Tone { mark: Mark::Dot, .. })));
        assert_eq!(scheduler.state(), PlaybackState::EmittingTone(Mark::Dot));

        assert!(matches!(scheduler.next_step(), Some(Step::Silence { event: None, units: 1, .. })));
        assert_eq!(scheduler.state(), PlaybackState::PausingIntraSymbol);

        // Terminal letter gap is reported but silent
        assert!(matches!(scheduler.next_step(), Some(Step::Silence { event: Some(_), units: 0, .. })));
        assert_eq!(scheduler.state(), PlaybackState::PausingLetter);

        assert_eq!(scheduler.next_step(), None);
        assert_eq!(scheduler.state(), PlaybackState::Done);
    }

    #[test]
    fn test_word_gap_state() {
        let mut scheduler = PlaybackScheduler::new(encode(" ").unwrap(), neutral_timing()).unwrap();
        assert!(matches!(scheduler.next_step(), Some(Step::Silence { units: 6, .. })));
        assert_eq!(scheduler.state(), PlaybackState::PausingWord);
    }

    #[test]
    fn test_dash_is_three_dots() {
        let steps = steps("T", neutral_timing());
        assert_eq!(steps[0].duration(), Duration::from_millis(126));
    }

    #[test]
    fn test_additive_word_gap_stacks_on_letter_gap() {
        let units: Vec<u32> = steps("E E", neutral_timing())
            .iter()
            .filter_map(|s| match s {
                Step::Silence { units, .. } => Some(*units),
                _ => None,
            })
            .collect();
        // post-tone, letter gap, word gap, post-tone, terminal letter gap
        assert_eq!(units, vec![1, 2, 6, 1, 0]);
    }

    #[test]
    fn test_absolute_word_gap_tops_up_to_seven() {
        let timing = neutral_timing().with_word_gap(WordGapMode::Absolute);
        let units: Vec<u32> = steps("E  E", timing)
            .iter()
            .filter_map(|s| match s {
                Step::Silence { units, .. } => Some(*units),
                _ => None,
            })
            .collect();
        // the second space has nothing left to add
        assert_eq!(units, vec![1, 2, 4, 0, 1, 0]);
    }

    #[test]
    fn test_silence_counter_saturates() {
        let mut scheduler = PlaybackScheduler::new(encode("  ").unwrap(), neutral_timing()).unwrap();
        scheduler.units_since_tone = u32::MAX - 1;
        assert!(matches!(scheduler.next_step(), Some(Step::Silence { units: 6, .. })));
        assert_eq!(scheduler.units_since_tone, u32::MAX);
        assert!(matches!(scheduler.next_step(), Some(Step::Silence { units: 6, .. })));
        assert_eq!(scheduler.units_since_tone, u32::MAX);
    }
}
