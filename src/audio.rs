use anyhow::{Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::MorseError;
use crate::synth::ToneBuffer;

/// Output capability the scheduler plays tones through
///
/// `play` must start playback and return immediately; the caller does its own timing.
pub trait AudioOutput {
    fn play(&mut self, buffer: ToneBuffer) -> Result<()>;
}

/// Discards every buffer. Used for `--silent` runs.
#[derive(Debug, Default)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn play(&mut self, buffer: ToneBuffer) -> Result<()> {
        log::trace!("NullOutput: dropping {} frames", buffer.frames());
        Ok(())
    }
}

/// Default output device, fed through a sample queue drained by the cpal callback
pub struct CpalOutput {
    config: StreamConfig,
    queue: Arc<Mutex<VecDeque<f32>>>,
    // Held so the stream keeps running
    _stream: Stream,
}

impl CpalOutput {
    pub fn new() -> Result<Self, MorseError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| MorseError::AudioDeviceUnavailable("no output device available".to_string()))?;

        let device_name = device.name().unwrap_or_else(|_| "<unknown>".to_string());
        log::info!("Using audio output device: {}", device_name);

        let default_config = device
            .default_output_config()
            .map_err(|e| unavailable("failed to get default output config", e))?;

        let sample_format = default_config.sample_format();
        let config: StreamConfig = default_config.into();

        log::info!(
            "Output config: {} channels, {} Hz, {:?}",
            config.channels, config.sample_rate.0, sample_format
        );

        let queue = Arc::new(Mutex::new(VecDeque::new()));

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, Arc::clone(&queue)),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, Arc::clone(&queue)),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, Arc::clone(&queue)),
            other => {
                return Err(MorseError::AudioDeviceUnavailable(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }
        .map_err(|e| unavailable("failed to build output stream", e))?;

        stream
            .play()
            .map_err(|e| unavailable("failed to start output stream", e))?;

        Ok(CpalOutput {
            config,
            queue,
            _stream: stream,
        })
    }
}

impl AudioOutput for CpalOutput {
    fn play(&mut self, buffer: ToneBuffer) -> Result<()> {
        let samples = adapt_buffer(&buffer, self.config.channels as usize, self.config.sample_rate.0);

        let mut queue = self
            .queue
            .lock()
            .map_err(|_| anyhow!("Audio queue mutex poisoned"))?;
        queue.extend(samples);

        Ok(())
    }
}

fn unavailable(what: &str, err: impl std::fmt::Display) -> MorseError {
    MorseError::AudioDeviceUnavailable(format!("{}: {}", what, err))
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    queue: Arc<Mutex<VecDeque<f32>>>,
) -> Result<Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let err_fn = |err| log::error!("Audio stream error: {}", err);

    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            // Never block or panic in the audio callback; output silence instead
            let Ok(mut queue) = queue.try_lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            for sample in data.iter_mut() {
                *sample = T::from_sample(queue.pop_front().unwrap_or(0.0));
            }
        },
        err_fn,
        None,
    )
}

/// Convert a tone buffer to interleaved f32 samples for a device's layout
///
/// Channels are averaged to mono, resampled to `sample_rate`, then copied to every
/// output channel.
pub fn adapt_buffer(buffer: &ToneBuffer, channels: usize, sample_rate: u32) -> Vec<f32> {
    let source_channels = buffer.channels() as usize;
    let mono: Vec<f32> = buffer
        .samples()
        .chunks_exact(source_channels)
        .map(|frame| {
            let sum: f32 = frame.iter().map(|&s| s as f32 / i16::MAX as f32).sum();
            sum / source_channels as f32
        })
        .collect();

    let resampled = resample(&mono, buffer.sample_rate(), sample_rate);

    let channels = channels.max(1);
    let mut output = Vec::with_capacity(resampled.len() * channels);
    for sample in resampled {
        output.extend(std::iter::repeat(sample).take(channels));
    }
    output
}

// Simple linear interpolation resampling
fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || input.is_empty() {
        return input.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (input.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_idx = i as f64 * ratio;
        let src_idx_floor = (src_idx.floor() as usize).min(input.len() - 1);
        let src_idx_ceil = (src_idx_floor + 1).min(input.len() - 1);
        let frac = src_idx - src_idx_floor as f64;

        let sample = input[src_idx_floor] * (1.0 - frac) as f32
            + input[src_idx_ceil] * frac as f32;

        output.push(sample);
    }

    output
}
