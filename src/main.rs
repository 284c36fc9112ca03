use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use morse_player::audio::{AudioOutput, CpalOutput, NullOutput};
use morse_player::config::{Config, WordGapMode};
use morse_player::encoder::{encode, letter_breakdown};
use morse_player::report::{self, ProgressReporter};
use morse_player::scheduler::{PlaybackScheduler, ThreadPacer};
use morse_player::synth::ToneSynthesizer;

#[derive(Parser)]
#[command(name = "morse-player")]
#[command(about = "Convert text to Morse code and play it as audio", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Text to play. If not specified, uses message.text from settings.yaml
    text: Option<String>,

    #[command(flatten)]
    overrides: Overrides,

    /// Load settings from this file instead of ~/.morse-player/settings.yaml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args)]
struct Overrides {
    /// Dot duration in milliseconds
    #[arg(long)]
    dot_ms: Option<f64>,
    /// Tone pitch in Hz
    #[arg(long)]
    pitch: Option<f64>,
    /// Silence stretch divisor (1000 = standard spacing)
    #[arg(long)]
    gap_scale: Option<f64>,
    /// How word gaps combine with the preceding letter gap
    #[arg(long, value_enum)]
    word_gap: Option<WordGapMode>,
    /// Tone amplitude, 0 < a <= 1
    #[arg(long)]
    amplitude: Option<f64>,
    /// Run the full timing without opening an audio device
    #[arg(long)]
    silent: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Morse code dictionary
    Table,
    /// Print the Morse conversion of a text without playing it
    Encode {
        /// Text to convert
        text: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Some(Commands::Table) => {
            report::dictionary(&mut io::stdout())?;
            Ok(())
        }
        Some(Commands::Encode { text }) => encode_command(&text),
        None => {
            let mut config = load_config(cli.config.as_ref())?;
            apply_overrides(&mut config, cli.text, &cli.overrides)?;
            play_command(&config, cli.overrides.silent)
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load_or_create(),
    }
}

fn apply_overrides(config: &mut Config, text: Option<String>, overrides: &Overrides) -> Result<()> {
    if let Some(text) = text {
        config.message.text = text;
    }
    if let Some(dot_ms) = overrides.dot_ms {
        config.timing.dot_duration_ms = dot_ms;
    }
    if let Some(pitch) = overrides.pitch {
        config.timing.pitch_hz = pitch;
    }
    if let Some(gap_scale) = overrides.gap_scale {
        config.timing.gap_scale = gap_scale;
    }
    if let Some(word_gap) = overrides.word_gap {
        config.timing.word_gap = word_gap;
    }
    if let Some(amplitude) = overrides.amplitude {
        config.audio.amplitude = amplitude;
    }

    // Timing errors surface here, before anything is encoded
    config.validate().context("Invalid settings")
}

fn encode_command(text: &str) -> Result<()> {
    let message = encode(text)?;
    let breakdown = letter_breakdown(text)?;
    report::conversion(&mut io::stdout(), text, &breakdown, &message)?;
    Ok(())
}

fn play_command(config: &Config, silent: bool) -> Result<()> {
    let text = &config.message.text;
    let mut stdout = io::stdout();

    report::banner(&mut stdout)?;
    report::dictionary(&mut stdout)?;

    // Encode up front so an invalid message never produces partial audio
    let message = encode(text)?;
    let breakdown = letter_breakdown(text)?;
    report::conversion(&mut stdout, text, &breakdown, &message)?;

    log::info!(
        "Encoded {} characters into {} symbols ({} tones)",
        text.chars().count(),
        message.len(),
        message.tone_count()
    );

    let mut output: Box<dyn AudioOutput> = if silent {
        log::info!("Silent run, audio output disabled");
        Box::new(NullOutput)
    } else {
        Box::new(CpalOutput::new()?)
    };

    let synth = ToneSynthesizer::new(config.audio.amplitude);
    let scheduler = PlaybackScheduler::new(message, config.timing)?;
    let mut reporter = ProgressReporter::stdout();

    println!("Morse play out: \n");
    print!(" ");

    let summary = scheduler.run(&synth, output.as_mut(), &mut ThreadPacer, |event| reporter.on_event(event))?;

    println!("\n\n");
    log::info!(
        "Played {} tones in {:.2}s",
        summary.tones,
        summary.total_time().as_secs_f64()
    );

    Ok(())
}
