/// Console rendering of the dictionary, conversions and live playback progress

use std::io::{self, Write};

use crate::encoder::{EncodedMessage, SymbolEvent};
use crate::symbol_table;

const RULE: &str = "================================================================================";

/// Prints one character per symbol as playback reaches it
pub struct ProgressReporter<W: Write> {
    out: W,
}

impl ProgressReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Print `.`, `-`, `|` or ` ` and flush so it shows up while the tone plays
    pub fn on_event(&mut self, event: &SymbolEvent) {
        // Progress output is best effort; a closed stdout must not stop playback
        if let Err(e) = write!(self.out, "{}", event.symbol.as_char()).and_then(|_| self.out.flush()) {
            log::debug!("Progress output failed: {}", e);
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n")?;
    writeln!(out, "Morse Code Generator")?;
    writeln!(out, "====================\n")
}

/// `Morse Code Dictionary:` followed by every `key : pattern` pair in table order
pub fn dictionary(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Morse Code Dictionary: ")?;
    for (key, code) in symbol_table::entries() {
        write!(out, "   {} : {}", key, code)?;
    }
    writeln!(out)?;
    writeln!(out, "{}", RULE)
}

/// The input text, its per-letter breakdown and the compact Morse line
pub fn conversion(out: &mut impl Write, text: &str, breakdown: &str, message: &EncodedMessage) -> io::Result<()> {
    writeln!(out, "Text to convert to morse code:  {}\n", text)?;
    writeln!(out, "Conversion: \n\n   {}\n", breakdown)?;
    writeln!(out, "\n {}\n\n", message.morse_line())?;
    writeln!(out, "{}\n", RULE)
}
