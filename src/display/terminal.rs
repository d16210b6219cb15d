// src/display/terminal.rs
//! Terminal output for device replies, port listings and encoded sentences

use crate::{
    error::{RelayError, Result},
    session::ReplyHandler,
};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

/// Prints every line the device sends back
pub struct ConsoleReporter<W: Write + Send + 'static = io::Stdout> {
    out: W,
    color: bool,
}

impl ConsoleReporter<io::Stdout> {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            color: true,
        }
    }
}

impl Default for ConsoleReporter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send + 'static> ConsoleReporter<W> {
    /// Plain-text reporter over any writer
    pub fn with_writer(out: W) -> Self {
        Self { out, color: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_reply(&mut self, line: &str) -> Result<()> {
        if self.color {
            execute!(
                self.out,
                SetForegroundColor(Color::Cyan),
                Print("Device response: "),
                ResetColor,
                Print(format!("{}\n", line))
            )
            .map_err(RelayError::Io)?;
        } else {
            writeln!(self.out, "Device response: {}", line)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send + 'static> ReplyHandler for ConsoleReporter<W> {
    fn on_line(&mut self, line: &str) {
        if let Err(e) = self.render_reply(line) {
            tracing::warn!("Failed to print device response: {}", e);
        }
    }
}

/// Print the ports an operator could pick instead of the unavailable one
pub fn print_ports(stdout: &mut impl Write, ports: &[String]) -> Result<()> {
    if ports.is_empty() {
        execute!(stdout, Print("No serial ports found.\n")).map_err(RelayError::Io)?;
        return Ok(());
    }

    execute!(
        stdout,
        SetForegroundColor(Color::Yellow),
        Print("Available ports:\n"),
        ResetColor
    )
    .map_err(RelayError::Io)?;

    for port in ports {
        execute!(stdout, Print(format!("\t{}\n", port))).map_err(RelayError::Io)?;
    }
    Ok(())
}

/// Print generated sentences with their CR/LF made visible
pub fn print_sentences(stdout: &mut impl Write, sentences: &[String]) -> Result<()> {
    for sentence in sentences {
        let visible = sentence.replace('\r', "\\r").replace('\n', "\\n");
        execute!(
            stdout,
            SetForegroundColor(Color::Green),
            Print(format!("{}\n", visible)),
            ResetColor
        )
        .map_err(RelayError::Io)?;
    }
    Ok(())
}
