//! Leveled, colored status output for the install flow.
//!
//! Info and success lines go to stdout, warnings and errors to stderr, with
//! color only when the stream is a terminal. Error level is reserved for
//! fatal conditions; main renders the fatal error here and exits non-zero.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub struct Reporter {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl Reporter {
    pub fn new() -> Self {
        Self {
            stdout: StandardStream::stdout(ColorChoice::Auto),
            stderr: StandardStream::stderr(ColorChoice::Auto),
        }
    }

    pub fn info(&mut self, msg: &str) {
        let _ = writeln!(self.stdout, "{msg}");
    }

    pub fn success(&mut self, msg: &str) {
        let _ = self
            .stdout
            .set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
        let _ = writeln!(self.stdout, "{msg}");
        let _ = self.stdout.reset();
    }

    pub fn warn(&mut self, msg: &str) {
        let _ = self
            .stderr
            .set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = writeln!(self.stderr, "warning: {msg}");
        let _ = self.stderr.reset();
    }

    pub fn error(&mut self, msg: &str) {
        let _ = self
            .stderr
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = writeln!(self.stderr, "error: {msg}");
        let _ = self.stderr.reset();
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
