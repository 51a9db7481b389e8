use chrono::Utc;
use std::io::{self, Write};

use crate::format::Rendered;
use crate::style::{Tone, paint};

/// Logger name shown on every leveled line.
const LOGGER_NAME: &str = "wt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

impl Level {
    fn tag(self) -> String {
        match self {
            Level::Info => paint(" INFO", Tone::Info),
            Level::Warn => paint(" WARN", Tone::Warn),
        }
    }
}

/// Leveled line printer for user-facing output, plus raw passthrough.
///
/// Lines look like `12:04:55.120Z  INFO wt: message (key=value)`.
pub struct Console<W: Write> {
    out: W,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn info(&mut self, msg: &str) -> io::Result<()> {
        self.line(Level::Info, msg, &[])
    }

    pub fn info_with(&mut self, fields: &[(&str, &str)], msg: &str) -> io::Result<()> {
        self.line(Level::Info, msg, fields)
    }

    pub fn warn(&mut self, msg: &str) -> io::Result<()> {
        self.line(Level::Warn, msg, &[])
    }

    /// Verbatim text, no timestamp or level.
    pub fn raw(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "{msg}")?;
        self.out.flush()
    }

    pub fn emit(&mut self, rendered: &Rendered) -> io::Result<()> {
        match rendered {
            Rendered::Raw(text) => self.raw(text),
            Rendered::Info(text) => self.info(text),
        }
    }

    fn line(&mut self, level: Level, msg: &str, fields: &[(&str, &str)]) -> io::Result<()> {
        let time = Utc::now().format("%H:%M:%S%.3fZ");
        write!(self.out, "{time} {} {LOGGER_NAME}: {msg}", level.tag())?;
        if !fields.is_empty() {
            let pairs: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(self.out, " ({})", pairs.join(", "))?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
