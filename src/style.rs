//! Pure ANSI formatting helpers. Each function takes text and returns it wrapped
//! in the escape sequences for one semantic tone; nothing here touches global state.

use crossterm::Command;
use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};

/// Semantic colors used by the formatter and console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Redirect,
    Failure,
    Highlight,
    Info,
    Warn,
}

impl Tone {
    fn color(self) -> Color {
        match self {
            Tone::Success => Color::DarkGreen,
            Tone::Redirect => Color::DarkBlue,
            Tone::Failure => Color::DarkRed,
            Tone::Highlight => Color::DarkYellow,
            Tone::Info => Color::DarkCyan,
            Tone::Warn => Color::DarkYellow,
        }
    }
}

fn ansi(command: impl Command) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = command.write_ansi(&mut out);
    out
}

/// Wrap `text` in the foreground color for `tone`, restoring the default color after.
///
/// Only the foreground is reset, so bold segments inside `text` keep their weight.
pub fn paint(text: &str, tone: Tone) -> String {
    format!(
        "{}{}{}",
        ansi(SetForegroundColor(tone.color())),
        text,
        ansi(SetForegroundColor(Color::Reset))
    )
}

/// Render `text` in bold without affecting its color.
pub fn bold(text: &str) -> String {
    format!(
        "{}{}{}",
        ansi(SetAttribute(Attribute::Bold)),
        text,
        ansi(SetAttribute(Attribute::NormalIntensity))
    )
}
