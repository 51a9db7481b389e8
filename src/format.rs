//! Turns one decoded record into terminal output.
//!
//! Display modes are checked in priority order: raw passthrough, request line,
//! verbose, plain message. Rendering is pure so the same record and options always
//! produce the same text.

use crate::cli::DisplayOptions;
use crate::filter::is_request_line;
use crate::log::ParsedLogRecord;
use crate::style::{Tone, bold, paint};

/// Column (relative to the method) at which status codes start.
const STATUS_COLUMN: usize = 6;

/// Output for a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Written verbatim, outside the leveled console.
    Raw(String),
    /// Logged at info level.
    Info(String),
}

/// A message recognised as an HTTP access line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub status: u16,
    pub body: String,
}

/// Split a request line into its parts. Returns `None` when `msg` does not look like
/// one or its status token is not numeric.
pub fn parse_request_line(msg: &str) -> Option<RequestLine<'_>> {
    if !is_request_line(msg) {
        return None;
    }
    let tokens: Vec<&str> = msg.split(' ').collect();
    let method = *tokens.get(1)?;
    let url = *tokens.get(2)?;
    let status = tokens.get(3)?.parse().ok()?;
    let body = tokens.get(4..).map(|rest| rest.join(" ")).unwrap_or_default();
    Some(RequestLine {
        method,
        url,
        status,
        body,
    })
}

fn status_tone(status: u16) -> Option<Tone> {
    match status {
        200..=299 => Some(Tone::Success),
        300..=399 => Some(Tone::Redirect),
        400.. => Some(Tone::Failure),
        _ => None,
    }
}

/// `[METHOD<pad>CODE URL]`, colored by status class, plus the highlighted body.
pub fn render_request(request: &RequestLine<'_>, http_bodies: bool) -> String {
    let padding = " ".repeat(STATUS_COLUMN.saturating_sub(request.method.chars().count()));
    let segment = format!(
        "{}{}{}{} {}{}",
        bold("["),
        bold(request.method),
        padding,
        bold(&request.status.to_string()),
        request.url,
        bold("]"),
    );
    let mut line = match status_tone(request.status) {
        Some(tone) => paint(&segment, tone),
        None => segment,
    };
    if http_bodies && !request.body.is_empty() {
        line.push(' ');
        line.push_str(&paint(&request.body, Tone::Highlight));
    }
    line
}

pub fn render(record: &ParsedLogRecord, options: &DisplayOptions) -> Rendered {
    if options.raw {
        return Rendered::Raw(record.msg.clone());
    }
    if let Some(request) = parse_request_line(&record.msg) {
        return Rendered::Info(render_request(&request, options.http_bodies));
    }
    if options.verbose {
        return Rendered::Info(format!("{} {}", record.msg, record.record));
    }
    Rendered::Info(record.msg.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PRIMARY_SOURCE;
    use serde_json::json;

    const SAMPLE: &str = "host GET /foo/bar 200 {\"ok\":true}";

    fn record(msg: &str) -> ParsedLogRecord {
        ParsedLogRecord {
            name: Some(PRIMARY_SOURCE.into()),
            msg: msg.into(),
            record: json!({ "name": PRIMARY_SOURCE, "msg": msg, "pid": 12 }),
        }
    }

    fn bracket(method: &str, pad: &str, status: &str, url: &str) -> String {
        format!("{}{}{}{} {}{}", bold("["), bold(method), pad, bold(status), url, bold("]"))
    }

    #[test]
    fn parses_request_tokens() {
        let request = parse_request_line(SAMPLE).unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.url, "/foo/bar");
        assert_eq!(request.status, 200);
        assert_eq!(request.body, "{\"ok\":true}");

        let request = parse_request_line("h POST /a 500 one  two three").unwrap();
        assert_eq!(request.body, "one  two three");
    }

    #[test]
    fn success_is_green_with_highlighted_body() {
        let out = render(&record(SAMPLE), &DisplayOptions::default());
        let expected = format!(
            "{} {}",
            paint(&bracket("GET", "   ", "200", "/foo/bar"), Tone::Success),
            paint("{\"ok\":true}", Tone::Highlight)
        );
        assert_eq!(out, Rendered::Info(expected));
    }

    #[test]
    fn status_classes_pick_colors() {
        let tone_of = |status: &str| {
            let msg = SAMPLE.replace("200", status);
            let request = parse_request_line(&msg).unwrap();
            let plain = bracket("GET", "   ", status, "/foo/bar");
            let out = render_request(&request, false);
            [Tone::Success, Tone::Redirect, Tone::Failure]
                .into_iter()
                .find(|tone| out == paint(&plain, *tone))
                .or_else(|| (out == plain).then_some(Tone::Info))
        };
        assert_eq!(tone_of("301"), Some(Tone::Redirect));
        assert_eq!(tone_of("404"), Some(Tone::Failure));
        assert_eq!(tone_of("503"), Some(Tone::Failure));
        // 1xx keeps the terminal's default color
        assert_eq!(tone_of("101"), Some(Tone::Info));
    }

    #[test]
    fn padding_aligns_status_column() {
        let delete = parse_request_line("h DELETE /x 204 y").unwrap();
        assert!(render_request(&delete, false).contains(&bracket("DELETE", "", "204", "/x")));
        let patch = parse_request_line("h PATCH /x 204 y").unwrap();
        assert!(render_request(&patch, false).contains(&bracket("PATCH", " ", "204", "/x")));
    }

    fn strip_ansi(text: &str) -> String {
        regex::Regex::new(r"\x1b\[[0-9;]*m")
            .unwrap()
            .replace_all(text, "")
            .into_owned()
    }

    #[test]
    fn sample_line_renders_aligned_bracket() {
        let request = parse_request_line(SAMPLE).unwrap();
        let plain = strip_ansi(&render_request(&request, true));
        assert_eq!(plain, "[GET   200 /foo/bar] {\"ok\":true}");

        let post = parse_request_line("h POST /a 201 x").unwrap();
        assert!(strip_ansi(&render_request(&post, false)).starts_with("[POST  201 /a]"));
    }

    #[test]
    fn bodies_can_be_hidden() {
        let options = DisplayOptions {
            http_bodies: false,
            ..Default::default()
        };
        let Rendered::Info(out) = render(&record(SAMPLE), &options) else {
            panic!("expected info output");
        };
        assert!(!out.contains("{\"ok\":true}"));
    }

    #[test]
    fn raw_wins_over_everything() {
        let options = DisplayOptions {
            raw: true,
            verbose: true,
            ..Default::default()
        };
        assert_eq!(render(&record(SAMPLE), &options), Rendered::Raw(SAMPLE.into()));
    }

    #[test]
    fn verbose_includes_full_record() {
        let options = DisplayOptions {
            verbose: true,
            ..Default::default()
        };
        let Rendered::Info(out) = render(&record("booted"), &options) else {
            panic!("expected info output");
        };
        assert!(out.starts_with("booted {"));
        assert!(out.contains("\"pid\":12"));
    }

    #[test]
    fn non_numeric_status_falls_back_to_plain_message() {
        let msg = "h GET /a b 200 c";
        assert!(is_request_line(msg));
        assert_eq!(
            render(&record(msg), &DisplayOptions::default()),
            Rendered::Info(msg.into())
        );
    }

    #[test]
    fn rendering_is_repeatable() {
        let options = DisplayOptions::default();
        let rec = record(SAMPLE);
        assert_eq!(render(&rec, &options), render(&rec, &options));
    }
}
