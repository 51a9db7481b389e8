use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::cli::DisplayOptions;
use crate::log::{LogEvent, ParsedLogRecord};

/// Source name of the component whose records are shown without `--all`.
pub const PRIMARY_SOURCE: &str = "sandbox-kafka";

static REQUEST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.+\s(?:GET|PUT|POST|PATCH|DELETE)\s.+\d{3}\s.+$").expect("static pattern")
});

/// Decode a data event's payload. Anything that is not a JSON object carrying `msg`
/// yields `None` and is dropped without a trace.
pub fn decode(event: &LogEvent) -> Option<ParsedLogRecord> {
    if event.kind != "data" {
        return None;
    }
    let record: Value = serde_json::from_str(&event.data).ok()?;
    let object = record.as_object()?;
    let msg = match object.get("msg")? {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let name = object.get("name").and_then(Value::as_str).map(str::to_owned);
    Some(ParsedLogRecord { name, msg, record })
}

/// Primary-source records always pass; everything else only with `--all`.
pub fn should_display(record: &ParsedLogRecord, options: &DisplayOptions) -> bool {
    options.all || record.name.as_deref() == Some(PRIMARY_SOURCE)
}

/// Decode and filter in one step.
pub fn select(event: &LogEvent, options: &DisplayOptions) -> Option<ParsedLogRecord> {
    decode(event).filter(|record| should_display(record, options))
}

pub fn is_request_line(msg: &str) -> bool {
    REQUEST_LINE.is_match(msg)
}
