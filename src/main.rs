//! wt-logs entry point: parses CLI and starts the async application runtime.
//! The main function is intentionally thin and delegates to the runtime in `app`.

mod app;
mod cli;
mod console;
mod filter;
mod format;
mod log;
mod logging;
mod session;
mod style;

use std::backtrace::BacktraceStatus;
use std::io::{self, Write};
use std::process::ExitCode;

use crate::console::Console;
use crate::session::WebtaskSession;
use crate::style::{Tone, paint};

#[tokio::main]
async fn main() -> ExitCode {
    let config = cli::parse();
    logging::init(config.debug);

    match stream_logs(config).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn stream_logs(config: cli::Config) -> anyhow::Result<app::Outcome> {
    let session = WebtaskSession::new(config.config_path)?;
    let mut console = Console::stdout();
    app::run(&session, &config.display, &mut console, app::MAX_CONNECTION_TIME).await
}

/// Fatal error output: debug form on stderr, message in red, then the backtrace if one
/// was captured.
fn report(e: &anyhow::Error) {
    eprintln!("{e:?}");
    // stdout may be the closed pipe that caused the error.
    let _ = write_report(&mut io::stdout(), e);
}

fn write_report<W: Write>(out: &mut W, e: &anyhow::Error) -> io::Result<()> {
    writeln!(out, "{}", paint(&e.to_string(), Tone::Failure))?;
    let backtrace = e.backtrace();
    if backtrace.status() == BacktraceStatus::Captured {
        writeln!(out, "{backtrace}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn report_prints_message_in_red() {
        let e = anyhow::anyhow!("profile `prod` does not exist");
        let mut out = Vec::new();
        write_report(&mut out, &e).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(&paint("profile `prod` does not exist", Tone::Failure)));
    }

    #[test]
    fn report_to_closed_stdout_is_an_error_not_a_panic() {
        let e = anyhow::Error::from(io::Error::from(io::ErrorKind::BrokenPipe));
        let err = write_report(&mut ClosedPipe, &e).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
