use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use tracing::debug;

use crate::cli::DisplayOptions;
use crate::console::Console;
use crate::filter::select;
use crate::format::render;
use crate::log::EventStream;
use crate::session::{SessionError, SessionResolver};

/// Hard ceiling on a single streaming session.
pub const MAX_CONNECTION_TIME: Duration = Duration::from_secs(30 * 60);

/// How a successfully opened stream finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The upstream closed the stream.
    Ended,
    /// The connection ceiling was reached first.
    TimedOut,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Ended => 0,
            Outcome::TimedOut => 1,
        }
    }
}

/// Resolve the profile named in `options` and open its stream.
pub async fn open<R: SessionResolver + ?Sized>(
    resolver: &R,
    options: &DisplayOptions,
) -> Result<(EventStream, Option<String>), SessionError> {
    let profiles = resolver.load_profiles().await?;
    if profiles.is_empty() {
        return Err(SessionError::no_profiles());
    }
    let profile = profiles.get(&options.profile)?;
    let stream = resolver.create_log_stream(profile, options).await?;
    let container = profile.container_for(options).map(str::to_owned);
    Ok((stream, container))
}

/// Print every displayable event until the stream ends.
pub async fn consume<W: Write>(
    stream: &mut EventStream,
    options: &DisplayOptions,
    console: &mut Console<W>,
) -> Result<()> {
    while let Some(event) = stream.recv().await {
        if let Some(record) = select(&event, options) {
            console.emit(&render(&record, options))?;
        }
    }
    debug!("log stream ended");
    Ok(())
}

/// Application runtime: resolves the session, then streams until the upstream ends or
/// `ceiling` elapses.
pub async fn run<R, W>(
    resolver: &R,
    options: &DisplayOptions,
    console: &mut Console<W>,
    ceiling: Duration,
) -> Result<Outcome>
where
    R: SessionResolver + ?Sized,
    W: Write,
{
    let (mut stream, container) = open(resolver, options).await?;
    console.info_with(
        &[("container", container.as_deref().unwrap_or("-"))],
        "connected to streaming logs",
    )?;

    let outcome = tokio::select! {
        res = consume(&mut stream, options, console) => {
            res?;
            Outcome::Ended
        }
        _ = tokio::time::sleep(ceiling) => Outcome::TimedOut,
    };

    if outcome == Outcome::TimedOut {
        console.warn("reached maximum connection time of 30min, disconnecting")?;
    }
    Ok(outcome)
}
