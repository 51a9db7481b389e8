//! Session resolution: stored profiles and the connection that turns one into a live
//! event stream.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::cli::DisplayOptions;
use crate::log::{EventStream, HttpSource};

/// Default profile store file name, relative to the home directory.
const PROFILE_FILE: &str = ".webtask";

/// Errors surfaced while resolving a session. All of them are fatal.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No usable profile store.
    #[error("{0}")]
    Config(String),
    /// The requested profile does not exist.
    #[error("profile `{0}` does not exist")]
    NotFound(String),
    /// The stream endpoint could not be reached or refused the request.
    #[error("unable to connect to log stream at {url}: {reason}")]
    Connection { url: String, reason: String },
}

impl SessionError {
    pub fn no_profiles() -> Self {
        Self::Config("You must create a profile to begin using this tool: `wt init`.".into())
    }
}

/// A named endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub url: String,
    pub token: String,
    #[serde(default)]
    pub container: Option<String>,
}

impl Profile {
    pub fn stream_url(&self, container: &str) -> String {
        format!(
            "{}/api/logs/tenant/{}",
            self.url.trim_end_matches('/'),
            container
        )
    }

    /// The positional container wins over the profile's own.
    pub fn container_for<'a>(&'a self, options: &'a DisplayOptions) -> Option<&'a str> {
        options.container.as_deref().or(self.container.as_deref())
    }
}

/// Profile name to profile, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Profiles(BTreeMap<String, Profile>);

impl Profiles {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Result<&Profile, SessionError> {
        self.0
            .get(name)
            .ok_or_else(|| SessionError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
impl From<BTreeMap<String, Profile>> for Profiles {
    fn from(map: BTreeMap<String, Profile>) -> Self {
        Self(map)
    }
}

/// Loads profiles and opens log streams on their behalf.
#[async_trait::async_trait]
pub trait SessionResolver: Send + Sync {
    async fn load_profiles(&self) -> Result<Profiles, SessionError>;

    async fn create_log_stream(
        &self,
        profile: &Profile,
        options: &DisplayOptions,
    ) -> Result<EventStream, SessionError>;
}

/// Profiles from a JSON file, streams over HTTP server-sent events.
pub struct WebtaskSession {
    path: PathBuf,
    client: reqwest::Client,
}

impl WebtaskSession {
    /// Use `path`, or `~/.webtask` when none is given.
    pub fn new(path: Option<PathBuf>) -> Result<Self, SessionError> {
        let path = match path {
            Some(path) => path,
            None => directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(PROFILE_FILE))
                .ok_or_else(|| {
                    SessionError::Config("unable to locate the home directory".into())
                })?,
        };
        Ok(Self {
            path,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait::async_trait]
impl SessionResolver for WebtaskSession {
    async fn load_profiles(&self) -> Result<Profiles, SessionError> {
        debug!(path = %self.path.display(), "loading profiles");
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Profiles::default()),
            Err(e) => {
                return Err(SessionError::Config(format!(
                    "unable to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        if text.trim().is_empty() {
            return Ok(Profiles::default());
        }
        serde_json::from_str(&text).map_err(|e| {
            SessionError::Config(format!("invalid profile file {}: {e}", self.path.display()))
        })
    }

    async fn create_log_stream(
        &self,
        profile: &Profile,
        options: &DisplayOptions,
    ) -> Result<EventStream, SessionError> {
        let container = profile.container_for(options).ok_or_else(|| {
            SessionError::Config(format!(
                "profile `{}` has no container; pass one explicitly",
                options.profile
            ))
        })?;
        let url = profile.stream_url(container);
        debug!(%url, "opening log stream");

        let connection_error = |reason: String| SessionError::Connection {
            url: url.clone(),
            reason,
        };
        let response = self
            .client
            .get(&url)
            .bearer_auth(&profile.token)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| connection_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| connection_error(e.to_string()))?;

        Ok(EventStream::spawn(HttpSource { response }))
    }
}
