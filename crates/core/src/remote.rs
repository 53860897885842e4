//! HTTP client for the shared save store.
//!
//! One artifact per game lives at `<base_url><shared_code>_<game_id>.zip`.
//! Writes are blind overwrites: whoever uploads last wins, with no merge
//! or conflict signal. That matches how the tool is used in practice,
//! where one operator syncs at a time.

use std::{
    fmt,
    fs::{self, File},
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Utc};
use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    header, StatusCode,
};
use tracing::{debug, info};

use crate::{config::RemoteConfig, error::RemoteError};

/// Basic-auth credentials applied uniformly to every request.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account name for the shared store.
    pub username: String,
    /// Password for the shared store.
    pub password: String,
}

/// Staleness signal for a shared artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The artifact exists and was last written at this time.
    Published(DateTime<Utc>),
    /// Never published, or the server reported no usable timestamp.
    Unknown,
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freshness::Published(stamp) => write!(f, "{}", stamp.format("%Y-%m-%d %H:%M UTC")),
            Freshness::Unknown => write!(f, "never published"),
        }
    }
}

/// Authenticated client for the shared HTTP location.
pub struct RemoteStore {
    client: Client,
    base_url: String,
    shared_code: String,
    credentials: Credentials,
}

impl RemoteStore {
    /// Build a store from the remote section of the configuration.
    ///
    /// No request timeout is set unless the configuration asks for one, so
    /// large archives on slow links are never cut short mid-transfer.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|source| RemoteError::Transport {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            shared_code: config.shared_code.clone(),
            credentials: Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            },
        })
    }

    /// Canonical name of a game's artifact, without the zip extension.
    pub fn artifact_stem(&self, game_id: &str) -> String {
        format!("{}_{}", self.shared_code, game_id)
    }

    /// Remote file name of a game's artifact.
    pub fn artifact_key(&self, game_id: &str) -> String {
        format!("{}.zip", self.artifact_stem(game_id))
    }

    fn artifact_url(&self, game_id: &str) -> String {
        format!("{}{}", self.base_url, self.artifact_key(game_id))
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }

    /// When the artifact was last published. A missing artifact is not an
    /// error; transport failures and auth rejections are.
    pub fn check_freshness(&self, game_id: &str) -> Result<Freshness, RemoteError> {
        let url = self.artifact_url(game_id);
        let response = self
            .authed(self.client.head(&url))
            .send()
            .map_err(|source| RemoteError::Transport {
                url: url.clone(),
                source,
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Freshness::Unknown);
        }
        if !response.status().is_success() {
            return Err(RemoteError::Status {
                url,
                status: response.status(),
            });
        }

        let stamp = response
            .headers()
            .get(header::LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_http_date);
        Ok(stamp.map(Freshness::Published).unwrap_or(Freshness::Unknown))
    }

    /// Overwrite the artifact with the archive's bytes, streamed from disk.
    pub fn upload(&self, game_id: &str, archive_path: &Path) -> Result<(), RemoteError> {
        let url = self.artifact_url(game_id);
        let file = File::open(archive_path).map_err(|source| RemoteError::Io {
            path: archive_path.to_path_buf(),
            source,
        })?;

        let response = self
            .authed(self.client.put(&url))
            .body(file)
            .send()
            .map_err(|source| RemoteError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                url,
                status: response.status(),
            });
        }
        info!("uploaded {} to {url}", archive_path.display());
        Ok(())
    }

    /// Fetch the artifact into `destination`, streaming the body to disk.
    ///
    /// The body lands in a sibling `.part` file that is renamed into place
    /// only once the transfer completes, so an interrupted download never
    /// leaves a file a later unpack would accept.
    pub fn download(&self, game_id: &str, destination: &Path) -> Result<(), RemoteError> {
        let url = self.artifact_url(game_id);
        let mut response = self.authed(self.client.get(&url)).send().map_err(|source| {
            RemoteError::Transport {
                url: url.clone(),
                source,
            }
        })?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                url,
                status: response.status(),
            });
        }

        let partial = partial_path(destination);
        match stream_body(&mut response, &url, &partial) {
            Ok(bytes) => {
                fs::rename(&partial, destination).map_err(|source| {
                    let _ = fs::remove_file(&partial);
                    RemoteError::Io {
                        path: destination.to_path_buf(),
                        source,
                    }
                })?;
                debug!("downloaded {bytes} bytes from {url}");
                Ok(())
            }
            Err(err) => {
                let _ = fs::remove_file(&partial);
                Err(err)
            }
        }
    }
}

fn stream_body(response: &mut Response, url: &str, path: &Path) -> Result<u64, RemoteError> {
    let mut file = File::create(path).map_err(|source| RemoteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    response
        .copy_to(&mut file)
        .map_err(|source| RemoteError::Transport {
            url: url.to_string(),
            source,
        })
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    destination.with_file_name(name)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|stamp| stamp.with_timezone(&Utc))
}
