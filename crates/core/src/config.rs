//! Configuration loading, validation and first-run bootstrap.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use ::config::{Config as Loader, Environment, File as ConfigFile};
use serde::Deserialize;

use crate::error::{Result, SyncError};

/// Configuration file read from the working directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `COZYSYNC_REMOTE__BASE_URL`.
const ENV_PREFIX: &str = "COZYSYNC";

const DEFAULT_CONFIG: &str = r#"# Cozy Game Sync configuration.
#
# Everyone sharing saves must point base_url at the same location and use
# the same shared_code.

[remote]
base_url = ""
shared_code = ""
username = ""
password = ""
# Optional request timeout in seconds. Leave unset for interactive use so
# large saves on slow connections are never cut short.
# timeout_secs = 60

# Leave a game's root_path out to disable syncing for that game.

[games.stardew]
# root_path = "/home/me/.config/StardewValley/Saves"

[games.pacha]
# root_path = "/home/me/.config/unity3d/SodaDen/Roots Of Pacha/Saves"
"#;

/// Validated application configuration, loaded once at startup and passed
/// into the components that need it.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Shared store coordinates and credentials.
    pub remote: RemoteConfig,
    /// Per-game settings keyed by game identifier.
    #[serde(default)]
    pub games: HashMap<String, GameConfig>,
}

/// The `[remote]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL the artifacts are stored under, typically ending in `/`.
    pub base_url: String,
    /// Name shared by everyone syncing the same saves; part of every
    /// artifact key.
    pub shared_code: String,
    /// Basic-auth user for the store. May be empty.
    #[serde(default)]
    pub username: String,
    /// Basic-auth password for the store. May be empty.
    #[serde(default)]
    pub password: String,
    /// Optional request timeout in seconds. Unset means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// A `[games.<id>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameConfig {
    /// Root directory holding this game's saves. Absent disables the game.
    #[serde(default)]
    pub root_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load and validate `config.toml` from the working directory, with
    /// `COZYSYNC_*` environment variables taking precedence.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Loader::builder()
            .add_source(ConfigFile::from(path))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|err| SyncError::Config(err.to_string()))?;
        let config: Self = settings
            .try_deserialize()
            .map_err(|err| SyncError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.remote.base_url.trim().is_empty() {
            return Err(SyncError::Config(
                "remote.base_url is empty; saves have nowhere to sync to".to_string(),
            ));
        }
        if self.remote.shared_code.trim().is_empty() {
            return Err(SyncError::Config(
                "remote.shared_code is empty; it names the saves you share".to_string(),
            ));
        }
        Ok(())
    }
}

/// Write a commented starter `config.toml` when none exists. Returns true
/// if the template was created, so the frontend can tell the operator to
/// fill it in before continuing.
pub fn ensure_default_config() -> Result<bool> {
    ensure_default_config_at(Path::new(CONFIG_FILE))
}

fn ensure_default_config_at(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, DEFAULT_CONFIG)
        .map_err(|err| SyncError::Config(format!("failed to write {}: {err}", path.display())))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("config.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_a_complete_config() -> Result<()> {
        let temp = tempdir().unwrap();
        let path = write_config(
            temp.path(),
            r#"
[remote]
base_url = "https://example.test/saves/"
shared_code = "our-farm"
username = "sam"
password = "secret"
timeout_secs = 60

[games.stardew]
root_path = "/saves/stardew"

[games.pacha]
"#,
        );

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.remote.base_url, "https://example.test/saves/");
        assert_eq!(config.remote.shared_code, "our-farm");
        assert_eq!(config.remote.timeout_secs, Some(60));
        assert_eq!(
            config.games["stardew"].root_path.as_deref(),
            Some(Path::new("/saves/stardew"))
        );
        // A section without root_path parses but stays disabled.
        assert!(config.games["pacha"].root_path.is_none());
        Ok(())
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let temp = tempdir().unwrap();
        let path = write_config(
            temp.path(),
            r#"
[remote]
base_url = ""
shared_code = "our-farm"
"#,
        );
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn empty_shared_code_is_rejected() {
        let temp = tempdir().unwrap();
        let path = write_config(
            temp.path(),
            r#"
[remote]
base_url = "https://example.test/saves/"
shared_code = "  "
"#,
        );
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let temp = tempdir().unwrap();
        let result = AppConfig::load_from(&temp.path().join("config.toml"));
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn bootstrap_writes_the_template_once() -> Result<()> {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");

        assert!(ensure_default_config_at(&path)?);
        let template = fs::read_to_string(&path).unwrap();
        assert!(template.contains("[remote]"));
        assert!(template.contains("[games.stardew]"));

        // A second run must not clobber operator edits.
        fs::write(&path, "edited").unwrap();
        assert!(!ensure_default_config_at(&path)?);
        assert_eq!(fs::read_to_string(&path).unwrap(), "edited");
        Ok(())
    }

    #[test]
    fn template_fails_validation_until_filled_in() -> Result<()> {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        ensure_default_config_at(&path)?;
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(SyncError::Config(_))
        ));
        Ok(())
    }
}
