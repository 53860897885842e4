//! Supported games and their on-disk save layouts.

use std::path::PathBuf;

use tracing::warn;

use crate::{
    config::AppConfig,
    error::{Result, SyncError},
};

/// How a game arranges its saves beneath the configured root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveLayout {
    /// Every immediate subdirectory of the root is one save.
    Flat,
    /// Saves sit one level deeper, inside a single active profile
    /// container, and each carries a metadata header naming the save.
    NestedWithMetadata,
}

/// Static description of one supported game.
#[derive(Debug, Clone)]
pub struct GameProfile {
    /// Short identifier used in menus, config keys and the remote artifact key.
    pub id: String,
    /// Directory holding this game's saves.
    pub root_path: PathBuf,
    /// Directory-layout rule for discovering saves.
    pub layout: SaveLayout,
}

/// Games this build knows how to sync. Adding a game is one new row here
/// plus a `[games.<id>]` entry in the config file.
const SUPPORTED_GAMES: &[(&str, SaveLayout)] = &[
    ("stardew", SaveLayout::Flat),
    ("pacha", SaveLayout::NestedWithMetadata),
];

/// Enabled game profiles, built once at startup from configuration.
#[derive(Debug, Clone)]
pub struct GameRegistry {
    profiles: Vec<GameProfile>,
}

impl GameRegistry {
    /// Build the registry from configuration. Games without a configured
    /// root path are skipped with a warning; only their operations are
    /// disabled, the rest of the process keeps running.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut profiles = Vec::new();
        for (id, layout) in SUPPORTED_GAMES {
            let root_path = config
                .games
                .get(*id)
                .and_then(|game| game.root_path.clone());
            match root_path {
                Some(root_path) => profiles.push(GameProfile {
                    id: (*id).to_string(),
                    root_path,
                    layout: *layout,
                }),
                None => warn!("no save path configured for {id}; its sync operations are disabled"),
            }
        }
        Self { profiles }
    }

    /// All enabled profiles, in declaration order.
    pub fn profiles(&self) -> &[GameProfile] {
        &self.profiles
    }

    /// True when no game has a configured save path.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Look up an enabled game by identifier.
    pub fn get(&self, id: &str) -> Result<&GameProfile> {
        self.profiles
            .iter()
            .find(|profile| profile.id == id)
            .ok_or_else(|| {
                SyncError::Config(format!(
                    "game {id} is unknown or has no save path configured"
                ))
            })
    }
}
