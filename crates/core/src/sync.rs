//! The two user-facing sync operations: publish and adopt.

use std::{fs, path::PathBuf};

use tracing::{info, warn};

use crate::{
    archive,
    config::AppConfig,
    error::Result,
    games::{GameProfile, GameRegistry, SaveLayout},
    locator::{self, SaveSlot},
    remote::{Freshness, RemoteStore},
};

/// Composes save discovery, the archive codec and the remote store into
/// the operations the frontend exposes. One instance per process; each
/// operation runs to completion before the next starts.
pub struct SaveSync {
    registry: GameRegistry,
    remote: RemoteStore,
}

/// Removes a transfer artifact when the operation scope ends, whether the
/// operation succeeded or not.
struct ScopedArtifact(PathBuf);

impl Drop for ScopedArtifact {
    fn drop(&mut self) {
        if self.0.exists() {
            if let Err(err) = fs::remove_file(&self.0) {
                warn!("failed to remove {}: {err}", self.0.display());
            }
        }
    }
}

impl SaveSync {
    /// Build the orchestrator from validated configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            registry: GameRegistry::from_config(config),
            remote: RemoteStore::new(&config.remote)?,
        })
    }

    /// Enabled games, in declaration order.
    pub fn games(&self) -> &[GameProfile] {
        self.registry.profiles()
    }

    /// Discover the selectable saves for a game.
    pub fn list_saves(&self, game_id: &str) -> Result<Vec<SaveSlot>> {
        locator::list_saves(self.registry.get(game_id)?)
    }

    /// When the shared artifact for a game was last published. Purely
    /// informational; it never gates publish or adopt.
    pub fn check_freshness(&self, game_id: &str) -> Result<Freshness> {
        self.registry.get(game_id)?;
        Ok(self.remote.check_freshness(game_id)?)
    }

    /// Pack the chosen save and overwrite the shared artifact with it.
    pub fn publish(&self, game_id: &str, slot: &SaveSlot) -> Result<()> {
        let profile = self.registry.get(game_id)?;
        let archive_path = archive::pack(&slot.path, &self.remote.artifact_stem(&profile.id))?;
        let _cleanup = ScopedArtifact(archive_path.clone());
        self.remote.upload(&profile.id, &archive_path)?;
        info!("published {} save \"{}\"", profile.id, slot.display_name);
        Ok(())
    }

    /// Fetch the shared artifact and merge-extract it into the local save
    /// location. Files already present locally but absent from the archive
    /// are left in place.
    pub fn adopt(&self, game_id: &str) -> Result<()> {
        let profile = self.registry.get(game_id)?;
        let destination = adopt_destination(profile)?;
        let artifact_path = destination.join(self.remote.artifact_key(&profile.id));
        let _cleanup = ScopedArtifact(artifact_path.clone());
        self.remote.download(&profile.id, &artifact_path)?;
        archive::unpack(&artifact_path, &destination)?;
        info!(
            "adopted remote {} save into {}",
            profile.id,
            destination.display()
        );
        Ok(())
    }
}

/// Where an adopted archive is extracted: the save root for flat games,
/// the active profile container for nested ones.
fn adopt_destination(profile: &GameProfile) -> Result<PathBuf> {
    match profile.layout {
        SaveLayout::Flat => Ok(profile.root_path.clone()),
        SaveLayout::NestedWithMetadata => locator::active_container(profile),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::error::SyncError;
    use tempfile::tempdir;

    #[test]
    fn flat_games_adopt_into_the_save_root() -> Result<()> {
        let temp = tempdir().unwrap();
        let profile = GameProfile {
            id: "stardew".to_string(),
            root_path: temp.path().to_path_buf(),
            layout: SaveLayout::Flat,
        };
        assert_eq!(adopt_destination(&profile)?, temp.path());
        Ok(())
    }

    #[test]
    fn nested_games_adopt_into_the_active_container() -> Result<()> {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("Profile-1")).unwrap();
        let profile = GameProfile {
            id: "pacha".to_string(),
            root_path: temp.path().to_path_buf(),
            layout: SaveLayout::NestedWithMetadata,
        };
        assert_eq!(adopt_destination(&profile)?, temp.path().join("Profile-1"));
        Ok(())
    }

    #[test]
    fn nested_games_without_a_container_cannot_adopt() {
        let temp = tempdir().unwrap();
        let profile = GameProfile {
            id: "pacha".to_string(),
            root_path: temp.path().to_path_buf(),
            layout: SaveLayout::NestedWithMetadata,
        };
        assert!(matches!(
            adopt_destination(&profile),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn scoped_artifacts_are_removed_on_drop() {
        let temp = tempdir().unwrap();
        let artifact = temp.path().join("pending.zip");
        fs::write(&artifact, b"payload").unwrap();
        {
            let _cleanup = ScopedArtifact(artifact.clone());
        }
        assert!(!artifact.exists());
    }

    #[test]
    fn scoped_artifacts_tolerate_already_missing_files() {
        let _cleanup = ScopedArtifact(Path::new("/nonexistent/pending.zip").to_path_buf());
        // Dropping must not panic.
    }
}
