//! Save-slot discovery.
//!
//! Listing is a pure read: nothing here mutates the filesystem, and slots
//! are recomputed on every request rather than cached.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    error::{Result, SyncError},
    games::{GameProfile, SaveLayout},
};

/// Metadata file expected inside each nested-layout save directory.
pub const SAVE_HEADER_FILE: &str = "header.json";

/// One discoverable, selectable save directory.
#[derive(Debug, Clone)]
pub struct SaveSlot {
    /// Human-readable label shown to the operator. Not necessarily unique.
    pub display_name: String,
    /// Directory holding the save. The only stable identity of a slot.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct SaveHeader {
    #[serde(rename = "Players")]
    players: Vec<PlayerRecord>,
}

#[derive(Debug, Deserialize)]
struct PlayerRecord {
    #[serde(rename = "Name")]
    name: String,
}

/// List every save slot for the given game, in directory-iteration order.
///
/// A root with no saves yields an empty list. For nested-layout games a
/// missing profile container is an error, and a save directory without a
/// readable header aborts the whole listing.
pub fn list_saves(profile: &GameProfile) -> Result<Vec<SaveSlot>> {
    match profile.layout {
        SaveLayout::Flat => {
            let slots = subdirectories(&profile.root_path)?
                .into_iter()
                .map(|path| SaveSlot {
                    display_name: directory_name(&path),
                    path,
                })
                .collect();
            Ok(slots)
        }
        SaveLayout::NestedWithMetadata => {
            let container = active_container(profile)?;
            let mut slots = Vec::new();
            for path in subdirectories(&container)? {
                let display_name = read_player_name(&path)?;
                slots.push(SaveSlot { display_name, path });
            }
            Ok(slots)
        }
    }
}

/// Resolve the single active profile container for a nested-layout game:
/// the first immediate subdirectory of the root. Adoption extracts into
/// the same directory.
pub fn active_container(profile: &GameProfile) -> Result<PathBuf> {
    subdirectories(&profile.root_path)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            SyncError::Config(format!(
                "no profile directory under {}; launch {} once so it creates one",
                profile.root_path.display(),
                profile.id
            ))
        })
}

fn subdirectories(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root).map_err(|err| {
        SyncError::Config(format!(
            "cannot read save directory {}: {err}",
            root.display()
        ))
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            SyncError::Config(format!(
                "cannot read save directory {}: {err}",
                root.display()
            ))
        })?;
        let file_type = entry.file_type().map_err(|err| {
            SyncError::Config(format!("cannot inspect {}: {err}", entry.path().display()))
        })?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_player_name(save_dir: &Path) -> Result<String> {
    let header_path = save_dir.join(SAVE_HEADER_FILE);
    let content = fs::read_to_string(&header_path).map_err(|err| SyncError::MalformedSave {
        path: save_dir.to_path_buf(),
        reason: format!("cannot read {SAVE_HEADER_FILE}: {err}"),
    })?;

    let header: SaveHeader =
        serde_json::from_str(&content).map_err(|err| SyncError::MalformedSave {
            path: save_dir.to_path_buf(),
            reason: format!("invalid {SAVE_HEADER_FILE}: {err}"),
        })?;

    header
        .players
        .into_iter()
        .next()
        .map(|player| player.name)
        .ok_or_else(|| SyncError::MalformedSave {
            path: save_dir.to_path_buf(),
            reason: format!("{SAVE_HEADER_FILE} lists no players"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn flat_profile(root: &Path) -> GameProfile {
        GameProfile {
            id: "stardew".to_string(),
            root_path: root.to_path_buf(),
            layout: SaveLayout::Flat,
        }
    }

    fn nested_profile(root: &Path) -> GameProfile {
        GameProfile {
            id: "pacha".to_string(),
            root_path: root.to_path_buf(),
            layout: SaveLayout::NestedWithMetadata,
        }
    }

    #[test]
    fn flat_layout_lists_subdirectories() -> Result<()> {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("farmA")).unwrap();
        fs::create_dir(temp.path().join("farmB")).unwrap();
        // Loose files are not saves and must be ignored.
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let slots = list_saves(&flat_profile(temp.path()))?;
        let mut names: Vec<_> = slots.iter().map(|slot| slot.display_name.clone()).collect();
        names.sort();
        assert_eq!(names, ["farmA", "farmB"]);
        assert!(slots.iter().all(|slot| slot.path.is_dir()));
        Ok(())
    }

    #[test]
    fn flat_layout_tolerates_zero_saves() -> Result<()> {
        let temp = tempdir().unwrap();
        let slots = list_saves(&flat_profile(temp.path()))?;
        assert!(slots.is_empty());
        Ok(())
    }

    #[test]
    fn missing_root_is_a_config_error() {
        let temp = tempdir().unwrap();
        let profile = flat_profile(&temp.path().join("does-not-exist"));
        assert!(matches!(list_saves(&profile), Err(SyncError::Config(_))));
    }

    #[test]
    fn nested_layout_reads_player_names() -> Result<()> {
        let temp = tempdir().unwrap();
        let save = temp.path().join("Profile-1").join("slot0");
        fs::create_dir_all(&save).unwrap();
        fs::write(
            save.join(SAVE_HEADER_FILE),
            r#"{"Players":[{"Name":"Ada"},{"Name":"Grace"}],"Day":12}"#,
        )
        .unwrap();

        let slots = list_saves(&nested_profile(temp.path()))?;
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].display_name, "Ada");
        assert_eq!(slots[0].path, save);
        Ok(())
    }

    #[test]
    fn nested_layout_without_container_is_a_config_error() {
        let temp = tempdir().unwrap();
        let result = list_saves(&nested_profile(temp.path()));
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn nested_layout_with_empty_container_yields_no_saves() -> Result<()> {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("Profile-1")).unwrap();
        let slots = list_saves(&nested_profile(temp.path()))?;
        assert!(slots.is_empty());
        Ok(())
    }

    #[test]
    fn missing_header_aborts_the_listing() {
        let temp = tempdir().unwrap();
        let container = temp.path().join("Profile-1");
        let good = container.join("slot0");
        fs::create_dir_all(&good).unwrap();
        fs::write(
            good.join(SAVE_HEADER_FILE),
            r#"{"Players":[{"Name":"Ada"}]}"#,
        )
        .unwrap();
        fs::create_dir(container.join("slot1")).unwrap();

        let result = list_saves(&nested_profile(temp.path()));
        assert!(matches!(result, Err(SyncError::MalformedSave { .. })));
    }

    #[test]
    fn header_without_players_is_malformed() {
        let temp = tempdir().unwrap();
        let save = temp.path().join("Profile-1").join("slot0");
        fs::create_dir_all(&save).unwrap();
        fs::write(save.join(SAVE_HEADER_FILE), r#"{"Players":[]}"#).unwrap();

        let result = list_saves(&nested_profile(temp.path()));
        assert!(matches!(result, Err(SyncError::MalformedSave { .. })));
    }

    #[test]
    fn active_container_picks_the_first_subdirectory() -> Result<()> {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("Profile-1")).unwrap();
        let container = active_container(&nested_profile(temp.path()))?;
        assert_eq!(container, temp.path().join("Profile-1"));
        Ok(())
    }
}
