#![warn(clippy::all, missing_docs)]

//! Core save-synchronization logic for Cozy Game Sync.
//!
//! This crate hosts configuration handling, save discovery, the archive
//! codec, and the HTTP remote store used by the console frontend and any
//! future frontends. Frontends drive it through [`SaveSync`], which exposes
//! the typed operations (list, check freshness, publish, adopt) and knows
//! nothing about menus or prompts.

pub mod archive;
pub mod config;
pub mod error;
pub mod games;
pub mod locator;
pub mod remote;
pub mod sync;

pub use config::AppConfig;
pub use error::{ArchiveError, RemoteError, SyncError};
pub use games::{GameProfile, GameRegistry, SaveLayout};
pub use locator::SaveSlot;
pub use remote::{Credentials, Freshness, RemoteStore};
pub use sync::SaveSync;
