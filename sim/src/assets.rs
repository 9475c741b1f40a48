//! Texture handles and the application-owned asset cache.
//!
//! The cache is created by the embedding application, filled through an
//! [`AssetLoader`] collaborator and handed to [`crate::SimWorld`] by reference.
//! A failed load never aborts: callers either substitute a generated
//! placeholder or keep running without the visual.

use crate::error::AssetError;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Cache key of the tiled background texture.
pub const BACKGROUND_TEXTURE: &str = "background";
/// Cache key of the player ship texture.
pub const PLAYER_TEXTURE: &str = "player";
/// Cache keys of the enemy ship variants.
pub const ENEMY_TEXTURES: [&str; 3] = ["enemy_0", "enemy_1", "enemy_2"];
/// Cache key of the projectile texture.
pub const PROJECTILE_TEXTURE: &str = "projectile";

/// Opaque handle to a texture owned by the render back-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    /// True when the texture was generated instead of loaded.
    pub placeholder: bool,
}

/// Dimensions reported by a loader for a decoded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
}

/// Collaborator that turns a file path into a texture.
pub trait AssetLoader {
    fn load_texture(&mut self, path: &Path) -> Result<TextureInfo, AssetError>;
}

/// Loader backed by an in-memory table of known textures.
///
/// Used by headless runs and tests; any path not in the table is `NotFound`.
#[derive(Debug, Default, Clone)]
pub struct StaticAssetLoader {
    textures: HashMap<PathBuf, TextureInfo>,
}

impl StaticAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture of the given size at `path`.
    pub fn with_texture(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.textures.insert(path.into(), TextureInfo { width, height });
        self
    }

    /// Loader that knows every file the game asks for.
    pub fn with_default_textures() -> Self {
        Self::new()
            .with_texture("background.png", 512, 512)
            .with_texture("ships/Blue.png", 32, 32)
            .with_texture("Gray1.png", 32, 32)
            .with_texture("Gray2.png", 32, 32)
            .with_texture("Gray3.png", 32, 32)
            .with_texture("proj.png", 16, 16)
    }
}

impl AssetLoader for StaticAssetLoader {
    fn load_texture(&mut self, path: &Path) -> Result<TextureInfo, AssetError> {
        self.textures
            .get(path)
            .copied()
            .ok_or_else(|| AssetError::NotFound(path.to_path_buf()))
    }
}

/// Keyed cache of texture handles.
#[derive(Debug, Default)]
pub struct AssetCache {
    handles: HashMap<String, TextureHandle>,
    next_id: u32,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path` under `key`. A key that is already cached is returned
    /// without touching the loader.
    pub fn load(
        &mut self,
        loader: &mut dyn AssetLoader,
        key: &str,
        path: impl AsRef<Path>,
    ) -> Result<TextureHandle, AssetError> {
        if let Some(handle) = self.handles.get(key) {
            return Ok(*handle);
        }
        let info = loader.load_texture(path.as_ref())?;
        let handle = self.insert(key, info.width, info.height, false);
        debug!(key, path = %path.as_ref().display(), "texture loaded");
        Ok(handle)
    }

    /// Load `path`, substituting a generated `width`×`height` placeholder on failure.
    pub fn load_or_placeholder(
        &mut self,
        loader: &mut dyn AssetLoader,
        key: &str,
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
    ) -> TextureHandle {
        match self.load(loader, key, path.as_ref()) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(key, error = %err, "using placeholder texture");
                self.insert(key, width, height, true)
            }
        }
    }

    /// Load every texture the game uses.
    ///
    /// Ships and projectiles fall back to placeholders. The background has no
    /// fallback: without it chunks are streamed but never drawn.
    pub fn load_game_textures(&mut self, loader: &mut dyn AssetLoader) {
        if let Err(err) = self.load(loader, BACKGROUND_TEXTURE, "background.png") {
            warn!(error = %err, "background texture unavailable, chunks will not render");
        }
        self.load_or_placeholder(loader, PLAYER_TEXTURE, "ships/Blue.png", 32, 32);
        for (key, path) in ENEMY_TEXTURES.iter().zip(["Gray1.png", "Gray2.png", "Gray3.png"]) {
            self.load_or_placeholder(loader, key, path, 32, 32);
        }
        self.load_or_placeholder(loader, PROJECTILE_TEXTURE, "proj.png", 16, 16);
    }

    pub fn get(&self, key: &str) -> Option<TextureHandle> {
        self.handles.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn insert(&mut self, key: &str, width: u32, height: u32, placeholder: bool) -> TextureHandle {
        let handle = TextureHandle {
            id: self.next_id,
            width,
            height,
            placeholder,
        };
        self.next_id += 1;
        self.handles.insert(key.to_string(), handle);
        handle
    }
}

/// The texture set the simulation hands to entities and chunks.
#[derive(Resource, Debug, Clone, Default)]
pub struct GameTextures {
    pub background: Option<TextureHandle>,
    pub player: Option<TextureHandle>,
    pub enemies: [Option<TextureHandle>; 3],
    pub projectile: Option<TextureHandle>,
}

impl GameTextures {
    pub fn from_cache(cache: &AssetCache) -> Self {
        Self {
            background: cache.get(BACKGROUND_TEXTURE),
            player: cache.get(PLAYER_TEXTURE),
            enemies: ENEMY_TEXTURES.map(|key| cache.get(key)),
            projectile: cache.get(PROJECTILE_TEXTURE),
        }
    }

    /// Texture for an enemy variant; out-of-range variants are clamped.
    pub fn enemy(&self, variant: usize) -> Option<TextureHandle> {
        self.enemies[variant.min(self.enemies.len() - 1)]
    }
}
