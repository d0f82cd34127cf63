//! Read-through texture cache.
//!
//! Decoding and uploading textures is the job of a [`TextureLoader`]
//! (the raylib [`TextureStore`](crate::resources::texturestore::TextureStore)
//! in the player). The storyboard keeps a [`TextureCache`] in front of it so
//! every distinct path is loaded at most once, including failed loads.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::error::StoryboardError;

/// Opaque handle to a texture owned by a [`TextureLoader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TextureId(pub u32);

/// Source of texture handles.
pub trait TextureLoader {
    fn load(&mut self, path: &Path) -> Result<TextureId, StoryboardError>;
}

/// Loader that only checks files exist and hands out sequential ids.
///
/// Used for headless runs where no GPU is available.
#[derive(Debug, Default)]
pub struct ProbeLoader {
    paths: Vec<PathBuf>,
}

impl ProbeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self, id: TextureId) -> Option<&Path> {
        self.paths.get(id.0 as usize).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl TextureLoader for ProbeLoader {
    fn load(&mut self, path: &Path) -> Result<TextureId, StoryboardError> {
        if !path.is_file() {
            return Err(StoryboardError::MissingAsset {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }
        let id = TextureId(self.paths.len() as u32);
        self.paths.push(path.to_path_buf());
        Ok(id)
    }
}

#[derive(Debug, Default)]
pub struct TextureCache {
    entries: FxHashMap<PathBuf, Option<TextureId>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached handle for `path`, loading it on first request.
    ///
    /// A failed load is cached as `None` and reported once through
    /// `warnings`.
    pub fn resolve(
        &mut self,
        loader: &mut dyn TextureLoader,
        path: &Path,
        warnings: &mut Vec<StoryboardError>,
    ) -> Option<TextureId> {
        if let Some(cached) = self.entries.get(path) {
            return *cached;
        }
        let handle = match loader.load(path) {
            Ok(id) => {
                debug!("Loaded storyboard texture {}", path.display());
                Some(id)
            }
            Err(e) => {
                warn!("{}", e);
                warnings.push(e);
                None
            }
        };
        self.entries.insert(path.to_path_buf(), handle);
        handle
    }

    pub fn get(&self, path: &Path) -> Option<TextureId> {
        self.entries.get(path).copied().flatten()
    }

    /// Number of distinct paths requested so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
