//! Raylib texture store.
//!
//! Owns every GPU texture of the loaded storyboard, indexed by
//! [`TextureId`]. Textures are freed when the store is dropped.
//!
//! # Note
//! This is a NonSend resource because `Texture2D` holds GPU resources that
//! must be accessed from the main thread.
use std::path::Path;

use raylib::ffi::{self, TextureFilter};
use raylib::prelude::*;

use crate::storyboard::error::StoryboardError;
use crate::storyboard::texturecache::{TextureId, TextureLoader};

#[derive(Default)]
pub struct TextureStore {
    textures: Vec<Texture2D>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: TextureId) -> Option<&Texture2D> {
        self.textures.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Loader that uploads textures through `rl` into this store.
    pub fn loader<'a>(
        &'a mut self,
        rl: &'a mut RaylibHandle,
        thread: &'a RaylibThread,
    ) -> RaylibTextureLoader<'a> {
        RaylibTextureLoader {
            store: self,
            rl,
            thread,
        }
    }
}

/// [`TextureLoader`] backed by raylib image decoding and GPU upload.
pub struct RaylibTextureLoader<'a> {
    store: &'a mut TextureStore,
    rl: &'a mut RaylibHandle,
    thread: &'a RaylibThread,
}

impl TextureLoader for RaylibTextureLoader<'_> {
    fn load(&mut self, path: &Path) -> Result<TextureId, StoryboardError> {
        let missing = |reason: String| StoryboardError::MissingAsset {
            path: path.to_path_buf(),
            reason,
        };
        if !path.is_file() {
            return Err(missing("file not found".to_string()));
        }
        let name = path
            .to_str()
            .ok_or_else(|| missing("path is not valid UTF-8".to_string()))?;
        let texture = self
            .rl
            .load_texture(self.thread, name)
            .map_err(|e| missing(e.to_string()))?;
        unsafe {
            ffi::SetTextureFilter(
                *texture,
                TextureFilter::TEXTURE_FILTER_BILINEAR as i32,
            );
        }
        let id = TextureId(self.store.textures.len() as u32);
        self.store.textures.push(texture);
        Ok(id)
    }
}
