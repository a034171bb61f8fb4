use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::info;

use super::sprite::Rgba;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read texture '{name}' from {path}: {source}")]
    ReadTexture {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture '{name}' from {path}: {source}")]
    DecodeTexture {
        name: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decoded RGBA image held in memory for software blitting.
pub struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Texture {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-neighbor sample; out-of-range coordinates read as transparent.
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        match self.rgba.get(offset..offset + 4) {
            Some(bytes) => [bytes[0], bytes[1], bytes[2], bytes[3]],
            None => [0, 0, 0, 0],
        }
    }
}

/// Named textures loaded once at scene init.
#[derive(Default)]
pub struct TextureStore {
    textures: HashMap<String, Texture>,
}

impl TextureStore {
    /// Decode the PNG at `path` and register it under `name`. Failure is
    /// fatal to startup; callers propagate it.
    pub fn load(&mut self, path: &Path, name: &str) -> Result<(), AssetError> {
        let reader = ImageReader::open(path).map_err(|source| AssetError::ReadTexture {
            name: name.to_string(),
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader
            .decode()
            .map_err(|source| AssetError::DecodeTexture {
                name: name.to_string(),
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        let (width, height) = decoded.dimensions();
        info!(name, width, height, path = %path.display(), "texture_loaded");
        self.textures.insert(
            name.to_string(),
            Texture {
                width,
                height,
                rgba: decoded.into_raw(),
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Texture> {
        self.textures.get(name)
    }
}
