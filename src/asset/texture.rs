use std::path::Path;

use crate::error::StageError;

/// CPU-side decoded texture.
///
/// GPU upload belongs to the embedding engine; this crate only decodes and
/// carries the per-texture post-processing flags the caller decided on.
/// There is no implicit vertical flip: glTF-baked normal maps keep their
/// stored orientation unless the caller asks otherwise.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub srgb: bool,
    pub flip_y: bool,
    pub label: String,
}

impl TextureData {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StageError> {
        let path = path.as_ref();
        log::info!("Loading texture: {:?}", path);

        let img = image::open(path)
            .map_err(|e| StageError::asset_load(path.to_string_lossy(), e))?;
        Ok(Self::from_image(img, path.to_string_lossy().into_owned()))
    }

    pub fn from_bytes(bytes: &[u8], label: impl Into<String>) -> Result<Self, StageError> {
        let label = label.into();
        let img = image::load_from_memory(bytes)
            .map_err(|e| StageError::asset_load(label.clone(), e))?;
        Ok(Self::from_image(img, label))
    }

    fn from_image(img: image::DynamicImage, label: String) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            pixels: rgba.into_raw(),
            width,
            height,
            srgb: false,
            flip_y: false,
            label,
        }
    }

    pub fn srgb(mut self, srgb: bool) -> Self {
        self.srgb = srgb;
        self
    }

    pub fn flip_y(mut self, flip: bool) -> Self {
        self.flip_y = flip;
        self
    }

    /// Load a batch of textures, preserving the order of `paths` so callers
    /// can destructure the result positionally.
    pub fn load_set<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Self>, StageError> {
        paths.iter().map(Self::from_path).collect()
    }

    /// Sample the texel at (x, y) as normalized RGBA. Used by tests and by
    /// debug tooling; runtime sampling happens in the shader.
    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        let px = &self.pixels[idx..idx + 4];
        [
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        ]
    }
}
