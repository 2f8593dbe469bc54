pub mod mesh;
pub mod store;
pub mod texture;

pub use mesh::{MeshData, Vertex};
pub use store::{AssetStore, Handle};
pub use texture::TextureData;

use crate::material::StageMaterial;

/// All assets owned by a scene, addressed by handle.
#[derive(Default)]
pub struct Assets {
    pub meshes: AssetStore<MeshData>,
    pub textures: AssetStore<TextureData>,
    pub materials: AssetStore<StageMaterial>,
}
