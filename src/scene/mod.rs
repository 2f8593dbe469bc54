// scene/mod.rs

pub mod animation;
pub mod assign;
pub mod components;
pub mod loader;
pub mod scene;
pub mod transform;

pub use assign::{assign_materials, marker_predicate, AssignReport};
pub use loader::{GltfLoader, LoadedAsset};
pub use scene::Scene;
pub use transform::Transform;

pub use components::{
    Children, DirectionalLight, MaterialComponent, MeshComponent, Name, Parent,
    TransformComponent, Visible, WorldTransform,
};
