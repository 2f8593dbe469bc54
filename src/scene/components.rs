// scene/components.rs
// Plain hecs components describing the loaded hierarchy.

use crate::asset::{Handle, MeshData};
use crate::material::StageMaterial;
use crate::scene::Transform;
use glam::Vec3;

/// Local transform (relative to parent).
#[derive(Debug, Clone, Copy)]
pub struct TransformComponent(pub Transform);

/// World-space transform, recomputed from the hierarchy every update.
#[derive(Debug, Clone, Copy)]
pub struct WorldTransform(pub Transform);

#[derive(Debug, Clone, Copy)]
pub struct MeshComponent(pub Handle<MeshData>);

/// The assigned material. Holds a handle, not a value: every subject node
/// aliases the one blend material instance.
#[derive(Debug, Clone, Copy)]
pub struct MaterialComponent(pub Handle<StageMaterial>);

#[derive(Debug, Clone, Copy)]
pub struct Visible(pub bool);

impl Default for Visible {
    fn default() -> Self {
        Self(true)
    }
}

/// The one fixed key light the stage exposes to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// Node name as authored in the asset; the partition predicate matches on
/// this.
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Parent(pub hecs::Entity);

#[derive(Debug, Clone)]
pub struct Children(pub Vec<hecs::Entity>);
