use std::collections::HashMap;

use hecs::World;

use super::animation::{AnimationClip, AnimationState, TransformUpdate};
use super::components::*;
use crate::asset::Assets;
use crate::error::StageError;
use crate::scene::Transform;

/// The loaded hierarchy plus everything that animates it.
///
/// All mutation is frame-driven and single-threaded: `update` advances the
/// playing clips, applies their transform writes, then propagates world
/// transforms root-down. Nothing here blocks or runs concurrently.
pub struct Scene {
    pub world: World,
    pub assets: Assets,
    animations: Vec<AnimationClip>,
    animation_states: Vec<AnimationState>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            assets: Assets::default(),
            animations: Vec::new(),
            animation_states: Vec::new(),
        }
    }

    pub fn animations(&self) -> &[AnimationClip] {
        &self.animations
    }

    pub fn animation_states(&self) -> &[AnimationState] {
        &self.animation_states
    }

    pub fn add_animation_clip(&mut self, clip: AnimationClip) -> usize {
        let index = self.animations.len();
        self.animations.push(clip);
        index
    }

    pub fn play_animation(&mut self, clip_index: usize, looping: bool) -> Option<usize> {
        if clip_index >= self.animations.len() {
            return None;
        }

        let mut state = AnimationState::new(clip_index);
        state.looping = looping;
        let index = self.animation_states.len();
        self.animation_states.push(state);
        Some(index)
    }

    /// Start the named clip, looping. The clip is a required part of the
    /// asset contract, so absence is a setup error rather than a silent
    /// no-op.
    pub fn play_clip_by_name(&mut self, name: &str) -> Result<usize, StageError> {
        let clip_index = self
            .animations
            .iter()
            .position(|clip| clip.name == name)
            .ok_or_else(|| StageError::MissingAnimationClip {
                name: name.to_string(),
            })?;

        // Index is valid by construction.
        Ok(self.play_animation(clip_index, true).unwrap_or(0))
    }

    /// Entities with a transform but no parent.
    pub fn roots(&self) -> Vec<hecs::Entity> {
        self.world
            .query::<&TransformComponent>()
            .without::<&Parent>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }

    pub fn update(&mut self, dt: f64) {
        self.system_animations(dt);
        self.system_propagate_transforms();
    }

    fn system_animations(&mut self, dt: f64) {
        if self.animation_states.is_empty() || self.animations.is_empty() {
            return;
        }

        let dt = dt as f32;
        let mut updates: HashMap<hecs::Entity, TransformUpdate> = HashMap::new();

        for state in &mut self.animation_states {
            if state.clip_index >= self.animations.len() {
                continue;
            }

            let clip = &self.animations[state.clip_index];
            let sample_time = state.advance(dt, clip.duration);
            clip.sample(sample_time, &mut updates);
        }

        for (entity, update) in updates {
            if let Ok(mut transform) = self.world.get::<&mut TransformComponent>(entity) {
                if let Some(translation) = update.translation {
                    transform.0.translation = translation;
                }
                if let Some(rotation) = update.rotation {
                    transform.0.rotation = rotation;
                }
                if let Some(scale) = update.scale {
                    transform.0.scale = scale;
                }
            }
        }
    }

    // Sequential walk: children depend on their parent's world transform.
    pub(crate) fn system_propagate_transforms(&mut self) {
        let roots = self.roots();

        let mut stack: Vec<(hecs::Entity, Transform)> = Vec::new();

        for root in roots {
            stack.push((root, Transform::IDENTITY));

            while let Some((entity, parent_world)) = stack.pop() {
                let local = match self.world.get::<&TransformComponent>(entity) {
                    Ok(t) => t.0,
                    Err(_) => continue,
                };

                let world = parent_world.mul_transform(&local);

                let mut has_world_transform = false;
                {
                    if let Ok(mut wt) = self.world.get::<&mut WorldTransform>(entity) {
                        wt.0 = world;
                        has_world_transform = true;
                    }
                }

                if !has_world_transform {
                    if let Err(e) = self.world.insert_one(entity, WorldTransform(world)) {
                        log::error!(
                            "Failed to insert WorldTransform for entity {:?}: {:?}",
                            entity,
                            e
                        );
                        continue;
                    }
                }

                if let Ok(children) = self.world.get::<&Children>(entity) {
                    for &child in children.0.iter().rev() {
                        stack.push((child, world));
                    }
                }
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::animation::{
        AnimationChannel, AnimationInterpolation, AnimationOutput, AnimationSampler,
        TransformProperty,
    };
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn transform_propagation_simple() {
        let mut scene = Scene::new();

        let parent = scene.world.spawn((
            Name::new("Parent"),
            TransformComponent(Transform::from_trs(
                Vec3::new(5.0, 0.0, 0.0),
                Quat::IDENTITY,
                Vec3::ONE,
            )),
        ));

        let child = scene.world.spawn((
            Name::new("Child"),
            TransformComponent(Transform::from_trs(
                Vec3::new(2.0, 0.0, 0.0),
                Quat::IDENTITY,
                Vec3::ONE,
            )),
            Parent(parent),
        ));

        scene.world.insert_one(parent, Children(vec![child])).ok();

        scene.system_propagate_transforms();

        let parent_world = scene.world.get::<&WorldTransform>(parent).unwrap();
        assert_eq!(parent_world.0.translation, Vec3::new(5.0, 0.0, 0.0));

        let child_world = scene.world.get::<&WorldTransform>(child).unwrap();
        assert_eq!(child_world.0.translation, Vec3::new(7.0, 0.0, 0.0));
    }

    #[test]
    fn transform_propagation_rotation() {
        let mut scene = Scene::new();

        let parent = scene.world.spawn((
            Name::new("Parent"),
            TransformComponent(Transform::from_trs(
                Vec3::ZERO,
                Quat::from_rotation_y(FRAC_PI_2),
                Vec3::ONE,
            )),
        ));

        let child = scene.world.spawn((
            Name::new("Child"),
            TransformComponent(Transform::from_trs(
                Vec3::new(1.0, 0.0, 0.0),
                Quat::IDENTITY,
                Vec3::ONE,
            )),
            Parent(parent),
        ));

        scene.world.insert_one(parent, Children(vec![child])).ok();

        scene.system_propagate_transforms();

        let child_world = scene.world.get::<&WorldTransform>(child).unwrap();
        assert!(child_world
            .0
            .translation
            .abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn missing_named_clip_is_a_setup_error() {
        let mut scene = Scene::new();
        let err = scene.play_clip_by_name("Take 001").unwrap_err();
        assert!(matches!(
            err,
            StageError::MissingAnimationClip { ref name } if name == "Take 001"
        ));
    }

    #[test]
    fn named_clip_starts_looping_playback() {
        let mut scene = Scene::new();
        let entity = scene.world.spawn((
            Name::new("Bone"),
            TransformComponent(Transform::IDENTITY),
        ));

        let mut clip = AnimationClip::new("Take 001");
        clip.add_channel(AnimationChannel {
            sampler: AnimationSampler {
                times: vec![0.0, 1.0],
                output: AnimationOutput::Vec3(vec![Vec3::ZERO, Vec3::X]),
                interpolation: AnimationInterpolation::Linear,
            },
            entity,
            property: TransformProperty::Translation,
        });
        scene.add_animation_clip(clip);

        scene.play_clip_by_name("Take 001").unwrap();
        assert_eq!(scene.animation_states().len(), 1);
        assert!(scene.animation_states()[0].looping);

        scene.update(0.5);
        let transform = scene.world.get::<&TransformComponent>(entity).unwrap();
        assert!(transform.0.translation.abs_diff_eq(Vec3::X * 0.5, 1e-6));
    }
}
