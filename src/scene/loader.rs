// scene/loader.rs
use glam::{Quat, Vec3};
use std::path::Path;

use super::animation::{
    AnimationChannel, AnimationClip, AnimationInterpolation, AnimationOutput, AnimationSampler,
    TransformProperty,
};
use super::components::*;
use crate::asset::{Handle, MeshData, TextureData, Vertex};
use crate::error::StageError;
use crate::scene::{Scene, Transform};

/// Result of loading one asset: the spawned hierarchy roots and the
/// asset's texture table in document order.
#[derive(Debug)]
pub struct LoadedAsset {
    pub roots: Vec<hecs::Entity>,
    pub textures: Vec<Handle<TextureData>>,
}

pub struct GltfLoader;

impl GltfLoader {
    /// Load a glTF/GLB file from disk into the scene.
    pub fn load(path: impl AsRef<Path>, scene: &mut Scene) -> Result<LoadedAsset, StageError> {
        let path = path.as_ref();
        log::info!("Loading asset: {:?}", path);

        let (document, buffers, images) = gltf::import(path)
            .map_err(|e| StageError::asset_load(path.to_string_lossy(), e))?;

        Self::build(&document, &buffers, &images, scene, &path.to_string_lossy())
    }

    /// Load from caller-provided bytes. Fetching the bytes is the
    /// embedder's concern (a web host hands over what it downloaded).
    pub fn load_from_slice(
        bytes: &[u8],
        label: &str,
        scene: &mut Scene,
    ) -> Result<LoadedAsset, StageError> {
        let (document, buffers, images) =
            gltf::import_slice(bytes).map_err(|e| StageError::asset_load(label, e))?;

        Self::build(&document, &buffers, &images, scene, label)
    }

    fn build(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        images: &[gltf::image::Data],
        scene: &mut Scene,
        label: &str,
    ) -> Result<LoadedAsset, StageError> {
        log::info!(
            "Document info: {} meshes, {} textures, {} animations, {} scenes",
            document.meshes().len(),
            document.textures().len(),
            document.animations().len(),
            document.scenes().len()
        );

        let textures = Self::load_textures(document, images, scene, label)?;

        let mut mesh_handles: Vec<Vec<Handle<MeshData>>> = vec![Vec::new(); document.meshes().len()];
        for gltf_mesh in document.meshes() {
            let primitives = &mut mesh_handles[gltf_mesh.index()];
            for primitive in gltf_mesh.primitives() {
                primitives.push(Self::load_primitive(&primitive, buffers, scene, label)?);
            }
        }

        let mut node_entities: Vec<Option<hecs::Entity>> = vec![None; document.nodes().len()];
        let mut roots = Vec::new();

        for gltf_scene in document.scenes() {
            for node in gltf_scene.nodes() {
                let entity = Self::load_node(
                    &node,
                    None,
                    &mesh_handles,
                    &mut scene.world,
                    &mut node_entities,
                );
                roots.push(entity);
            }
        }

        Self::load_animations(document, buffers, &node_entities, scene);

        log::info!(
            "Asset loaded: {} entities, {} clips",
            scene.world.len(),
            scene.animations().len()
        );

        Ok(LoadedAsset { roots, textures })
    }

    fn load_node(
        node: &gltf::Node,
        parent: Option<hecs::Entity>,
        mesh_handles: &[Vec<Handle<MeshData>>],
        world: &mut hecs::World,
        node_entities: &mut [Option<hecs::Entity>],
    ) -> hecs::Entity {
        let node_name = node.name().unwrap_or("Unnamed");
        log::debug!("Loading node: {} (index: {})", node_name, node.index());

        let (translation, rotation, scale) = node.transform().decomposed();
        let transform = Transform {
            translation: Vec3::from(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from(scale),
        };

        let mut builder = hecs::EntityBuilder::new();
        builder.add(Name::new(node_name));
        builder.add(TransformComponent(transform));
        builder.add(Visible(true));

        if let Some(parent_entity) = parent {
            builder.add(Parent(parent_entity));
        }

        // First primitive stays on this entity; any extras become children
        // so every renderable carries exactly one mesh and one material.
        let mut extra_primitives: Vec<Handle<MeshData>> = Vec::new();
        if let Some(gltf_mesh) = node.mesh() {
            if let Some(primitives) = mesh_handles.get(gltf_mesh.index()) {
                if let Some((first, rest)) = primitives.split_first() {
                    builder.add(MeshComponent(*first));
                    extra_primitives.extend(rest.iter().copied());
                }
            }
        }

        let entity = world.spawn(builder.build());
        if let Some(slot) = node_entities.get_mut(node.index()) {
            *slot = Some(entity);
        }

        let mut children = Vec::new();

        for (primitive_index, mesh_handle) in extra_primitives.into_iter().enumerate() {
            let primitive_entity = world.spawn((
                Name::new(format!("{}_Primitive_{}", node_name, primitive_index + 1)),
                TransformComponent(Transform::IDENTITY),
                Visible(true),
                Parent(entity),
                MeshComponent(mesh_handle),
            ));
            children.push(primitive_entity);
        }

        for child_node in node.children() {
            let child =
                Self::load_node(&child_node, Some(entity), mesh_handles, world, node_entities);
            children.push(child);
        }

        if !children.is_empty() {
            world.insert_one(entity, Children(children)).ok();
        }

        entity
    }

    fn load_textures(
        document: &gltf::Document,
        images: &[gltf::image::Data],
        scene: &mut Scene,
        label: &str,
    ) -> Result<Vec<Handle<TextureData>>, StageError> {
        let mut handles = Vec::new();

        for gltf_texture in document.textures() {
            let source = gltf_texture.source();
            let img_data = images
                .get(source.index())
                .ok_or_else(|| StageError::asset_load(label, "texture image index out of range"))?;

            let texture = TextureData {
                pixels: Self::to_rgba8(img_data, label)?,
                width: img_data.width,
                height: img_data.height,
                srgb: true,
                flip_y: false,
                label: format!("{}#texture{}", label, source.index()),
            };

            handles.push(scene.assets.textures.insert(texture));
        }

        Ok(handles)
    }

    fn to_rgba8(data: &gltf::image::Data, label: &str) -> Result<Vec<u8>, StageError> {
        use gltf::image::Format;

        let pixel_count = (data.width * data.height) as usize;
        match data.format {
            Format::R8G8B8A8 => Ok(data.pixels.clone()),
            Format::R8G8B8 => {
                let mut rgba = Vec::with_capacity(pixel_count * 4);
                for rgb in data.pixels.chunks_exact(3) {
                    rgba.extend_from_slice(rgb);
                    rgba.push(255);
                }
                Ok(rgba)
            }
            Format::R8 => {
                let mut rgba = Vec::with_capacity(pixel_count * 4);
                for &luma in &data.pixels {
                    rgba.extend_from_slice(&[luma, luma, luma, 255]);
                }
                Ok(rgba)
            }
            other => Err(StageError::asset_load(
                label,
                format!("unsupported texture format {:?}", other),
            )),
        }
    }

    fn load_primitive(
        primitive: &gltf::Primitive,
        buffers: &[gltf::buffer::Data],
        scene: &mut Scene,
        label: &str,
    ) -> Result<Handle<MeshData>, StageError> {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()].0[..]));

        let positions = reader
            .read_positions()
            .ok_or_else(|| StageError::asset_load(label, "primitive is missing positions"))?
            .collect::<Vec<_>>();

        let normals = reader
            .read_normals()
            .map(|n| n.collect::<Vec<_>>())
            .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);

        let uvs = reader
            .read_tex_coords(0)
            .map(|uv| uv.into_f32().collect::<Vec<_>>())
            .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);

        let indices = reader
            .read_indices()
            .map(|idx| idx.into_u32().collect::<Vec<_>>())
            .unwrap_or_else(|| (0..positions.len() as u32).collect());

        log::trace!(
            "    Primitive: {} vertices, {} indices",
            positions.len(),
            indices.len()
        );

        let vertices = positions
            .iter()
            .zip(normals.iter())
            .zip(uvs.iter())
            .map(|((pos, norm), uv)| Vertex {
                pos: *pos,
                normal: *norm,
                uv: *uv,
            })
            .collect::<Vec<_>>();

        Ok(scene.assets.meshes.insert(MeshData::new(vertices, indices)))
    }

    fn load_animations(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        node_entities: &[Option<hecs::Entity>],
        scene: &mut Scene,
    ) {
        for (animation_index, animation) in document.animations().enumerate() {
            let clip_name = animation
                .name()
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("Animation_{}", animation_index));
            let mut clip = AnimationClip::new(clip_name.clone());

            for (channel_index, channel) in animation.channels().enumerate() {
                let reader = channel.reader(|buffer| Some(&buffers[buffer.index()].0[..]));

                let Some(inputs) = reader.read_inputs() else {
                    log::warn!(
                        "Animation '{}' channel {} is missing input keyframes",
                        clip_name,
                        channel_index
                    );
                    continue;
                };
                let mut times: Vec<f32> = inputs.collect();
                if times.is_empty() {
                    continue;
                }

                let (interpolation, cubic) = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Step => (AnimationInterpolation::Step, false),
                    gltf::animation::Interpolation::Linear => {
                        (AnimationInterpolation::Linear, false)
                    }
                    gltf::animation::Interpolation::CubicSpline => {
                        // One hand-authored clip is consumed here; cubic
                        // tangents are dropped and the key values played
                        // back linearly.
                        log::warn!(
                            "Animation '{}' channel {} uses cubic-spline keys; sampling linearly",
                            clip_name,
                            channel_index
                        );
                        (AnimationInterpolation::Linear, true)
                    }
                };

                let Some(entity) = node_entities
                    .get(channel.target().node().index())
                    .and_then(|entry| *entry)
                else {
                    log::warn!(
                        "Animation '{}' channel {} targets a node that was not instantiated",
                        clip_name,
                        channel_index
                    );
                    continue;
                };

                let (output, property) = match reader.read_outputs() {
                    Some(gltf::animation::util::ReadOutputs::Translations(iter)) => {
                        let values = Self::keep_key_values(iter.map(Vec3::from).collect(), cubic);
                        (AnimationOutput::Vec3(values), TransformProperty::Translation)
                    }
                    Some(gltf::animation::util::ReadOutputs::Scales(iter)) => {
                        let values = Self::keep_key_values(iter.map(Vec3::from).collect(), cubic);
                        (AnimationOutput::Vec3(values), TransformProperty::Scale)
                    }
                    Some(gltf::animation::util::ReadOutputs::Rotations(rotations)) => {
                        let values = Self::keep_key_values(
                            rotations
                                .into_f32()
                                .map(|r| Quat::from_xyzw(r[0], r[1], r[2], r[3]))
                                .collect(),
                            cubic,
                        );
                        (AnimationOutput::Quat(values), TransformProperty::Rotation)
                    }
                    _ => {
                        log::warn!(
                            "Skipping unsupported outputs for animation '{}' channel {}",
                            clip_name,
                            channel_index
                        );
                        continue;
                    }
                };

                let value_count = match &output {
                    AnimationOutput::Vec3(values) => values.len(),
                    AnimationOutput::Quat(values) => values.len(),
                };
                if value_count != times.len() {
                    log::warn!(
                        "Animation '{}' channel {} has {} inputs but {} outputs - truncating",
                        clip_name,
                        channel_index,
                        times.len(),
                        value_count
                    );
                    let min_len = times.len().min(value_count);
                    times.truncate(min_len);
                }
                if times.is_empty() {
                    continue;
                }

                let output = match output {
                    AnimationOutput::Vec3(mut values) => {
                        values.truncate(times.len());
                        AnimationOutput::Vec3(values)
                    }
                    AnimationOutput::Quat(mut values) => {
                        values.truncate(times.len());
                        AnimationOutput::Quat(values)
                    }
                };

                clip.add_channel(AnimationChannel {
                    sampler: AnimationSampler {
                        times,
                        output,
                        interpolation,
                    },
                    entity,
                    property,
                });
            }

            if clip.channels.is_empty() {
                log::debug!("Skipping animation '{}': no supported channels", clip_name);
            } else {
                scene.add_animation_clip(clip);
            }
        }
    }

    // Cubic-spline outputs store in-tangent / value / out-tangent triples
    // per key; keep only the values.
    fn keep_key_values<T: Copy>(values: Vec<T>, cubic: bool) -> Vec<T> {
        if !cubic {
            return values;
        }
        values
            .chunks_exact(3)
            .map(|triple| triple[1])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_outputs_keep_middle_values() {
        let values = vec![0, 1, 2, 10, 11, 12, 20, 21, 22];
        assert_eq!(GltfLoader::keep_key_values(values, true), vec![1, 11, 21]);
    }

    #[test]
    fn linear_outputs_pass_through() {
        let values = vec![1, 2, 3];
        assert_eq!(GltfLoader::keep_key_values(values.clone(), false), values);
    }

    #[test]
    fn missing_file_reports_asset_load_error() {
        let mut scene = Scene::new();
        let err = GltfLoader::load("does/not/exist.glb", &mut scene).unwrap_err();
        assert!(matches!(err, StageError::AssetLoad { .. }));
    }
}
