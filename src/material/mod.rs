pub mod compose;

pub use compose::{shader_module_descriptor, FragmentComposer, FragmentSlot};

use bytemuck::{Pod, Zeroable};

use crate::asset::{Handle, TextureData};
use crate::error::StageError;

/// Subject material: matcap shading where the matcap lookup is replaced by
/// a blend of two reference images under a single scalar control.
///
/// `progress` = 1.0 renders pure A, 0.0 pure B, anything between a linear
/// RGB mix. One instance is shared by handle across every subject node, so
/// a single mutation retints the whole model.
///
/// Mutating `progress` does not mark the material dirty by itself; the
/// caller decides when the renderer should re-upload the uniform.
#[derive(Debug)]
pub struct MatcapBlendMaterial {
    pub matcap_a: Handle<TextureData>,
    pub matcap_b: Handle<TextureData>,
    pub normal_map: Handle<TextureData>,
    progress: f32,
    needs_update: bool,
}

impl MatcapBlendMaterial {
    pub fn new(
        matcap_a: Handle<TextureData>,
        matcap_b: Handle<TextureData>,
        normal_map: Handle<TextureData>,
    ) -> Self {
        Self {
            matcap_a,
            matcap_b,
            normal_map,
            progress: 1.0,
            needs_update: true,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
    }

    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
    }

    /// Consumes the dirty flag; the renderer calls this once per frame to
    /// decide whether to re-upload [`BlendUniform`].
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }

    pub fn uniform(&self) -> BlendUniform {
        BlendUniform {
            progress: self.progress,
            _pad: [0.0; 3],
        }
    }

    /// Compose the blend shader on top of a base: extra bindings appended
    /// to the declarations stage, the matcap lookup replaced with the
    /// two-texture mix. Fails with [`StageError::ShaderPatchIncompatible`]
    /// when the base does not carry the stage being replaced.
    pub fn compose_shader(&self, mut base: FragmentComposer) -> Result<String, StageError> {
        base.append_slot(FragmentSlot::Declarations, BLEND_DECLARATIONS)?;
        base.override_slot(FragmentSlot::MatcapSample, BLEND_SAMPLE)?;
        Ok(base.compose())
    }

    /// Bind group layout for the blend bindings, for the external engine's
    /// pipeline construction. Matches [`BLEND_DECLARATIONS`] order.
    pub fn bind_group_layout_entries() -> [wgpu::BindGroupLayoutEntry; 4] {
        let texture = wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        };
        [
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: texture,
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: texture,
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 5,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ]
    }
}

const BLEND_DECLARATIONS: &str = r#"
@group(1) @binding(3) var matcap_a_tex: texture_2d<f32>;
@group(1) @binding(4) var matcap_b_tex: texture_2d<f32>;
struct BlendUniforms {
    progress: f32,
};
@group(1) @binding(5) var<uniform> blend: BlendUniforms;
"#;

const BLEND_SAMPLE: &str = r#"
    let sample_a = textureSample(matcap_a_tex, matcap_samp, in.matcap_uv);
    let sample_b = textureSample(matcap_b_tex, matcap_samp, in.matcap_uv);
    let mixed = mix(sample_b.rgb, sample_a.rgb, blend.progress);
    var diffuse = vec4<f32>(mixed, 1.0);
"#;

/// Uniform block mirrored by `BlendUniforms` in the composed shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BlendUniform {
    pub progress: f32,
    pub _pad: [f32; 3],
}

/// Environment material for the foliage: one diffuse map, one normal map,
/// no blend control. Stateless after construction.
#[derive(Debug, Clone, Copy)]
pub struct MatcapMaterial {
    pub diffuse: Handle<TextureData>,
    pub normal_map: Handle<TextureData>,
}

impl MatcapMaterial {
    pub fn new(diffuse: Handle<TextureData>, normal_map: Handle<TextureData>) -> Self {
        Self { diffuse, normal_map }
    }
}

/// Material variants stored in the scene's material store.
#[derive(Debug)]
pub enum StageMaterial {
    Blend(MatcapBlendMaterial),
    Environment(MatcapMaterial),
}

impl StageMaterial {
    pub fn as_blend_mut(&mut self) -> Option<&mut MatcapBlendMaterial> {
        match self {
            StageMaterial::Blend(blend) => Some(blend),
            StageMaterial::Environment(_) => None,
        }
    }

    pub fn as_blend(&self) -> Option<&MatcapBlendMaterial> {
        match self {
            StageMaterial::Blend(blend) => Some(blend),
            StageMaterial::Environment(_) => None,
        }
    }
}

/// CPU reference for the shader's blend stage: `progress` = 1 yields `a`'s
/// color, 0 yields `b`'s. Only the color channels are mixed; the output is
/// always opaque, as the material is. Used to validate the blend
/// boundaries in tests.
pub fn mix_rgba(a: [f32; 4], b: [f32; 4], progress: f32) -> [f32; 4] {
    let t = progress.clamp(0.0, 1.0);
    let mut out = [0.0, 0.0, 0.0, 1.0];
    for channel in 0..3 {
        out[channel] = b[channel] + (a[channel] - b[channel]) * t;
    }
    out
}
