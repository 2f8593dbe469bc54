//! Fragment-stage composition for the matcap shaders.
//!
//! Materials extend a base shader through typed slots instead of textual
//! search-and-replace: a base declares which stages it has, an extending
//! material appends declarations and overrides a named stage. Overriding a
//! stage the base never defined is a hard error, not a silent no-op.

use std::borrow::Cow;

use crate::error::StageError;

/// Stages of the fragment shader, in assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentSlot {
    /// Bindings and uniform declarations, emitted at module scope.
    Declarations,
    /// Produces `surface_normal` from the interpolated normal (and the
    /// normal map, when the base uses one).
    SurfaceNormal,
    /// Produces `diffuse`, the shaded surface color. This is the stage the
    /// blend material replaces.
    MatcapSample,
    /// Produces the final fragment color from `diffuse`.
    Output,
}

impl FragmentSlot {
    pub fn name(&self) -> &'static str {
        match self {
            FragmentSlot::Declarations => "declarations",
            FragmentSlot::SurfaceNormal => "surface_normal",
            FragmentSlot::MatcapSample => "matcap_sample",
            FragmentSlot::Output => "output",
        }
    }
}

const VERTEX_STAGE: &str = r#"
struct VertexOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) matcap_uv: vec2<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> VertexOut {
    var out: VertexOut;
    let view_pos = frame.view * frame.model * vec4<f32>(position, 1.0);
    out.clip_position = frame.proj * view_pos;
    let view_normal = normalize((frame.view * frame.model * vec4<f32>(normal, 0.0)).xyz);
    // Matcap lookup: view-space normal xy remapped to [0, 1].
    out.matcap_uv = view_normal.xy * 0.5 + vec2<f32>(0.5, 0.5);
    out.normal = view_normal;
    out.uv = uv;
    return out;
}
"#;

const FRAME_DECLARATIONS: &str = r#"
struct FrameUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
};
@group(0) @binding(0) var<uniform> frame: FrameUniforms;
"#;

const MATCAP_DECLARATIONS: &str = r#"
@group(1) @binding(0) var matcap_tex: texture_2d<f32>;
@group(1) @binding(1) var normal_tex: texture_2d<f32>;
@group(1) @binding(2) var matcap_samp: sampler;
"#;

const MATCAP_SURFACE_NORMAL: &str = r#"
    let tangent_normal = textureSample(normal_tex, matcap_samp, in.uv).xyz * 2.0 - vec3<f32>(1.0);
    let surface_normal = normalize(in.normal + tangent_normal * 0.5);
"#;

const MATCAP_SAMPLE: &str = r#"
    var diffuse = textureSample(matcap_tex, matcap_samp, in.matcap_uv);
"#;

const MATCAP_OUTPUT: &str = r#"
    return vec4<f32>(diffuse.rgb, diffuse.a);
"#;

/// Ordered collection of fragment stages with their WGSL bodies.
pub struct FragmentComposer {
    label: &'static str,
    slots: Vec<(FragmentSlot, String)>,
}

impl FragmentComposer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            slots: Vec::new(),
        }
    }

    /// The matcap base shader shared by the subject and environment
    /// materials: one matcap texture, one normal map, view-space lookup.
    pub fn matcap_base() -> Self {
        let mut composer = Self::new("matcap");
        composer.define_slot(FragmentSlot::Declarations, MATCAP_DECLARATIONS);
        composer.define_slot(FragmentSlot::SurfaceNormal, MATCAP_SURFACE_NORMAL);
        composer.define_slot(FragmentSlot::MatcapSample, MATCAP_SAMPLE);
        composer.define_slot(FragmentSlot::Output, MATCAP_OUTPUT);
        composer
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn define_slot(&mut self, slot: FragmentSlot, wgsl: &str) {
        self.slots.push((slot, wgsl.to_string()));
    }

    pub fn has_slot(&self, slot: FragmentSlot) -> bool {
        self.slots.iter().any(|(s, _)| *s == slot)
    }

    /// Append WGSL to an existing stage (used for extra bindings).
    pub fn append_slot(&mut self, slot: FragmentSlot, wgsl: &str) -> Result<(), StageError> {
        let entry = self
            .slots
            .iter_mut()
            .find(|(s, _)| *s == slot)
            .ok_or(StageError::ShaderPatchIncompatible { slot: slot.name() })?;
        entry.1.push_str(wgsl);
        Ok(())
    }

    /// Replace an existing stage's body outright.
    pub fn override_slot(&mut self, slot: FragmentSlot, wgsl: &str) -> Result<(), StageError> {
        let entry = self
            .slots
            .iter_mut()
            .find(|(s, _)| *s == slot)
            .ok_or(StageError::ShaderPatchIncompatible { slot: slot.name() })?;
        entry.1 = wgsl.to_string();
        Ok(())
    }

    /// Assemble the full WGSL module: frame/vertex boilerplate, then the
    /// fragment stages in declaration order inside `fs_main`.
    pub fn compose(&self) -> String {
        let mut source = String::new();
        source.push_str(FRAME_DECLARATIONS);

        for (slot, wgsl) in &self.slots {
            if *slot == FragmentSlot::Declarations {
                source.push_str(wgsl);
            }
        }

        source.push_str(VERTEX_STAGE);

        source.push_str("\n@fragment\nfn fs_main(in: VertexOut) -> @location(0) vec4<f32> {\n");
        for (slot, wgsl) in &self.slots {
            if *slot != FragmentSlot::Declarations {
                source.push_str(wgsl);
            }
        }
        source.push_str("}\n");
        source
    }
}

/// Descriptor for handing the composed source to the external engine.
pub fn shader_module_descriptor<'a>(
    label: &'a str,
    source: &'a str,
) -> wgpu::ShaderModuleDescriptor<'a> {
    wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcap_base_composes_all_stages() {
        let source = FragmentComposer::matcap_base().compose();
        assert!(source.contains("fn vs_main"));
        assert!(source.contains("fn fs_main"));
        assert!(source.contains("matcap_tex"));
        assert!(source.contains("var diffuse"));
    }

    #[test]
    fn override_replaces_stage_body() {
        let mut composer = FragmentComposer::matcap_base();
        composer
            .override_slot(FragmentSlot::MatcapSample, "    var diffuse = vec4<f32>(1.0);\n")
            .unwrap();
        let source = composer.compose();
        assert!(source.contains("var diffuse = vec4<f32>(1.0);"));
        assert!(!source.contains("var diffuse = textureSample(matcap_tex"));
    }

    #[test]
    fn module_descriptor_wraps_the_composed_source() {
        let source = FragmentComposer::matcap_base().compose();
        let descriptor = shader_module_descriptor("matcap", &source);

        assert_eq!(descriptor.label, Some("matcap"));
        match descriptor.source {
            wgpu::ShaderSource::Wgsl(text) => {
                assert!(text.contains("fn vs_main"));
                assert!(text.contains("fn fs_main"));
            }
            _ => panic!("composed shaders are WGSL"),
        }
    }

    #[test]
    fn override_without_anchor_is_rejected() {
        // A base that shades from a plain texture has no matcap stage to
        // substitute; the patch must fail loudly instead of no-opping.
        let mut composer = FragmentComposer::new("textured");
        composer.define_slot(FragmentSlot::Declarations, "// bindings\n");
        composer.define_slot(FragmentSlot::Output, "    return vec4<f32>(1.0);\n");

        let result = composer.override_slot(FragmentSlot::MatcapSample, "    var diffuse = vec4<f32>(0.0);\n");
        assert!(matches!(
            result,
            Err(crate::error::StageError::ShaderPatchIncompatible { slot: "matcap_sample" })
        ));
    }
}
