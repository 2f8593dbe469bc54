// stage.rs
//
// Ties the pieces together: loads the showcase asset and its textures,
// builds and assigns the two materials, starts the idle clip, and routes
// scroll and hover input into the timeline and the blend transition.

use std::cell::Cell;
use std::f32::consts::{FRAC_PI_4, PI};
use std::rc::Rc;
use std::time::Duration;

use glam::{vec3, EulerRot, Quat, Vec3};
use instant::Instant;

use crate::asset::{Handle, TextureData};
use crate::error::StageError;
use crate::interact::{BlendTransition, Subscription};
use crate::material::{
    FragmentComposer, MatcapBlendMaterial, MatcapMaterial, StageMaterial,
};
use crate::scene::{
    assign_materials, marker_predicate, DirectionalLight, GltfLoader, Name, Scene, Transform,
    TransformComponent,
};
use crate::settings::StageSettings;
use crate::timeline::{PoseDelta, RootPose, ScrollBinding, ScrollTimeline};

/// The five textures the stage needs, decoded and flagged.
pub struct StageTextures {
    pub matcap_a: TextureData,
    pub matcap_b: TextureData,
    pub subject_normal: TextureData,
    pub environment_diffuse: TextureData,
    pub environment_normal: TextureData,
}

impl StageTextures {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(settings: &StageSettings) -> Result<Self, StageError> {
        let set: [TextureData; 5] = TextureData::load_set(&[
            settings.subject.matcap_a.as_str(),
            settings.subject.matcap_b.as_str(),
            settings.subject.normal_map.as_str(),
            settings.environment.diffuse.as_str(),
            settings.environment.normal_map.as_str(),
        ])?
        .try_into()
        .map_err(|_| StageError::asset_load("textures", "texture set was not five entries"))?;
        Ok(Self::from_ordered(set))
    }

    /// Apply the per-texture flags to a decoded set, in load order:
    /// matcap A, matcap B, subject normal, environment diffuse,
    /// environment normal. The authored asset encodes all five as sRGB,
    /// normal maps included, and nothing is vertically flipped.
    pub fn from_ordered(set: [TextureData; 5]) -> Self {
        let [matcap_a, matcap_b, subject_normal, environment_diffuse, environment_normal] = set;
        Self {
            matcap_a: matcap_a.srgb(true),
            matcap_b: matcap_b.srgb(true),
            subject_normal: subject_normal.srgb(true).flip_y(false),
            environment_diffuse: environment_diffuse.srgb(true),
            environment_normal: environment_normal.srgb(true),
        }
    }
}

/// The assembled showcase: scene, materials, timeline, and input state.
pub struct Stage {
    pub scene: Scene,
    subject_material: Handle<StageMaterial>,
    environment_material: Handle<StageMaterial>,
    shader_source: String,
    timeline: ScrollTimeline,
    root: hecs::Entity,
    transition: BlendTransition,
    scrub: f32,
    hover_entered: Rc<Cell<bool>>,
    scroll_offset: Rc<Cell<f64>>,
    scroll_binding: Rc<Cell<Option<ScrollBinding>>>,
    subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").finish_non_exhaustive()
    }
}

impl Stage {
    /// Load everything from disk per `settings` and assemble the stage.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(settings: &StageSettings) -> Result<Self, StageError> {
        let textures = StageTextures::load(settings)?;
        let mut scene = Scene::new();
        let loaded = GltfLoader::load(&settings.model_path, &mut scene)?;
        Self::assemble(settings, scene, loaded.roots, textures)
    }

    /// Assemble from caller-provided bytes. A web host downloads the model
    /// and textures itself and hands over the results.
    pub fn from_model_bytes(
        settings: &StageSettings,
        model: &[u8],
        textures: StageTextures,
    ) -> Result<Self, StageError> {
        let mut scene = Scene::new();
        let loaded = GltfLoader::load_from_slice(model, &settings.model_path, &mut scene)?;
        Self::assemble(settings, scene, loaded.roots, textures)
    }

    fn assemble(
        settings: &StageSettings,
        mut scene: Scene,
        roots: Vec<hecs::Entity>,
        textures: StageTextures,
    ) -> Result<Self, StageError> {
        let root = roots.first().copied().ok_or(StageError::MissingRoot)?;

        let matcap_a = scene.assets.textures.insert(textures.matcap_a);
        let matcap_b = scene.assets.textures.insert(textures.matcap_b);
        let subject_normal = scene.assets.textures.insert(textures.subject_normal);
        let environment_diffuse = scene.assets.textures.insert(textures.environment_diffuse);
        let environment_normal = scene.assets.textures.insert(textures.environment_normal);

        let blend = MatcapBlendMaterial::new(matcap_a, matcap_b, subject_normal);

        // An incompatible base keeps its own matcap lookup: the subject
        // renders unblended rather than not at all.
        let shader_source = match blend.compose_shader(FragmentComposer::matcap_base()) {
            Ok(source) => source,
            Err(err) => {
                log::warn!("Blend stage disabled: {}", err);
                FragmentComposer::matcap_base().compose()
            }
        };

        let subject_material = scene.assets.materials.insert(StageMaterial::Blend(blend));
        let environment_material = scene
            .assets
            .materials
            .insert(StageMaterial::Environment(MatcapMaterial::new(
                environment_diffuse,
                environment_normal,
            )));

        let report = assign_materials(
            &mut scene.world,
            &roots,
            marker_predicate(&settings.subject_marker),
            subject_material,
            environment_material,
        );
        log::info!(
            "Assigned materials: {} subject nodes, {} total",
            report.matched,
            report.visited
        );

        scene.world.spawn((
            Name::new("KeyLight"),
            TransformComponent(Transform::from_trs(
                vec3(0.0, 5.0, 5.0),
                Quat::IDENTITY,
                Vec3::ONE,
            )),
            DirectionalLight {
                color: Vec3::ONE,
                intensity: 10.0,
            },
        ));

        scene.play_clip_by_name(&settings.idle_clip)?;

        let timeline = showcase_timeline();
        let transition =
            BlendTransition::new(Duration::from_secs_f32(settings.blend_duration_secs));

        let mut stage = Self {
            scene,
            subject_material,
            environment_material,
            shader_source,
            timeline,
            root,
            transition,
            scrub: 0.0,
            hover_entered: Rc::new(Cell::new(false)),
            scroll_offset: Rc::new(Cell::new(0.0)),
            scroll_binding: Rc::new(Cell::new(None)),
            subscriptions: Vec::new(),
        };
        stage.apply_scrub();
        Ok(stage)
    }

    /// Hook the stage up to the page: hover listener on the configured
    /// selector, scroll listener on the window, and the scroll span
    /// measured from the trigger elements. A missing hover target just
    /// leaves the blend at rest.
    #[cfg(target_arch = "wasm32")]
    pub fn attach_dom(&mut self, settings: &StageSettings) {
        use crate::interact::dom;

        if let Some(sub) = dom::attach_hover(&settings.hover_selector, self.hover_entered.clone())
        {
            self.subscriptions.push(sub);
        }
        if let Some(sub) = dom::attach_scroll(self.scroll_offset.clone()) {
            self.subscriptions.push(sub);
        }

        self.scroll_binding.set(dom::binding_from_elements(
            &settings.scroll_trigger_id,
            &settings.scroll_end_id,
        ));
        if let Some(sub) = dom::attach_resize(
            &settings.scroll_trigger_id,
            &settings.scroll_end_id,
            self.scroll_binding.clone(),
        ) {
            self.subscriptions.push(sub);
        }
    }

    /// Install the scroll range directly. Native hosts and tests use this
    /// in place of the DOM measurement.
    pub fn set_scroll_binding(&mut self, binding: Option<ScrollBinding>) {
        self.scroll_binding.set(binding);
    }

    /// Scrub the timeline to `s` in [0, 1]. Pure: any value may follow any
    /// other.
    pub fn on_scroll_progress(&mut self, s: f32) {
        self.scrub = s.clamp(0.0, 1.0);
        self.apply_scrub();
    }

    /// Start (or restart) the blend ramp from the material's current
    /// progress toward 0.
    pub fn on_hover_enter(&mut self) {
        let current = self
            .blend_material()
            .map(|m| m.progress())
            .unwrap_or(0.0);
        self.transition.trigger(Instant::now(), current);
    }

    /// One frame: drain pending input, advance the blend ramp, then step
    /// the scene's animation and transform systems.
    pub fn update(&mut self, dt: f64) {
        if self.hover_entered.replace(false) {
            self.on_hover_enter();
        }

        if let Some(binding) = self.scroll_binding.get() {
            let s = binding.progress(self.scroll_offset.get());
            if s != self.scrub {
                self.on_scroll_progress(s);
            }
        }

        if let Some(progress) = self.transition.sample(Instant::now()) {
            if let Some(material) = self.blend_material_mut() {
                material.set_progress(progress);
                material.mark_dirty();
            }
        }

        self.scene.update(dt);
    }

    /// Drop every attached listener. Also runs on drop; calling it early
    /// makes teardown order explicit for hosts that care.
    pub fn teardown(&mut self) {
        self.subscriptions.clear();
        self.scroll_binding.set(None);
    }

    pub fn scrub(&self) -> f32 {
        self.scrub
    }

    pub fn root(&self) -> hecs::Entity {
        self.root
    }

    pub fn timeline(&self) -> &ScrollTimeline {
        &self.timeline
    }

    /// WGSL for the subject's composed fragment stage, ready for the
    /// engine's shader module creation.
    pub fn shader_source(&self) -> &str {
        &self.shader_source
    }

    pub fn subject_material(&self) -> Handle<StageMaterial> {
        self.subject_material
    }

    pub fn environment_material(&self) -> Handle<StageMaterial> {
        self.environment_material
    }

    pub fn blend_material(&self) -> Option<&MatcapBlendMaterial> {
        self.scene
            .assets
            .materials
            .get(self.subject_material)
            .and_then(StageMaterial::as_blend)
    }

    fn blend_material_mut(&mut self) -> Option<&mut MatcapBlendMaterial> {
        self.scene
            .assets
            .materials
            .get_mut(self.subject_material)
            .and_then(StageMaterial::as_blend_mut)
    }

    // Write the scrubbed pose onto the root's local transform. Scale is
    // whatever the asset authored; the timeline never touches it.
    fn apply_scrub(&mut self) {
        let pose = self.timeline.scrub(self.scrub);
        if let Ok(mut transform) = self.scene.world.get::<&mut TransformComponent>(self.root) {
            transform.0.translation = pose.position;
            transform.0.rotation = Quat::from_euler(
                EulerRot::XYZ,
                pose.rotation.x,
                pose.rotation.y,
                pose.rotation.z,
            );
        }
    }
}

/// The showcase camera path: four segments over the scroll range. The two
/// co-timed entries share a start, so the final turn and the final slide
/// play together over the last third.
pub fn showcase_timeline() -> ScrollTimeline {
    ScrollTimeline::builder()
        .to(PoseDelta::position(vec3(0.0, 0.1, -0.75)))
        .to(PoseDelta::rotation(vec3(PI / 15.0, 0.0, 0.0)))
        .to_at("third", PoseDelta::rotation(vec3(0.0, -PI, 0.0)))
        .to_at("third", PoseDelta::position(vec3(-0.5, -0.05, 0.6)))
        .build(RootPose::new(
            vec3(0.25, -0.55, 0.0),
            vec3(0.0, FRAC_PI_4, 0.0),
        ))
}
