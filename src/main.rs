// Headless demo: assemble the stage from the settings file, sweep the
// scroll range once, fire the hover transition, and report the resulting
// poses and blend values. Rendering belongs to the embedding engine; this
// binary exercises the stage logic end to end.

#[cfg(not(target_arch = "wasm32"))]
use scrollscene::{init_logging, Stage, StageSettings};

// On the web the host drives the library entry points directly; the demo
// binary is native-only.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    init_logging();

    let settings = StageSettings::load();
    log::info!("Loading showcase from {:?}", settings.model_path);

    let mut stage = match Stage::new(&settings) {
        Ok(stage) => stage,
        Err(err) => {
            log::error!("Stage setup failed: {}", err);
            std::process::exit(1);
        }
    };

    // Scrub sweep: forward to the end, then back to a mid point.
    for step in 0..=10 {
        let s = step as f32 / 10.0;
        stage.on_scroll_progress(s);
        stage.update(1.0 / 60.0);
        let pose = stage.timeline().scrub(s);
        log::info!(
            "s = {:.2} -> position {:?}, rotation {:?}",
            s,
            pose.position,
            pose.rotation
        );
    }
    stage.on_scroll_progress(0.5);
    stage.update(1.0 / 60.0);

    // Hover: run the blend ramp to completion in frame-sized steps.
    stage.on_hover_enter();
    let frames = (settings.blend_duration_secs * 60.0).ceil() as u32 + 1;
    for _ in 0..frames {
        stage.update(1.0 / 60.0);
        std::thread::sleep(std::time::Duration::from_millis(16));
    }
    if let Some(material) = stage.blend_material() {
        log::info!("Blend progress after hover: {:.3}", material.progress());
    }

    stage.teardown();
    log::info!("Showcase demo complete");
}
