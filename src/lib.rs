pub mod asset;
pub mod error;
pub mod interact;
pub mod material;
pub mod scene;
pub mod settings;
pub mod stage;
pub mod timeline;

pub use error::StageError;
pub use settings::StageSettings;
pub use stage::{Stage, StageTextures};

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    // Set panic hook to get better error messages
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    let _ = console_log::init_with_level(log::Level::Info);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
