use thiserror::Error;

/// Failures that can surface while setting up or driving the stage.
///
/// Construction-time failures (asset loading, missing clip, incompatible
/// shader base) are propagated to the caller; the absent hover target is
/// deliberately not represented here because it disables the feature
/// silently instead of failing setup.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to load asset {path:?}: {reason}")]
    AssetLoad { path: String, reason: String },

    #[error("animation clip '{name}' not present on the loaded asset")]
    MissingAnimationClip { name: String },

    #[error("base shader does not define the '{slot}' stage; blend patch would be a no-op")]
    ShaderPatchIncompatible { slot: &'static str },

    #[error("scene has no root node to drive")]
    MissingRoot,
}

impl StageError {
    pub fn asset_load(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
