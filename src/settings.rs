use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::interact::BLEND_TRANSITION_SECS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSettings {
    #[serde(default = "StageSettings::default_model_path")]
    pub model_path: String,
    #[serde(default = "StageSettings::default_idle_clip")]
    pub idle_clip: String,
    #[serde(default = "StageSettings::default_subject_marker")]
    pub subject_marker: String,
    #[serde(default)]
    pub subject: SubjectTextures,
    #[serde(default)]
    pub environment: EnvironmentTextures,
    #[serde(default = "StageSettings::default_hover_selector")]
    pub hover_selector: String,
    #[serde(default = "StageSettings::default_scroll_trigger_id")]
    pub scroll_trigger_id: String,
    #[serde(default = "StageSettings::default_scroll_end_id")]
    pub scroll_end_id: String,
    #[serde(default = "StageSettings::default_blend_duration_secs")]
    pub blend_duration_secs: f32,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            model_path: Self::default_model_path(),
            idle_clip: Self::default_idle_clip(),
            subject_marker: Self::default_subject_marker(),
            subject: SubjectTextures::default(),
            environment: EnvironmentTextures::default(),
            hover_selector: Self::default_hover_selector(),
            scroll_trigger_id: Self::default_scroll_trigger_id(),
            scroll_end_id: Self::default_scroll_end_id(),
            blend_duration_secs: Self::default_blend_duration_secs(),
        }
    }
}

impl StageSettings {
    pub fn load() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            info!("Using default stage settings for WebAssembly build");
            return Self::default();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::load_from_path("stage.json")
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<StageSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded stage settings from {:?}", path);
                    settings.validate()
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default stage settings.",
                        path, err
                    );
                    StageSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Stage settings file {:?} not found. Using default settings.",
                    path
                );
                StageSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default stage settings.",
                    path, err
                );
                StageSettings::default()
            }
        }
    }

    fn validate(mut self) -> Self {
        if self.subject_marker.is_empty() {
            warn!("Subject marker must not be empty. Using default marker.");
            self.subject_marker = Self::default_subject_marker();
        }

        if self.idle_clip.is_empty() {
            warn!("Idle clip name must not be empty. Using default clip name.");
            self.idle_clip = Self::default_idle_clip();
        }

        if !self.blend_duration_secs.is_finite() || self.blend_duration_secs <= 0.0 {
            warn!("Blend duration must be positive. Using default duration.");
            self.blend_duration_secs = Self::default_blend_duration_secs();
        }

        self
    }

    fn default_model_path() -> String {
        "assets/dog.glb".into()
    }

    fn default_idle_clip() -> String {
        "Take 001".into()
    }

    fn default_subject_marker() -> String {
        "DOG".into()
    }

    fn default_hover_selector() -> String {
        ".titles .item[img-title=\"tomorrowland\"]".into()
    }

    fn default_scroll_trigger_id() -> String {
        "section-1".into()
    }

    fn default_scroll_end_id() -> String {
        "section-3".into()
    }

    const fn default_blend_duration_secs() -> f32 {
        BLEND_TRANSITION_SECS
    }
}

/// Texture set for the marked subject meshes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectTextures {
    #[serde(default = "SubjectTextures::default_matcap_a")]
    pub matcap_a: String,
    #[serde(default = "SubjectTextures::default_matcap_b")]
    pub matcap_b: String,
    #[serde(default = "SubjectTextures::default_normal_map")]
    pub normal_map: String,
}

impl Default for SubjectTextures {
    fn default() -> Self {
        Self {
            matcap_a: Self::default_matcap_a(),
            matcap_b: Self::default_matcap_b(),
            normal_map: Self::default_normal_map(),
        }
    }
}

impl SubjectTextures {
    fn default_matcap_a() -> String {
        "assets/matcap_gold.png".into()
    }

    fn default_matcap_b() -> String {
        "assets/matcap_chrome.png".into()
    }

    fn default_normal_map() -> String {
        "assets/dog_normal.jpg".into()
    }
}

/// Texture set for everything that is not the subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentTextures {
    #[serde(default = "EnvironmentTextures::default_diffuse")]
    pub diffuse: String,
    #[serde(default = "EnvironmentTextures::default_normal_map")]
    pub normal_map: String,
}

impl Default for EnvironmentTextures {
    fn default() -> Self {
        Self {
            diffuse: Self::default_diffuse(),
            normal_map: Self::default_normal_map(),
        }
    }
}

impl EnvironmentTextures {
    fn default_diffuse() -> String {
        "assets/environment_diffuse.jpg".into()
    }

    fn default_normal_map() -> String {
        "assets/environment_normal.jpg".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_settings() -> StageSettings {
        StageSettings {
            subject_marker: String::new(),
            idle_clip: String::new(),
            blend_duration_secs: -1.0,
            ..StageSettings::default()
        }
    }

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let validated = invalid_settings().validate();

        assert_eq!(validated.subject_marker, StageSettings::default().subject_marker);
        assert_eq!(validated.idle_clip, StageSettings::default().idle_clip);
        assert_eq!(
            validated.blend_duration_secs,
            StageSettings::default().blend_duration_secs
        );
    }

    #[test]
    fn validate_preserves_valid_values() {
        let valid = StageSettings {
            subject_marker: "CAT".into(),
            idle_clip: "Idle".into(),
            blend_duration_secs: 1.5,
            ..StageSettings::default()
        };

        let validated = valid.clone().validate();

        assert_eq!(validated.subject_marker, valid.subject_marker);
        assert_eq!(validated.idle_clip, valid.idle_clip);
        assert_eq!(validated.blend_duration_secs, valid.blend_duration_secs);
    }

    #[test]
    fn scroll_triggers_default_to_the_page_sections() {
        let settings = StageSettings::default();
        assert_eq!(settings.scroll_trigger_id, "section-1");
        assert_eq!(settings.scroll_end_id, "section-3");
    }

    #[test]
    fn partial_json_fills_missing_fields_with_defaults() {
        let settings: StageSettings =
            serde_json::from_str(r#"{ "subject_marker": "WOLF" }"#).unwrap();

        assert_eq!(settings.subject_marker, "WOLF");
        assert_eq!(settings.idle_clip, StageSettings::default().idle_clip);
        assert_eq!(settings.model_path, StageSettings::default().model_path);
    }
}
