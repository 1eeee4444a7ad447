use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{GradientSelection, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub animation: AnimationConfig,
}

impl AppConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(?path, "loading configuration");
        let source = fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Playback settings for the animation controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Oscillation periods per second.
    #[serde(default = "AnimationConfig::default_speed")]
    pub speed: f32,
    #[serde(default = "AnimationConfig::default_amplification")]
    pub amplification: f32,
    #[serde(default = "AnimationConfig::default_looping")]
    pub looping: bool,
    #[serde(default)]
    pub gradient: GradientSelection,
}

impl AnimationConfig {
    fn default_speed() -> f32 {
        1.0
    }
    fn default_amplification() -> f32 {
        1.0
    }
    fn default_looping() -> bool {
        true
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            speed: Self::default_speed(),
            amplification: Self::default_amplification(),
            looping: Self::default_looping(),
            gradient: GradientSelection::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GradientBase, ModalVizError};

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config.animation, AnimationConfig::default());
        assert!(config.animation.looping);
        assert_eq!(config.animation.gradient, GradientSelection::CLASSIC);
    }

    #[test]
    fn parses_partial_animation_section() {
        let config = AppConfig::from_json_str(
            r#"{ "animation": { "speed": 0.25, "gradient": { "base": "ocean", "symmetric": true } } }"#,
        )
        .unwrap();

        assert_eq!(config.animation.speed, 0.25);
        assert_eq!(config.animation.amplification, 1.0);
        assert_eq!(
            config.animation.gradient,
            GradientSelection::symmetric(GradientBase::Ocean)
        );
    }

    #[test]
    fn survives_a_json_round_trip() {
        let mut config = AppConfig::default();
        config.animation.looping = false;
        config.animation.gradient = GradientSelection::FIRE;

        let text = config.to_json_string().unwrap();
        let parsed = AppConfig::from_json_str(&text).unwrap();
        assert_eq!(parsed.animation, config.animation);
    }

    #[test]
    fn reports_unknown_gradients() {
        let err = AppConfig::from_json_str(r#"{ "animation": { "gradient": { "base": "plasma" } } }"#)
            .unwrap_err();
        assert!(matches!(err, ModalVizError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ModalVizError::Io(_)));
    }
}
