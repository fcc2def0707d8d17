use blur_core::{Blend, BlendMode, BlurParameters, Color};
use serde::Deserialize;

use crate::error::AppError;

/// Blur settings as written in a TOML params file. Every field is optional;
/// defaults match the live view component (three passes, full ratio,
/// plus-lighter blend when a color is given).
#[derive(Deserialize, Debug)]
pub struct BlurConfig {
    /// Blur radius in points.
    #[serde(default)]
    pub radius: f32,

    /// Capture scale factor.
    #[serde(default = "one")]
    pub scale: f32,

    /// Radius attenuation in `0..=1`.
    #[serde(default = "one")]
    pub ratio: f32,

    /// Number of convolution passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Hex blend color, `#RRGGBB` or `#RRGGBBAA`.
    #[serde(default)]
    pub blend_color: Option<String>,

    /// Composite mode for the blend fill: `plus-lighter` or `source-over`.
    #[serde(default)]
    pub blend_mode: Option<String>,
}

fn one() -> f32 {
    1.0
}

fn default_iterations() -> u32 {
    3
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            radius: 0.0,
            scale: 1.0,
            ratio: 1.0,
            iterations: default_iterations(),
            blend_color: None,
            blend_mode: None,
        }
    }
}

impl BlurConfig {
    /// Parses a params file's contents.
    pub fn from_toml(contents: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolves the config into pipeline parameters.
    pub fn into_parameters(self) -> Result<BlurParameters, AppError> {
        let blend = match self.blend_color {
            Some(hex) => {
                let color = Color::from_hex(&hex)
                    .ok_or_else(|| AppError::InvalidBlendColor(hex.clone()))?;
                let mode = match self.blend_mode.as_deref() {
                    None | Some("plus-lighter") => BlendMode::PlusLighter,
                    Some("source-over") => BlendMode::SourceOver,
                    Some(other) => return Err(AppError::InvalidBlendMode(other.to_string())),
                };
                Some(Blend { color, mode })
            }
            None => None,
        };

        Ok(BlurParameters {
            radius: self.radius,
            scale: self.scale,
            ratio: self.ratio,
            iterations: self.iterations,
            blend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_resolve_to_defaults() {
        let params = BlurConfig::from_toml("").unwrap().into_parameters().unwrap();
        assert_eq!(params.radius, 0.0);
        assert_eq!(params.scale, 1.0);
        assert_eq!(params.ratio, 1.0);
        assert_eq!(params.iterations, 3);
        assert!(params.blend.is_none());
    }

    #[test]
    fn full_params_parse() {
        let toml = r##"
            radius = 17.0
            scale = 2.0
            ratio = 0.5
            iterations = 10
            blend_color = "#80808040"
            blend_mode = "source-over"
        "##;
        let params = BlurConfig::from_toml(toml).unwrap().into_parameters().unwrap();
        assert_eq!(params.radius, 17.0);
        assert_eq!(params.iterations, 10);
        let blend = params.blend.unwrap();
        assert_eq!(blend.color, Color::rgba(128, 128, 128, 64));
        assert_eq!(blend.mode, BlendMode::SourceOver);
    }

    #[test]
    fn blend_color_defaults_to_plus_lighter() {
        let params = BlurConfig::from_toml("blend_color = \"#ffffff\"")
            .unwrap()
            .into_parameters()
            .unwrap();
        assert_eq!(params.blend.unwrap().mode, BlendMode::PlusLighter);
    }

    #[test]
    fn bad_color_and_mode_are_rejected() {
        let bad_color = BlurConfig::from_toml("blend_color = \"#zz0000\"")
            .unwrap()
            .into_parameters();
        assert!(matches!(bad_color, Err(AppError::InvalidBlendColor(_))));

        let bad_mode =
            BlurConfig::from_toml("blend_color = \"#ff0000\"\nblend_mode = \"difference\"")
                .unwrap()
                .into_parameters();
        assert!(matches!(bad_mode, Err(AppError::InvalidBlendMode(_))));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(BlurConfig::from_toml("radius = ["), Err(AppError::Config(_))));
    }
}
