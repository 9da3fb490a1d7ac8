use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{timeline::Ease, CarouselError, Result};

/// Top-level configuration structure for a carousel session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub scroll: ScrollConfig,
    pub input: InputConfig,
    pub layout: LayoutConfig,
    pub mesh: MeshConfig,
    pub frame: FrameConfig,
}

impl CarouselConfig {
    /// Parses a JSON document. Missing sections fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks every value that would otherwise produce undefined motion.
    pub fn validate(&self) -> Result<()> {
        let ease = self.scroll.ease;
        if !(ease > 0.0 && ease <= 1.0) {
            return Err(CarouselError::invalid_config(format!(
                "scroll.ease must lie in (0, 1], got {ease}"
            )));
        }
        if !self.input.wheel_sensitivity.is_finite() || !self.input.drag_sensitivity.is_finite()
        {
            return Err(CarouselError::invalid_config(
                "input sensitivities must be finite",
            ));
        }
        if self.input.settle_quiet_ms == 0 {
            return Err(CarouselError::invalid_config(
                "input.settle_quiet_ms must be positive",
            ));
        }
        if self.input.snap_duration_ms == 0 {
            return Err(CarouselError::invalid_config(
                "input.snap_duration_ms must be positive",
            ));
        }
        if !(self.layout.min_pitch > 0.0) {
            return Err(CarouselError::invalid_config(
                "layout.min_pitch must be positive",
            ));
        }
        if !(self.layout.slide_padding >= 0.0) {
            return Err(CarouselError::invalid_config(
                "layout.slide_padding must not be negative",
            ));
        }
        if !(self.mesh.pointer_damping > 0.0 && self.mesh.pointer_damping <= 1.0) {
            return Err(CarouselError::invalid_config(
                "mesh.pointer_damping must lie in (0, 1]",
            ));
        }
        if !(self.mesh.pointer_decay > 0.0 && self.mesh.pointer_decay <= 1.0) {
            return Err(CarouselError::invalid_config(
                "mesh.pointer_decay must lie in (0, 1]",
            ));
        }
        if self.mesh.parallax_domain.0 >= self.mesh.parallax_domain.1 {
            return Err(CarouselError::invalid_config(
                "mesh.parallax_domain must be an increasing interval",
            ));
        }
        if !(self.mesh.perspective > 1.0) {
            return Err(CarouselError::invalid_config(
                "mesh.perspective must be greater than the near plane",
            ));
        }
        if self.frame.fps == 0 {
            return Err(CarouselError::invalid_config("frame.fps must be positive"));
        }
        Ok(())
    }
}

/// Damping applied to the virtual scroll value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Fraction of the remaining gap closed on every tick.
    pub ease: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self { ease: 0.1 }
    }
}

/// Gesture sensitivities and settle behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pixels of target travel per wheel delta unit. The sign is inverted.
    pub wheel_sensitivity: f32,
    /// Pixels of target travel per pixel of drag.
    pub drag_sensitivity: f32,
    pub settle_quiet_ms: u64,
    pub snap_duration_ms: u64,
    pub snap_ease: Ease,
}

impl InputConfig {
    pub fn settle_quiet(&self) -> Duration {
        Duration::from_millis(self.settle_quiet_ms)
    }

    pub fn snap_duration(&self) -> Duration {
        Duration::from_millis(self.snap_duration_ms)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            wheel_sensitivity: 2.0,
            drag_sensitivity: 4.0,
            settle_quiet_ms: 100,
            snap_duration_ms: 500,
            snap_ease: Ease::ElasticOut {
                amplitude: 1.0,
                period: 1.0,
            },
        }
    }
}

/// Slide geometry used to derive the pitch and the wrap band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Added to the measured slide height to obtain the pitch.
    pub slide_padding: f32,
    /// Smallest pitch accepted; anything below is a configuration error at
    /// startup and is clamped on resize.
    pub min_pitch: f32,
    pub hover_tilt_degrees: f32,
    pub hover_tilt_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            slide_padding: 100.0,
            min_pitch: 1.0,
            hover_tilt_degrees: 2.5,
            hover_tilt_ms: 500,
        }
    }
}

/// Uniform derivation constants for the mesh layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Multiplier turning the target/current gap into a shader velocity.
    pub velocity_scale: f32,
    pub parallax_domain: (f32, f32),
    pub parallax_range: (f32, f32),
    /// Divisor applied to the scroll value before offsetting the parallax
    /// position.
    pub parallax_scroll_divisor: f32,
    pub pointer_damping: f32,
    pub pointer_decay: f32,
    pub pointer_velocity_cap: f32,
    pub perspective: f32,
    pub zoom: f32,
    pub plane_segments: u32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            velocity_scale: 0.001,
            parallax_domain: (-1.1, 1.1),
            parallax_range: (-0.005, 0.005),
            parallax_scroll_divisor: 100.0,
            pointer_damping: 0.1,
            pointer_decay: 0.999,
            pointer_velocity_cap: 0.05,
            perspective: 1000.0,
            zoom: 0.85,
            plane_segments: 100,
        }
    }
}

/// Frame pacing for loops that are not driven by a host compositor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub fps: u32,
}

impl FrameConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { fps: 60 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CarouselConfig::default();
        config.validate().unwrap();
        assert_eq!(config.scroll.ease, 0.1);
        assert_eq!(config.input.settle_quiet(), Duration::from_millis(100));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            CarouselConfig::from_json_str(r#"{ "input": { "drag_sensitivity": 3.0 } }"#).unwrap();
        assert_eq!(config.input.drag_sensitivity, 3.0);
        assert_eq!(config.input.wheel_sensitivity, 2.0);
        assert_eq!(config.mesh, MeshConfig::default());
    }

    #[test]
    fn rejects_out_of_range_ease() {
        let err = CarouselConfig::from_json_str(r#"{ "scroll": { "ease": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, CarouselError::InvalidConfig(_)));

        let err = CarouselConfig::from_json_str(r#"{ "scroll": { "ease": 1.5 } }"#).unwrap_err();
        assert!(format!("{err}").contains("scroll.ease"));
    }

    #[test]
    fn rejects_non_positive_pitch_floor() {
        let mut config = CarouselConfig::default();
        config.layout.min_pitch = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = CarouselConfig::from_json_str("{ scroll: ").unwrap_err();
        assert!(matches!(err, CarouselError::Json(_)));
    }
}
