use serde::{Deserialize, Serialize};

use crate::{CarouselError, Result};

/// Folds a slide's raw offset into `[-pitch, wrap_length - pitch)`.
///
/// The reduction is modular, so the result is a sawtooth of `raw_offset`
/// that jumps by exactly `wrap_length` at the seam. Both visual layers call
/// this function with the same arguments so they cannot disagree on where a
/// slide sits.
pub fn project(index: usize, pitch: f32, raw_offset: f32, wrap_length: f32) -> f32 {
    let lower = -pitch;
    let upper = wrap_length - pitch;
    let raw = index as f32 * pitch + raw_offset;

    let mut remainder = (raw - lower).rem_euclid(wrap_length);
    // rem_euclid can round a tiny negative remainder up to the modulus itself.
    if remainder >= wrap_length {
        remainder -= wrap_length;
    }
    let wrapped = remainder + lower;
    if wrapped >= upper {
        lower
    } else {
        wrapped
    }
}

/// Slide geometry from which the pitch and the wrap band are derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideMetrics {
    pub container_height: f32,
    pub slide_height: f32,
    pub slide_padding: f32,
    pub slide_count: usize,
}

impl SlideMetrics {
    /// Height of one slide plus padding; the modulus unit for wrap and snap.
    pub fn pitch(&self) -> f32 {
        self.slide_height + self.slide_padding
    }

    pub fn wrap_length(&self) -> f32 {
        self.container_height * self.slide_count as f32
    }

    /// Resolves the band, rejecting degenerate geometry.
    pub fn band(&self, min_pitch: f32) -> Result<WrapBand> {
        let pitch = self.pitch();
        if !(pitch >= min_pitch) {
            return Err(CarouselError::DegeneratePitch {
                pitch,
                floor: min_pitch,
            });
        }
        let wrap_length = self.wrap_length();
        if !(wrap_length > 0.0) {
            return Err(CarouselError::invalid_config(format!(
                "wrap length must be positive, got {wrap_length} for {} slide(s)",
                self.slide_count
            )));
        }
        Ok(WrapBand { pitch, wrap_length })
    }

    /// Resolves the band for a runtime re-measure, flooring the pitch instead
    /// of failing. Returns `None` when the container has collapsed entirely.
    pub fn band_floored(&self, min_pitch: f32) -> Option<WrapBand> {
        let wrap_length = self.wrap_length();
        if !(wrap_length > 0.0) {
            return None;
        }
        let pitch = self.pitch();
        let pitch = if pitch >= min_pitch {
            pitch
        } else {
            tracing::warn!(pitch, floor = min_pitch, "slide pitch below floor, clamping");
            min_pitch
        };
        Some(WrapBand { pitch, wrap_length })
    }
}

/// The finite interval every projected slide position is folded into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WrapBand {
    pub pitch: f32,
    pub wrap_length: f32,
}

impl WrapBand {
    pub fn lower(&self) -> f32 {
        -self.pitch
    }

    pub fn upper(&self) -> f32 {
        self.wrap_length - self.pitch
    }

    pub fn contains(&self, position: f32) -> bool {
        position >= self.lower() && position < self.upper()
    }

    pub fn project(&self, index: usize, raw_offset: f32) -> f32 {
        project(index, self.pitch, raw_offset, self.wrap_length)
    }

    /// Index of the slide nearest the origin for the given scroll value.
    pub fn active_index(&self, scroll: f32, slide_count: usize) -> usize {
        if slide_count == 0 {
            return 0;
        }
        let steps = (scroll.abs() / self.pitch).round();
        (steps as usize) % slide_count
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn metrics(container: f32, slide: f32, count: usize) -> SlideMetrics {
        SlideMetrics {
            container_height: container,
            slide_height: slide,
            slide_padding: 0.0,
            slide_count: count,
        }
    }

    #[test]
    fn positions_inside_band_are_unchanged() {
        assert_eq!(project(0, 100.0, 0.0, 500.0), 0.0);
        assert_eq!(project(2, 100.0, 50.0, 500.0), 250.0);
        assert_eq!(project(0, 100.0, -100.0, 500.0), -100.0);
    }

    #[test]
    fn folds_both_directions() {
        // 400 is the upper bound and folds to the lower bound
        assert_eq!(project(4, 100.0, 0.0, 500.0), -100.0);
        assert_eq!(project(0, 100.0, -150.0, 500.0), 350.0);
        assert_eq!(project(1, 100.0, 1_000.0, 500.0), 100.0);
    }

    #[test]
    fn large_drag_stays_in_band() {
        let band = metrics(600.0, 300.0, 5).band(1.0).unwrap();
        assert_eq!(band.wrap_length, 3_000.0);
        let position = band.project(0, 1_000_000.0);
        assert!(band.contains(position), "{position} escaped the band");
        assert!((position - 1_000.0).abs() < 1e-3);
    }

    #[test]
    fn seam_jumps_by_wrap_length() {
        let before = project(0, 100.0, 399.5, 500.0);
        let after = project(0, 100.0, 400.5, 500.0);
        assert!((before - 399.5).abs() < 1e-4);
        assert!((after + 99.5).abs() < 1e-4);
        assert!(((before - after) - 500.0 + 1.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_pitch_is_rejected() {
        let err = metrics(600.0, 0.0, 5).band(1.0).unwrap_err();
        assert!(matches!(err, CarouselError::DegeneratePitch { .. }));
        assert!(metrics(600.0, 100.0, 0).band(1.0).is_err());
    }

    #[test]
    fn floored_band_clamps_pitch() {
        let band = metrics(600.0, 0.0, 5).band_floored(10.0).unwrap();
        assert_eq!(band.pitch, 10.0);
        assert!(metrics(0.0, 100.0, 5).band_floored(10.0).is_none());
    }

    #[test]
    fn padding_extends_pitch() {
        let mut slide = metrics(700.0, 400.0, 3);
        slide.slide_padding = 100.0;
        assert_eq!(slide.pitch(), 500.0);
    }

    #[test]
    fn active_index_wraps_around_slide_count() {
        let band = WrapBand {
            pitch: 100.0,
            wrap_length: 500.0,
        };
        assert_eq!(band.active_index(0.0, 5), 0);
        assert_eq!(band.active_index(-140.0, 5), 1);
        assert_eq!(band.active_index(260.0, 5), 3);
        assert_eq!(band.active_index(700.0, 5), 2);
        assert_eq!(band.active_index(700.0, 0), 0);
    }

    proptest! {
        #[test]
        fn projection_stays_in_half_open_band(
            index in 0usize..64,
            pitch in 1.0f32..2_000.0,
            raw_offset in -1.0e6f32..1.0e6,
            wrap_length in 1.0f32..50_000.0,
        ) {
            let position = project(index, pitch, raw_offset, wrap_length);
            prop_assert!(position >= -pitch, "{} below {}", position, -pitch);
            prop_assert!(position < wrap_length - pitch, "{} above {}", position, wrap_length - pitch);
        }

        #[test]
        fn projection_is_continuous_away_from_seam(
            index in 0usize..8,
            pitch in 50.0f32..500.0,
            raw_offset in -5_000.0f32..5_000.0,
            delta in 0.01f32..5.0,
        ) {
            let wrap_length = 3_000.0;
            let a = project(index, pitch, raw_offset, wrap_length);
            let b = project(index, pitch, raw_offset + delta, wrap_length);
            let difference = b - a;
            let tolerance = 1e-2;
            let continuous = (difference - delta).abs() < tolerance;
            let across_seam = (difference - (delta - wrap_length)).abs() < tolerance;
            prop_assert!(continuous || across_seam, "difference {} for delta {}", difference, delta);
        }
    }
}
