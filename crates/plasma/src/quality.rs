//! Adaptive internal resolution.
//!
//! The kernel cost is per pixel, so larger surfaces render at a coarser
//! internal resolution and the presentation pass upscales the result. The
//! thresholds are tuned breakpoints; the only contract is that a larger area
//! never selects a smaller downscale.

/// `(minimum area exclusive, downscale)`, coarsest first.
const AREA_THRESHOLDS: [(u64, f32); 3] = [(2_300_000, 2.2), (1_500_000, 1.9), (1_000_000, 1.6)];

/// Downscale used below the smallest threshold.
pub const BASE_DOWNSCALE: f32 = 1.35;

/// Picks the downscale factor for a surface of `width` x `height` device pixels.
///
/// A manual override is returned verbatim.
pub fn choose_downscale(width: u32, height: u32, quality_override: Option<f32>) -> f32 {
    if let Some(factor) = quality_override {
        return factor;
    }
    let area = u64::from(width) * u64::from(height);
    AREA_THRESHOLDS
        .iter()
        .find(|(threshold, _)| area > *threshold)
        .map(|(_, factor)| *factor)
        .unwrap_or(BASE_DOWNSCALE)
}

/// Divides the external size by `downscale`, flooring and clamping each axis to 1.
pub fn internal_resolution(external: (u32, u32), downscale: f32) -> (u32, u32) {
    let downscale = if downscale.is_finite() && downscale > 0.0 {
        downscale
    } else {
        tracing::warn!(downscale, "invalid quality downscale; rendering at full resolution");
        1.0
    };
    let axis = |value: u32| {
        let scaled = (f64::from(value) / f64::from(downscale)).floor();
        scaled.clamp(1.0, f64::from(u32::MAX)) as u32
    };
    (axis(external.0), axis(external.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hd_lands_in_second_bucket() {
        assert_eq!(choose_downscale(1920, 1080, None), 1.9);
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(choose_downscale(1000, 1000, None), BASE_DOWNSCALE);
        assert_eq!(choose_downscale(1000, 1001, None), 1.6);
        assert_eq!(choose_downscale(1500, 1000, None), 1.6);
        assert_eq!(choose_downscale(1500, 1001, None), 1.9);
        assert_eq!(choose_downscale(2300, 1000, None), 1.9);
        assert_eq!(choose_downscale(3840, 2160, None), 2.2);
    }

    #[test]
    fn override_is_returned_verbatim() {
        assert_eq!(choose_downscale(100, 100, Some(3.0)), 3.0);
        assert_eq!(choose_downscale(3840, 2160, Some(0.5)), 0.5);
    }

    #[test]
    fn downscale_is_monotonic_in_area() {
        let mut last = 0.0;
        for side in (0..=4000).step_by(50) {
            let factor = choose_downscale(side, side, None);
            assert!(factor >= last, "side {side}: {factor} < {last}");
            last = factor;
        }
    }

    #[test]
    fn internal_resolution_floors_and_clamps() {
        assert_eq!(internal_resolution((1920, 1080), 1.9), (1010, 568));
        assert_eq!(internal_resolution((1, 1), 1.35), (1, 1));
        assert_eq!(internal_resolution((800, 600), 1.0), (800, 600));
    }

    #[test]
    fn degenerate_downscale_falls_back_to_full_resolution() {
        assert_eq!(internal_resolution((640, 480), 0.0), (640, 480));
        assert_eq!(internal_resolution((640, 480), f32::NAN), (640, 480));
        assert_eq!(internal_resolution((640, 480), -2.0), (640, 480));
    }
}
