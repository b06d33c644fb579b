//! Covering scale: how large an image is drawn relative to the output frame.
//!
//! Landscape images are scaled to fill the frame (the larger of the two axis
//! ratios, so one axis overflows). Portrait images are scaled to fit inside
//! it (the smaller ratio).

use ksg_project_model::rect::Size;
use serde::Serialize;

/// Image orientation. Square images count as landscape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn of(size: Size) -> Self {
        if size.is_portrait() {
            Self::Portrait
        } else {
            Self::Landscape
        }
    }
}

/// Result of fitting a source image to the output frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cover {
    pub orientation: Orientation,
    /// Multiplier applied to the source dimensions.
    pub scale: f64,
    /// Source dimensions times `scale`.
    pub scaled: Size,
}

/// Compute the covering scale of `source` inside `frame`.
///
/// Both sizes must be strictly positive; the project resolver rejects
/// zero dimensions before they reach this point.
pub fn cover(source: Size, frame: Size) -> Cover {
    let h_ratio = frame.width / source.width;
    let v_ratio = frame.height / source.height;

    let orientation = Orientation::of(source);
    let scale = match orientation {
        Orientation::Portrait => h_ratio.min(v_ratio),
        Orientation::Landscape => h_ratio.max(v_ratio),
    };

    Cover {
        orientation,
        scale,
        scaled: source.scaled(scale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_landscape_fills_frame() {
        let c = cover(Size::new(4000.0, 3000.0), Size::new(1920.0, 1080.0));
        assert_eq!(c.orientation, Orientation::Landscape);
        assert!((c.scale - 0.48).abs() < 1e-12);
        assert!((c.scaled.width - 1920.0).abs() < EPS);
        assert!((c.scaled.height - 1440.0).abs() < EPS);
    }

    #[test]
    fn test_portrait_fits_frame() {
        let c = cover(Size::new(3000.0, 4000.0), Size::new(1920.0, 1080.0));
        assert_eq!(c.orientation, Orientation::Portrait);
        assert!((c.scale - 0.27).abs() < 1e-12);
        assert!((c.scaled.width - 810.0).abs() < EPS);
        assert!((c.scaled.height - 1080.0).abs() < EPS);
    }

    #[test]
    fn test_square_is_landscape() {
        let c = cover(Size::new(1000.0, 1000.0), Size::new(1920.0, 1080.0));
        assert_eq!(c.orientation, Orientation::Landscape);
        assert!((c.scaled.width - 1920.0).abs() < EPS);
    }

    #[test]
    fn test_upscales_small_images() {
        let c = cover(Size::new(640.0, 480.0), Size::new(1920.0, 1080.0));
        assert!((c.scale - 3.0).abs() < 1e-12);
        assert!((c.scaled.height - 1440.0).abs() < EPS);
    }

    proptest! {
        #[test]
        fn prop_landscape_covers_frame(
            w in 1u32..10_000,
            h in 1u32..10_000,
            fw in 16u32..8_000,
            fh in 16u32..8_000,
        ) {
            prop_assume!(h <= w);
            let frame = Size::from((fw, fh));
            let c = cover(Size::from((w, h)), frame);
            let expected = (fw as f64 / w as f64).max(fh as f64 / h as f64);
            prop_assert!((c.scale - expected).abs() < 1e-12);
            prop_assert!(c.scaled.width.round() >= frame.width);
            prop_assert!(c.scaled.height.round() >= frame.height);
        }

        #[test]
        fn prop_portrait_fits_inside_frame(
            w in 1u32..10_000,
            h in 1u32..10_000,
            fw in 16u32..8_000,
            fh in 16u32..8_000,
        ) {
            prop_assume!(h > w);
            let frame = Size::from((fw, fh));
            let c = cover(Size::from((w, h)), frame);
            let expected = (fw as f64 / w as f64).min(fh as f64 / h as f64);
            prop_assert!((c.scale - expected).abs() < 1e-12);
            prop_assert!(c.scaled.width.round() <= frame.width);
            prop_assert!(c.scaled.height.round() <= frame.height);
        }
    }
}
