//! Frame sizes, animation rectangles, and keyframe strings.
//!
//! Geometry is computed in `f64` output-frame pixels and rounded once, when a
//! [`Rect`] becomes a [`PixelRect`], just before it is written to the project.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Multiply both dimensions by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Taller than wide.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

/// A rectangle placed in the output frame, in unrounded pixels.
///
/// `x`/`y` may be negative: an image larger than the frame is shifted left or
/// up so the visible window lands on the wanted part of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Place a rectangle of `size` at `(x, y)`.
    pub fn at(x: f64, y: f64, size: Size) -> Self {
        Self::new(x, y, size.width, size.height)
    }

    /// Center a rectangle of `size` inside `frame`.
    pub fn centered_in(frame: Size, size: Size) -> Self {
        Self::at(
            (frame.width - size.width) / 2.0,
            (frame.height - size.height) / 2.0,
            size,
        )
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Round every component to the nearest integer, ties to even.
    pub fn round(&self) -> PixelRect {
        PixelRect {
            x: self.x.round_ties_even() as i64,
            y: self.y.round_ties_even() as i64,
            w: self.w.round_ties_even() as i64,
            h: self.h.round_ties_even() as i64,
        }
    }
}

/// A rounded rectangle as written into the `rect` animation property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.w, self.h)
    }
}

/// A rectangle valid at a timeline position.
///
/// `time` is the frame string copied from the entry's `in` or `out`
/// attribute; it is never reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: String,
    pub rect: PixelRect,
}

/// Start and end keyframes of a two-point animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyframePair {
    pub start: Keyframe,
    pub end: Keyframe,
}

impl KeyframePair {
    /// Opacity written for both keyframes.
    pub const OPACITY: f64 = 1.0;

    pub fn new(
        in_point: impl Into<String>,
        start: &Rect,
        out_point: impl Into<String>,
        end: &Rect,
    ) -> Self {
        Self {
            start: Keyframe {
                time: in_point.into(),
                rect: start.round(),
            },
            end: Keyframe {
                time: out_point.into(),
                rect: end.round(),
            },
        }
    }

    /// MLT animation string for the `rect` property,
    /// e.g. `0=0 0 1920 1440 1.000000;125=-96 -72 2112 1584 1.000000`.
    pub fn rect_property(&self) -> String {
        format!(
            "{}={} {:.6};{}={} {:.6}",
            self.start.time,
            self.start.rect,
            Self::OPACITY,
            self.end.time,
            self.end.rect,
            Self::OPACITY
        )
    }

    /// MLT animation string for the `rotation` property (no rotation).
    pub fn rotation_property(&self) -> String {
        format!("{}=0;{}=0", self.start.time, self.end.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_in() {
        let r = Rect::centered_in(Size::new(1920.0, 1080.0), Size::new(2112.0, 1584.0));
        assert_eq!(r.x, -96.0);
        assert_eq!(r.y, -252.0);
        assert_eq!(r.size(), Size::new(2112.0, 1584.0));
    }

    #[test]
    fn test_round_ties_to_even() {
        let r = Rect::new(0.5, 1.5, 2.5, -0.5).round();
        assert_eq!(r, PixelRect { x: 0, y: 2, w: 2, h: 0 });

        let r = Rect::new(10.4, 10.6, -3.6, 7.0).round();
        assert_eq!(r, PixelRect { x: 10, y: 11, w: -4, h: 7 });
    }

    #[test]
    fn test_rect_property_format() {
        let pair = KeyframePair::new(
            "0",
            &Rect::new(0.0, 0.0, 1920.0, 1440.0),
            "125",
            &Rect::new(-192.0, -144.0, 2112.0, 1584.0),
        );
        assert_eq!(
            pair.rect_property(),
            "0=0 0 1920 1440 1.000000;125=-192 -144 2112 1584 1.000000"
        );
        assert_eq!(pair.rotation_property(), "0=0;125=0");
    }

    #[test]
    fn test_orientation() {
        assert!(Size::new(3000.0, 4000.0).is_portrait());
        assert!(!Size::new(4000.0, 3000.0).is_portrait());
        assert!(!Size::new(1000.0, 1000.0).is_portrait());
    }

    #[test]
    fn test_scaled() {
        let s = Size::from((4000, 3000)).scaled(0.48);
        assert!((s.width - 1920.0).abs() < 1e-9);
        assert!((s.height - 1440.0).abs() < 1e-9);
    }
}
