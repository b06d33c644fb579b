//! Ken Burns motion planning.
//!
//! A shot is described by a start and an end rectangle in output-frame
//! pixels. Landscape images get one of three effects:
//!
//! - **Zoom in:** covering size growing to `zoom_factor` times, held at an anchor
//! - **Zoom out:** the reverse
//! - **Pan:** `zoom_factor` times the covering size, sliding across one row
//!
//! Anchors name a cell of a 3×3 grid. The column decides `x` (flush left,
//! centered, flush right) and the row decides `y` (flush top, centered, flush
//! bottom); the rectangle is placed with its own width and height, so start
//! and end of a zoom share the anchor but not the offsets.
//!
//! Portrait images always get the same shot: start at twice the zoom,
//! centered, and settle to 1.5 times the zoom pinned to the top edge.

use std::fmt;
use std::str::FromStr;

use ksg_common::{KsgError, KsgResult};
use ksg_project_model::rect::{Rect, Size};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::geometry::{Cover, Orientation};

/// Horizontal placement within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Center,
    Right,
}

/// Vertical placement within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Top,
    Middle,
    Bottom,
}

impl Column {
    fn x(self, frame: Size, size: Size) -> f64 {
        match self {
            Column::Left => 0.0,
            Column::Center => (frame.width - size.width) / 2.0,
            Column::Right => frame.width - size.width,
        }
    }
}

impl Row {
    fn y(self, frame: Size, size: Size) -> f64 {
        match self {
            Row::Top => 0.0,
            Row::Middle => (frame.height - size.height) / 2.0,
            Row::Bottom => frame.height - size.height,
        }
    }
}

/// Place a rectangle of `size` in the given grid cell of `frame`.
fn place(frame: Size, size: Size, row: Row, column: Column) -> Rect {
    Rect::at(column.x(frame, size), row.y(frame, size), size)
}

/// Grid cell a zoom holds on to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::MiddleCenter,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    pub fn row(self) -> Row {
        match self {
            Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => Row::Top,
            Anchor::MiddleLeft | Anchor::MiddleCenter | Anchor::MiddleRight => Row::Middle,
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => Row::Bottom,
        }
    }

    pub fn column(self) -> Column {
        match self {
            Anchor::TopLeft | Anchor::MiddleLeft | Anchor::BottomLeft => Column::Left,
            Anchor::TopCenter | Anchor::MiddleCenter | Anchor::BottomCenter => Column::Center,
            Anchor::TopRight | Anchor::MiddleRight | Anchor::BottomRight => Column::Right,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopCenter => "top-center",
            Anchor::TopRight => "top-right",
            Anchor::MiddleLeft => "middle-left",
            Anchor::MiddleCenter => "middle-center",
            Anchor::MiddleRight => "middle-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomCenter => "bottom-center",
            Anchor::BottomRight => "bottom-right",
        }
    }

    /// Place a rectangle of `size` at this anchor.
    pub fn place(self, frame: Size, size: Size) -> Rect {
        place(frame, size, self.row(), self.column())
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = KsgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| KsgError::config(format!("unknown anchor {s:?}")))
    }
}

/// Row and direction of a pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanDirection {
    TopLeftToRight,
    MiddleLeftToRight,
    BottomLeftToRight,
    TopRightToLeft,
    MiddleRightToLeft,
    BottomRightToLeft,
}

impl PanDirection {
    pub const ALL: [PanDirection; 6] = [
        PanDirection::TopLeftToRight,
        PanDirection::MiddleLeftToRight,
        PanDirection::BottomLeftToRight,
        PanDirection::TopRightToLeft,
        PanDirection::MiddleRightToLeft,
        PanDirection::BottomRightToLeft,
    ];

    pub fn row(self) -> Row {
        match self {
            PanDirection::TopLeftToRight | PanDirection::TopRightToLeft => Row::Top,
            PanDirection::MiddleLeftToRight | PanDirection::MiddleRightToLeft => Row::Middle,
            PanDirection::BottomLeftToRight | PanDirection::BottomRightToLeft => Row::Bottom,
        }
    }

    /// Columns of the start and end rectangles.
    pub fn columns(self) -> (Column, Column) {
        match self {
            PanDirection::TopLeftToRight
            | PanDirection::MiddleLeftToRight
            | PanDirection::BottomLeftToRight => (Column::Left, Column::Right),
            PanDirection::TopRightToLeft
            | PanDirection::MiddleRightToLeft
            | PanDirection::BottomRightToLeft => (Column::Right, Column::Left),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PanDirection::TopLeftToRight => "top-left-to-right",
            PanDirection::MiddleLeftToRight => "middle-left-to-right",
            PanDirection::BottomLeftToRight => "bottom-left-to-right",
            PanDirection::TopRightToLeft => "top-right-to-left",
            PanDirection::MiddleRightToLeft => "middle-right-to-left",
            PanDirection::BottomRightToLeft => "bottom-right-to-left",
        }
    }
}

impl fmt::Display for PanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PanDirection {
    type Err = KsgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PanDirection::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| KsgError::config(format!("unknown pan direction {s:?}")))
    }
}

/// Effect family chosen first for landscape images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    ZoomIn,
    ZoomOut,
    Pan,
}

impl EffectKind {
    pub const ALL: [EffectKind; 3] = [EffectKind::ZoomIn, EffectKind::ZoomOut, EffectKind::Pan];
}

/// The concrete effect applied to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "placement", rename_all = "snake_case")]
pub enum Effect {
    ZoomIn(Anchor),
    ZoomOut(Anchor),
    Pan(PanDirection),
    /// Fixed shot for tall images.
    PortraitSettle,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::ZoomIn(a) => write!(f, "zoom in ({a})"),
            Effect::ZoomOut(a) => write!(f, "zoom out ({a})"),
            Effect::Pan(p) => write!(f, "pan ({p})"),
            Effect::PortraitSettle => f.write_str("portrait settle"),
        }
    }
}

/// Source of the two random decisions made per landscape image.
///
/// Slices passed in are never empty.
pub trait EffectPicker {
    fn pick_kind(&mut self) -> EffectKind;
    fn pick_anchor(&mut self, anchors: &[Anchor]) -> Anchor;
    fn pick_pan(&mut self, pans: &[PanDirection]) -> PanDirection;
}

/// Uniform choices from a pseudo-random generator.
#[derive(Debug, Clone)]
pub struct RandomPicker<R = StdRng> {
    rng: R,
}

impl RandomPicker<StdRng> {
    /// Reproducible picker.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Picker seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomPicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> EffectPicker for RandomPicker<R> {
    fn pick_kind(&mut self) -> EffectKind {
        EffectKind::ALL[self.rng.gen_range(0..EffectKind::ALL.len())]
    }

    fn pick_anchor(&mut self, anchors: &[Anchor]) -> Anchor {
        anchors[self.rng.gen_range(0..anchors.len())]
    }

    fn pick_pan(&mut self, pans: &[PanDirection]) -> PanDirection {
        pans[self.rng.gen_range(0..pans.len())]
    }
}

/// Configuration for motion planning.
#[derive(Debug, Clone)]
pub struct KenBurnsConfig {
    /// Extra zoom over the covering size (1.1 = 10%).
    pub zoom_factor: f64,

    /// Portrait start size as a multiple of `zoom_factor`.
    pub portrait_start_multiplier: f64,

    /// Portrait end size as a multiple of `zoom_factor`.
    pub portrait_end_multiplier: f64,

    /// Anchors available to zooms; repeat an anchor to weight it.
    pub anchors: Vec<Anchor>,

    /// Directions available to pans; repeat a direction to weight it.
    pub pans: Vec<PanDirection>,
}

impl Default for KenBurnsConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.1,
            portrait_start_multiplier: 2.0,
            portrait_end_multiplier: 1.5,
            anchors: Anchor::ALL.to_vec(),
            pans: PanDirection::ALL.to_vec(),
        }
    }
}

impl KenBurnsConfig {
    /// Reject settings that cannot produce a motion.
    pub fn validate(&self) -> KsgResult<()> {
        for (name, value) in [
            ("zoom_factor", self.zoom_factor),
            ("portrait_start_multiplier", self.portrait_start_multiplier),
            ("portrait_end_multiplier", self.portrait_end_multiplier),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(KsgError::config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.anchors.is_empty() {
            return Err(KsgError::config("at least one zoom anchor is required"));
        }
        if self.pans.is_empty() {
            return Err(KsgError::config("at least one pan direction is required"));
        }
        Ok(())
    }
}

/// Start and end rectangles of a planned shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub effect: Effect,
    pub start: Rect,
    pub end: Rect,
}

/// Plan the motion for an image covered as `cover` inside `frame`.
pub fn plan_motion<P: EffectPicker + ?Sized>(
    config: &KenBurnsConfig,
    frame: Size,
    cover: &Cover,
    picker: &mut P,
) -> Motion {
    let scaled = cover.scaled;
    let zoomed = scaled.scaled(config.zoom_factor);

    if cover.orientation == Orientation::Portrait {
        let start_size = scaled.scaled(config.zoom_factor * config.portrait_start_multiplier);
        let end_size = scaled.scaled(config.zoom_factor * config.portrait_end_multiplier);
        return Motion {
            effect: Effect::PortraitSettle,
            start: Rect::centered_in(frame, start_size),
            end: place(frame, end_size, Row::Top, Column::Center),
        };
    }

    match picker.pick_kind() {
        EffectKind::ZoomIn => {
            let anchor = picker.pick_anchor(&config.anchors);
            Motion {
                effect: Effect::ZoomIn(anchor),
                start: anchor.place(frame, scaled),
                end: anchor.place(frame, zoomed),
            }
        }
        EffectKind::ZoomOut => {
            let anchor = picker.pick_anchor(&config.anchors);
            Motion {
                effect: Effect::ZoomOut(anchor),
                start: anchor.place(frame, zoomed),
                end: anchor.place(frame, scaled),
            }
        }
        EffectKind::Pan => {
            let direction = picker.pick_pan(&config.pans);
            let (from, to) = direction.columns();
            Motion {
                effect: Effect::Pan(direction),
                start: place(frame, zoomed, direction.row(), from),
                end: place(frame, zoomed, direction.row(), to),
            }
        }
    }
}
