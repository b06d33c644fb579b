//! KSG Processing Core: the slideshow animator
//!
//! Turns still-image entries of a Kdenlive timeline into Ken Burns shots:
//! - **Geometry:** Covering scale of an image against the output frame
//! - **Ken Burns:** Zoom-in, zoom-out, and pan motions between two rectangles
//! - **Animator:** One pass over the project attaching a transform filter per entry
//!
//! Geometry and motion planning are pure computation. Randomness enters only
//! through an [`EffectPicker`], which can be seeded or replaced in tests.

pub mod animator;
pub mod geometry;
pub mod ken_burns;

pub use animator::{AnimationReport, AnimatorConfig, SlideshowAnimator};
pub use ken_burns::{EffectPicker, RandomPicker};
