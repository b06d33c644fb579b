//! KSG Project Model
//!
//! Defines the data contracts for Kdenlive slideshow projects:
//! - **Document:** An owned, mutable XML tree that round-trips untouched nodes
//! - **Project:** Profile, playlists, entries, and producers on top of the tree
//! - **Rect:** Frame sizes, animation rectangles, and keyframe serialization
//! - **Filter:** The ordered property bag attached to a timeline entry
//!
//! All pixel geometry is expressed in output-frame pixels; keyframe times are
//! carried as the opaque frame strings found in the project file.

pub mod document;
pub mod filter;
pub mod project;
pub mod rect;

pub use document::*;
pub use filter::*;
pub use project::*;
pub use rect::*;
