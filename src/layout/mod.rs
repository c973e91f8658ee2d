//! Layout: the three fixed screen regions.
//!
//! Regions are computed once at startup and again on every resize or
//! subscription change. Rendering never walks a tree; it reads the
//! precomputed rectangles from [`ScreenLayout`].

mod rect;
mod screen;

pub use rect::Rect;
pub use screen::ScreenLayout;
