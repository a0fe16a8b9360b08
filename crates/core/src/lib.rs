#![deny(unsafe_code)]
//! Core types for tileburst: a live video frame cut into tiles that burst
//! away from a click and settle back into place.
//!
//! Provides [`Tile`] physics, the ordered [`TileField`] with its impact and
//! z-order sort, the per-tick [`FrameRenderer`], the [`VideoSource`] and
//! [`PaintTarget`] seams, a software [`Surface`], [`RenderConfig`],
//! reproducible [`Scenario`]s, and the seedable [`Xorshift64`] PRNG.

pub mod config;
pub mod error;
pub mod geometry;
pub mod pixel;
pub mod prng;
pub mod renderer;
pub mod scenario;
pub mod source;
pub mod surface;
pub mod tile;
pub mod tile_field;

pub use config::{RenderConfig, RenderMode};
pub use error::TileError;
pub use geometry::{Circle, Rect};
pub use pixel::{PixelBuffer, Rgba};
pub use prng::{RandomSource, Xorshift64};
pub use renderer::{FrameRenderer, TickReport};
pub use scenario::{Scenario, ScheduledImpact};
pub use source::{RawFrame, VideoSource};
pub use surface::{Blit, PaintTarget, Shadow, Surface};
pub use tile::{Phase, RenderInstruction, Tile};
pub use tile_field::{SourceRegion, TileField};
