#![deny(unsafe_code)]
//! Frame source registry: maps source names to feeds and drives scenarios.
//!
//! This crate sits between `tileburst-core` (which defines the
//! [`VideoSource`] seam) and the front ends. The CLI resolves feeds by name
//! here and replays [`Scenario`](tileburst_core::Scenario)s through
//! [`player::play`].

pub mod params;
pub mod pattern;
pub mod player;

#[cfg(feature = "png")]
pub mod snapshot;
#[cfg(feature = "png")]
pub mod still;

use serde_json::Value;
use tileburst_core::error::TileError;
use tileburst_core::pixel::PixelBuffer;
use tileburst_core::source::VideoSource;

use crate::params::{param_f64, param_usize};
use crate::pattern::{Checker, ColorBars, Pattern, Plasma};

/// All available source names.
#[cfg(feature = "png")]
const SOURCE_NAMES: &[&str] = &["bars", "checker", "plasma", "still"];
#[cfg(not(feature = "png"))]
const SOURCE_NAMES: &[&str] = &["bars", "checker", "plasma"];

/// Frame size of synthetic feeds when the params don't say otherwise.
const DEFAULT_WIDTH: usize = 640;
const DEFAULT_HEIGHT: usize = 480;

/// The frame generator behind a [`Feed`].
///
/// Use [`SourceKind::from_name`] for string-based construction.
pub enum SourceKind {
    Bars(ColorBars),
    Checker(Checker),
    Plasma(Plasma),
    /// A decoded image that never changes.
    Still(PixelBuffer),
}

impl SourceKind {
    /// Constructs a source by name.
    ///
    /// Synthetic sources read `width`, `height`, and their own tuning keys
    /// from `params`; `still` needs a `path`. Returns
    /// `TileError::UnknownSource` for unrecognised names.
    pub fn from_name(name: &str, seed: u64, params: &Value) -> Result<Self, TileError> {
        let width = param_usize(params, "width", DEFAULT_WIDTH);
        let height = param_usize(params, "height", DEFAULT_HEIGHT);
        if width == 0 || height == 0 {
            return Err(TileError::InvalidDimensions);
        }
        match name {
            "bars" => Ok(SourceKind::Bars(ColorBars::new(
                width,
                height,
                param_f64(params, "speed", 2.0),
            ))),
            "checker" => Ok(SourceKind::Checker(Checker::new(
                width,
                height,
                param_usize(params, "cell", 24),
                param_f64(params, "speed", 1.0),
            ))),
            "plasma" => Ok(SourceKind::Plasma(Plasma::new(
                width,
                height,
                param_f64(params, "scale", 0.01),
                param_f64(params, "speed", 0.02),
                (seed ^ (seed >> 32)) as u32,
            ))),
            #[cfg(feature = "png")]
            "still" => {
                let path = params::param_str(params, "path").ok_or_else(|| {
                    TileError::InvalidArgument("the still source needs a \"path\" param".into())
                })?;
                Ok(SourceKind::Still(still::load_image(std::path::Path::new(
                    path,
                ))?))
            }
            _ => Err(TileError::UnknownSource(name.to_string())),
        }
    }

    /// Returns a slice of all recognised source names.
    pub fn list_sources() -> &'static [&'static str] {
        SOURCE_NAMES
    }

    /// Frame width and height.
    pub fn size(&self) -> (usize, usize) {
        match self {
            SourceKind::Bars(p) => p.size(),
            SourceKind::Checker(p) => p.size(),
            SourceKind::Plasma(p) => p.size(),
            SourceKind::Still(img) => (img.width(), img.height()),
        }
    }

    fn paint(&self, time: f64, buffer: &mut PixelBuffer) -> Result<(), TileError> {
        match self {
            SourceKind::Bars(p) => p.paint(time, buffer),
            SourceKind::Checker(p) => p.paint(time, buffer),
            SourceKind::Plasma(p) => p.paint(time, buffer),
            SourceKind::Still(img) => buffer.copy_from_rgba(img.as_rgba())?,
        }
        Ok(())
    }
}

/// A [`SourceKind`] with a playback clock and an optional warm-up period.
///
/// During warm-up the feed reports no dimensions, like a stream whose
/// metadata hasn't arrived. While paused the clock stands still and every
/// snapshot repeats the same frame.
pub struct Feed {
    kind: SourceKind,
    clock: u64,
    playing: bool,
    warmup: usize,
}

impl Feed {
    /// A playing feed with no warm-up.
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            clock: 0,
            playing: true,
            warmup: 0,
        }
    }

    /// Hides the dimensions for the first `ticks` calls to [`advance`](Self::advance).
    pub fn with_warmup(mut self, ticks: usize) -> Self {
        self.warmup = ticks;
        self
    }

    /// Builds a feed by source name; `warmup` is read from `params`.
    pub fn from_name(name: &str, seed: u64, params: &Value) -> Result<Self, TileError> {
        let kind = SourceKind::from_name(name, seed, params)?;
        Ok(Self::new(kind).with_warmup(param_usize(params, "warmup", 0)))
    }

    /// Ticks of playback so far.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Flips between playing and paused; returns the new state.
    pub fn toggle_playback(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Moves the feed forward by one tick.
    pub fn advance(&mut self) {
        if self.warmup > 0 {
            self.warmup -= 1;
            if self.warmup == 0 {
                log::trace!("feed ready: {}x{}", self.kind.size().0, self.kind.size().1);
            }
        } else if self.playing {
            self.clock += 1;
        }
    }
}

impl VideoSource for Feed {
    fn dimensions(&self) -> Option<(usize, usize)> {
        (self.warmup == 0).then(|| self.kind.size())
    }

    fn snapshot_into(&mut self, buffer: &mut PixelBuffer) -> Result<(), TileError> {
        if self.warmup > 0 {
            return Err(TileError::UninitializedSource);
        }
        let (w, h) = self.kind.size();
        if (buffer.width(), buffer.height()) != (w, h) {
            return Err(TileError::DimensionMismatch {
                lhs_w: w,
                lhs_h: h,
                rhs_w: buffer.width(),
                rhs_h: buffer.height(),
            });
        }
        self.kind.paint(self.clock as f64, buffer)
    }
}
