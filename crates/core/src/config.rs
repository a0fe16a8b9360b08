//! Renderer configuration.
//!
//! [`RenderConfig`] is threaded into the [`FrameRenderer`](crate::FrameRenderer)
//! explicitly; nothing here is process-global. Configs deserialize from JSON
//! with every key optional, and [`RenderConfig::from_json`] falls back to the
//! default for any key that is missing or has the wrong type.

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TileError;
use crate::geometry::Rect;
use crate::tile::{TILE_HEIGHT, TILE_WIDTH};

/// Default output surface width.
pub const DEFAULT_SURFACE_WIDTH: usize = 1000;
/// Default output surface height.
pub const DEFAULT_SURFACE_HEIGHT: usize = 600;
/// Cadence the host is expected to call `tick` at.
pub const FRAME_INTERVAL_MS: u64 = 24;
/// Default PRNG seed for impacts.
pub const DEFAULT_SEED: u64 = 42;

/// How tiles sample and composite their pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Rotated rectangular blocks with a drop shadow while moving.
    #[default]
    Rectangles,
    /// Circular windows onto a magnified sample, no shadow.
    Ellipses,
}

impl RenderMode {
    const NAMES: &'static [&'static str] = &["rectangles", "ellipses"];

    /// Picks the mode from a URL fragment: `#ellipses` selects ellipses,
    /// anything else selects rectangles.
    pub fn from_fragment(fragment: &str) -> Self {
        if fragment == "#ellipses" {
            RenderMode::Ellipses
        } else {
            RenderMode::Rectangles
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderMode::Rectangles => "rectangles",
            RenderMode::Ellipses => "ellipses",
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        Self::NAMES
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RenderMode {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangles" | "rect" | "squares" => Ok(RenderMode::Rectangles),
            "ellipses" | "ellipse" | "circles" => Ok(RenderMode::Ellipses),
            _ => Err(TileError::UnknownMode(s.to_string())),
        }
    }
}

/// Everything the renderer needs besides the source and the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub mode: RenderMode,
    pub surface_width: usize,
    pub surface_height: usize,
    pub tile_width: usize,
    pub tile_height: usize,
    /// Apply tile rotation in ellipse mode too.
    pub rotate_ellipses: bool,
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            surface_width: DEFAULT_SURFACE_WIDTH,
            surface_height: DEFAULT_SURFACE_HEIGHT,
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
            rotate_ellipses: false,
            seed: DEFAULT_SEED,
        }
    }
}

impl RenderConfig {
    /// Reads a config from a JSON object, keeping the default for any key
    /// that is missing or mistyped.
    ///
    /// Returns `TileError::UnknownMode` for an unrecognised `mode` string and
    /// `TileError::InvalidDimensions` if a size ends up zero.
    pub fn from_json(params: &Value) -> Result<Self, TileError> {
        let d = Self::default();
        let mode = match params.get("mode").and_then(Value::as_str) {
            Some(name) => name.parse()?,
            None => d.mode,
        };
        let config = Self {
            mode,
            surface_width: usize_or(params, "surface_width", d.surface_width),
            surface_height: usize_or(params, "surface_height", d.surface_height),
            tile_width: usize_or(params, "tile_width", d.tile_width),
            tile_height: usize_or(params, "tile_height", d.tile_height),
            rotate_ellipses: params
                .get("rotate_ellipses")
                .and_then(Value::as_bool)
                .unwrap_or(d.rotate_ellipses),
            seed: params.get("seed").and_then(Value::as_u64).unwrap_or(d.seed),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero-sized surfaces or tiles.
    pub fn validate(&self) -> Result<(), TileError> {
        let sizes = [
            self.surface_width,
            self.surface_height,
            self.tile_width,
            self.tile_height,
        ];
        if sizes.contains(&0) {
            return Err(TileError::InvalidDimensions);
        }
        Ok(())
    }

    /// The region cleared every tick.
    pub fn paint_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.surface_width as f64,
            self.surface_height as f64,
        )
    }

    /// Surface size as used for the bounce test.
    pub fn bounds(&self) -> DVec2 {
        DVec2::new(self.surface_width as f64, self.surface_height as f64)
    }

    pub fn tile_size(&self) -> (usize, usize) {
        (self.tile_width, self.tile_height)
    }
}

fn usize_or(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}
