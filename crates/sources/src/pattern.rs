//! Procedural test feeds.
//!
//! Each pattern paints a full opaque frame for a given clock value, so a
//! paused feed repaints the same image and a playing one animates.

use noise::{NoiseFn, Perlin};
use tileburst_core::pixel::{PixelBuffer, Rgba};

/// A frame generator with fixed dimensions.
pub trait Pattern {
    fn size(&self) -> (usize, usize);

    /// Paints the frame at `time` (in ticks) into `buffer`, which has
    /// [`size`](Self::size) dimensions.
    fn paint(&self, time: f64, buffer: &mut PixelBuffer);
}

/// 75% SMPTE bar colors, left to right.
const BAR_COLORS: [Rgba; 7] = [
    [191, 191, 191, 255],
    [191, 191, 0, 255],
    [0, 191, 191, 255],
    [0, 191, 0, 255],
    [191, 0, 191, 255],
    [191, 0, 0, 255],
    [0, 0, 191, 255],
];

/// Vertical color bars scrolling left at `speed` pixels per tick.
#[derive(Debug, Clone)]
pub struct ColorBars {
    width: usize,
    height: usize,
    speed: f64,
}

impl ColorBars {
    pub fn new(width: usize, height: usize, speed: f64) -> Self {
        Self {
            width,
            height,
            speed,
        }
    }
}

impl Pattern for ColorBars {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn paint(&self, time: f64, buffer: &mut PixelBuffer) {
        let w = self.width as f64;
        for x in 0..self.width {
            let shifted = (x as f64 + time * self.speed).rem_euclid(w);
            let bar = ((shifted * BAR_COLORS.len() as f64 / w) as usize).min(BAR_COLORS.len() - 1);
            for y in 0..self.height {
                buffer.put(x as isize, y as isize, BAR_COLORS[bar]);
            }
        }
    }
}

/// Black and white checkerboard drifting diagonally.
#[derive(Debug, Clone)]
pub struct Checker {
    width: usize,
    height: usize,
    cell: usize,
    speed: f64,
}

impl Checker {
    /// A `cell` of 0 is treated as 1.
    pub fn new(width: usize, height: usize, cell: usize, speed: f64) -> Self {
        Self {
            width,
            height,
            cell: cell.max(1),
            speed,
        }
    }
}

impl Pattern for Checker {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn paint(&self, time: f64, buffer: &mut PixelBuffer) {
        let shift = (time * self.speed).floor() as i64;
        let cell = self.cell as i64;
        for y in 0..self.height {
            for x in 0..self.width {
                let cx = (x as i64 + shift).div_euclid(cell);
                let cy = (y as i64 + shift).div_euclid(cell);
                let color = if (cx + cy).rem_euclid(2) == 0 {
                    [240, 240, 240, 255]
                } else {
                    [16, 16, 16, 255]
                };
                buffer.put(x as isize, y as isize, color);
            }
        }
    }
}

/// Slowly morphing Perlin-noise color field.
#[derive(Debug, Clone)]
pub struct Plasma {
    noise: Perlin,
    width: usize,
    height: usize,
    scale: f64,
    speed: f64,
}

impl Plasma {
    pub fn new(width: usize, height: usize, scale: f64, speed: f64, seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
            width,
            height,
            scale,
            speed,
        }
    }
}

impl Pattern for Plasma {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn paint(&self, time: f64, buffer: &mut PixelBuffer) {
        let t = time * self.speed;
        for y in 0..self.height {
            for x in 0..self.width {
                let sx = x as f64 * self.scale;
                let sy = y as f64 * self.scale;
                let r = self.noise.get([sx, sy, t]);
                let g = self.noise.get([sx + 100.0, sy + 100.0, t]);
                let b = self.noise.get([sx + 200.0, sy + 200.0, t]);
                buffer.put(
                    x as isize,
                    y as isize,
                    [channel(r), channel(g), channel(b), 255],
                );
            }
        }
    }
}

/// Maps a noise sample in [-1, 1] to a byte.
fn channel(v: f64) -> u8 {
    ((v.clamp(-1.0, 1.0) + 1.0) * 127.5).round() as u8
}
