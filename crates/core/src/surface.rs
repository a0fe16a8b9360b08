//! Output surfaces and the software rasterizer.
//!
//! The renderer talks to a [`PaintTarget`], which only knows how to clear a
//! rectangle and draw an image region through an affine transform with an
//! optional circular clip and drop shadow. [`Surface`] is the CPU
//! implementation backed by a [`PixelBuffer`].

use glam::{DAffine2, DVec2};

use crate::error::TileError;
use crate::geometry::{Circle, Rect};
use crate::pixel::{PixelBuffer, Rgba, TRANSPARENT};

/// Drop shadow painted beneath an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// Offset in surface units; not affected by the blit transform.
    pub offset: DVec2,
    /// Width of the soft edge.
    pub blur: f64,
    pub color: Rgba,
}

/// One image draw: copy `src` from the image into `dest`, where `dest` is in
/// local coordinates mapped to the surface by `transform`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blit {
    pub src: Rect,
    pub dest: Rect,
    pub transform: DAffine2,
    /// Surface-space clip; pixels outside are untouched.
    pub clip: Option<Circle>,
    pub shadow: Option<Shadow>,
}

/// A passive paint target.
pub trait PaintTarget {
    /// Width and height in pixels.
    fn size(&self) -> (usize, usize);

    /// Resets every pixel inside `rect` to transparent.
    fn clear_rect(&mut self, rect: Rect);

    /// Draws an image region as described by `blit`.
    fn draw_image(&mut self, image: &PixelBuffer, blit: &Blit);
}

/// CPU paint target with nearest-neighbour sampling and source-over blending.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: PixelBuffer,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Result<Self, TileError> {
        Ok(Self {
            pixels: PixelBuffer::new(width, height)?,
        })
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Integer pixel bounds `(x0, y0, x1, y1)` (exclusive end) covering the
    /// transformed `dest` rect grown by `margin`, clamped to the surface.
    fn footprint(&self, blit: &Blit, margin: f64) -> Option<(isize, isize, isize, isize)> {
        let d = blit.dest;
        let corners = [
            DVec2::new(d.x, d.y),
            DVec2::new(d.x + d.width, d.y),
            DVec2::new(d.x, d.y + d.height),
            DVec2::new(d.x + d.width, d.y + d.height),
        ]
        .map(|c| blit.transform.transform_point2(c));
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }
        min -= DVec2::splat(margin);
        max += DVec2::splat(margin);
        if let Some(clip) = blit.clip {
            min = min.max(clip.center - DVec2::splat(clip.radius));
            max = max.min(clip.center + DVec2::splat(clip.radius));
        }

        let w = self.pixels.width() as f64;
        let h = self.pixels.height() as f64;
        let x0 = min.x.floor().clamp(0.0, w) as isize;
        let y0 = min.y.floor().clamp(0.0, h) as isize;
        let x1 = max.x.ceil().clamp(0.0, w) as isize;
        let y1 = max.y.ceil().clamp(0.0, h) as isize;
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    fn paint_shadow(&mut self, blit: &Blit, shadow: &Shadow, inverse: &DAffine2) {
        let blur = shadow.blur.max(f64::EPSILON);
        let shifted = Blit {
            transform: DAffine2::from_translation(shadow.offset) * blit.transform,
            ..*blit
        };
        let Some((x0, y0, x1, y1)) = self.footprint(&shifted, blur) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let p = DVec2::new(px as f64 + 0.5, py as f64 + 0.5);
                if blit.clip.is_some_and(|c| !c.contains(p)) {
                    continue;
                }
                let local = inverse.transform_point2(p - shadow.offset);
                let coverage = 0.5 - blit.dest.signed_distance(local) / blur;
                if coverage > 0.0 {
                    self.pixels.blend_over(px, py, shadow.color, coverage);
                }
            }
        }
    }
}

impl PaintTarget for Surface {
    fn size(&self) -> (usize, usize) {
        (self.pixels.width(), self.pixels.height())
    }

    fn clear_rect(&mut self, rect: Rect) {
        let x0 = rect.x.floor().max(0.0) as isize;
        let y0 = rect.y.floor().max(0.0) as isize;
        let x1 = (rect.x + rect.width).ceil().min(self.pixels.width() as f64) as isize;
        let y1 = (rect.y + rect.height).ceil().min(self.pixels.height() as f64) as isize;
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels.put(x, y, TRANSPARENT);
            }
        }
    }

    fn draw_image(&mut self, image: &PixelBuffer, blit: &Blit) {
        if blit.dest.width <= 0.0 || blit.dest.height <= 0.0 {
            return;
        }
        let inverse = blit.transform.inverse();
        if let Some(shadow) = &blit.shadow {
            self.paint_shadow(blit, shadow, &inverse);
        }

        let Some((x0, y0, x1, y1)) = self.footprint(blit, 0.0) else {
            return;
        };
        let scale = blit.src.size() / blit.dest.size();
        for py in y0..y1 {
            for px in x0..x1 {
                let p = DVec2::new(px as f64 + 0.5, py as f64 + 0.5);
                if blit.clip.is_some_and(|c| !c.contains(p)) {
                    continue;
                }
                let local = inverse.transform_point2(p);
                if !blit.dest.contains(local) {
                    continue;
                }
                let s = blit.src.origin() + (local - blit.dest.origin()) * scale;
                if let Some(color) = image.pixel(s.x.floor() as isize, s.y.floor() as isize) {
                    self.pixels.blend_over(px, py, color, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    /// 4x2 image where each pixel's red channel encodes its index.
    fn indexed_image() -> PixelBuffer {
        let mut img = PixelBuffer::new(4, 2).unwrap();
        for y in 0..2 {
            for x in 0..4 {
                img.put(x, y, [(y * 4 + x) as u8 * 10, 0, 0, 255]);
            }
        }
        img
    }

    fn plain_blit(src: Rect, dest: Rect) -> Blit {
        Blit {
            src,
            dest,
            transform: DAffine2::IDENTITY,
            clip: None,
            shadow: None,
        }
    }

    #[test]
    fn identity_blit_copies_pixels() {
        let img = indexed_image();
        let mut s = Surface::new(8, 8).unwrap();
        let r = Rect::new(0.0, 0.0, 4.0, 2.0);
        s.draw_image(&img, &plain_blit(r, Rect::new(2.0, 3.0, 4.0, 2.0)));
        assert_eq!(s.pixels().pixel(2, 3), Some([0, 0, 0, 255]));
        assert_eq!(s.pixels().pixel(5, 4), Some([70, 0, 0, 255]));
        assert_eq!(s.pixels().pixel(1, 3), Some(TRANSPARENT));
        assert_eq!(s.pixels().pixel(6, 3), Some(TRANSPARENT));
    }

    #[test]
    fn rotated_blit_turns_clockwise_on_screen() {
        let img = indexed_image();
        let mut s = Surface::new(20, 20).unwrap();
        let blit = Blit {
            transform: DAffine2::from_angle_translation(FRAC_PI_2, DVec2::new(10.0, 10.0)),
            ..plain_blit(Rect::new(0.0, 0.0, 4.0, 2.0), Rect::new(-2.0, -1.0, 4.0, 2.0))
        };
        s.draw_image(&img, &blit);
        // Surface pixel (9, 11) maps back to local (1.5, 0.5) -> source (3, 1).
        assert_eq!(s.pixels().pixel(9, 11), Some([70, 0, 0, 255]));
        // The unrotated footprint row is now empty.
        assert_eq!(s.pixels().pixel(8, 9), Some(TRANSPARENT));
    }

    #[test]
    fn scaled_blit_stretches_source() {
        let img = indexed_image();
        let mut s = Surface::new(8, 4).unwrap();
        s.draw_image(
            &img,
            &plain_blit(Rect::new(0.0, 0.0, 2.0, 1.0), Rect::new(0.0, 0.0, 8.0, 4.0)),
        );
        assert_eq!(s.pixels().pixel(3, 3), Some([0, 0, 0, 255]));
        assert_eq!(s.pixels().pixel(4, 0), Some([10, 0, 0, 255]));
    }

    #[test]
    fn samples_outside_image_are_skipped() {
        let img = indexed_image();
        let mut s = Surface::new(8, 8).unwrap();
        s.draw_image(
            &img,
            &plain_blit(Rect::new(2.0, 0.0, 4.0, 2.0), Rect::new(0.0, 0.0, 4.0, 2.0)),
        );
        assert_eq!(s.pixels().pixel(1, 0), Some([30, 0, 0, 255]));
        assert_eq!(s.pixels().pixel(2, 0), Some(TRANSPARENT));
    }

    #[test]
    fn circle_clip_limits_drawing() {
        let img = PixelBuffer::filled(16, 16, [0, 255, 0, 255]).unwrap();
        let mut s = Surface::new(16, 16).unwrap();
        let full = Rect::new(0.0, 0.0, 16.0, 16.0);
        let blit = Blit {
            clip: Some(Circle {
                center: DVec2::new(8.0, 8.0),
                radius: 4.0,
            }),
            ..plain_blit(full, full)
        };
        s.draw_image(&img, &blit);
        assert_eq!(s.pixels().pixel(8, 8), Some([0, 255, 0, 255]));
        assert_eq!(s.pixels().pixel(0, 0), Some(TRANSPARENT));
        assert_eq!(s.pixels().pixel(13, 8), Some(TRANSPARENT));
    }

    #[test]
    fn shadow_paints_offset_halo() {
        let img = PixelBuffer::filled(4, 4, [0, 0, 0, 255]).unwrap();
        let mut s = Surface::new(16, 16).unwrap();
        let blit = Blit {
            shadow: Some(Shadow {
                offset: DVec2::new(4.0, 0.0),
                blur: 3.0,
                color: [255, 255, 255, 77],
            }),
            ..plain_blit(Rect::new(0.0, 0.0, 4.0, 4.0), Rect::new(4.0, 4.0, 4.0, 4.0))
        };
        s.draw_image(&img, &blit);
        let shadowed = s.pixels().pixel(9, 5).unwrap();
        assert_eq!(&shadowed[..3], &[255, 255, 255]);
        assert!(shadowed[3] > 0 && shadowed[3] < 255);
        // Image paints over its own shadow.
        assert_eq!(s.pixels().pixel(5, 5), Some([0, 0, 0, 255]));
        assert_eq!(s.pixels().pixel(0, 0), Some(TRANSPARENT));
    }

    #[test]
    fn clear_rect_resets_region_only() {
        let mut s = Surface::new(4, 4).unwrap();
        let img = PixelBuffer::filled(4, 4, [9, 9, 9, 255]).unwrap();
        let r = Rect::new(0.0, 0.0, 4.0, 4.0);
        s.draw_image(&img, &plain_blit(r, r));
        s.clear_rect(Rect::new(0.0, 0.0, 2.0, 4.0));
        assert_eq!(s.pixels().pixel(1, 1), Some(TRANSPARENT));
        assert_eq!(s.pixels().pixel(2, 1), Some([9, 9, 9, 255]));
    }

    #[test]
    fn off_surface_blit_is_noop() {
        let img = indexed_image();
        let mut s = Surface::new(4, 4).unwrap();
        let r = Rect::new(0.0, 0.0, 4.0, 2.0);
        s.draw_image(&img, &plain_blit(r, Rect::new(100.0, 100.0, 4.0, 2.0)));
        assert!(s.pixels().as_rgba().iter().all(|&b| b == 0));
    }
}
