//! Per-tick orchestration: snapshot the source, clear, build, advance, paint.

use glam::{DAffine2, DVec2};

use crate::config::{RenderConfig, RenderMode};
use crate::error::TileError;
use crate::geometry::{Circle, Rect};
use crate::pixel::{PixelBuffer, Rgba};
use crate::prng::Xorshift64;
use crate::source::VideoSource;
use crate::surface::{Blit, PaintTarget, Shadow};
use crate::tile::RenderInstruction;
use crate::tile_field::{SourceRegion, TileField};

/// Shadow offset is the displacement from rest divided by this.
pub const SHADOW_DIVISOR: f64 = 70.0;
/// Soft edge width of the tile shadow.
pub const SHADOW_BLUR: f64 = 3.0;
/// Translucent white, alpha 0.3.
pub const SHADOW_COLOR: Rgba = [255, 255, 255, 77];
/// Magnification factor of the ellipse sample, multiplied by the aspect ratio.
pub const ELLIPSE_ZOOM: f64 = 10.0;

/// What a tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The tile grid was constructed during this tick.
    pub grid_built: bool,
    pub tiles_drawn: usize,
    /// Tiles that were expanding or contracting.
    pub tiles_moving: usize,
}

/// Drives the tile field against a video source and a paint target.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    config: RenderConfig,
    field: Option<TileField>,
    sampling: Option<PixelBuffer>,
    rng: Xorshift64,
}

impl FrameRenderer {
    pub fn new(config: RenderConfig) -> Result<Self, TileError> {
        config.validate()?;
        let rng = Xorshift64::new(config.seed);
        Ok(Self {
            config,
            field: None,
            sampling: None,
            rng,
        })
    }

    pub fn mode(&self) -> RenderMode {
        self.config.mode
    }

    /// Switches the render style; physics are unaffected.
    pub fn set_mode(&mut self, mode: RenderMode) {
        self.config.mode = mode;
    }

    /// The tile field, once the source has reported its dimensions.
    pub fn field(&self) -> Option<&TileField> {
        self.field.as_ref()
    }

    /// The frame snapshot taken by the last tick.
    pub fn sampling_buffer(&self) -> Option<&PixelBuffer> {
        self.sampling.as_ref()
    }

    /// Applies an impact at surface point `(x, y)` and re-sorts the field in
    /// the same call. Returns the number of tiles that took the impulse;
    /// before the grid exists this is a no-op.
    pub fn impact(&mut self, x: f64, y: f64) -> usize {
        match self.field.as_mut() {
            Some(field) => field.explode(DVec2::new(x, y), &mut self.rng),
            None => 0,
        }
    }

    /// Impact followed by an immediate redraw.
    pub fn explode(
        &mut self,
        x: f64,
        y: f64,
        source: &mut dyn VideoSource,
        target: &mut dyn PaintTarget,
    ) -> Result<TickReport, TileError> {
        self.impact(x, y);
        self.tick(source, target)
    }

    /// Renders one frame.
    ///
    /// Until the source reports non-zero dimensions this only clears the
    /// paint rect. Returns `TileError::DimensionMismatch` if `target` is not
    /// the configured surface size.
    pub fn tick(
        &mut self,
        source: &mut dyn VideoSource,
        target: &mut dyn PaintTarget,
    ) -> Result<TickReport, TileError> {
        let (target_w, target_h) = target.size();
        if (target_w, target_h) != (self.config.surface_width, self.config.surface_height) {
            return Err(TileError::DimensionMismatch {
                lhs_w: self.config.surface_width,
                lhs_h: self.config.surface_height,
                rhs_w: target_w,
                rhs_h: target_h,
            });
        }

        let mut report = TickReport::default();
        let dims = source.dimensions().filter(|&(w, h)| w > 0 && h > 0);

        if let Some((w, h)) = dims {
            if self.sampling.is_none() {
                self.sampling = Some(PixelBuffer::new(w, h)?);
            }
            if let Some(buffer) = self.sampling.as_mut() {
                buffer.resize(w, h)?;
                source.snapshot_into(buffer)?;
            }
        }

        target.clear_rect(self.config.paint_rect());

        if self.field.is_none() {
            if let Some((w, h)) = dims {
                match SourceRegion::new(w, h) {
                    Ok(region) => {
                        self.field = Some(TileField::build(
                            region,
                            self.config.bounds(),
                            self.config.tile_size(),
                        )?);
                        report.grid_built = true;
                    }
                    Err(TileError::UninitializedSource) => {}
                    Err(e) => return Err(e),
                }
            } else {
                log::trace!("source not ready; skipping grid construction");
            }
        }

        let config = &self.config;
        if let (Some(field), Some(buffer)) = (self.field.as_mut(), self.sampling.as_ref()) {
            let source_size = DVec2::new(buffer.width() as f64, buffer.height() as f64);
            field.advance_and_draw_all(config.bounds(), |ins| {
                let blit = match config.mode {
                    RenderMode::Rectangles => rectangle_blit(ins, config),
                    RenderMode::Ellipses => ellipse_blit(ins, config, source_size),
                };
                target.draw_image(buffer, &blit);
                report.tiles_drawn += 1;
                if ins.moving {
                    report.tiles_moving += 1;
                }
            });
        }

        Ok(report)
    }
}

/// The tile's block, centred on its position and rotated, with a shadow that
/// trails the displacement while the tile is moving.
fn rectangle_blit(ins: &RenderInstruction, config: &RenderConfig) -> Blit {
    let (tw, th) = (config.tile_width as f64, config.tile_height as f64);
    let shadow = ins.moving.then(|| Shadow {
        offset: (ins.rest_position - ins.position) / SHADOW_DIVISOR,
        blur: SHADOW_BLUR,
        color: SHADOW_COLOR,
    });
    Blit {
        src: Rect::new(ins.sample_origin.0 as f64, ins.sample_origin.1 as f64, tw, th),
        dest: Rect::new(-tw / 2.0, -th / 2.0, tw, th),
        transform: DAffine2::from_angle_translation(ins.rotation.to_radians(), ins.position),
        clip: None,
        shadow,
    }
}

/// A circular window of radius `tile_height` onto a magnified sample.
///
/// The source rect spans `tile * ratio * ELLIPSE_ZOOM` and is drawn at the
/// full source size, so the magnification follows the aspect ratio. Rotation
/// only applies with `rotate_ellipses`.
fn ellipse_blit(ins: &RenderInstruction, config: &RenderConfig, source_size: DVec2) -> Blit {
    let tile = DVec2::new(config.tile_width as f64, config.tile_height as f64);
    let zoom = source_size.x / source_size.y * ELLIPSE_ZOOM;
    let dest_origin = ins.position - tile / 2.0 - DVec2::splat(zoom);
    let transform = if config.rotate_ellipses {
        DAffine2::from_translation(ins.position)
            * DAffine2::from_angle(ins.rotation.to_radians())
            * DAffine2::from_translation(-ins.position)
    } else {
        DAffine2::IDENTITY
    };
    Blit {
        src: Rect::new(
            ins.sample_origin.0 as f64,
            ins.sample_origin.1 as f64,
            tile.x * zoom,
            tile.y * zoom,
        ),
        dest: Rect::new(dest_origin.x, dest_origin.y, source_size.x, source_size.y),
        transform,
        clip: Some(Circle {
            center: ins.position,
            radius: tile.y,
        }),
        shadow: None,
    }
}
