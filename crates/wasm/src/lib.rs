#![deny(unsafe_code)]
//! Browser bindings for the tile renderer.
//!
//! The host grabs the current video frame as RGBA (e.g. via
//! `getImageData` on an offscreen canvas), hands it to [`TileBurst::tick`],
//! and puts the returned pixels on the visible canvas. Pointer events go to
//! [`TileBurst::impact`]; the URL fragment goes to
//! [`TileBurst::set_fragment`].

use tileburst_core::{
    FrameRenderer, PixelBuffer, RawFrame, RenderConfig, RenderMode, Surface, TileError,
    VideoSource,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::ImageData;

fn to_js(e: TileError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct TileBurst {
    renderer: FrameRenderer,
    surface: Surface,
    playing: bool,
    /// Frame repeated while playback is paused.
    held: Option<PixelBuffer>,
}

#[wasm_bindgen]
impl TileBurst {
    /// A renderer with default settings on a `width` x `height` canvas.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Result<TileBurst, JsValue> {
        let config = RenderConfig {
            surface_width: width as usize,
            surface_height: height as usize,
            ..RenderConfig::default()
        };
        Self::with_config(config).map_err(to_js)
    }

    /// Builds from a JSON config string; unknown keys are ignored.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(json: &str) -> Result<TileBurst, JsValue> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        RenderConfig::from_json(&value)
            .and_then(Self::with_config)
            .map_err(to_js)
    }

    pub fn width(&self) -> u32 {
        self.surface.pixels().width() as u32
    }

    pub fn height(&self) -> u32 {
        self.surface.pixels().height() as u32
    }

    /// Kicks tiles away from canvas point (x, y); returns how many moved.
    pub fn impact(&mut self, x: f64, y: f64) -> u32 {
        self.renderer.impact(x, y) as u32
    }

    /// Selects the render mode from a URL fragment such as `#ellipses`.
    #[wasm_bindgen(js_name = setFragment)]
    pub fn set_fragment(&mut self, fragment: &str) {
        self.renderer.set_mode(RenderMode::from_fragment(fragment));
    }

    /// Selects the render mode by name.
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, name: &str) -> Result<(), JsValue> {
        let mode: RenderMode = name.parse().map_err(to_js)?;
        self.renderer.set_mode(mode);
        Ok(())
    }

    pub fn mode(&self) -> String {
        self.renderer.mode().name().to_string()
    }

    /// Pauses or resumes; returns true when playing afterwards.
    #[wasm_bindgen(js_name = togglePlayback)]
    pub fn toggle_playback(&mut self) -> bool {
        self.playing = !self.playing;
        if self.playing {
            self.held = None;
        }
        self.playing
    }

    /// Renders one frame from `frame` (RGBA, `width` x `height`) and returns
    /// the canvas pixels. Pass zero dimensions while the video is loading.
    pub fn tick(&mut self, frame: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
        self.render(frame, width as usize, height as usize)
            .map_err(to_js)?;
        Ok(self.surface.pixels().as_rgba().to_vec())
    }

    /// Like [`tick`](Self::tick) but returns `ImageData` ready for `putImageData`.
    #[wasm_bindgen(js_name = tickImageData)]
    pub fn tick_image_data(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<ImageData, JsValue> {
        self.render(frame, width as usize, height as usize)
            .map_err(to_js)?;
        let pixels = self.surface.pixels();
        ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(pixels.as_rgba()),
            pixels.width() as u32,
            pixels.height() as u32,
        )
    }

    /// Impact followed by an immediate redraw, as a click handler would do.
    pub fn explode(
        &mut self,
        x: f64,
        y: f64,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, JsValue> {
        self.impact(x, y);
        self.tick(frame, width, height)
    }
}

impl TileBurst {
    fn with_config(config: RenderConfig) -> Result<Self, TileError> {
        let surface = Surface::new(config.surface_width, config.surface_height)?;
        Ok(Self {
            renderer: FrameRenderer::new(config)?,
            surface,
            playing: true,
            held: None,
        })
    }

    fn render(&mut self, frame: &[u8], width: usize, height: usize) -> Result<(), TileError> {
        let mut raw = RawFrame::new(width, height, frame)?;
        if self.playing {
            self.renderer.tick(&mut raw, &mut self.surface)?;
            return Ok(());
        }
        if self.held.is_none() {
            if let Some((w, h)) = raw.dimensions() {
                let mut buffer = PixelBuffer::new(w, h)?;
                raw.snapshot_into(&mut buffer)?;
                log::debug!("holding {w}x{h} frame while paused");
                self.held = Some(buffer);
            }
        }
        match self.held.as_mut() {
            Some(held) => self.renderer.tick(held, &mut self.surface)?,
            None => self.renderer.tick(&mut raw, &mut self.surface)?,
        };
        Ok(())
    }
}
