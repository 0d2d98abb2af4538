//! Freehand signature capture onto a fixed-size raster.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fieldvisit_config::SignatureConfig;
use fieldvisit_protocol::{PointerEvent, PointerPhase};
use image::{ImageFormat, Rgba, RgbaImage};
use log::debug;
use std::io::Cursor;
use thiserror::Error;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";
const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);
/// Upper bound on disc stamps per segment.
const MAX_SEGMENT_STEPS: usize = 4096;

/// Errors raised while exporting or decoding a signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("signature is not a PNG data URL")]
    NotPngDataUrl,
}

/// Captured signature encoded as a `data:image/png;base64,...` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    data_url: String,
}

impl Signature {
    /// Encode a raster as a PNG data URL.
    pub fn from_raster(raster: &RgbaImage) -> Result<Self, SignatureError> {
        let mut bytes = Vec::new();
        raster.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(Self {
            data_url: format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(&bytes)),
        })
    }

    /// Wrap a previously exported data URL after checking it decodes.
    pub fn from_data_url(data_url: impl Into<String>) -> Result<Self, SignatureError> {
        let signature = Self {
            data_url: data_url.into(),
        };
        signature.png_bytes()?;
        Ok(signature)
    }

    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }

    pub fn into_data_url(self) -> String {
        self.data_url
    }

    /// Decode back into a raster.
    pub fn decode(&self) -> Result<RgbaImage, SignatureError> {
        let bytes = self.png_bytes()?;
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?;
        Ok(image.to_rgba8())
    }

    fn png_bytes(&self) -> Result<Vec<u8>, SignatureError> {
        let payload = self
            .data_url
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .ok_or(SignatureError::NotPngDataUrl)?;
        Ok(STANDARD.decode(payload)?)
    }
}

/// Capture surface state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureState {
    Idle,
    /// A stroke is in progress; `last` is in surface coordinates.
    Drawing { last: (f64, f64) },
}

/// Two-state pointer machine rendering strokes onto a raster.
///
/// Events arrive in client coordinates and are translated by the surface
/// offset. Strokes accumulate until [`SignatureCapture::clear`].
#[derive(Debug, Clone)]
pub struct SignatureCapture {
    raster: RgbaImage,
    pen_width: f32,
    pen_color: Rgba<u8>,
    offset: (f64, f64),
    state: CaptureState,
    captured: bool,
    signature: Option<Signature>,
}

impl Default for SignatureCapture {
    fn default() -> Self {
        Self::from_config(&SignatureConfig::default())
    }
}

impl SignatureCapture {
    /// Blank surface with a 2-unit white pen.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: RgbaImage::from_pixel(width, height, BLANK),
            pen_width: 2.0,
            pen_color: Rgba([255, 255, 255, 255]),
            offset: (0.0, 0.0),
            state: CaptureState::Idle,
            captured: false,
            signature: None,
        }
    }

    /// Surface sized and inked from config; an unparsable color falls back to white.
    pub fn from_config(config: &SignatureConfig) -> Self {
        let [r, g, b] = config.stroke_rgb().unwrap_or([255, 255, 255]);
        Self::new(config.width, config.height).with_pen(config.stroke_width, [r, g, b])
    }

    pub fn with_pen(mut self, width: f32, color: [u8; 3]) -> Self {
        self.pen_width = width;
        self.pen_color = Rgba([color[0], color[1], color[2], 255]);
        self
    }

    /// Set the surface's on-screen origin.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.offset = (x, y);
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Most recent export; `None` until a stroke ends or after `clear`.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn is_blank(&self) -> bool {
        self.raster.pixels().all(|pixel| *pixel == BLANK)
    }

    /// Begin a stroke at client coordinates.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        let point = self.to_surface(x, y);
        self.state = CaptureState::Drawing { last: point };
    }

    /// Extend the current stroke; ignored while idle.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let CaptureState::Drawing { last } = self.state else {
            return;
        };
        let point = self.to_surface(x, y);
        self.draw_segment(last, point);
        self.state = CaptureState::Drawing { last: point };
    }

    /// Finish the stroke and export the raster; ignored while idle.
    pub fn pointer_up(&mut self) -> Result<(), SignatureError> {
        if self.state == CaptureState::Idle {
            return Ok(());
        }
        self.state = CaptureState::Idle;
        let signature = Signature::from_raster(&self.raster)?;
        debug!(
            "captured signature (bytes={})",
            signature.as_data_url().len()
        );
        self.signature = Some(signature);
        self.captured = true;
        Ok(())
    }

    /// Dispatch a mouse or touch event.
    pub fn handle(&mut self, event: PointerEvent) -> Result<(), SignatureError> {
        match event.phase {
            PointerPhase::Start => self.pointer_down(event.x, event.y),
            PointerPhase::Move => self.pointer_move(event.x, event.y),
            PointerPhase::End => self.pointer_up()?,
        }
        Ok(())
    }

    /// Blank the surface and forget any capture.
    pub fn clear(&mut self) {
        for pixel in self.raster.pixels_mut() {
            *pixel = BLANK;
        }
        self.state = CaptureState::Idle;
        self.captured = false;
        self.signature = None;
    }

    fn to_surface(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.offset.0, y - self.offset.1)
    }

    /// Stamp round discs along the segment, which also rounds the caps.
    fn draw_segment(&mut self, from: (f64, f64), to: (f64, f64)) {
        let radius = (f64::from(self.pen_width) / 2.0).max(0.5);
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length = dx.hypot(dy);
        let spacing = (radius / 2.0).max(0.25);
        let steps = ((length / spacing).ceil() as usize).clamp(1, MAX_SEGMENT_STEPS);
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            self.stamp(from.0 + dx * t, from.1 + dy * t, radius);
        }
    }

    fn stamp(&mut self, cx: f64, cy: f64, radius: f64) {
        let (width, height) = self.raster.dimensions();
        if width == 0 || height == 0 || !cx.is_finite() || !cy.is_finite() {
            return;
        }
        let (max_x, max_y) = (f64::from(width - 1), f64::from(height - 1));
        let off_surface = cx + radius < 0.0
            || cy + radius < 0.0
            || cx - radius > max_x + 1.0
            || cy - radius > max_y + 1.0;
        if off_surface {
            return;
        }
        let x0 = (cx - radius).floor().clamp(0.0, max_x) as u32;
        let x1 = (cx + radius).floor().clamp(0.0, max_x) as u32;
        let y0 = (cy - radius).floor().clamp(0.0, max_y) as u32;
        let y1 = (cy + radius).floor().clamp(0.0, max_y) as u32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
                let inside = (px - cx).powi(2) + (py - cy).powi(2) <= radius * radius;
                let under_pen = cx.floor() == f64::from(x) && cy.floor() == f64::from(y);
                if inside || under_pen {
                    self.raster.put_pixel(x, y, self.pen_color);
                }
            }
        }
    }
}
