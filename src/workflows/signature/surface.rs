//! Rasterization of recorded strokes.

use std::fmt;
use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use super::input::{Point, Stroke};
use crate::api::UploadedFile;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("unable to encode signature image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Turns strokes into an exportable image file.
pub trait Surface: fmt::Debug + Send + Sync {
    fn export(&self, strokes: &[Stroke]) -> Result<UploadedFile, SurfaceError>;
}

/// Opaque white canvas with round-capped black ink, exported as PNG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    stroke_width: f32,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            stroke_width: 2.0,
        }
    }

    pub fn with_stroke_width(mut self, stroke_width: f32) -> Self {
        if stroke_width.is_finite() && stroke_width > 0.0 {
            self.stroke_width = stroke_width;
        }
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The background is filled before any ink, and the buffer has no alpha
    /// channel, so untouched pixels are always opaque white.
    pub fn rasterize(&self, strokes: &[Stroke]) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(self.width, self.height, WHITE);
        let radius = self.stroke_width / 2.0;
        for stroke in strokes {
            for (from, to) in stroke.segments() {
                self.paint_segment(&mut canvas, from, to, radius);
            }
        }
        canvas
    }

    fn paint_segment(&self, canvas: &mut RgbImage, from: Point, to: Point, radius: f32) {
        let min_x = (from.x.min(to.x) - radius).floor() as i64;
        let max_x = (from.x.max(to.x) + radius).ceil() as i64;
        let min_y = (from.y.min(to.y) - radius).floor() as i64;
        let max_y = (from.y.max(to.y) + radius).ceil() as i64;

        let x_range = min_x.max(0)..=max_x.min(self.width as i64 - 1);
        let y_range = min_y.max(0)..=max_y.min(self.height as i64 - 1);

        for y in y_range {
            for x in x_range.clone() {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, from, to) <= radius {
                    canvas.put_pixel(x as u32, y as u32, INK);
                }
            }
        }
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(500, 200)
    }
}

impl Surface for RasterSurface {
    fn export(&self, strokes: &[Stroke]) -> Result<UploadedFile, SurfaceError> {
        let canvas = self.rasterize(strokes);
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(canvas).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(UploadedFile::new("signature.png", mime::IMAGE_PNG.as_ref(), bytes))
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
