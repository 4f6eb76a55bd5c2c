//! sampler.rs
//! Background sampler contract and the procedural track bitmap backing it.
//!
//! The sampler works in projected screen space: origin at the bitmap center,
//! world y up, one unit per pixel. Sampling is deterministic for a fixed
//! track and scale.

use crate::core::vector::Vec2;

/// Brightness source for the line sensors. `center` is in screen pixels;
/// the window is axis-aligned with its top-left rounded to the pixel grid.
pub trait BackgroundSampler {
    fn sample(&self, center: Vec2, w: u32, h: u32) -> Vec<u8>;
}

/// Grayscale track image, row-major, top-left origin. Pixels outside the
/// bitmap read as brightness 0 and therefore as line-dark, the same way an
/// image canvas reads transparent black past its edges.
pub struct TrackBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TrackBitmap {
    /// All-white bitmap of the given pixel dimensions.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![255; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Darkens every pixel whose world-space position (cm, y up, origin at
    /// the bitmap center) satisfies `dark`.
    pub fn paint_dark<F>(&mut self, pixels_per_unit: f64, mut dark: F)
    where
        F: FnMut(f64, f64) -> bool,
    {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        for py in 0..self.height {
            for px in 0..self.width {
                let wx = (px as f64 - half_w) / pixels_per_unit;
                let wy = (half_h - py as f64) / pixels_per_unit;
                if dark(wx, wy) {
                    self.pixels[(py * self.width + px) as usize] = 0;
                }
            }
        }
    }

    /// Vertical line segment of the track: dark stripe centered on world
    /// x = `center_x_cm`, `width_cm` wide.
    pub fn stripe_vertical(&mut self, pixels_per_unit: f64, center_x_cm: f64, width_cm: f64) {
        let half = width_cm / 2.0;
        self.paint_dark(pixels_per_unit, |wx, _| (wx - center_x_cm).abs() <= half);
    }

    /// Circular loop track: dark ring of the given radius and stroke width.
    pub fn loop_stroke(&mut self, pixels_per_unit: f64, center: Vec2, radius_cm: f64, stroke_cm: f64) {
        let half = stroke_cm / 2.0;
        self.paint_dark(pixels_per_unit, |wx, wy| {
            (Vec2::new(wx, wy).dist(center) - radius_cm).abs() <= half
        });
    }

    fn pixel(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        self.pixels[(y as u32 * self.width + x as u32) as usize]
    }
}

impl BackgroundSampler for TrackBitmap {
    fn sample(&self, center: Vec2, w: u32, h: u32) -> Vec<u8> {
        let origin_x = (self.width as f64 / 2.0 + center.x - w as f64 / 2.0).round() as i64;
        let origin_y = (self.height as f64 / 2.0 - center.y - h as f64 / 2.0).round() as i64;

        let mut out = Vec::with_capacity((w * h) as usize);
        for dy in 0..h as i64 {
            for dx in 0..w as i64 {
                out.push(self.pixel(origin_x + dx, origin_y + dy));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_reads_white_inside() {
        let track = TrackBitmap::blank(64, 64);
        let samples = track.sample(Vec2::ZERO, 4, 4);
        assert_eq!(samples.len(), 16);
        assert!(samples.iter().all(|&b| b == 255));
    }

    #[test]
    fn out_of_bounds_reads_dark() {
        let track = TrackBitmap::blank(8, 8);
        let samples = track.sample(Vec2::new(1000.0, 0.0), 2, 2);
        assert!(samples.iter().all(|&b| b == 0));
    }

    #[test]
    fn stripe_darkens_expected_columns() {
        let mut track = TrackBitmap::blank(64, 64);
        track.stripe_vertical(2.0, 0.0, 2.0);

        // Window centered on the stripe is fully dark.
        let on = track.sample(Vec2::ZERO, 4, 4);
        assert!(on.iter().all(|&b| b == 0));

        // 10 cm to the side (20 px) is fully white.
        let off = track.sample(Vec2::new(20.0, 0.0), 4, 4);
        assert!(off.iter().all(|&b| b == 255));
    }

    #[test]
    fn loop_stroke_is_dark_on_the_ring_only() {
        let mut track = TrackBitmap::blank(256, 256);
        track.loop_stroke(2.0, Vec2::ZERO, 40.0, 4.0);

        // On the ring at world (40, 0) -> screen (80, 0).
        let on = track.sample(Vec2::new(80.0, 0.0), 4, 4);
        assert!(on.iter().any(|&b| b == 0));

        // At the center the ring is far away.
        let center = track.sample(Vec2::ZERO, 4, 4);
        assert!(center.iter().all(|&b| b == 255));
    }
}
