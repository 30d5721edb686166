//! CPU drawing surface owned by the worker.
//!
//! Renders into a float RGB buffer, then quantizes to RGBA8 on `present`.
//! The host receives the surface once (inside an `Arc<Mutex<..>>`) at init
//! and only ever reads the presented RGBA8 frame back for display.

use egui::Color32;
use std::sync::{Arc, Mutex};

/// Handle the host passes to the worker at init and keeps for blitting.
pub type SharedSurface = Arc<Mutex<FrameSurface>>;

pub struct FrameSurface {
    width: u32,
    height: u32,
    background: Color32,
    /// Working RGB in 0..255 float space.
    rgb: Vec<f32>,
    /// Presented RGBA8 frame.
    out_rgba: Vec<u8>,
}

impl FrameSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let px = (width * height) as usize;
        Self {
            width,
            height,
            background: Color32::BLACK,
            rgb: vec![0.0; px * 3],
            out_rgba: vec![0; px * 4],
        }
    }

    pub fn shared(width: u32, height: u32) -> SharedSurface {
        Arc::new(Mutex::new(Self::new(width, height)))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_background(&mut self, background: Color32) {
        self.background = background;
    }

    /// Reallocate buffers for a new geometry. Contents are undefined until
    /// the next `clear` + `present`.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        let px = (self.width * self.height) as usize;
        self.rgb = vec![0.0; px * 3];
        self.out_rgba = vec![0; px * 4];
    }

    pub fn clear(&mut self) {
        let r = self.background.r() as f32;
        let g = self.background.g() as f32;
        let b = self.background.b() as f32;
        for chunk in self.rgb.chunks_exact_mut(3) {
            chunk[0] = r;
            chunk[1] = g;
            chunk[2] = b;
        }
    }

    /// Soft filled circle, straight-alpha OVER the current buffer.
    pub fn draw_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color32, alpha: f32) {
        if radius <= 0.1 || alpha <= 0.0 {
            return;
        }

        let min_x = (cx - radius).floor().max(0.0) as i32;
        let max_x = (cx + radius).ceil().min(self.width as f32 - 1.0) as i32;
        let min_y = (cy - radius).floor().max(0.0) as i32;
        let max_y = (cy + radius).ceil().min(self.height as f32 - 1.0) as i32;

        let r = color.r() as f32;
        let g = color.g() as f32;
        let b = color.b() as f32;
        let radius_sq = radius * radius;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let dx = px as f32 - cx;
                let dy = py as f32 - cy;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq > radius_sq {
                    continue;
                }

                // Smooth falloff toward the rim
                let t = (dist_sq.sqrt() / radius).clamp(0.0, 1.0);
                let falloff = (1.0 - t).powf(1.8);
                let a = (alpha * falloff).clamp(0.0, 1.0);

                let base = ((py as u32 * self.width + px as u32) as usize) * 3;
                self.rgb[base] = self.rgb[base] * (1.0 - a) + r * a;
                self.rgb[base + 1] = self.rgb[base + 1] * (1.0 - a) + g * a;
                self.rgb[base + 2] = self.rgb[base + 2] * (1.0 - a) + b * a;
            }
        }
    }

    /// Quantize the working buffer into the presented RGBA8 frame.
    pub fn present(&mut self) {
        let px = (self.width * self.height) as usize;
        for i in 0..px {
            let base = i * 3;
            let o = i * 4;
            self.out_rgba[o] = self.rgb[base].clamp(0.0, 255.0) as u8;
            self.out_rgba[o + 1] = self.rgb[base + 1].clamp(0.0, 255.0) as u8;
            self.out_rgba[o + 2] = self.rgb[base + 2].clamp(0.0, 255.0) as u8;
            self.out_rgba[o + 3] = 255;
        }
    }

    /// Last presented frame, tightly packed RGBA8.
    pub fn rgba(&self) -> &[u8] {
        &self.out_rgba
    }

    /// Copy of the last presented frame as an image, for PNG snapshots.
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.out_rgba.clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(surface: &FrameSurface, x: u32, y: u32) -> [u8; 4] {
        let o = ((y * surface.width() + x) * 4) as usize;
        let rgba = surface.rgba();
        [rgba[o], rgba[o + 1], rgba[o + 2], rgba[o + 3]]
    }

    #[test]
    fn clear_fills_with_background() {
        let mut surface = FrameSurface::new(8, 8);
        surface.set_background(Color32::from_rgb(10, 20, 30));
        surface.clear();
        surface.present();
        assert_eq!(pixel(&surface, 0, 0), [10, 20, 30, 255]);
        assert_eq!(pixel(&surface, 7, 7), [10, 20, 30, 255]);
    }

    #[test]
    fn circle_center_takes_full_color() {
        let mut surface = FrameSurface::new(16, 16);
        surface.clear();
        surface.draw_circle(8.0, 8.0, 3.0, Color32::from_rgb(200, 100, 50), 1.0);
        surface.present();
        // Falloff is 1.0 at distance zero, so the center pixel is the raw color.
        assert_eq!(pixel(&surface, 8, 8), [200, 100, 50, 255]);
        // Well outside the radius the background is untouched.
        assert_eq!(pixel(&surface, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn off_surface_draws_are_clipped() {
        let mut surface = FrameSurface::new(8, 8);
        surface.clear();
        surface.draw_circle(-100.0, -100.0, 5.0, Color32::WHITE, 1.0);
        surface.draw_circle(4.0, 1000.0, 50.0, Color32::WHITE, 1.0);
        surface.present();
        // No panic and no wrap-around writes.
        assert_eq!(pixel(&surface, 4, 4), [0, 0, 0, 255]);
    }

    #[test]
    fn resize_reallocates_frame() {
        let mut surface = FrameSurface::new(8, 8);
        surface.resize(4, 2);
        surface.clear();
        surface.present();
        assert_eq!(surface.rgba().len(), 4 * 2 * 4);
        assert_eq!(surface.to_image().dimensions(), (4, 2));
    }

    #[test]
    fn zero_size_is_clamped() {
        let surface = FrameSurface::new(0, 0);
        assert_eq!(surface.width(), 1);
        assert_eq!(surface.height(), 1);
    }
}
