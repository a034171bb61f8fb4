use std::collections::HashSet;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::assets::TextureStore;
use crate::app::geometry::Vec2;
use crate::app::scene::Scene;
use crate::app::sprite::{FrameRect, RenderSink, Rgba};

const CLEAR_COLOR: Rgba = [0, 0, 0, 255];

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Software renderer: scenes draw through the `RenderSink` contract into a
/// `pixels` framebuffer which is then presented to the window surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    warned_missing_textures: HashSet<String>,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            warned_missing_textures: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render_scene(
        &mut self,
        scene: &mut dyn Scene,
        textures: &TextureStore,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        let mut painter = FramePainter {
            frame,
            width: self.viewport.width,
            height: self.viewport.height,
            textures,
            warned_missing_textures: &mut self.warned_missing_textures,
        };
        scene.render(&mut painter);

        self.pixels.render()
    }
}

struct FramePainter<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    textures: &'a TextureStore,
    warned_missing_textures: &'a mut HashSet<String>,
}

impl RenderSink for FramePainter<'_> {
    fn fill_rect(&mut self, center: Vec2, size: Vec2, color: Rgba) {
        let left = (center.x - size.x / 2.0).round() as i32;
        let top = (center.y - size.y / 2.0).round() as i32;
        draw_filled_rect(
            self.frame,
            self.width,
            self.height,
            left,
            top,
            size.x.round() as i32,
            size.y.round() as i32,
            color,
        );
    }

    fn draw_frame(&mut self, texture: &str, frame: FrameRect, center: Vec2, size: Vec2) {
        let Some(loaded) = self.textures.get(texture) else {
            if self.warned_missing_textures.insert(texture.to_string()) {
                warn!(texture, "missing_texture");
            }
            return;
        };

        let dest_width = size.x.round() as i32;
        let dest_height = size.y.round() as i32;
        if dest_width <= 0 || dest_height <= 0 {
            return;
        }
        let left = (center.x - size.x / 2.0).round() as i32;
        let top = (center.y - size.y / 2.0).round() as i32;

        for dy in 0..dest_height {
            let py = top + dy;
            if py < 0 || py >= self.height as i32 {
                continue;
            }
            let src_y =
                frame.top + ((dy as f32 + 0.5) / dest_height as f32 * frame.height as f32) as u32;
            for dx in 0..dest_width {
                let px = left + dx;
                if px < 0 || px >= self.width as i32 {
                    continue;
                }
                let src_x = frame.left
                    + ((dx as f32 + 0.5) / dest_width as f32 * frame.width as f32) as u32;
                let color = loaded.pixel(src_x, src_y);
                if color[3] == 0 {
                    continue;
                }
                write_pixel_rgba(
                    self.frame,
                    self.width as usize,
                    px as usize,
                    py as usize,
                    color,
                );
            }
        }
    }

    fn draw_text(&mut self, position: Vec2, text: &str, char_size: u32, color: Rgba) {
        let scale = (char_size as i32 / GLYPH_HEIGHT).max(1);
        let advance = (GLYPH_WIDTH + 1) * scale;
        let mut x = position.x.round() as i32;
        let y = position.y.round() as i32;
        for ch in text.chars() {
            let glyph = glyph_for(ch).unwrap_or(SPACE_GLYPH);
            draw_glyph_clipped(self.frame, self.width, self.height, x, y, scale, glyph, color);
            x += advance;
        }
    }
}

fn write_pixel_rgba(frame: &mut [u8], width: usize, x: usize, y: usize, color: Rgba) {
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }

    frame[byte_offset..end].copy_from_slice(&color);
}

#[allow(clippy::too_many_arguments)]
fn draw_filled_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: Rgba,
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = (x + rect_width).min(width as i32);
    let end_y = (y + rect_height).min(height as i32);
    if end_x <= start_x || end_y <= start_y {
        return;
    }

    let width_usize = width as usize;
    for py in start_y..end_y {
        for px in start_x..end_x {
            write_pixel_rgba(frame, width_usize, px as usize, py as usize, color);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_glyph_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    scale: i32,
    glyph: Glyph,
    color: Rgba,
) {
    if width == 0 || height == 0 {
        return;
    }

    let height_i32 = height as i32;
    let width_i32 = width as i32;

    for (row_index, row_bits) in glyph.rows.iter().enumerate() {
        let glyph_y = y + row_index as i32 * scale;

        for col in 0..GLYPH_WIDTH {
            if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                continue;
            }

            let glyph_x = x + col * scale;
            for sy in 0..scale {
                let pixel_y = glyph_y + sy;
                if pixel_y < 0 || pixel_y >= height_i32 {
                    continue;
                }
                for sx in 0..scale {
                    let pixel_x = glyph_x + sx;
                    if pixel_x < 0 || pixel_x >= width_i32 {
                        continue;
                    }
                    write_pixel_rgba(
                        frame,
                        width as usize,
                        pixel_x as usize,
                        pixel_y as usize,
                        color,
                    );
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Glyph {
    rows: [u8; GLYPH_HEIGHT as usize],
}

const SPACE_GLYPH: Glyph = Glyph {
    rows: [0, 0, 0, 0, 0],
};

fn glyph_for(ch: char) -> Option<Glyph> {
    let rows = match ch.to_ascii_uppercase() {
        ' ' => return Some(SPACE_GLYPH),
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b110, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        _ => return None,
    };
    Some(Glyph { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_pixel(frame: &[u8], width: usize, x: usize, y: usize) -> Rgba {
        let offset = (y * width + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn filled_rect_writes_inside_and_clips_outside() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        draw_filled_rect(&mut frame, 8, 8, 6, 6, 4, 4, [9, 9, 9, 255]);

        assert_eq!(frame_pixel(&frame, 8, 6, 6), [9, 9, 9, 255]);
        assert_eq!(frame_pixel(&frame, 8, 7, 7), [9, 9, 9, 255]);
        assert_eq!(frame_pixel(&frame, 8, 5, 5), [0, 0, 0, 0]);
    }

    #[test]
    fn negative_origin_rect_clips_to_frame() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        draw_filled_rect(&mut frame, 4, 4, -2, -2, 3, 3, [1, 2, 3, 255]);

        assert_eq!(frame_pixel(&frame, 4, 0, 0), [1, 2, 3, 255]);
        assert_eq!(frame_pixel(&frame, 4, 1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn glyph_scale_one_draws_digit_rows() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        let glyph = glyph_for('1').expect("digit glyph");
        draw_glyph_clipped(&mut frame, 8, 8, 0, 0, 1, glyph, [255, 255, 255, 255]);

        // Top row of '1' lights only the middle column.
        assert_eq!(frame_pixel(&frame, 8, 1, 0), [255, 255, 255, 255]);
        assert_eq!(frame_pixel(&frame, 8, 0, 0), [0, 0, 0, 0]);
        // Bottom row lights the full width.
        assert_eq!(frame_pixel(&frame, 8, 0, 4), [255, 255, 255, 255]);
        assert_eq!(frame_pixel(&frame, 8, 2, 4), [255, 255, 255, 255]);
    }

    #[test]
    fn unknown_glyph_falls_back_to_none() {
        assert!(glyph_for('~').is_none());
        assert!(glyph_for('0').is_some());
        assert!(glyph_for('z').is_some());
    }
}
