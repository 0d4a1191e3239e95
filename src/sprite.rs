use std::collections::{HashMap, HashSet};

use image::imageops::FilterType;
use image::{GenericImageView, RgbaImage};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier};
use ratatui::widgets::Widget;
use serde::{Deserialize, Serialize};

/// Pixel bounds of the popover sprite.
pub const SPRITE_MAX_WIDTH: u32 = 24;
pub const SPRITE_MAX_HEIGHT: u32 = 16;

/// Pixel bounds of a card thumbnail.
pub const THUMB_MAX_WIDTH: u32 = 16;
pub const THUMB_MAX_HEIGHT: u32 = 8;

/// Below this scale factor nearest-neighbour sampling loses the silhouette.
const SMOOTH_BELOW_SCALE: f64 = 0.25;

const ALPHA_CUTOFF: u8 = 128;

/// Opaque RGB pixels, row-major; `None` is transparent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Option<[u8; 3]>>,
}

impl SpriteData {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .flatten()
    }

    /// Terminal cells needed: one column per pixel, two pixel rows per line.
    pub fn cell_size(&self) -> (u16, u16) {
        (self.width as u16, self.height.div_ceil(2) as u16)
    }
}

/// Decode an image, crop it to its opaque pixels and shrink it to fit
/// `max` (width, height) pixels.
pub fn decode_sprite(bytes: &[u8], max: (u32, u32)) -> Result<SpriteData, String> {
    let (max_width, max_height) = max;
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let rgba = image.to_rgba8();
    let Some((x, y, width, height)) = opaque_bounds(&rgba) else {
        return Err("sprite has no opaque pixels".to_string());
    };
    let cropped = image.crop_imm(x, y, width, height);

    let scale = f64::min(
        1.0,
        f64::min(
            f64::from(max_width) / f64::from(width),
            f64::from(max_height) / f64::from(height),
        ),
    );
    let filter = if scale < SMOOTH_BELOW_SCALE {
        FilterType::Triangle
    } else {
        FilterType::Nearest
    };
    let target_w = ((width as f64 * scale).round() as u32).max(1);
    let target_h = ((height as f64 * scale).round() as u32).max(1);
    let scaled = if (target_w, target_h) == cropped.dimensions() {
        cropped.to_rgba8()
    } else {
        image::imageops::resize(&cropped.to_rgba8(), target_w, target_h, filter)
    };

    let pixels = scaled
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            (a >= ALPHA_CUTOFF).then_some([r, g, b])
        })
        .collect();

    Ok(SpriteData {
        width: target_w,
        height: target_h,
        pixels,
    })
}

/// Decoded sprites by creature id, plus the ids in flight or known to fail.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteCache {
    ready: HashMap<u16, SpriteData>,
    loading: HashSet<u16>,
    failed: HashSet<u16>,
}

impl SpriteCache {
    pub fn get(&self, id: u16) -> Option<&SpriteData> {
        self.ready.get(&id)
    }

    pub fn is_loading(&self, id: u16) -> bool {
        self.loading.contains(&id)
    }

    /// Mark `id` as in flight. False when it is already cached, loading or
    /// failed, in which case nothing should be fetched.
    pub fn begin(&mut self, id: u16) -> bool {
        if self.ready.contains_key(&id) || self.failed.contains(&id) {
            return false;
        }
        self.loading.insert(id)
    }

    pub fn finish(&mut self, id: u16, sprite: SpriteData) {
        self.loading.remove(&id);
        self.ready.insert(id, sprite);
    }

    pub fn fail(&mut self, id: u16) {
        self.loading.remove(&id);
        self.failed.insert(id);
    }

    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    pub fn loading_count(&self) -> usize {
        self.loading.len()
    }
}

fn opaque_bounds(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;
    for (x, y, px) in image.enumerate_pixels() {
        if px.0[3] >= ALPHA_CUTOFF {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Half-block rendering: each cell shows an upper and a lower pixel.
pub struct SpriteWidget<'a> {
    sprite: &'a SpriteData,
    dim: bool,
}

impl<'a> SpriteWidget<'a> {
    pub fn new(sprite: &'a SpriteData) -> Self {
        Self { sprite, dim: false }
    }

    pub fn dim(mut self, dim: bool) -> Self {
        self.dim = dim;
        self
    }
}

impl Widget for SpriteWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (cols, rows) = self.sprite.cell_size();
        let cols = cols.min(area.width);
        let rows = rows.min(area.height);
        let offset_x = area.x + (area.width - cols) / 2;
        let offset_y = area.y + (area.height - rows) / 2;

        for row in 0..rows {
            for col in 0..cols {
                let top = self.sprite.pixel(u32::from(col), u32::from(row) * 2);
                let bottom = self.sprite.pixel(u32::from(col), u32::from(row) * 2 + 1);
                let Some(cell) = buf.cell_mut((offset_x + col, offset_y + row)) else {
                    continue;
                };
                match (top, bottom) {
                    (None, None) => continue,
                    (Some(top), None) => {
                        cell.set_char('▀').set_fg(rgb(top));
                    }
                    (None, Some(bottom)) => {
                        cell.set_char('▄').set_fg(rgb(bottom));
                    }
                    (Some(top), Some(bottom)) => {
                        cell.set_char('▀').set_fg(rgb(top)).set_bg(rgb(bottom));
                    }
                }
                if self.dim {
                    cell.modifier.insert(Modifier::DIM);
                }
            }
        }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}
