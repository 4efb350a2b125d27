//! Raster composition: background, wrapped text, optional circular photo, PNG out.
//!
//! Everything here is synchronous and CPU-bound; handlers run it on
//! `tokio::task::spawn_blocking`.

use dashmap::DashMap;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::layout::{CertificateLayout, LayoutProfile, PhotoSlot, TextBlock};
use crate::models::CertificateRequest;
use crate::wrap::{place, wrap};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot read asset {}: {source}", .path.display())]
    Asset {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid font file {}", .0.display())]
    Font(PathBuf),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Resolves template files under the assets directory. Parsed fonts are kept,
/// backgrounds are decoded again for every render.
pub struct AssetStore {
    root: PathBuf,
    fonts: DashMap<String, Arc<Font<'static>>>,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fonts: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, relative: &str) -> Result<Vec<u8>, RenderError> {
        let path = self.root.join(relative);
        std::fs::read(&path).map_err(|source| RenderError::Asset { path, source })
    }

    pub fn font(&self, relative: &str) -> Result<Arc<Font<'static>>, RenderError> {
        if let Some(font) = self.fonts.get(relative) {
            return Ok(Arc::clone(&font));
        }

        let bytes = self.read(relative)?;
        let font = Font::try_from_vec(bytes)
            .map(Arc::new)
            .ok_or_else(|| RenderError::Font(self.root.join(relative)))?;
        debug!(font = relative, "Font loaded");

        self.fonts.insert(relative.to_string(), Arc::clone(&font));
        Ok(font)
    }

    /// Decodes a background and stretches it to exactly `width` x `height`.
    pub fn background(&self, relative: &str, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
        let bytes = self.read(relative)?;
        let img = image::load_from_memory(&bytes)?;
        Ok(img.resize_exact(width, height, FilterType::Triangle).to_rgba8())
    }
}

/// Advance width of `text` at `px`, kerning included.
pub fn text_width(font: &Font<'static>, px: f32, text: &str) -> f32 {
    font.layout(text, Scale::uniform(px), point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

// Draws `text` with its baseline at `y`, blending glyph coverage over the canvas.
fn draw_text(img: &mut RgbaImage, font: &Font<'static>, px: f32, x: f32, y: f32, color: Rgba<u8>, text: &str) {
    for glyph in font.layout(text, Scale::uniform(px), point(x, y)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, v| {
            let tx = gx as i32 + bb.min.x;
            let ty = gy as i32 + bb.min.y;
            if tx < 0 || ty < 0 {
                return;
            }
            let (tx, ty) = (tx as u32, ty as u32);
            if tx >= img.width() || ty >= img.height() {
                return;
            }
            let sa = v.clamp(0.0, 1.0);
            if sa <= 0.0 {
                return;
            }
            let inv = 1.0 - sa;
            let dst = img.get_pixel_mut(tx, ty);
            for c in 0..3 {
                dst.0[c] = (color.0[c] as f32 * sa + dst.0[c] as f32 * inv) as u8;
            }
            dst.0[3] = 255;
        });
    }
}

// Wraps `text` inside `block` and draws every line centered on the block anchor.
fn draw_block(img: &mut RgbaImage, font: &Font<'static>, block: &TextBlock, text: &str) -> usize {
    let lines = wrap(text, block.max_width, |s| text_width(font, block.font_size, s));
    let placed = place(&lines, block.center_x, block.start_y, block.line_height);
    for line in &placed {
        draw_text(img, font, block.font_size, line.x, line.y, block.fill, &line.text);
    }
    placed.len()
}

pub fn overlay_alpha(base: &mut RgbaImage, over: &RgbaImage, x: u32, y: u32) {
    for oy in 0..over.height() {
        for ox in 0..over.width() {
            let p = over.get_pixel(ox, oy);
            let a = p.0[3] as f32 / 255.0;
            if a <= 0.0 {
                continue;
            }
            let (bx, by) = (x + ox, y + oy);
            if bx >= base.width() || by >= base.height() {
                continue;
            }
            let inv = 1.0 - a;
            let dst = base.get_pixel_mut(bx, by);
            for c in 0..3 {
                dst.0[c] = (p.0[c] as f32 * a + dst.0[c] as f32 * inv) as u8;
            }
            dst.0[3] = 255;
        }
    }
}

/// Center-crops `photo` to a square, scales it to the slot and clears everything
/// outside the inscribed circle.
pub fn circle_photo(photo: &DynamicImage, slot: &PhotoSlot) -> RgbaImage {
    let rgba = photo.to_rgba8();
    let side = rgba.width().min(rgba.height());
    let left = (rgba.width() - side) / 2;
    let top = (rgba.height() - side) / 2;
    let square = imageops::crop_imm(&rgba, left, top, side, side).to_image();
    let mut out = imageops::resize(&square, slot.size, slot.size, FilterType::Lanczos3);

    let c = (slot.size as f32 - 1.0) / 2.0;
    let r = slot.size as f32 / 2.0;
    for (x, y, p) in out.enumerate_pixels_mut() {
        let dx = x as f32 - c;
        let dy = y as f32 - c;
        if (dx * dx + dy * dy).sqrt() > r {
            p.0[3] = 0;
        }
    }
    out
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

pub fn render_caption(assets: &AssetStore, profile: &LayoutProfile, text: &str) -> Result<Vec<u8>, RenderError> {
    let mut canvas = assets.background(profile.background, profile.canvas_width, profile.canvas_height)?;
    let font = assets.font(profile.font)?;

    let lines = draw_block(&mut canvas, &font, &profile.text, text);
    debug!(lines, width = profile.canvas_width, height = profile.canvas_height, "Caption rendered");

    encode_png(&canvas)
}

pub fn render_certificate(
    assets: &AssetStore,
    layout: &CertificateLayout,
    card: &CertificateRequest,
    photo: &DynamicImage,
) -> Result<Vec<u8>, RenderError> {
    let mut canvas = assets.background(layout.background, layout.canvas_width, layout.canvas_height)?;
    let font = assets.font(layout.font)?;

    let avatar = circle_photo(photo, &layout.photo);
    overlay_alpha(&mut canvas, &avatar, layout.photo.x, layout.photo.y);

    for (block, text) in [
        (&layout.name, &card.name),
        (&layout.high_school, &card.high_school),
        (&layout.jurusan, &card.jurusan),
        (&layout.desc_bronze, &card.desc_bronze),
        (&layout.desc_silver, &card.desc_silver),
    ] {
        draw_block(&mut canvas, &font, block, text);
    }

    encode_png(&canvas)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::layout::{CERTIFICATE, CaptionStyle};

    const SYSTEM_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/Library/Fonts/Arial.ttf",
    ];

    pub(crate) const NO_FONT: &str = "no system font installed, skipping";

    /// White template backgrounds under `root`. The `.jpg` names hold PNG data, which
    /// is fine because decoding sniffs the content.
    pub(crate) fn write_backgrounds(root: &Path) {
        std::fs::create_dir_all(root.join("image")).unwrap();

        let white = Rgba([255, 255, 255, 255]);
        for bg in [
            CaptionStyle::Type1.profile().background,
            CaptionStyle::Type2.profile().background,
            CERTIFICATE.background,
        ] {
            RgbaImage::from_pixel(16, 16, white)
                .save_with_format(root.join(bg), ImageFormat::Png)
                .unwrap();
        }
    }

    /// Builds an assets directory with a system font standing in for the template font.
    /// `None` only when the machine has none of the fonts; any other setup failure panics.
    pub(crate) fn template_assets() -> Option<tempfile::TempDir> {
        let font = SYSTEM_FONTS.iter().find(|p| Path::new(p).exists())?;
        let dir = tempfile::tempdir().unwrap();

        std::fs::create_dir_all(dir.path().join("fonts")).unwrap();
        std::fs::copy(font, dir.path().join(CaptionStyle::Type1.profile().font)).unwrap();
        write_backgrounds(dir.path());
        Some(dir)
    }
}
