//! Label rasterization with fallback-chain font resolution.
//!
//! Fonts are resolved once per process: an ordered list of system typeface
//! paths is tried first, and an embedded DejaVu Sans Mono is the guaranteed
//! final fallback. A missing system font is a fidelity degradation, never an
//! error.

use std::sync::OnceLock;

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use tracing::debug;

/// Ordered system typeface candidates, best first.
const FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
];

/// Builtin fallback so label rendering can never fail.
const EMBEDDED_FONT: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");

static RESOLVED_FONT: OnceLock<FontArc> = OnceLock::new();

/// Resolve the run's typeface, caching the result.
fn resolved_font() -> &'static FontArc {
    RESOLVED_FONT.get_or_init(|| {
        for path in FONT_CANDIDATES {
            if let Ok(bytes) = std::fs::read(path) {
                if let Ok(font) = FontArc::try_from_vec(bytes) {
                    debug!("resolved typeface: {path}");
                    return font;
                }
            }
        }
        debug!("no system typeface candidate resolved, using embedded font");
        FontArc::try_from_slice(EMBEDDED_FONT).expect("embedded font data is valid")
    })
}

/// Layout dimensions of a label at the given pixel size.
///
/// Returns (width, height) of the layout box, before ink cropping.
#[must_use]
pub fn measure_label(text: &str, px: f32) -> (u32, u32) {
    let font = resolved_font();
    let scaled = font.as_scaled(PxScale::from(px));

    let mut width = 0.0f32;
    let mut prev: Option<ab_glyph::GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let layout = (width.ceil() as u32 + 2, scaled.height().ceil() as u32 + 2);
    layout
}

/// Rasterize a label into a transparent RGBA buffer, ink-cropped.
///
/// The buffer is cropped to the glyph ink so anchoring the buffer centers
/// the visible text. `color` carries the final alpha byte; anti-aliased
/// edges scale it by glyph coverage. An empty or whitespace-only label
/// yields a 1x1 transparent buffer.
#[must_use]
pub fn render_label(text: &str, px: f32, color: Rgba<u8>) -> RgbaImage {
    let font = resolved_font();
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);

    let (width, height) = measure_label(text, px);
    let mut buffer = RgbaImage::new(width.max(1), height.max(1));

    let baseline = scaled.ascent();
    let mut cursor = 0.0f32;
    let mut prev: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            cursor += scaled.kern(prev, id);
        }

        let glyph = id.with_scale_and_position(scale, point(cursor, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                #[allow(clippy::cast_possible_truncation)]
                let x = gx as i32 + bounds.min.x as i32;
                #[allow(clippy::cast_possible_truncation)]
                let y = gy as i32 + bounds.min.y as i32;
                if x >= 0 && y >= 0 && (x as u32) < buffer.width() && (y as u32) < buffer.height()
                {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let alpha = (coverage * f32::from(color[3])) as u8;
                    let px = buffer.get_pixel_mut(x as u32, y as u32);
                    // Overlapping glyph edges keep the strongest coverage.
                    if alpha > px[3] {
                        *px = Rgba([color[0], color[1], color[2], alpha]);
                    }
                }
            });
        }

        cursor += scaled.h_advance(id);
        prev = Some(id);
    }

    crop_to_ink(&buffer)
}

/// Crop a transparent buffer to its non-transparent bounding box.
fn crop_to_ink(buffer: &RgbaImage) -> RgbaImage {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;

    for (x, y, px) in buffer.enumerate_pixels() {
        if px[3] > 0 {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if min_x > max_x {
        return RgbaImage::new(1, 1);
    }

    let mut cropped = RgbaImage::new(max_x - min_x + 1, max_y - min_y + 1);
    for (x, y, px) in cropped.enumerate_pixels_mut() {
        *px = *buffer.get_pixel(min_x + x, min_y + y);
    }
    cropped
}

/// Rotate an RGBA buffer by `degrees` clockwise, expanding the canvas.
///
/// Uses bilinear sampling; uncovered pixels stay fully transparent.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rotate(image: &RgbaImage, degrees: f32) -> RgbaImage {
    let radians = -degrees.to_radians();
    let (cos, sin) = (radians.cos(), radians.sin());

    let src_w = image.width() as f32;
    let src_h = image.height() as f32;
    let (cx, cy) = (src_w / 2.0, src_h / 2.0);

    let corners = [
        (-cx, -cy),
        (src_w - cx, -cy),
        (-cx, src_h - cy),
        (src_w - cx, src_h - cy),
    ];
    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for (x, y) in corners {
        let rx = x * cos - y * sin;
        let ry = x * sin + y * cos;
        min_x = min_x.min(rx);
        max_x = max_x.max(rx);
        min_y = min_y.min(ry);
        max_y = max_y.max(ry);
    }

    let dst_w = ((max_x - min_x).ceil() as u32).max(1);
    let dst_h = ((max_y - min_y).ceil() as u32).max(1);
    let mut rotated = RgbaImage::new(dst_w, dst_h);

    let dst_cx = dst_w as f32 / 2.0;
    let dst_cy = dst_h as f32 / 2.0;
    let (inv_cos, inv_sin) = ((-radians).cos(), (-radians).sin());

    for (dx, dy, out) in rotated.enumerate_pixels_mut() {
        let rx = dx as f32 - dst_cx;
        let ry = dy as f32 - dst_cy;
        let sx = rx * inv_cos - ry * inv_sin + cx;
        let sy = rx * inv_sin + ry * inv_cos + cy;

        if sx >= 0.0 && sx < src_w - 1.0 && sy >= 0.0 && sy < src_h - 1.0 {
            let (x0, y0) = (sx.floor() as u32, sy.floor() as u32);
            let (fx, fy) = (sx - x0 as f32, sy - y0 as f32);

            let p00 = image.get_pixel(x0, y0);
            let p10 = image.get_pixel(x0 + 1, y0);
            let p01 = image.get_pixel(x0, y0 + 1);
            let p11 = image.get_pixel(x0 + 1, y0 + 1);

            let lerp2 = |c: usize| -> u8 {
                let v = f32::from(p00[c]) * (1.0 - fx) * (1.0 - fy)
                    + f32::from(p10[c]) * fx * (1.0 - fy)
                    + f32::from(p01[c]) * (1.0 - fx) * fy
                    + f32::from(p11[c]) * fx * fy;
                v.clamp(0.0, 255.0) as u8
            };

            *out = Rgba([lerp2(0), lerp2(1), lerp2(2), lerp2(3)]);
        }
    }

    rotated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_resolution_never_fails() {
        // Either a system candidate or the embedded fallback resolves.
        let font = resolved_font();
        assert!(font.glyph_count() > 0);
    }

    #[test]
    fn measure_grows_with_size_and_length() {
        let (w1, h1) = measure_label("Hello", 12.0);
        let (w2, h2) = measure_label("Hello", 24.0);
        assert!(w2 > w1 && h2 > h1);

        let (short, _) = measure_label("Hi", 24.0);
        let (long, _) = measure_label("Hi there", 24.0);
        assert!(long > short);
    }

    #[test]
    fn render_label_has_ink_at_requested_alpha() {
        let label = render_label("SAMPLE", 48.0, Rgba([255, 255, 255, 200]));
        assert!(label.width() > 1 && label.height() > 1);

        let max_alpha = label.pixels().map(|p| p[3]).max().unwrap_or(0);
        assert_eq!(max_alpha, 200);
    }

    #[test]
    fn render_label_is_ink_cropped() {
        let label = render_label("X", 40.0, Rgba([255, 255, 255, 255]));
        // Every border must touch ink after cropping.
        let w = label.width();
        let h = label.height();
        assert!((0..w).any(|x| label.get_pixel(x, 0)[3] > 0));
        assert!((0..w).any(|x| label.get_pixel(x, h - 1)[3] > 0));
        assert!((0..h).any(|y| label.get_pixel(0, y)[3] > 0));
        assert!((0..h).any(|y| label.get_pixel(w - 1, y)[3] > 0));
    }

    #[test]
    fn render_empty_label_yields_transparent_stub() {
        let label = render_label("", 24.0, Rgba([255, 255, 255, 255]));
        assert_eq!(label.dimensions(), (1, 1));
        assert_eq!(label.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn rotate_expands_canvas_and_keeps_ink() {
        let tile = render_label("DEMO", 24.0, Rgba([255, 255, 255, 255]));
        let rotated = rotate(&tile, 45.0);
        // A wide tile turned diagonal grows in height.
        assert!(rotated.height() > tile.height());
        assert!(rotated.pixels().any(|p| p[3] > 0));
    }

    #[test]
    fn rotate_zero_degrees_preserves_dimensions() {
        let tile = render_label("A", 24.0, Rgba([255, 255, 255, 255]));
        let rotated = rotate(&tile, 0.0);
        assert_eq!(rotated.dimensions(), tile.dimensions());
    }
}
