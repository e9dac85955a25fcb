//! The watermark compositor.
//!
//! Every style renders onto a transparent overlay the same size as the base
//! image, then the overlay is alpha-composited over the base in one pass and
//! flattened back to opaque RGB. [`apply`] is pure: the base is never
//! mutated and the result always has identical dimensions.

use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};

use crate::placement::{self, Anchor};
use crate::style::{alpha_byte, PatternMode, WatermarkStyle};
use crate::text;

/// Pixel offset of the contrast shadow behind text labels.
const SHADOW_OFFSET: i32 = 3;

/// Minimum pattern tile font size in pixels.
const MIN_TILE_PX: f32 = 8.0;

/// Composite a watermark style onto a copy of `base`.
///
/// The returned image always has the same dimensions as `base`. Overlay
/// fragments that would extend past the canvas are clipped, never an error.
/// An opacity of zero produces a pixel-identical copy.
#[must_use]
pub fn apply(base: &RgbImage, style: &WatermarkStyle) -> RgbImage {
    let canvas = base.dimensions();
    let mut overlay = RgbaImage::new(canvas.0, canvas.1);

    match style {
        WatermarkStyle::Text {
            label,
            opacity,
            anchor,
            shadow,
        } => draw_text(&mut overlay, label, *opacity, *anchor, *shadow),
        WatermarkStyle::Pattern {
            label,
            opacity,
            spacing,
            mode,
        } => draw_pattern(&mut overlay, label, *opacity, *spacing, *mode),
        WatermarkStyle::Logo {
            initials,
            opacity,
            anchor,
        } => draw_logo(&mut overlay, initials, *opacity, *anchor),
        WatermarkStyle::Embedded {
            label,
            opacity,
            blur_sigma,
        } => {
            draw_embedded(&mut overlay, label, *opacity);
            if *blur_sigma > 0.0 {
                overlay = imageops::blur(&overlay, *blur_sigma);
            }
        }
    }

    flatten(base, &overlay)
}

/// Render a single anchored label, optionally over a dark contrast shadow.
fn draw_text(overlay: &mut RgbaImage, label: &str, opacity: f32, anchor: Anchor, shadow: bool) {
    let canvas = overlay.dimensions();
    let px = label_px(canvas, 10);
    let alpha = alpha_byte(opacity);

    let main = text::render_label(label, px, Rgba([255, 255, 255, alpha]));
    let (x, y) = placement::anchor_position(anchor, canvas, main.dimensions());

    if shadow {
        let dark = text::render_label(label, px, Rgba([0, 0, 0, alpha]));
        paste_over(overlay, &dark, x + SHADOW_OFFSET, y + SHADOW_OFFSET);
    }
    paste_over(overlay, &main, x, y);
}

/// Tile a label across the canvas, upright or rotated 45 degrees.
fn draw_pattern(
    overlay: &mut RgbaImage,
    label: &str,
    opacity: f32,
    spacing: u32,
    mode: PatternMode,
) {
    let canvas = overlay.dimensions();
    #[allow(clippy::cast_precision_loss)]
    let px = (spacing as f32 / 6.0).max(MIN_TILE_PX);
    let alpha = alpha_byte(opacity);
    let tile = text::render_label(label, px, Rgba([255, 255, 255, alpha]));

    match mode {
        PatternMode::Grid => {
            for (x, y) in placement::grid_positions(canvas, spacing) {
                paste_over(overlay, &tile, x, y);
            }
        }
        PatternMode::Diagonal => {
            let rotated = text::rotate(&tile, 45.0);
            for (x, y) in placement::diagonal_positions(canvas, rotated.dimensions(), spacing) {
                paste_over(overlay, &rotated, x, y);
            }
        }
    }
}

/// Render the geometric mark once and paste it at the anchor.
fn draw_logo(overlay: &mut RgbaImage, initials: &str, opacity: f32, anchor: Anchor) {
    let canvas = overlay.dimensions();
    let side = (canvas.0.min(canvas.1) / 5).max(32);
    let mark = render_mark(side, initials, opacity);

    let (x, y) = placement::anchor_position(anchor, canvas, mark.dimensions());
    paste_over(overlay, &mark, x, y);
}

/// Draw the vector-style mark: circle outline, inner triangle, initials.
fn render_mark(side: u32, initials: &str, opacity: f32) -> RgbaImage {
    let mut mark = RgbaImage::new(side, side);
    let alpha = alpha_byte(opacity);
    let half_alpha = alpha / 2;

    #[allow(clippy::cast_precision_loss)]
    let s = side as f32;
    let center = s / 2.0;
    let radius = center - 10.0;
    let ring_width = 2.5;

    // Triangle vertices, matching the inset of the ring.
    let apex = (center, 20.0);
    let left = (20.0, s - 20.0);
    let right = (s - 20.0, s - 20.0);

    for (x, y, px) in mark.enumerate_pixels_mut() {
        #[allow(clippy::cast_precision_loss)]
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);

        let dist = ((fx - center).powi(2) + (fy - center).powi(2)).sqrt();
        if radius > 0.0 && (dist - radius).abs() <= ring_width {
            *px = Rgba([255, 255, 255, alpha]);
        } else if in_triangle((fx, fy), apex, left, right) {
            *px = Rgba([255, 255, 255, half_alpha]);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let initials_px = (s / 4.0).max(MIN_TILE_PX);
    let glyphs = text::render_label(initials, initials_px, Rgba([255, 255, 255, alpha]));
    let (gx, gy) = placement::anchor_position(Anchor::Center, (side, side), glyphs.dimensions());
    paste_over(&mut mark, &glyphs, gx, gy);

    mark
}

/// Half-plane test against each triangle edge.
fn in_triangle(p: (f32, f32), a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> bool {
    let edge = |p: (f32, f32), v0: (f32, f32), v1: (f32, f32)| {
        (v1.0 - v0.0) * (p.1 - v0.1) - (v1.1 - v0.1) * (p.0 - v0.0)
    };
    let d0 = edge(p, a, b);
    let d1 = edge(p, b, c);
    let d2 = edge(p, c, a);
    let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
    let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
    !(has_neg && has_pos)
}

/// Render a single large, centered label for the embedded style.
fn draw_embedded(overlay: &mut RgbaImage, label: &str, opacity: f32) {
    let canvas = overlay.dimensions();
    let px = label_px(canvas, 3);
    let alpha = alpha_byte(opacity);

    let glyphs = text::render_label(label, px, Rgba([128, 128, 128, alpha]));
    let (x, y) = placement::anchor_position(Anchor::Center, canvas, glyphs.dimensions());
    paste_over(overlay, &glyphs, x, y);
}

/// Label pixel size derived from the short canvas dimension.
fn label_px(canvas: (u32, u32), divisor: u32) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let px = (canvas.0.min(canvas.1) / divisor) as f32;
    px.max(MIN_TILE_PX)
}

/// Paste `tile` onto `canvas` at (x, y) with the "over" operator.
///
/// Fragments outside the canvas are clipped.
pub(crate) fn paste_over(canvas: &mut RgbaImage, tile: &RgbaImage, x: i32, y: i32) {
    #[allow(clippy::cast_possible_wrap)]
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    #[allow(clippy::cast_possible_wrap)]
    let (tw, th) = (tile.width() as i32, tile.height() as i32);

    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + tw).min(cw);
    let y_end = (y + th).min(ch);

    for cy in y_start..y_end {
        for cx in x_start..x_end {
            #[allow(clippy::cast_sign_loss)]
            let src = tile.get_pixel((cx - x) as u32, (cy - y) as u32);
            if src[3] == 0 {
                continue;
            }
            #[allow(clippy::cast_sign_loss)]
            let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
            *dst = over(*src, *dst);
        }
    }
}

/// Porter-Duff "over" for two RGBA pixels.
fn over(fg: Rgba<u8>, bg: Rgba<u8>) -> Rgba<u8> {
    let fa = f32::from(fg[3]) / 255.0;
    let ba = f32::from(bg[3]) / 255.0;
    let out_a = fa + ba * (1.0 - fa);
    if out_a < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let ch = |f: u8, b: u8| {
        let v = (f32::from(f) / 255.0 * fa + f32::from(b) / 255.0 * ba * (1.0 - fa)) / out_a;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let byte = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        byte
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let out_alpha = (out_a * 255.0).round() as u8;
    Rgba([ch(fg[0], bg[0]), ch(fg[1], bg[1]), ch(fg[2], bg[2]), out_alpha])
}

/// Alpha-composite a transparent overlay over an opaque base in one pass.
///
/// Pixels with zero overlay alpha are copied through untouched, so an empty
/// overlay yields a pixel-identical result.
pub(crate) fn flatten(base: &RgbImage, overlay: &RgbaImage) -> RgbImage {
    debug_assert_eq!(base.dimensions(), overlay.dimensions());

    let mut out = base.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let src = overlay.get_pixel(x, y);
        if src[3] == 0 {
            continue;
        }
        let fa = f32::from(src[3]) / 255.0;
        let blend = |f: u8, b: u8| {
            let v = f32::from(f) * fa + f32::from(b) * (1.0 - fa);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let byte = v.round().clamp(0.0, 255.0) as u8;
            byte
        };
        *px = Rgb([
            blend(src[0], px[0]),
            blend(src[1], px[1]),
            blend(src[2], px[2]),
        ]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::builtin_presets;

    fn gray_base(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([60, 60, 60]))
    }

    #[test]
    fn apply_preserves_dimensions_for_all_presets() {
        let base = gray_base(320, 240);
        for preset in builtin_presets() {
            let out = apply(&base, &preset.style);
            assert_eq!(out.dimensions(), base.dimensions(), "{}", preset.tag);
        }
    }

    #[test]
    fn apply_never_mutates_base() {
        let base = gray_base(200, 150);
        let before: Vec<u8> = base.as_raw().clone();
        for preset in builtin_presets() {
            let _ = apply(&base, &preset.style);
        }
        assert_eq!(base.as_raw(), &before);
    }

    #[test]
    fn zero_opacity_is_identity_for_every_variant() {
        let base = gray_base(160, 120);
        let styles = [
            WatermarkStyle::Text {
                label: "SAMPLE".to_string(),
                opacity: 0.0,
                anchor: Anchor::Center,
                shadow: true,
            },
            WatermarkStyle::Pattern {
                label: "DEMO".to_string(),
                opacity: 0.0,
                spacing: 60,
                mode: PatternMode::Grid,
            },
            WatermarkStyle::Logo {
                initials: "WM".to_string(),
                opacity: 0.0,
                anchor: Anchor::BottomRight,
            },
            WatermarkStyle::Embedded {
                label: "PROTECTED".to_string(),
                opacity: 0.0,
                blur_sigma: 3.0,
            },
        ];
        for style in &styles {
            let out = apply(&base, style);
            assert_eq!(out.as_raw(), base.as_raw(), "{style:?}");
        }
    }

    #[test]
    fn text_style_changes_pixels_at_the_anchor() {
        let base = gray_base(400, 300);
        let style = WatermarkStyle::Text {
            label: "SAMPLE".to_string(),
            opacity: 0.5,
            anchor: Anchor::Center,
            shadow: false,
        };
        let out = apply(&base, &style);
        let changed = out
            .pixels()
            .zip(base.pixels())
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed > 0);
    }

    #[test]
    fn grid_pattern_stamps_every_cell() {
        let base = gray_base(300, 200);
        let style = WatermarkStyle::Pattern {
            label: "DEMO".to_string(),
            opacity: 0.6,
            spacing: 100,
            mode: PatternMode::Grid,
        };
        let out = apply(&base, &style);

        // A stamp starts at every grid origin; sample inside each cell's
        // top-left label region.
        for (x, y) in placement::grid_positions((300, 200), 100) {
            #[allow(clippy::cast_sign_loss)]
            let region_changed = (0..20).any(|dy| {
                (0..40).any(|dx| {
                    let (px, py) = ((x + dx) as u32, (y + dy) as u32);
                    px < 300 && py < 200 && out.get_pixel(px, py) != base.get_pixel(px, py)
                })
            });
            assert!(region_changed, "no ink near stamp ({x}, {y})");
        }
    }

    #[test]
    fn diagonal_pattern_does_not_panic_on_small_canvas() {
        let base = gray_base(40, 30);
        let style = WatermarkStyle::Pattern {
            label: "WATERMARK".to_string(),
            opacity: 0.3,
            spacing: 150,
            mode: PatternMode::Diagonal,
        };
        let out = apply(&base, &style);
        assert_eq!(out.dimensions(), (40, 30));
    }

    #[test]
    fn logo_mark_draws_ring_and_initials() {
        let mark = render_mark(100, "WM", 1.0);
        // Ring pixel on the vertical through the center, near the top inset.
        assert!(mark.get_pixel(50, 10)[3] > 0);
        // Somewhere inside the mark carries the triangle's half alpha.
        assert!(mark.pixels().any(|p| p[3] == 127));
    }

    #[test]
    fn embedded_style_spreads_ink_beyond_glyph_edges() {
        let base = gray_base(300, 200);
        let sharp = apply(
            &base,
            &WatermarkStyle::Embedded {
                label: "PROTECTED".to_string(),
                opacity: 0.6,
                blur_sigma: 0.0,
            },
        );
        let blurred = apply(
            &base,
            &WatermarkStyle::Embedded {
                label: "PROTECTED".to_string(),
                opacity: 0.6,
                blur_sigma: 3.0,
            },
        );

        let count = |img: &RgbImage| {
            img.pixels()
                .zip(base.pixels())
                .filter(|(a, b)| a != b)
                .count()
        };
        assert!(count(&blurred) > count(&sharp));
    }

    #[test]
    fn paste_over_clips_partial_tiles() {
        let mut canvas = RgbaImage::new(50, 50);
        let tile = RgbaImage::from_pixel(30, 30, Rgba([255, 0, 0, 255]));

        paste_over(&mut canvas, &tile, 40, 40);
        assert_eq!(canvas.get_pixel(45, 45)[0], 255);
        assert_eq!(canvas.get_pixel(30, 30)[3], 0);

        paste_over(&mut canvas, &tile, -20, -20);
        assert_eq!(canvas.get_pixel(5, 5)[0], 255);
    }

    #[test]
    fn flatten_blends_half_alpha_to_midpoint() {
        let base = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
        let overlay = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 128]));
        let out = flatten(&base, &overlay);
        let px = out.get_pixel(2, 2);
        assert!(px[0] >= 126 && px[0] <= 130);
    }
}
