//! Procedural placeholder base images.
//!
//! When no real source photo is available the driver synthesizes one: a
//! vertical two-stop gradient from the category palette, uniform pixel
//! noise for photographic texture, and the category label centered with a
//! contrast shadow. Output is deterministic for a given (category, seed).

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compositor;
use crate::placement::{self, Anchor};
use crate::text;

/// Peak per-channel noise amplitude.
const NOISE_AMPLITUDE: i16 = 10;

/// Offset of the label's contrast shadow, in pixels.
const LABEL_SHADOW_OFFSET: i32 = 3;

/// Two-stop gradient palette for a category, keyed on its first word.
fn palette(category: &str) -> ([u8; 3], [u8; 3]) {
    let key = category
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match key.as_str() {
        "nature" => ([34, 139, 34], [144, 238, 144]),
        "architecture" => ([70, 130, 180], [176, 196, 222]),
        "product" => ([255, 140, 0], [255, 218, 185]),
        "portrait" => ([199, 21, 133], [255, 182, 193]),
        "food" => ([255, 69, 0], [255, 160, 122]),
        // "abstract" and anything unrecognized share the purple ramp.
        _ => ([138, 43, 226], [221, 160, 221]),
    }
}

/// Mix the run seed with the category so every category gets its own noise.
fn category_seed(category: &str, seed: u64) -> u64 {
    category
        .bytes()
        .fold(seed, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)))
}

/// Synthesize a placeholder base image for a category.
#[must_use]
pub fn synthesize(category: &str, size: (u32, u32), seed: u64) -> RgbImage {
    let (w, h) = (size.0.max(1), size.1.max(1));
    let (top, bottom) = palette(category);

    let mut img = RgbImage::new(w, h);
    for (_, y, px) in img.enumerate_pixels_mut() {
        #[allow(clippy::cast_precision_loss)]
        let t = y as f32 / h as f32;
        *px = Rgb([
            lerp(top[0], bottom[0], t),
            lerp(top[1], bottom[1], t),
            lerp(top[2], bottom[2], t),
        ]);
    }

    let mut rng = StdRng::seed_from_u64(category_seed(category, seed));
    for px in img.pixels_mut() {
        for ch in &mut px.0 {
            let noise = rng.gen_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let v = (i16::from(*ch) + noise).clamp(0, 255) as u8;
            *ch = v;
        }
    }

    let label = category.to_uppercase();
    #[allow(clippy::cast_precision_loss)]
    let label_px = ((w.min(h) / 15).max(10)) as f32;
    let shadow = text::render_label(&label, label_px, Rgba([0, 0, 0, 128]));
    let main = text::render_label(&label, label_px, Rgba([255, 255, 255, 200]));

    let mut overlay = RgbaImage::new(w, h);
    let (x, y) = placement::anchor_position(Anchor::Center, (w, h), main.dimensions());
    compositor::paste_over(
        &mut overlay,
        &shadow,
        x + LABEL_SHADOW_OFFSET,
        y + LABEL_SHADOW_OFFSET,
    );
    compositor::paste_over(&mut overlay, &main, x, y);

    compositor::flatten(&img, &overlay)
}

/// Linear interpolation between two channel values.
fn lerp(a: u8, b: u8, t: f32) -> u8 {
    let v = f32::from(a) * (1.0 - t) + f32::from(b) * t;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let byte = v.round().clamp(0.0, 255.0) as u8;
    byte
}
