//! Watermark style descriptors and the builtin preset table.
//!
//! A [`WatermarkStyle`] is an immutable description of one watermark
//! treatment; the compositor consumes it without modifying it. The builtin
//! presets mirror the treatments used on the landing page: opacities and
//! spacings are empirically chosen for visual plausibility and are tunable
//! defaults, not contracts.

use crate::placement::Anchor;

/// Placement mode for repeating pattern watermarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMode {
    /// Axis-aligned grid of upright labels.
    Grid,
    /// Grid of labels rotated 45 degrees.
    Diagonal,
}

/// An immutable descriptor of a single watermark treatment.
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkStyle {
    /// A label rendered once at an anchor position.
    Text {
        /// Watermark label.
        label: String,
        /// Overlay opacity in `[0, 1]`.
        opacity: f32,
        /// Where the label is placed.
        anchor: Anchor,
        /// Draw an offset dark duplicate beneath the label for contrast.
        shadow: bool,
    },
    /// A label tiled across the whole canvas.
    Pattern {
        /// Watermark label.
        label: String,
        /// Overlay opacity in `[0, 1]`.
        opacity: f32,
        /// Step between tile origins, in pixels.
        spacing: u32,
        /// Upright grid or 45-degree diagonal tiles.
        mode: PatternMode,
    },
    /// A small geometric mark with glyph initials.
    Logo {
        /// Initials rendered inside the mark.
        initials: String,
        /// Overlay opacity in `[0, 1]`.
        opacity: f32,
        /// Where the mark is placed.
        anchor: Anchor,
    },
    /// A large, blurred, low-opacity label across the center.
    Embedded {
        /// Watermark label.
        label: String,
        /// Overlay opacity in `[0, 1]`.
        opacity: f32,
        /// Gaussian blur sigma applied to the overlay before compositing.
        blur_sigma: f32,
    },
}

impl WatermarkStyle {
    /// The style's opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        match self {
            Self::Text { opacity, .. }
            | Self::Pattern { opacity, .. }
            | Self::Logo { opacity, .. }
            | Self::Embedded { opacity, .. } => *opacity,
        }
    }
}

/// Convert an opacity in `[0, 1]` to a final alpha byte.
#[must_use]
pub fn alpha_byte(opacity: f32) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let byte = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    byte
}

/// A named watermark style used by the batch driver.
#[derive(Debug, Clone)]
pub struct StylePreset {
    /// Style tag used in output filenames and metadata.
    pub tag: &'static str,
    /// The style descriptor.
    pub style: WatermarkStyle,
}

/// The builtin preset table: one entry per watermark treatment shown on
/// the landing page.
#[must_use]
pub fn builtin_presets() -> Vec<StylePreset> {
    vec![
        StylePreset {
            tag: "text_center",
            style: WatermarkStyle::Text {
                label: "SAMPLE".to_string(),
                opacity: 0.5,
                anchor: Anchor::Center,
                shadow: true,
            },
        },
        StylePreset {
            tag: "text_corner",
            style: WatermarkStyle::Text {
                label: "© DEMO 2024".to_string(),
                opacity: 0.7,
                anchor: Anchor::BottomRight,
                shadow: true,
            },
        },
        StylePreset {
            tag: "pattern_diagonal",
            style: WatermarkStyle::Pattern {
                label: "WATERMARK".to_string(),
                opacity: 0.3,
                spacing: 150,
                mode: PatternMode::Diagonal,
            },
        },
        StylePreset {
            tag: "pattern_grid",
            style: WatermarkStyle::Pattern {
                label: "DEMO".to_string(),
                opacity: 0.25,
                spacing: 150,
                mode: PatternMode::Grid,
            },
        },
        StylePreset {
            tag: "logo",
            style: WatermarkStyle::Logo {
                initials: "WM".to_string(),
                opacity: 0.4,
                anchor: Anchor::BottomRight,
            },
        },
        StylePreset {
            tag: "embedded",
            style: WatermarkStyle::Embedded {
                label: "PROTECTED".to_string(),
                opacity: 0.15,
                blur_sigma: 3.0,
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_byte_rounds_and_clamps() {
        assert_eq!(alpha_byte(0.0), 0);
        assert_eq!(alpha_byte(1.0), 255);
        assert_eq!(alpha_byte(0.5), 128);
        assert_eq!(alpha_byte(-0.3), 0);
        assert_eq!(alpha_byte(2.0), 255);
    }

    #[test]
    fn builtin_presets_have_unique_tags() {
        let presets = builtin_presets();
        assert_eq!(presets.len(), 6);
        for (i, a) in presets.iter().enumerate() {
            for b in &presets[i + 1..] {
                assert_ne!(a.tag, b.tag);
            }
        }
    }

    #[test]
    fn builtin_opacities_are_normalized() {
        for preset in builtin_presets() {
            let o = preset.style.opacity();
            assert!((0.0..=1.0).contains(&o), "{}: {o}", preset.tag);
        }
    }
}
