//! Synthetic before/after demo pairs for watermark-removal showcases.
//!
//! This crate produces matched image pairs — a clean base image and the
//! same image with a synthetic watermark composited on top — across a
//! fixed set of content categories and watermark styles. Base images come
//! from the Unsplash API when an access key is configured and a gradient
//! placeholder synthesizer otherwise, so a batch always completes offline.
//!
//! # Quick Start
//!
//! Watermark a single image in memory:
//!
//! ```no_run
//! use image::RgbImage;
//! use watermark_demo_gen::{apply, Anchor, WatermarkStyle};
//!
//! let base = image::open("photo.jpg").unwrap().to_rgb8();
//! let style = WatermarkStyle::Text {
//!     label: "SAMPLE".to_string(),
//!     opacity: 0.5,
//!     anchor: Anchor::Center,
//!     shadow: true,
//! };
//! let marked: RgbImage = apply(&base, &style);
//! marked.save("photo_marked.jpg").unwrap();
//! ```
//!
//! Generate the full demo set:
//!
//! ```no_run
//! use watermark_demo_gen::{run, GenerateConfig};
//!
//! let config = GenerateConfig {
//!     offline: true,
//!     ..GenerateConfig::default()
//! };
//! let summary = run(&config).unwrap();
//! println!("{} pairs written", summary.pairs_written());
//! ```

#![deny(missing_docs)]

pub mod compositor;
pub mod error;
pub mod fetch;
pub mod generator;
pub mod placeholder;
pub mod placement;
pub mod style;
pub mod text;

pub use compositor::apply;
pub use error::{Error, Result};
pub use fetch::acquire_base;
pub use generator::{
    run, GenerateConfig, OutputFormat, PairOutcome, PairRecord, RunSummary, CATEGORIES,
};
pub use placeholder::synthesize;
pub use placement::Anchor;
pub use style::{builtin_presets, PatternMode, StylePreset, WatermarkStyle};
