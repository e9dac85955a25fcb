//! Batch driver: one clean image and one watermarked image per
//! (category, style preset) pair, plus a JSON metadata sidecar.
//!
//! A failed pair is logged with its category and style tag and skipped;
//! the batch always runs to completion. There are no per-pair retries.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbImage};
use serde::Serialize;
use tracing::{info, warn};

use crate::compositor;
use crate::error::{Error, Result};
use crate::fetch;
use crate::style::{builtin_presets, StylePreset};

/// Categories generated in a full run.
pub const CATEGORIES: [&str; 6] = [
    "nature landscape",
    "architecture building",
    "product photography",
    "portrait photography",
    "abstract art",
    "food photography",
];

/// Filename of the JSON sidecar written next to the images.
pub const METADATA_FILENAME: &str = "metadata.json";

const JPEG_QUALITY: u8 = 95;

/// Encoding used for generated image files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JPEG at quality 95.
    Jpeg,
    /// Lossless WebP.
    Webp,
}

impl OutputFormat {
    /// File extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Configuration for a generation run.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Directory receiving image files and the metadata sidecar.
    /// Created on demand.
    pub output_dir: PathBuf,
    /// Encoding for generated files.
    pub format: OutputFormat,
    /// Dimensions of every generated image.
    pub size: (u32, u32),
    /// Seed for placeholder synthesis.
    pub seed: u64,
    /// Skip remote fetch and always synthesize base images.
    pub offline: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("demo/generated"),
            format: OutputFormat::Jpeg,
            size: (800, 600),
            seed: 42,
            offline: false,
        }
    }
}

/// One entry of the metadata sidecar.
#[derive(Debug, Clone, Serialize)]
pub struct PairRecord {
    /// Category label.
    pub category: String,
    /// Style tag.
    #[serde(rename = "type")]
    pub style: String,
    /// Watermarked output filename.
    pub watermarked: String,
    /// Clean output filename.
    pub clean: String,
}

#[derive(Serialize)]
struct Metadata<'a> {
    generated_files: &'a [PairRecord],
    watermark_types: Vec<&'static str>,
    categories: Vec<&'static str>,
}

/// Result of writing a single output file.
#[derive(Debug)]
pub struct PairOutcome {
    /// Category label.
    pub category: String,
    /// Style tag, or `"clean"` for the unwatermarked output.
    pub tag: String,
    /// Path that was (or would have been) written.
    pub file: PathBuf,
    /// Whether the file was written.
    pub success: bool,
    /// Failure description, empty on success.
    pub message: String,
}

/// Summary of a full generation run.
#[derive(Debug)]
pub struct RunSummary {
    /// Per-file outcomes in generation order.
    pub outcomes: Vec<PairOutcome>,
    /// Metadata entries for every successfully written pair.
    pub records: Vec<PairRecord>,
    /// Path of the metadata sidecar.
    pub metadata_path: PathBuf,
}

impl RunSummary {
    /// Number of watermarked pairs written.
    #[must_use]
    pub fn pairs_written(&self) -> usize {
        self.records.len()
    }

    /// Number of failed outputs.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }
}

/// Filename-safe form of a category label.
#[must_use]
pub fn slug(category: &str) -> String {
    category
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Save an RGB image with format-specific settings.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for extensions outside
/// jpg/jpeg/png/webp, or an encode/I/O error from the underlying writer.
pub fn save_image(img: &RgbImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    let dyn_img = DynamicImage::ImageRgb8(img.clone());

    match format {
        ImageFormat::Jpeg => {
            let file = File::create(path)?;
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(file, JPEG_QUALITY);
            encoder.encode_image(&dyn_img)?;
        }
        ImageFormat::Png | ImageFormat::WebP => {
            dyn_img.save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Generate every pair for one category.
///
/// The base image is acquired once; a clean copy is written first, then one
/// watermarked file per preset. A failed clean write skips the whole
/// category; failed watermarked writes skip only that pair.
fn generate_category(
    config: &GenerateConfig,
    category: &str,
    presets: &[StylePreset],
) -> (Vec<PairOutcome>, Vec<PairRecord>) {
    let mut outcomes = Vec::new();
    let mut records = Vec::new();

    let base = fetch::acquire_base(category, config.size, config.seed, config.offline);
    let ext = config.format.extension();
    let clean_name = format!("{}_clean.{ext}", slug(category));
    let clean_path = config.output_dir.join(&clean_name);

    match save_image(&base, &clean_path) {
        Ok(()) => outcomes.push(PairOutcome {
            category: category.to_string(),
            tag: "clean".to_string(),
            file: clean_path,
            success: true,
            message: String::new(),
        }),
        Err(e) => {
            warn!("{category}/clean failed: {e}");
            outcomes.push(PairOutcome {
                category: category.to_string(),
                tag: "clean".to_string(),
                file: clean_path,
                success: false,
                message: e.to_string(),
            });
            return (outcomes, records);
        }
    }

    for preset in presets {
        let watermarked_name = format!("{}_{}.{ext}", slug(category), preset.tag);
        let watermarked_path = config.output_dir.join(&watermarked_name);

        let watermarked = compositor::apply(&base, &preset.style);
        match save_image(&watermarked, &watermarked_path) {
            Ok(()) => {
                outcomes.push(PairOutcome {
                    category: category.to_string(),
                    tag: preset.tag.to_string(),
                    file: watermarked_path,
                    success: true,
                    message: String::new(),
                });
                records.push(PairRecord {
                    category: category.to_string(),
                    style: preset.tag.to_string(),
                    watermarked: watermarked_name,
                    clean: clean_name.clone(),
                });
            }
            Err(e) => {
                warn!("{category}/{} failed: {e}", preset.tag);
                outcomes.push(PairOutcome {
                    category: category.to_string(),
                    tag: preset.tag.to_string(),
                    file: watermarked_path,
                    success: false,
                    message: e.to_string(),
                });
            }
        }
    }

    (outcomes, records)
}

/// Run the full generation batch.
///
/// Writes one clean file per category, one watermarked file per
/// (category, preset) pair, and the metadata sidecar. Individual pair
/// failures are recorded in the summary; only output-directory creation
/// and metadata writing can fail the run as a whole.
///
/// # Errors
///
/// Returns an error if the output directory cannot be created or the
/// metadata sidecar cannot be written.
pub fn run(config: &GenerateConfig) -> Result<RunSummary> {
    fs::create_dir_all(&config.output_dir)?;
    let presets = builtin_presets();

    #[cfg(feature = "cli")]
    let per_category: Vec<_> = {
        use rayon::prelude::*;
        CATEGORIES
            .par_iter()
            .map(|category| generate_category(config, category, &presets))
            .collect()
    };

    #[cfg(not(feature = "cli"))]
    let per_category: Vec<_> = CATEGORIES
        .iter()
        .map(|category| generate_category(config, category, &presets))
        .collect();

    let mut outcomes = Vec::new();
    let mut records = Vec::new();
    for (o, r) in per_category {
        outcomes.extend(o);
        records.extend(r);
    }

    let metadata_path = config.output_dir.join(METADATA_FILENAME);
    let metadata = Metadata {
        generated_files: &records,
        watermark_types: presets.iter().map(|p| p.tag).collect(),
        categories: CATEGORIES.to_vec(),
    };
    let file = File::create(&metadata_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &metadata)?;

    info!(
        "generated {} pairs into {}",
        records.len(),
        config.output_dir.display()
    );

    Ok(RunSummary {
        outcomes,
        records,
        metadata_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn slug_replaces_whitespace() {
        assert_eq!(slug("nature landscape"), "nature_landscape");
        assert_eq!(slug("Food  Photography"), "food_photography");
    }

    #[test]
    fn output_format_parses_known_names() {
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn save_image_rejects_unknown_extension() {
        let img = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(&img, &dir.path().join("x.xyz")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn save_image_jpeg_roundtrips_dimensions() {
        let img = RgbImage::from_pixel(32, 24, Rgb([200, 100, 50]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.jpg");
        save_image(&img, &path).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (32, 24));
    }

    #[test]
    fn save_image_webp_roundtrips_dimensions() {
        let img = RgbImage::from_pixel(32, 24, Rgb([10, 20, 30]));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.webp");
        save_image(&img, &path).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (32, 24));
    }

    #[test]
    fn default_config_matches_landing_page_output() {
        let config = GenerateConfig::default();
        assert_eq!(config.size, (800, 600));
        assert_eq!(config.format, OutputFormat::Jpeg);
        assert_eq!(config.output_dir, PathBuf::from("demo/generated"));
    }
}
