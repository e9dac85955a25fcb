//! Best-effort remote base-image acquisition.
//!
//! When an API credential is present, a base photo is fetched from the
//! Unsplash random-photo endpoint with a blocking client and fitted to the
//! target size. Any failure along the way (missing key, network, status,
//! decode) is logged and falls back to a synthesized placeholder; a fetch
//! problem is never fatal to the run. No retries, no backoff.

use std::time::Duration;

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::placeholder;

/// Environment variable holding the Unsplash API credential.
pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

const RANDOM_PHOTO_URL: &str = "https://api.unsplash.com/photos/random";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch a base photo for a category and fit it to `size`.
///
/// # Errors
///
/// Returns [`Error::Fetch`] for any network, status, or decode failure.
/// Callers are expected to fall back to [`placeholder::synthesize`].
pub fn fetch_remote(category: &str, size: (u32, u32), access_key: &str) -> Result<RgbImage> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| Error::Fetch(e.to_string()))?;

    let meta: Value = client
        .get(RANDOM_PHOTO_URL)
        .query(&[
            ("query", category),
            ("orientation", "landscape"),
            ("client_id", access_key),
        ])
        .send()
        .map_err(|e| Error::Fetch(e.to_string()))?
        .error_for_status()
        .map_err(|e| Error::Fetch(e.to_string()))?
        .json()
        .map_err(|e| Error::Fetch(format!("metadata decode: {e}")))?;

    let url = meta
        .pointer("/urls/regular")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Fetch("response missing urls.regular".to_string()))?;

    let bytes = client
        .get(url)
        .send()
        .map_err(|e| Error::Fetch(e.to_string()))?
        .error_for_status()
        .map_err(|e| Error::Fetch(e.to_string()))?
        .bytes()
        .map_err(|e| Error::Fetch(e.to_string()))?;

    let img =
        image::load_from_memory(&bytes).map_err(|e| Error::Fetch(format!("image decode: {e}")))?;
    Ok(fit_to(&img, size))
}

/// Center-crop to the target aspect ratio, then resize to exact size.
#[must_use]
pub fn fit_to(img: &DynamicImage, size: (u32, u32)) -> RgbImage {
    let (tw, th) = (size.0.max(1), size.1.max(1));
    let (w, h) = (img.width().max(1), img.height().max(1));

    let cropped = if u64::from(w) * u64::from(th) > u64::from(h) * u64::from(tw) {
        // Source is wider than the target: trim the sides.
        let new_w = ((u64::from(h) * u64::from(tw) / u64::from(th)) as u32).max(1);
        img.crop_imm((w - new_w) / 2, 0, new_w, h)
    } else {
        let new_h = ((u64::from(w) * u64::from(th) / u64::from(tw)) as u32).max(1);
        img.crop_imm(0, (h - new_h) / 2, w, new_h)
    };

    cropped.resize_exact(tw, th, FilterType::Lanczos3).to_rgb8()
}

/// Acquire a base image for a category, never failing.
///
/// Tries the remote API when `offline` is false and the credential
/// environment variable is set; otherwise (or on any fetch error) returns
/// a synthesized placeholder.
#[must_use]
pub fn acquire_base(category: &str, size: (u32, u32), seed: u64, offline: bool) -> RgbImage {
    if offline {
        debug!("offline mode, synthesizing base for {category}");
        return placeholder::synthesize(category, size, seed);
    }

    let Some(key) = std::env::var(ACCESS_KEY_ENV)
        .ok()
        .filter(|k| !k.is_empty())
    else {
        debug!("{ACCESS_KEY_ENV} not set, synthesizing base for {category}");
        return placeholder::synthesize(category, size, seed);
    };

    match fetch_remote(category, size, &key) {
        Ok(img) => img,
        Err(e) => {
            warn!("fetch failed for {category}: {e}; using placeholder");
            placeholder::synthesize(category, size, seed)
        }
    }
}
