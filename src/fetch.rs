//! Image fetching for export embedding.
//!
//! Fetches are the only I/O suspension points in an export. Each export
//! call owns a private [`ImageFetcher`] so memoized bytes never leak across
//! documents; within one export a repeated `src` is fetched once.
//!
//! `data:` URIs are decoded locally with no network round-trip. Everything
//! else goes through a blocking HTTP GET. A failed fetch or an unrecognized
//! format is reported as a recoverable error: exporters substitute an
//! inline placeholder and keep going.

use std::collections::HashMap;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{Error, Result};

/// Image formats the exporters can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Fetched image bytes plus their detected format.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

/// Per-export image fetcher with memoization keyed by `src`.
pub struct ImageFetcher {
    client: reqwest::blocking::Client,
    cache: HashMap<String, FetchedImage>,
}

impl ImageFetcher {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self {
            client,
            cache: HashMap::new(),
        }
    }

    /// Fetch (or return the memoized copy of) the image at `src`.
    pub fn fetch(&mut self, src: &str) -> Result<FetchedImage> {
        if let Some(cached) = self.cache.get(src) {
            return Ok(cached.clone());
        }

        let image = if src.starts_with("data:") {
            decode_data_uri(src)?
        } else {
            self.fetch_http(src)?
        };

        self.cache.insert(src.to_string(), image.clone());
        Ok(image)
    }

    fn fetch_http(&self, src: &str) -> Result<FetchedImage> {
        log::debug!("fetching image {src}");
        let response = self
            .client
            .get(src)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Fetch(format!("{src}: {e}")))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .map_err(|e| Error::Fetch(format!("{src}: {e}")))?
            .to_vec();

        let format = detect_format(content_type.as_deref(), &bytes)
            .ok_or_else(|| Error::UnsupportedImageFormat(src.to_string()))?;

        Ok(FetchedImage { bytes, format })
    }
}

impl Default for ImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_data_uri(uri: &str) -> Result<FetchedImage> {
    let payload = &uri["data:".len()..];
    let (header, data) = payload
        .split_once(',')
        .ok_or_else(|| Error::Fetch(format!("malformed data URI: {}", truncate(uri))))?;

    if !header.contains(";base64") {
        return Err(Error::Fetch(format!(
            "data URI is not base64-encoded: {}",
            truncate(uri)
        )));
    }

    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| Error::Fetch(format!("data URI decode failed: {e}")))?;

    let mime = header.split(';').next().unwrap_or("");
    let format = detect_format(Some(mime), &bytes)
        .ok_or_else(|| Error::UnsupportedImageFormat(truncate(uri).to_string()))?;

    Ok(FetchedImage { bytes, format })
}

/// Decide PNG vs JPEG from the content type, falling back to magic bytes.
fn detect_format(content_type: Option<&str>, bytes: &[u8]) -> Option<ImageFormat> {
    if let Some(ct) = content_type {
        let ct = ct.to_ascii_lowercase();
        if ct.contains("image/png") {
            return Some(ImageFormat::Png);
        }
        if ct.contains("image/jpeg") || ct.contains("image/jpg") {
            return Some(ImageFormat::Jpeg);
        }
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some(ImageFormat::Png);
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }
    None
}

fn truncate(s: &str) -> &str {
    s.get(..64).unwrap_or(s)
}
