//! Cover image pipeline: decode, shrink, re-encode as JPEG, store atomically.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use uuid::Uuid;

use crate::error::{ReelnoteError, Result};

pub const DEFAULT_MAX_WIDTH: u32 = 1000;
pub const JPEG_QUALITY: u8 = 85;

/// Target size for an image of `width`x`height` capped at `max_width`,
/// keeping the aspect ratio. Images that already fit are left alone.
pub fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if max_width == 0 || width <= max_width {
        return (width, height);
    }
    let scaled = (u64::from(height) * u64::from(max_width)) / u64::from(width.max(1));
    (max_width, (scaled as u32).max(1))
}

pub fn shrink_to_width(image: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    let (target_w, target_h) = fit_width(width, height, max_width);
    if (target_w, target_h) == (width, height) {
        image
    } else {
        image.resize_exact(target_w, target_h, FilterType::Lanczos3)
    }
}

pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;
    Ok(out.into_inner())
}

/// Decodes `bytes`, shrinks and writes a JPEG to `dest`, creating parent
/// directories as needed.
pub fn store_cover(bytes: &[u8], dest: &Path, max_width: u32) -> Result<()> {
    let decoded = image::load_from_memory(bytes)?;
    let resized = shrink_to_width(decoded, max_width);
    let encoded = encode_jpeg(&resized)?;
    write_atomic(dest, &encoded)
}

fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path_for(dest);
    fs::write(&tmp, bytes)?;
    if let Err(err) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(ReelnoteError::Io(err));
    }
    Ok(())
}

fn tmp_path_for(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cover".to_string());
    dest.with_file_name(format!(".{}-{}.tmp", name, Uuid::new_v4()))
}
