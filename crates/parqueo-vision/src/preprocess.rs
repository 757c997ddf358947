//! Candidate buffer derivation from one raw photo
//!
//! Crops of the expected plate band carry less background noise than the
//! full frame, so they come first in the candidate order. The full frame is
//! always produced as the guaranteed fallback.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};

use parqueo_types::Result;

/// Buffers are downscaled to this width before OCR; never upscaled.
pub const MAX_WIDTH: u32 = 1200;

/// Fixed binarization threshold, matched to DVR plate contrast.
pub const BINARIZE_THRESHOLD: u8 = 180;

/// Fractional bounding box of the source frame.
#[derive(Debug, Clone, Copy)]
pub struct CropRegion {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Three tuned regions covering the expected plate band for a rear/side
/// mounted DVR camera.
pub const PLATE_BAND_CROPS: [CropRegion; 3] = [
    CropRegion { left: 0.20, top: 0.55, width: 0.60, height: 0.25 },
    CropRegion { left: 0.15, top: 0.45, width: 0.70, height: 0.30 },
    CropRegion { left: 0.10, top: 0.65, width: 0.80, height: 0.25 },
];

/// One normalized candidate buffer, PNG-encoded for the OCR engine.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub label: String,
    pub png: Vec<u8>,
}

/// Derive the ordered candidate buffers from raw encoded photo bytes:
/// plate-band crops first, full frame last. A crop that cannot be computed
/// is skipped; the full frame always survives.
pub fn candidate_buffers(raw: &[u8]) -> Result<Vec<Candidate>> {
    let source = image::load_from_memory(raw)?;
    let mut candidates = Vec::with_capacity(PLATE_BAND_CROPS.len() + 1);

    for (i, region) in PLATE_BAND_CROPS.iter().enumerate() {
        let label = format!("crop{}", i + 1);
        match crop_frame(&source, region) {
            Some(cropped) => match normalize_buffer(cropped) {
                Ok(png) => candidates.push(Candidate { label, png }),
                Err(err) => log::warn!("could not preprocess {}: {}", label, err),
            },
            None => log::warn!("skipping degenerate crop region {}", i + 1),
        }
    }

    candidates.push(Candidate {
        label: "full".to_string(),
        png: normalize_buffer(source)?,
    });

    Ok(candidates)
}

fn crop_frame(source: &DynamicImage, region: &CropRegion) -> Option<DynamicImage> {
    let (w, h) = (source.width(), source.height());
    let left = (w as f32 * region.left).floor() as u32;
    let top = (h as f32 * region.top).floor() as u32;
    let width = (w as f32 * region.width).floor() as u32;
    let height = (h as f32 * region.height).floor() as u32;

    if width == 0 || height == 0 || left + width > w || top + height > h {
        return None;
    }
    Some(source.crop_imm(left, top, width, height))
}

/// Resize (max width, no upscale) → grayscale → contrast stretch →
/// fixed-threshold binarize → PNG.
fn normalize_buffer(mut img: DynamicImage) -> Result<Vec<u8>> {
    if img.width() > MAX_WIDTH {
        img = img.resize(MAX_WIDTH, u32::MAX, FilterType::Lanczos3);
    }
    let mut gray = img.to_luma8();
    stretch_contrast(&mut gray);
    binarize(&mut gray);

    let mut out = Vec::new();
    DynamicImage::ImageLuma8(gray).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

/// Min/max contrast normalization over the whole buffer.
fn stretch_contrast(gray: &mut GrayImage) {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in gray.pixels() {
        min = min.min(pixel.0[0]);
        max = max.max(pixel.0[0]);
    }
    if max <= min {
        return;
    }
    let range = (max - min) as u16;
    for pixel in gray.pixels_mut() {
        let value = (pixel.0[0] - min) as u16;
        pixel.0[0] = (value * 255 / range) as u8;
    }
}

fn binarize(gray: &mut GrayImage) {
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] >= BINARIZE_THRESHOLD { 255 } else { 0 };
    }
}
