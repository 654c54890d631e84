//! Question screenshot cropper (`spec.md` §4.6, component C6).
//!
//! Crops each question's vertical span out of the page raster(s) it spans,
//! stitching per-page slices into one PNG. Degrades gracefully to `None`
//! when no page contributes a slice or encoding fails — a missing
//! screenshot is never fatal to extraction.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::assets::AssetStore;
use crate::config::Config;
use crate::model::PageFrame;
use crate::pdf::PageCanvas;

/// Crop and stitch one question's screenshot, returning the asset URL.
pub fn crop_question_screenshot<'a>(
    pages: &[PageFrame],
    canvases: &dyn Fn(usize) -> Option<&'a PageCanvas>,
    y_start_global: f64,
    y_end_global: f64,
    question_index: usize,
    assets: &mut dyn AssetStore,
    config: &Config,
) -> Option<String> {
    let mut slices: Vec<RgbImage> = Vec::new();

    for pf in pages {
        let page_global_start = pf.y_offset;
        let page_global_end = pf.y_offset + pf.height;

        let overlap_start = (y_start_global - config.screenshot_pad_top).max(page_global_start);
        let overlap_end = y_end_global.min(page_global_end);
        if overlap_end <= overlap_start {
            continue;
        }

        let local_start = (overlap_start - page_global_start).max(0.0);
        let local_end = (overlap_end - page_global_start).min(pf.height);
        if local_end <= local_start {
            continue;
        }

        let Some(canvas) = canvases(pf.page_num) else {
            continue;
        };
        if let Some(slice) = canvas.crop_rows(local_start, local_end, config.render_dpi) {
            slices.push(slice);
        } else {
            log::warn!(
                "crop failed for question {question_index} on page {}",
                pf.page_num
            );
        }
    }

    let stitched = stitch_vertically(slices)?;

    let mut png_bytes = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut png_bytes);
    let dynamic = image::DynamicImage::from(stitched);
    if let Err(err) = dynamic.write_to(&mut cursor, image::ImageFormat::Png) {
        log::warn!("encode failed for question {question_index}: {err}");
        return None;
    }

    match assets.save_png(&png_bytes, &format!("qshot{question_index}")) {
        Ok(url) => Some(url),
        Err(err) => {
            log::warn!("save failed for question {question_index}: {err}");
            None
        }
    }
}

fn stitch_vertically(slices: Vec<RgbImage>) -> Option<RgbImage> {
    if slices.is_empty() {
        return None;
    }
    if slices.len() == 1 {
        return slices.into_iter().next();
    }

    let total_h: u32 = slices.iter().map(|s| s.height()).sum();
    let max_w: u32 = slices.iter().map(|s| s.width()).max().unwrap_or(0);
    let mut canvas: RgbImage = ImageBuffer::from_pixel(max_w, total_h, Rgb([255, 255, 255]));

    let mut y_cur = 0u32;
    for slice in &slices {
        image::imageops::overlay(&mut canvas, slice, 0, y_cur as i64);
        y_cur += slice.height();
    }
    Some(canvas)
}
