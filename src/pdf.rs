//! PDF ingestion adapter (`spec.md` §6, orchestrating C1/C4/C5/C6).
//!
//! Wraps two collaborators: [`pdfplumber`] for glyph-level text geometry
//! (`Page::chars()`) and `pdfium-render` for whole-page rasterization, the
//! same split the original system makes by layering `pdfplumber` (text) on
//! top of its own `pdfium`-backed `.to_image()` (raster). Every page is
//! rendered to an owned [`image::RgbImage`] once, up front — this keeps the
//! rasters available for both the image collector and the screenshot
//! cropper without holding a `pdfium` page handle open across the whole
//! pipeline (Design Note 9.4).

use image::RgbImage;
use pdfium_render::prelude::{PdfRenderConfig, Pdfium};

use crate::assets::AssetStore;
use crate::attach::{attach_images_to_questions, promote_option_images};
use crate::config::Config;
use crate::error::ExtractError;
use crate::images::collect_page_images;
use crate::lines::{reconstruct_lines, Glyph};
use crate::model::{ImageRegion, PageFrame, QuestionRecord};
use crate::parser::parse_lines;
use crate::screenshot::crop_question_screenshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterKind {
    Embedded,
    VectorFigure,
}

pub struct PageRaster {
    pub kind: RasterKind,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
    pub png_bytes: Vec<u8>,
}

/// An eagerly-rendered page, in pixels at `render_dpi`, paired with its
/// size in PDF points for the points-to-pixels conversion.
pub struct PageCanvas {
    image: RgbImage,
    width_pts: f64,
    height_pts: f64,
}

impl PageCanvas {
    fn points_to_pixels(&self, pts: f64, dpi: u32) -> u32 {
        (pts * dpi as f64 / 72.0).round().max(0.0) as u32
    }

    /// Crop a horizontal strip spanning the full page width, `[local_start,
    /// local_end)` in PDF points.
    pub fn crop_rows(&self, local_start: f64, local_end: f64, dpi: u32) -> Option<RgbImage> {
        self.crop_box(0.0, local_start, self.width_pts, local_end, dpi)
    }

    /// Crop an arbitrary box given in PDF points.
    pub fn crop_box(&self, x0: f64, top: f64, x1: f64, bottom: f64, dpi: u32) -> Option<RgbImage> {
        let px_x0 = self.points_to_pixels(x0.max(0.0), dpi);
        let px_y0 = self.points_to_pixels(top.max(0.0), dpi);
        let px_x1 = self.points_to_pixels(x1.min(self.width_pts), dpi);
        let px_y1 = self.points_to_pixels(bottom.min(self.height_pts), dpi);
        if px_x1 <= px_x0 || px_y1 <= px_y0 {
            return None;
        }
        let w = px_x1.saturating_sub(px_x0).min(self.image.width().saturating_sub(px_x0));
        let h = px_y1.saturating_sub(px_y0).min(self.image.height().saturating_sub(px_y0));
        if w == 0 || h == 0 {
            return None;
        }
        Some(image::imageops::crop_imm(&self.image, px_x0, px_y0, w, h).to_image())
    }
}

/// Output of one full extraction run.
pub struct ExtractionOutput {
    pub records: Vec<QuestionRecord>,
}

/// Raw glyph/geometry facts pulled from one `pdfplumber` page, kept
/// page-local until the caller offsets them into global Y space.
struct PageGeometry {
    glyphs: Vec<Glyph>,
    rasters: Vec<PageRaster>,
    height_pts: f64,
}

/// Run the full pipeline over one PDF's bytes: text reconstruction,
/// question parsing, image attachment, and screenshot cropping.
pub fn extract(
    bytes: &[u8],
    config: &Config,
    assets: &mut dyn AssetStore,
) -> Result<ExtractionOutput, ExtractError> {
    let pdfium = Pdfium::new(
        Pdfium::bind_to_system_library().map_err(|e| ExtractError::IngestRead(e.to_string()))?,
    );
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| ExtractError::IngestRead(e.to_string()))?;

    let text_doc = pdfplumber::Pdf::open(bytes, None)
        .map_err(|e| ExtractError::IngestRead(e.to_string()))?;

    let page_count = document.pages().len() as usize;

    let mut canvases: Vec<PageCanvas> = Vec::with_capacity(page_count);
    let mut geometries: Vec<PageGeometry> = Vec::with_capacity(page_count);

    for page_num in 0..page_count {
        let pdfium_page = document
            .pages()
            .get(page_num as u16)
            .map_err(|e| ExtractError::IngestRead(e.to_string()))?;
        let width_pts = pdfium_page.width().value as f64;
        let height_pts = pdfium_page.height().value as f64;

        let render_config = PdfRenderConfig::new()
            .set_target_width((width_pts * config.render_dpi as f64 / 72.0).round() as i32);
        let rendered = pdfium_page
            .render_with_config(&render_config)
            .map(|bitmap| bitmap.as_image().to_rgb8());

        let image = match rendered {
            Ok(img) => img,
            Err(err) => {
                log::warn!("could not render page {}: {err}", page_num + 1);
                RgbImage::new(1, 1)
            }
        };
        canvases.push(PageCanvas {
            image,
            width_pts,
            height_pts,
        });

        let text_page = text_doc
            .page(page_num)
            .map_err(|e| ExtractError::IngestRead(e.to_string()))?;
        let glyphs: Vec<Glyph> = text_page
            .chars()
            .iter()
            .map(|c| Glyph {
                text: c.text.to_string(),
                x0: c.bbox.x0 as f64,
                x1: c.bbox.x1 as f64,
                top: c.bbox.top as f64,
                bottom: c.bbox.bottom as f64,
                size: c.size as f64,
            })
            .collect();

        let mut rasters = Vec::new();
        for img_meta in text_page.images() {
            let (top, bottom) = (img_meta.top as f64, img_meta.bottom as f64);
            rasters.push(PageRaster {
                kind: RasterKind::Embedded,
                x0: img_meta.x0 as f64,
                x1: img_meta.x1 as f64,
                top: top.min(bottom),
                bottom: top.max(bottom),
                png_bytes: Vec::new(),
            });
        }
        for fig in text_page.figures() {
            rasters.push(PageRaster {
                kind: RasterKind::VectorFigure,
                x0: fig.x0 as f64,
                x1: fig.x1 as f64,
                top: fig.top as f64,
                bottom: fig.bottom as f64,
                png_bytes: Vec::new(),
            });
        }

        geometries.push(PageGeometry {
            glyphs,
            rasters,
            height_pts,
        });
    }

    let mut all_lines = Vec::new();
    let mut all_images: Vec<ImageRegion> = Vec::new();
    let mut pages = Vec::with_capacity(page_count);
    let mut y_offset = 0.0;

    for (page_num, geometry) in geometries.into_iter().enumerate() {
        let mut lines = reconstruct_lines(&geometry.glyphs, config);
        for l in &mut lines {
            l.top += y_offset;
            l.bottom += y_offset;
        }
        all_lines.extend(lines);

        let canvas = &canvases[page_num];
        let rendered_rasters: Vec<PageRaster> = geometry
            .rasters
            .into_iter()
            .map(|mut r| {
                if let Some(cropped) = canvas.crop_box(r.x0, r.top, r.x1, r.bottom, config.render_dpi)
                {
                    r.png_bytes = encode_png(&cropped);
                }
                r
            })
            .filter(|r| !r.png_bytes.is_empty())
            .collect();

        let mut images = collect_page_images(page_num + 1, &rendered_rasters, assets, config);
        for img in &mut images {
            img.top += y_offset;
            img.bottom += y_offset;
        }
        all_images.extend(images);

        pages.push(PageFrame {
            page_num: page_num + 1,
            y_offset,
            height: geometry.height_pts,
        });
        y_offset += geometry.height_pts + config.page_gap;
    }

    let mut questions = parse_lines(&all_lines, config);
    if questions.is_empty() {
        return Err(ExtractError::NoQuestions);
    }

    attach_images_to_questions(&mut questions, &all_images, config);

    let coords: std::collections::HashMap<String, (f64, f64)> = all_images
        .iter()
        .map(|img| (img.path.clone(), (img.top, img.bottom)))
        .collect();
    promote_option_images(&mut questions, &|path| coords.get(path).copied(), config);

    let canvas_lookup = |page_num: usize| canvases.get(page_num - 1);
    let clamped_ends: Vec<f64> = (0..questions.len())
        .map(|idx| match questions.get(idx + 1) {
            Some(next) => questions[idx].y_end.min(next.y_start),
            None => questions[idx].y_end,
        })
        .collect();
    for (idx, q) in questions.iter_mut().enumerate() {
        q.question_image = crop_question_screenshot(
            &pages,
            &canvas_lookup,
            q.y_start,
            clamped_ends[idx],
            idx + 1,
            assets,
            config,
        );
    }

    Ok(ExtractionOutput {
        records: questions.into_iter().map(|q| q.into_record()).collect(),
    })
}

fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut bytes);
    let dynamic = image::DynamicImage::from(image.clone());
    match dynamic.write_to(&mut cursor, image::ImageFormat::Png) {
        Ok(()) => bytes,
        Err(_) => Vec::new(),
    }
}
