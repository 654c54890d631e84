//! Image region collector (`spec.md` §4.4, component C4).
//!
//! Saves embedded raster images and vector-drawn figures as PNG assets via
//! the [`crate::assets::AssetStore`] boundary, skipping anything smaller
//! than `min_image_dim` on either axis and de-duplicating vector figures
//! that cover the same region as an already-saved raster image.

use crate::assets::AssetStore;
use crate::config::Config;
use crate::model::ImageRegion;
use crate::pdf::{PageRaster, RasterKind};

/// Collect every accepted image region on one page, saving each through
/// `assets`. Coordinates stay page-local; the caller offsets them into
/// global Y space.
pub fn collect_page_images(
    page_num: usize,
    rasters: &[PageRaster],
    assets: &mut dyn AssetStore,
    config: &Config,
) -> Vec<ImageRegion> {
    let mut saved: Vec<ImageRegion> = Vec::new();

    for (idx, raster) in rasters
        .iter()
        .filter(|r| r.kind == RasterKind::Embedded)
        .enumerate()
    {
        if let Some(region) = save_raster(page_num, idx, raster, assets, "img", config) {
            saved.push(region);
        }
    }

    for (idx, figure) in rasters
        .iter()
        .filter(|r| r.kind == RasterKind::VectorFigure)
        .enumerate()
    {
        let center_y = (figure.top + figure.bottom) / 2.0;
        let already_covered = saved
            .iter()
            .any(|r| (r.center_y() - center_y).abs() < config.figure_dedup_tol);
        if already_covered {
            continue;
        }
        if let Some(region) = save_raster(page_num, idx, figure, assets, "fig", config) {
            saved.push(region);
        }
    }

    saved
}

fn save_raster(
    page_num: usize,
    idx: usize,
    raster: &PageRaster,
    assets: &mut dyn AssetStore,
    label: &str,
    config: &Config,
) -> Option<ImageRegion> {
    let top = raster.top.min(raster.bottom);
    let bottom = raster.top.max(raster.bottom);
    if raster.x0 >= raster.x1 || top >= bottom {
        return None;
    }
    let width = raster.x1 - raster.x0;
    let height = bottom - top;
    if width < config.min_image_dim || height < config.min_image_dim {
        return None;
    }

    match assets.save_png(&raster.png_bytes, &format!("page{page_num}_{label}{idx}")) {
        Ok(path) => Some(ImageRegion { path, top, bottom }),
        Err(err) => {
            log::warn!("could not save image on page {page_num} idx {idx}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssetStore;

    fn raster(kind: RasterKind, x0: f64, x1: f64, top: f64, bottom: f64) -> PageRaster {
        PageRaster {
            kind,
            x0,
            x1,
            top,
            bottom,
            png_bytes: vec![0u8; 4],
        }
    }

    #[test]
    fn tiny_images_are_skipped() {
        let config = Config::default();
        let mut store = InMemoryAssetStore::default();
        let rasters = vec![raster(RasterKind::Embedded, 0.0, 10.0, 0.0, 10.0)];
        let regions = collect_page_images(1, &rasters, &mut store, &config);
        assert!(regions.is_empty());
    }

    #[test]
    fn vector_figure_deduplicated_against_raster() {
        let config = Config::default();
        let mut store = InMemoryAssetStore::default();
        let rasters = vec![
            raster(RasterKind::Embedded, 0.0, 100.0, 0.0, 100.0),
            raster(RasterKind::VectorFigure, 0.0, 100.0, 5.0, 105.0),
        ];
        let regions = collect_page_images(1, &rasters, &mut store, &config);
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn distinct_vector_figure_is_kept() {
        let config = Config::default();
        let mut store = InMemoryAssetStore::default();
        let rasters = vec![
            raster(RasterKind::Embedded, 0.0, 100.0, 0.0, 100.0),
            raster(RasterKind::VectorFigure, 0.0, 100.0, 400.0, 500.0),
        ];
        let regions = collect_page_images(1, &rasters, &mut store, &config);
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn figure_dedup_tolerance_is_configurable() {
        let mut config = Config::default();
        config.figure_dedup_tol = 200.0;
        let mut store = InMemoryAssetStore::default();
        let rasters = vec![
            raster(RasterKind::Embedded, 0.0, 100.0, 0.0, 100.0),
            raster(RasterKind::VectorFigure, 0.0, 100.0, 150.0, 250.0),
        ];
        let regions = collect_page_images(1, &rasters, &mut store, &config);
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn min_image_dim_is_configurable() {
        let mut config = Config::default();
        config.min_image_dim = 5.0;
        let mut store = InMemoryAssetStore::default();
        let rasters = vec![raster(RasterKind::Embedded, 0.0, 10.0, 0.0, 10.0)];
        let regions = collect_page_images(1, &rasters, &mut store, &config);
        assert_eq!(regions.len(), 1);
    }
}
