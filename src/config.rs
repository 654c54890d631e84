//! Tunable tolerances for the extraction pipeline.
//!
//! These are the constants named throughout `spec.md` §4 (`LINE_Y_TOL`,
//! `INDENT_TOL`, …). They live on a `Config` struct rather than as bare
//! module consts so tests can exercise boundary values without touching
//! global state (Design Note 9.3 — explicit context over singletons).

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Row-grouping tolerance for glyph→line reconstruction, in points.
    pub line_y_tol: f64,
    /// Fraction of glyph size beyond which a gap becomes an inserted space.
    pub space_gap_ratio: f64,
    /// Sub/superscript rows are those with average size below this fraction
    /// of the page's dominant size.
    pub subscript_size_ratio: f64,
    /// Highest numeric value accepted as a question header.
    pub max_question_number: u32,
    /// Minimum width/height (points) for an accepted image region.
    pub min_image_dim: f64,
    /// A vector figure is suppressed when within this many points of an
    /// already-accepted raster region's vertical centre.
    pub figure_dedup_tol: f64,
    /// Y-tolerance (points) for attaching an image region to a question.
    pub image_y_tolerance: f64,
    /// Extra allowance (points) below an option's Y-anchor when testing
    /// whether an image belongs to it.
    pub option_image_slack: f64,
    /// Vertical gap (points) inserted between concatenated pages' Y streams.
    pub page_gap: f64,
    /// Padding (points) above a question's first line when cropping its
    /// screenshot.
    pub screenshot_pad_top: f64,
    /// Render resolution (dots per inch) for cropped image assets.
    pub render_dpi: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_y_tol: 5.0,
            space_gap_ratio: 0.25,
            subscript_size_ratio: 0.80,
            max_question_number: 200,
            min_image_dim: 40.0,
            figure_dedup_tol: 30.0,
            image_y_tolerance: 150.0,
            option_image_slack: 20.0,
            page_gap: 20.0,
            screenshot_pad_top: 6.0,
            render_dpi: 150,
        }
    }
}
