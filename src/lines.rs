//! Glyph→line reconstruction (`spec.md` §4.1, component C1).
//!
//! Groups raw per-glyph coordinates into visual text lines, reinserting
//! spaces from horizontal gaps and folding sub/superscript rows into the
//! baseline line above or below them. Operates purely on in-memory glyph
//! records so it can be exercised without a real PDF (§8 testable
//! properties construct these by hand).

use crate::config::Config;
use crate::model::VisualLine;
use crate::normalize::{digits_to_script, normalize_math_chars};

/// A single glyph as yielded by the PDF page access library (§6): one
/// character with its bounding box and font size.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
    pub size: f64,
}

/// Reconstruct visual lines from a page's raw glyphs. The returned lines are
/// in page-local Y coordinates; callers offset by the page's `y_offset`
/// before feeding them into the parser.
pub fn reconstruct_lines(glyphs: &[Glyph], config: &Config) -> Vec<VisualLine> {
    if glyphs.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&Glyph> = glyphs.iter().collect();
    sorted.sort_by(|a, b| {
        a.top
            .partial_cmp(&b.top)
            .unwrap()
            .then(a.x0.partial_cmp(&b.x0).unwrap())
    });

    let mut rows: Vec<Vec<&Glyph>> = Vec::new();
    let mut current_row: Vec<&Glyph> = vec![sorted[0]];
    let mut current_top = sorted[0].top;
    for g in &sorted[1..] {
        if (g.top - current_top).abs() <= config.line_y_tol {
            current_row.push(g);
        } else {
            rows.push(std::mem::take(&mut current_row));
            current_row = vec![g];
            current_top = g.top;
        }
    }
    rows.push(current_row);

    let dominant_size = dominant_font_size(&rows);

    let mut result: Vec<VisualLine> = Vec::new();
    for row in &rows {
        let mut row_sorted = row.clone();
        row_sorted.sort_by(|a, b| a.x0.partial_cmp(&b.x0).unwrap());

        let mut text = String::new();
        let mut prev_x1: Option<f64> = None;
        for g in &row_sorted {
            if g.text.is_empty() {
                continue;
            }
            let size = if g.size > 0.0 { g.size } else { dominant_size };
            if let Some(px1) = prev_x1 {
                if g.x0 - px1 > size * config.space_gap_ratio {
                    text.push(' ');
                }
            }
            text.push_str(&g.text);
            prev_x1 = Some(prev_x1.unwrap_or(0.0).max(g.x1));
        }
        let text = text.trim().to_string();
        if text.is_empty() {
            continue;
        }
        let text = normalize_math_chars(&text);

        let n = row.len() as f64;
        let avg_top = row.iter().map(|g| g.top).sum::<f64>() / n;
        let avg_bot = row.iter().map(|g| g.bottom).sum::<f64>() / n;
        let min_x0 = row.iter().map(|g| g.x0).fold(f64::INFINITY, f64::min);
        let sizes_row: Vec<f64> = row.iter().map(|g| g.size).filter(|s| *s > 0.0).collect();
        let avg_size = if sizes_row.is_empty() {
            0.0
        } else {
            sizes_row.iter().sum::<f64>() / sizes_row.len() as f64
        };

        let is_sub = avg_size > 0.0 && avg_size < dominant_size * config.subscript_size_ratio;

        if is_sub {
            if let Some(prev) = result.last_mut() {
                let prev_center = (prev.top + prev.bottom) / 2.0;
                let row_center = avg_top + (avg_bot - avg_top) / 2.0;
                let superscript = row_center < prev_center;
                prev.text.push_str(&digits_to_script(&text, superscript));
                prev.bottom = prev.bottom.max(avg_bot);
                continue;
            }
        }

        result.push(VisualLine {
            text,
            top: avg_top,
            bottom: avg_bot,
            x0: min_x0,
        });
    }

    result
}

/// Median of positive glyph sizes across every row, matching
/// `original_source`'s `all_sizes[len(all_sizes)//2]` (upper-middle element
/// for even counts). Defaults to `12.0` when no glyph has a positive size.
fn dominant_font_size(rows: &[Vec<&Glyph>]) -> f64 {
    let mut sizes: Vec<f64> = rows
        .iter()
        .flat_map(|row| row.iter().map(|g| g.size))
        .filter(|s| *s > 0.0)
        .collect();
    if sizes.is_empty() {
        return 12.0;
    }
    sizes.sort_by(|a, b| a.partial_cmp(b).unwrap());
    sizes[sizes.len() / 2]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(text: &str, x0: f64, x1: f64, top: f64, bottom: f64, size: f64) -> Glyph {
        Glyph {
            text: text.to_string(),
            x0,
            x1,
            top,
            bottom,
            size,
        }
    }

    #[test]
    fn inserts_space_on_wide_gap() {
        let config = Config::default();
        let glyphs = vec![
            glyph("H", 0.0, 5.0, 0.0, 10.0, 10.0),
            glyph("i", 5.2, 7.0, 0.0, 10.0, 10.0),
            glyph("W", 20.0, 28.0, 0.0, 10.0, 10.0),
        ];
        let lines = reconstruct_lines(&glyphs, &config);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hi W");
    }

    #[test]
    fn folds_subscript_row_below_baseline() {
        let config = Config::default();
        // Baseline row "m" and "v" at size 10, small row "1" at size 6, placed
        // lower (higher top value) than the baseline's centre.
        let glyphs = vec![
            glyph("m", 0.0, 6.0, 0.0, 10.0, 10.0),
            glyph("v", 6.0, 12.0, 0.0, 10.0, 10.0),
            glyph("1", 12.0, 16.0, 8.0, 14.0, 6.0),
        ];
        let lines = reconstruct_lines(&glyphs, &config);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "mv₁");
    }

    #[test]
    fn folds_superscript_row_above_baseline() {
        let config = Config::default();
        let glyphs = vec![
            glyph("v", 0.0, 6.0, 4.0, 14.0, 10.0),
            glyph("2", 6.0, 10.0, 0.0, 4.0, 6.0),
        ];
        let lines = reconstruct_lines(&glyphs, &config);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "v²");
    }

    #[test]
    fn empty_input_yields_no_lines() {
        let config = Config::default();
        assert!(reconstruct_lines(&[], &config).is_empty());
    }
}
