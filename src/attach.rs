//! Spatial attacher (`spec.md` §4.5, component C5).
//!
//! Two passes over the finished [`ParsedQuestion`] list: first attach each
//! image region to the nearest question by Y-proximity, then promote
//! question-level images into per-option slots when their centre falls
//! inside that option's Y-range.

use crate::config::Config;
use crate::model::{ImageRegion, ParsedQuestion};

/// Attach every image region to the question whose `[y_start, y_end]` range
/// it falls in (tie-broken by distance), falling back to the globally
/// nearest question when none is within tolerance.
pub fn attach_images_to_questions(
    questions: &mut [ParsedQuestion],
    images: &[ImageRegion],
    config: &Config,
) {
    if questions.is_empty() {
        return;
    }

    for img in images {
        let center_y = img.center_y();
        let mut best: Option<(usize, f64)> = None;

        for (i, q) in questions.iter().enumerate() {
            let range_top = q.y_start - config.image_y_tolerance;
            let range_bottom = q.y_end + config.image_y_tolerance;
            if range_top <= center_y && center_y <= range_bottom {
                let dist = if q.y_start <= center_y && center_y <= q.y_end {
                    0.0
                } else {
                    (center_y - q.y_start).abs().min((center_y - q.y_end).abs())
                };
                if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                    best = Some((i, dist));
                }
            }
        }

        if best.is_none() {
            for (i, q) in questions.iter().enumerate() {
                let dist = (center_y - q.y_start).abs().min((center_y - q.y_end).abs());
                if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                    best = Some((i, dist));
                }
            }
        }

        if let Some((i, _)) = best {
            let q = &mut questions[i];
            q.has_diagram = true;
            q.image_path.push(img.path.clone());
        }
    }
}

/// Promote a question's attached images into per-option slots when their
/// centre Y lands inside that option's range (first option's range starts
/// at negative infinity from the tolerance slack below its own anchor,
/// every later option's range runs up to the next option's anchor, and the
/// last option's range extends `image_y_tolerance` past the question end).
pub fn promote_option_images(
    questions: &mut [ParsedQuestion],
    image_coords: &dyn Fn(&str) -> Option<(f64, f64)>,
    config: &Config,
) {
    for q in questions.iter_mut() {
        if q.opt_y.is_empty() || q.image_path.is_empty() {
            continue;
        }

        let letters: Vec<char> = q.opt_y.keys().copied().collect();
        let mut ranges: Vec<(char, f64, f64)> = Vec::with_capacity(letters.len());
        for (i, &letter) in letters.iter().enumerate() {
            let y_s = q.opt_y[&letter];
            let y_e = letters
                .get(i + 1)
                .map(|next| q.opt_y[next])
                .unwrap_or(q.y_end + config.image_y_tolerance);
            ranges.push((letter, y_s, y_e));
        }

        let paths = std::mem::take(&mut q.image_path);
        let mut remaining = Vec::with_capacity(paths.len());
        for path in paths {
            let Some((top, bottom)) = image_coords(&path) else {
                remaining.push(path);
                continue;
            };
            let cy = (top + bottom) / 2.0;
            let matched = ranges
                .iter()
                .find(|(_, y_s, y_e)| *y_s - config.option_image_slack <= cy && cy <= *y_e);

            if let Some((letter, _, _)) = matched {
                let slot = q.option_image_slot(*letter);
                if slot.is_none() {
                    *slot = Some(path);
                    continue;
                }
            }
            remaining.push(path);
        }
        q.image_path = remaining;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(num: &str, y_start: f64, y_end: f64) -> ParsedQuestion {
        let mut q = ParsedQuestion::new(num.to_string(), "text".to_string(), y_start);
        q.y_end = y_end;
        q
    }

    #[test]
    fn image_attaches_to_nearest_question_within_tolerance() {
        let config = Config::default();
        let mut questions = vec![question("1", 0.0, 50.0), question("2", 300.0, 350.0)];
        let images = vec![ImageRegion {
            path: "/static/images/a.png".into(),
            top: 40.0,
            bottom: 60.0,
        }];
        attach_images_to_questions(&mut questions, &images, &config);
        assert!(questions[0].has_diagram);
        assert!(!questions[1].has_diagram);
    }

    #[test]
    fn image_falls_back_to_globally_nearest_question() {
        let config = Config::default();
        let mut questions = vec![question("1", 0.0, 50.0), question("2", 2000.0, 2050.0)];
        let images = vec![ImageRegion {
            path: "/static/images/a.png".into(),
            top: 90.0,
            bottom: 100.0,
        }];
        attach_images_to_questions(&mut questions, &images, &config);
        assert!(questions[0].has_diagram);
        assert_eq!(questions[0].image_path.len(), 1);
    }

    #[test]
    fn promotes_image_whose_center_is_inside_option_range() {
        let config = Config::default();
        let mut q = question("1", 0.0, 100.0);
        q.opt_y.insert('a', 10.0);
        q.opt_y.insert('b', 50.0);
        q.image_path = vec!["/static/images/b_opt.png".to_string()];
        let mut questions = vec![q];

        let coords = |path: &str| -> Option<(f64, f64)> {
            if path == "/static/images/b_opt.png" {
                Some((55.0, 65.0))
            } else {
                None
            }
        };
        promote_option_images(&mut questions, &coords, &config);
        assert_eq!(
            questions[0].option_b_image.as_deref(),
            Some("/static/images/b_opt.png")
        );
        assert!(questions[0].image_path.is_empty());
    }
}
