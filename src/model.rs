//! Record types that flow between the components in `spec.md` §2-§3.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A reconstructed visual line of text, in global (cross-page) Y coordinates.
///
/// Invariant: `top <= bottom`; `text` is non-empty after `.trim()`; within a
/// page, lines are ordered by `top` ascending.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualLine {
    pub text: String,
    pub top: f64,
    pub bottom: f64,
    pub x0: f64,
}

/// An extracted diagram region, already normalised into the global Y space.
///
/// Invariant: `bottom - top >= 40` and the originating region's width was
/// also `>= 40` (enforced by the collector before a region is ever built).
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRegion {
    pub path: String,
    pub top: f64,
    pub bottom: f64,
}

impl ImageRegion {
    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// Per-page accessor metadata retained so screenshots can be cropped after
/// every page's text/images have already been collected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageFrame {
    pub page_num: usize,
    pub y_offset: f64,
    pub height: f64,
}

/// Internal parser-state record (Design Note 9.1). Accumulates during
/// parsing; converted into a [`QuestionRecord`] at the output boundary.
#[derive(Clone, Debug, Default)]
pub struct ParsedQuestion {
    pub question: String,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub option_a_image: Option<String>,
    pub option_b_image: Option<String>,
    pub option_c_image: Option<String>,
    pub option_d_image: Option<String>,
    pub has_diagram: bool,
    /// Remaining question-scope image paths not promoted to an option.
    pub image_path: Vec<String>,
    pub question_image: Option<String>,

    /// Header token as written, e.g. `"3"`, `"III"`, `"212"`.
    pub num: String,
    pub y_start: f64,
    pub y_end: f64,
    /// Y of each option letter's first occurrence.
    pub opt_y: BTreeMap<char, f64>,
}

impl ParsedQuestion {
    pub fn new(num: String, text: String, y_top: f64) -> Self {
        Self {
            question: text,
            num,
            y_start: y_top,
            y_end: y_top,
            ..Default::default()
        }
    }

    pub fn option_slot(&mut self, letter: char) -> &mut Option<String> {
        match letter {
            'a' => &mut self.option_a,
            'b' => &mut self.option_b,
            'c' => &mut self.option_c,
            'd' => &mut self.option_d,
            _ => unreachable!("option letters are restricted to a..d"),
        }
    }

    pub fn option_image_slot(&mut self, letter: char) -> &mut Option<String> {
        match letter {
            'a' => &mut self.option_a_image,
            'b' => &mut self.option_b_image,
            'c' => &mut self.option_c_image,
            'd' => &mut self.option_d_image,
            _ => unreachable!("option letters are restricted to a..d"),
        }
    }

    pub fn option_count(&self) -> usize {
        [&self.option_a, &self.option_b, &self.option_c, &self.option_d]
            .iter()
            .filter(|o| o.is_some())
            .count()
    }

    pub fn into_record(self) -> QuestionRecord {
        QuestionRecord {
            question: self.question,
            option_a: self.option_a,
            option_b: self.option_b,
            option_c: self.option_c,
            option_d: self.option_d,
            option_a_image: self.option_a_image,
            option_b_image: self.option_b_image,
            option_c_image: self.option_c_image,
            option_d_image: self.option_d_image,
            has_diagram: u8::from(self.has_diagram),
            image_path: if self.image_path.is_empty() {
                None
            } else {
                Some(self.image_path.join(","))
            },
            question_image: self.question_image,
        }
    }
}

/// Output entity. Mirrors the persistence collaborator's column list (§6):
/// `id` (assigned by the store on insert), `question`, `option_a..d`,
/// `option_a_image..d_image`, `has_diagram`, `image_path`, `question_image`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub option_a_image: Option<String>,
    pub option_b_image: Option<String>,
    pub option_c_image: Option<String>,
    pub option_d_image: Option<String>,
    pub has_diagram: u8,
    pub image_path: Option<String>,
    pub question_image: Option<String>,
}

/// A row as returned by the persistence collaborator's read-back endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredQuestion {
    pub id: u64,
    #[serde(flatten)]
    pub record: QuestionRecord,
}
