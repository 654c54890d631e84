//! MCQ state machine (`spec.md` §4.3, component C3).
//!
//! Consumes the visual lines produced by [`crate::lines`] (already merged
//! across a page, in global Y coordinates) and assembles [`ParsedQuestion`]
//! records. A new header line unconditionally finalizes whatever question is
//! currently open — two questions are never merged, even when one of them
//! has zero options.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::Config;
use crate::model::{ParsedQuestion, VisualLine};
use crate::patterns::{self, Classification, LineState};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static FRACTION_COLLAPSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(mv2\s*0)\s*([23]?\s*x2\s*0)\b").unwrap());
static MATH_FRAGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\[\]\(\)+\-−=*/.:\s]+$").unwrap());
static DENOMINATOR_X_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\d*x\d").unwrap());
static DENOMINATOR_SIGNED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[+\-−][A-Za-z0-9]+$").unwrap());
static DIGITS_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// Run the state machine over one document's worth of visual lines (already
/// concatenated across pages in global Y space).
pub fn parse_lines(visual_lines: &[VisualLine], config: &Config) -> Vec<ParsedQuestion> {
    let mut machine = Machine::new(config);
    for vl in visual_lines {
        machine.feed(vl);
    }
    machine.finish()
}

/// Convenience entry point for plain text with no spatial information —
/// lines get synthetic, strictly increasing Y coordinates.
pub fn parse_text(full_text: &str, config: &Config) -> Vec<ParsedQuestion> {
    let visual_lines: Vec<VisualLine> = full_text
        .lines()
        .enumerate()
        .map(|(i, raw)| VisualLine {
            text: raw.to_string(),
            top: i as f64,
            bottom: (i + 1) as f64,
            x0: 0.0,
        })
        .collect();
    parse_lines(&visual_lines, config)
}

struct Machine<'a> {
    config: &'a Config,
    questions: Vec<ParsedQuestion>,
    current: Option<ParsedQuestion>,
    state: LineState,
    stopped: bool,
    last_option_key: Option<char>,
    last_option_x0: f64,
}

impl<'a> Machine<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            config,
            questions: Vec::new(),
            current: None,
            state: LineState::Idle,
            stopped: false,
            last_option_key: None,
            last_option_x0: 0.0,
        }
    }

    fn finish_question(&mut self) {
        if let Some(mut q) = self.current.take() {
            for letter in ['a', 'b', 'c', 'd'] {
                let slot = q.option_slot(letter);
                if let Some(text) = slot.take() {
                    *slot = Some(normalize_math_option_text(&text));
                }
            }
            self.questions.push(q);
        }
        self.last_option_key = None;
        self.last_option_x0 = 0.0;
    }

    fn start_question(&mut self, num: String, text: String, y_top: f64) {
        self.finish_question();
        self.current = Some(ParsedQuestion::new(num, text, y_top));
        self.state = LineState::InQuestion;
        self.last_option_key = None;
        self.last_option_x0 = 0.0;
    }

    fn feed(&mut self, vl: &VisualLine) {
        let line = vl.text.trim();
        if line.is_empty() || self.stopped {
            return;
        }

        let classification =
            patterns::classify(line, self.state, self.config.max_question_number);

        if !matches!(classification, Classification::Stop | Classification::Noise) {
            if let Some(q) = self.current.as_mut() {
                q.y_end = vl.bottom;
            }
        }

        match classification {
            Classification::Stop => {
                self.finish_question();
                self.stopped = true;
            }
            Classification::Noise => {}
            Classification::HeaderRoman { num, body } => {
                self.start_question(num, body, vl.top);
            }
            Classification::HeaderOnly { num } => {
                self.start_question(num, String::new(), vl.top);
            }
            Classification::HeaderNumeric { num, body } => {
                self.start_question(num, body, vl.top);
            }
            Classification::HeaderOcr { num, body } => {
                self.start_question(num, body, vl.top);
            }
            Classification::Option { letter, body } => {
                self.record_option(letter, body, vl.top, vl.x0);
            }
            Classification::Bullet { body } => {
                if let Some(letter) = self.next_bullet_slot() {
                    self.record_option(letter, body, vl.top, vl.x0);
                }
            }
            Classification::Continuation => {
                self.append_continuation(line, vl.x0);
            }
            Classification::Ignored => {}
        }
    }

    fn next_bullet_slot(&self) -> Option<char> {
        let q = self.current.as_ref()?;
        ['a', 'b', 'c', 'd']
            .into_iter()
            .find(|&letter| q.opt_for(letter).is_none())
    }

    fn record_option(&mut self, letter: char, body: String, y_top: f64, x0: f64) {
        let Some(q) = self.current.as_mut() else {
            return;
        };
        if q.opt_for(letter).is_none() {
            *q.option_slot(letter) = Some(body);
            self.last_option_key = Some(letter);
            self.last_option_x0 = x0;
            q.opt_y.entry(letter).or_insert(y_top);
        }
        self.state = LineState::InOptions;
    }

    /// Indentation relative to the last option's label is never used to
    /// decide the append target: `original_source`'s indented-vs-same-indent
    /// branches both call `_append_option_text` unconditionally, so
    /// `INDENT_TOL` never actually forks behaviour. No `Config` field is
    /// carried for it here.
    fn append_continuation(&mut self, line: &str, _x0: f64) {
        let Some(q) = self.current.as_mut() else {
            return;
        };
        match self.state {
            LineState::InQuestion => {
                if q.question.is_empty() {
                    q.question.push_str(line);
                } else {
                    q.question.push(' ');
                    q.question.push_str(line);
                }
            }
            LineState::InOptions => {
                if let Some(letter) = self.last_option_key {
                    if q.opt_for(letter).is_some() {
                        let slot = q.option_slot(letter);
                        let merged = append_option_text(slot.as_deref(), line);
                        *slot = Some(merged);
                    }
                }
            }
            LineState::Idle => {}
        }
    }

    fn finish(mut self) -> Vec<ParsedQuestion> {
        self.finish_question();
        self.questions
    }
}

impl ParsedQuestion {
    fn opt_for(&self, letter: char) -> Option<&String> {
        match letter {
            'a' => self.option_a.as_ref(),
            'b' => self.option_b.as_ref(),
            'c' => self.option_c.as_ref(),
            'd' => self.option_d.as_ref(),
            _ => None,
        }
    }
}

/// Merge a wrapped option-text fragment into the text collected so far,
/// preserving fraction-like math layout as plain text (§4.3 edge case:
/// "stacked fraction OCR split across lines").
fn append_option_text(existing: Option<&str>, incoming: &str) -> String {
    let new_part = incoming.trim();
    if new_part.is_empty() {
        return existing.unwrap_or("").trim().to_string();
    }

    let current = existing.unwrap_or("").trim_end().to_string();
    if current.is_empty() {
        return new_part.to_string();
    }

    if new_part == "]" || new_part == ")" {
        return format!("{current}{new_part}");
    }

    let compact_current: String = current.chars().filter(|c| !c.is_whitespace()).collect();
    let compact_new: String = new_part.chars().filter(|c| !c.is_whitespace()).collect();

    if DIGITS_ONLY_RE.is_match(&compact_new)
        && compact_current
            .chars()
            .last()
            .is_some_and(|c| c.is_alphanumeric())
    {
        return format!("{current}{compact_new}");
    }

    let starts_like_denominator = compact_new.to_lowercase().starts_with('x')
        || DENOMINATOR_X_RE.is_match(&compact_new)
        || DENOMINATOR_SIGNED_RE.is_match(&compact_new);
    let current_looks_like_numerator = current.ends_with(']')
        || compact_current.to_lowercase().contains("mv")
        || current.contains(['+', '-', '−']);

    if !current.contains('/')
        && starts_like_denominator
        && current_looks_like_numerator
        && looks_math_fragment(&current)
        && looks_math_fragment(new_part)
    {
        return format!("{current} / {new_part}");
    }

    format!("{current} {new_part}")
}

fn looks_math_fragment(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() || t.chars().count() > 28 {
        return false;
    }
    MATH_FRAGMENT_RE.is_match(t)
}

/// Collapses repeated whitespace and, when no `/` is already present, folds
/// common stacked-fraction OCR fragments (§4.3: `mv20x20` -> `mv20 / x20`).
fn normalize_math_option_text(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ").trim().to_string();
    if collapsed.is_empty() || collapsed.contains('/') {
        return collapsed;
    }
    FRACTION_COLLAPSE_RE
        .replace_all(&collapsed, "$1 / $2")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, top: f64, x0: f64) -> VisualLine {
        VisualLine {
            text: text.to_string(),
            top,
            bottom: top + 1.0,
            x0,
        }
    }

    #[test]
    fn simple_numeric_question_with_four_options() {
        let config = Config::default();
        let lines = vec![
            line("1. What is 2+2?", 0.0, 0.0),
            line("(A) 3", 1.0, 5.0),
            line("(B) 4", 2.0, 5.0),
            line("(C) 5", 3.0, 5.0),
            line("(D) 6", 4.0, 5.0),
        ];
        let qs = parse_lines(&lines, &config);
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].num, "1");
        assert_eq!(qs[0].question, "What is 2+2?");
        assert_eq!(qs[0].option_a.as_deref(), Some("3"));
        assert_eq!(qs[0].option_d.as_deref(), Some("6"));
    }

    #[test]
    fn header_with_split_number_and_body_lines() {
        let config = Config::default();
        let lines = vec![
            line("Q.2", 0.0, 0.0),
            line("What is the capital of France?", 1.0, 0.0),
            line("(A) Paris", 2.0, 5.0),
        ];
        let qs = parse_lines(&lines, &config);
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].num, "2");
        assert_eq!(qs[0].question, "What is the capital of France?");
    }

    #[test]
    fn header_unconditionally_finalizes_previous_question() {
        let config = Config::default();
        let lines = vec![
            line("1. Incomplete question with no options", 0.0, 0.0),
            line("2. Next question", 1.0, 0.0),
            line("(A) x", 2.0, 5.0),
        ];
        let qs = parse_lines(&lines, &config);
        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].option_count(), 0);
        assert_eq!(qs[1].num, "2");
    }

    #[test]
    fn stop_marker_truncates_remaining_lines() {
        let config = Config::default();
        let lines = vec![
            line("1. Question?", 0.0, 0.0),
            line("(A) yes", 1.0, 5.0),
            line("Answer Key", 2.0, 0.0),
            line("2. Should not appear", 3.0, 0.0),
        ];
        let qs = parse_lines(&lines, &config);
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].num, "1");
    }

    #[test]
    fn roman_numeral_headers_are_recognized() {
        let config = Config::default();
        let lines = vec![
            line("I. First question", 0.0, 0.0),
            line("(A) a", 1.0, 5.0),
            line("II. Second question", 2.0, 0.0),
            line("(A) b", 3.0, 5.0),
        ];
        let qs = parse_lines(&lines, &config);
        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].num, "I");
        assert_eq!(qs[1].num, "II");
    }

    #[test]
    fn bullet_options_fill_slots_in_order() {
        let config = Config::default();
        let lines = vec![
            line("1. Pick one", 0.0, 0.0),
            line("• first", 1.0, 5.0),
            line("• second", 2.0, 5.0),
        ];
        let qs = parse_lines(&lines, &config);
        assert_eq!(qs[0].option_a.as_deref(), Some("first"));
        assert_eq!(qs[0].option_b.as_deref(), Some("second"));
    }

    #[test]
    fn wrapped_option_text_merges_as_fraction() {
        let config = Config::default();
        let lines = vec![
            line("1. Velocity", 0.0, 0.0),
            line("(A) mv20", 1.0, 5.0),
            line("x20", 2.0, 30.0),
        ];
        let qs = parse_lines(&lines, &config);
        assert_eq!(qs[0].option_a.as_deref(), Some("mv20 / x20"));
    }

    #[test]
    fn solution_colon_anywhere_in_line_stops_parsing() {
        let config = Config::default();
        let lines = vec![
            line("1. Question?", 0.0, 0.0),
            line("(A) yes", 1.0, 5.0),
            line("Detailed Solution: because reasons", 2.0, 0.0),
        ];
        let qs = parse_lines(&lines, &config);
        assert_eq!(qs.len(), 1);
    }

    #[test]
    fn noise_line_does_not_extend_question_span() {
        let config = Config::default();
        let lines = vec![
            line("1. Question?", 0.0, 0.0),
            line("(A) yes", 1.0, 5.0),
            line("Page 3", 2.0, 0.0),
        ];
        let qs = parse_lines(&lines, &config);
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].y_end, 2.0);
    }

    #[test]
    fn stop_line_does_not_extend_question_span() {
        let config = Config::default();
        let lines = vec![
            line("1. Question?", 0.0, 0.0),
            line("(A) yes", 1.0, 5.0),
            line("Answer Key", 2.0, 0.0),
        ];
        let qs = parse_lines(&lines, &config);
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].y_end, 2.0);
    }

    #[test]
    fn fraction_collapse_applies_to_every_occurrence() {
        let merged = normalize_math_option_text("mv20x20 and mv20x20");
        assert_eq!(merged, "mv20 / x20 and mv20 / x20");
    }

    #[test]
    fn parse_text_builds_synthetic_coordinates() {
        let config = Config::default();
        let qs = parse_text("1. Hello?\n(A) hi\n(B) bye\n", &config);
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].option_a.as_deref(), Some("hi"));
    }
}
