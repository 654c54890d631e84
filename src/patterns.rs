//! Pattern matchers and line classifier (`spec.md` §4.2, component C2).
//!
//! Regex lookaround is not available in the `regex` crate, so the two Roman
//! numeral patterns (`QUESTION_ROMAN`, `QNUM_ROMAN_ONLY`) that rely on a
//! negative lookahead in the source grammar are matched by a small
//! hand-written recursive-descent-free scanner (`scan_roman_prefix`) instead
//! of a regex. Every other pattern in §4.2 ports directly.

use std::sync::LazyLock;

use regex::Regex;

/// Parser state, shared with the state machine (`spec.md` §4.3) — needed
/// here because several patterns are only considered in specific states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineState {
    Idle,
    InQuestion,
    InOptions,
}

/// The tagged classification outcome for one visual line (Design Note 9.2).
#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    HeaderNumeric { num: String, body: String },
    HeaderRoman { num: String, body: String },
    HeaderOcr { num: String, body: String },
    HeaderOnly { num: String },
    Option { letter: char, body: String },
    Bullet { body: String },
    Stop,
    Noise,
    Continuation,
    /// No pattern applied and there is no live question to continue.
    Ignored,
}

static QUESTION_PREFIXED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
        ^\s*
        (?:
            (?:Question|Que)\.?\s+
          | Q\.?\s*
        )
        \(?
        (0?\d{1,3})
        \)?
        \s*
        [.):\x{2013}\-]?
        \s*
        (.*)
        $",
    )
    .unwrap()
});

static QUESTION_BARE_NUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        \(?
        (0?\d{1,3})
        \)?
        \s*
        [.):\x{2013}\-]
        \s*
        (.*)
        $",
    )
    .unwrap()
});

static QUESTION_OCR_SPACED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        (\d(?:\s+\d){1,3})
        \s*[.):\-]?\s*
        (.+)
        $",
    )
    .unwrap()
});

static QNUM_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
        ^\s*
        (?:(?:Question|Que)\.?\s+|Q\.\s*)
        \(?
        (0?\d{1,3})
        \)?
        \s*[.):\-]?\s*
        $",
    )
    .unwrap()
});

static OPTION_LETTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        [\(\[]?
        ([A-Da-d])
        [\)\].:]
        \s*[-:]?\s*
        (.*)
        $",
    )
    .unwrap()
});

static OPTION_ROMAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
        ^\s*
        \(
        (i{1,3}|iv|v?i{0,3})
        \)
        \s*
        (.+)
        $",
    )
    .unwrap()
});

static OPTION_NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        ([1-4])
        [).]
        \s+
        (.+)
        $",
    )
    .unwrap()
});

static OPTION_BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        [•\*\-\x{2013}]
        \s+
        (.+)
        $",
    )
    .unwrap()
});

static STOP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
        ^\s*
        (?:
            answers?\s*(?:[&]|and)\s*solutions?
          | answer\s*key
          | answer\s*sheet
          | solutions?
          | explanations?
          | hints?
        )
        \b",
    )
    .unwrap()
});

static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:page\s*\d+|\d+\s*/\s*\d+|www\.|http|©|copyright)\s*$").unwrap()
});

static SOLUTION_COLON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsolution\s*:").unwrap());

static ANSWER_OR_SOLUTION_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:answer|solution)\b").unwrap());

/// `"3"`, `"III"`, `"212"`, … reject values over `max`. Leading zeros are
/// stripped before parsing (`"0?\d{1,3}"` in the source patterns).
pub fn is_valid_question_start(num_str: &str, max: u32) -> bool {
    let trimmed = num_str.trim_start_matches('0');
    let digits = if trimmed.is_empty() { "0" } else { trimmed };
    digits.parse::<u32>().is_ok_and(|n| n <= max)
}

pub fn option_letter_to_key(letter: char) -> char {
    letter.to_ascii_lowercase()
}

pub fn roman_option_to_key(roman: &str) -> Option<char> {
    match roman.to_ascii_lowercase().as_str() {
        "i" => Some('a'),
        "ii" => Some('b'),
        "iii" => Some('c'),
        "iv" => Some('d'),
        _ => None,
    }
}

pub fn numeric_option_to_key(digit: char) -> Option<char> {
    match digit {
        '1' => Some('a'),
        '2' => Some('b'),
        '3' => Some('c'),
        '4' => Some('d'),
        _ => None,
    }
}

/// `\bsolution\s*:` search (not anchored), case-insensitive.
pub fn contains_solution_colon(line: &str) -> bool {
    SOLUTION_COLON_RE.is_match(line)
}

pub fn matches_stop(line: &str) -> bool {
    STOP_RE.is_match(line)
}

pub fn matches_noise(line: &str) -> bool {
    NOISE_RE.is_match(line)
}

/// Greedily scans the grammar `X{0,3}(?:IX|IV|V?I{0,3})` from the start of
/// `s`, case-insensitively, returning `(matched, rest)`. `matched` may be
/// empty — callers must reject empty matches themselves, mirroring the
/// Python source's `if m and m.group(1):` truthiness guards.
fn scan_roman_prefix(s: &str) -> (&str, &str) {
    let bytes = s.as_bytes();
    let at = |i: usize, c: u8| -> bool { i < bytes.len() && bytes[i].to_ascii_uppercase() == c };

    let mut i = 0;
    let mut x_count = 0;
    while x_count < 3 && at(i, b'X') {
        i += 1;
        x_count += 1;
    }

    if at(i, b'I') && at(i + 1, b'X') {
        i += 2;
    } else if at(i, b'I') && at(i + 1, b'V') {
        i += 2;
    } else {
        if at(i, b'V') {
            i += 1;
        }
        let mut i_count = 0;
        while i_count < 3 && at(i, b'I') {
            i += 1;
            i_count += 1;
        }
    }

    (&s[..i], &s[i..])
}

/// `QUESTION_ROMAN_RE`: roman numeral header, delimiter `.`/`:` mandatory,
/// body optional.
pub fn match_roman_header(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim_start();
    let (roman, rest) = scan_roman_prefix(trimmed);
    if roman.is_empty() || rest.starts_with('(') {
        return None;
    }
    let after_ws = rest.trim_start();
    let after_delim = after_ws
        .strip_prefix('.')
        .or_else(|| after_ws.strip_prefix(':'))?;
    Some((roman.to_uppercase(), after_delim.trim().to_string()))
}

/// `QNUM_ROMAN_ONLY_RE`: roman numeral alone on its line, delimiter optional.
pub fn match_roman_only(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let (roman, rest) = scan_roman_prefix(trimmed);
    if roman.is_empty() || rest.starts_with('(') {
        return None;
    }
    let after_ws = rest.trim_start();
    let after_delim = after_ws
        .strip_prefix('.')
        .or_else(|| after_ws.strip_prefix(':'))
        .unwrap_or(after_ws);
    if after_delim.trim().is_empty() {
        Some(roman.to_uppercase())
    } else {
        None
    }
}

fn match_question_prefixed(line: &str) -> Option<(String, String)> {
    let caps = QUESTION_PREFIXED_RE.captures(line)?;
    Some((caps[1].to_string(), caps[2].trim().to_string()))
}

fn match_question_bare_num(line: &str) -> Option<(String, String)> {
    let caps = QUESTION_BARE_NUM_RE.captures(line)?;
    Some((caps[1].to_string(), caps[2].trim().to_string()))
}

fn match_question_ocr_spaced(line: &str) -> Option<(String, String)> {
    let caps = QUESTION_OCR_SPACED_RE.captures(line)?;
    Some((caps[1].to_string(), caps[2].trim().to_string()))
}

fn match_qnum_only(line: &str) -> Option<String> {
    let caps = QNUM_ONLY_RE.captures(line)?;
    Some(caps[1].to_string())
}

/// Try every option format in priority order. `in_question_ctx` gates the
/// Roman/numeric/bullet variants (§4.2: "only valid while inside a
/// question").
fn try_option(line: &str, in_question_ctx: bool) -> Option<Classification> {
    if let Some(caps) = OPTION_LETTER_RE.captures(line) {
        let letter = option_letter_to_key(caps[1].chars().next().unwrap());
        return Some(Classification::Option {
            letter,
            body: caps[2].trim().to_string(),
        });
    }
    if !in_question_ctx {
        return None;
    }
    if let Some(caps) = OPTION_ROMAN_RE.captures(line) {
        if let Some(letter) = roman_option_to_key(&caps[1]) {
            return Some(Classification::Option {
                letter,
                body: caps[2].trim().to_string(),
            });
        }
    }
    if let Some(caps) = OPTION_NUMERIC_RE.captures(line) {
        if let Some(letter) = numeric_option_to_key(caps[1].chars().next().unwrap()) {
            return Some(Classification::Option {
                letter,
                body: caps[2].trim().to_string(),
            });
        }
    }
    if let Some(caps) = OPTION_BULLET_RE.captures(line) {
        return Some(Classification::Bullet {
            body: caps[1].trim().to_string(),
        });
    }
    None
}

/// Classify one stripped visual-line's text, given the parser's current
/// state and whether a question is currently live. Mirrors the ordering of
/// `original_source/main.py`'s `parse_questions_from_lines` loop body
/// exactly (roman header short-circuits first, then option attempt, then
/// the numeric/OCR header chain with its suppression rules).
pub fn classify(line: &str, state: LineState, max_question_number: u32) -> Classification {
    if matches_stop(line) || contains_solution_colon(line) {
        return Classification::Stop;
    }
    if matches_noise(line) {
        return Classification::Noise;
    }

    // Roman header: highest priority in any state.
    if let Some((num, body)) = match_roman_header(line) {
        return Classification::HeaderRoman { num, body };
    }
    if let Some(num) = match_roman_only(line) {
        return Classification::HeaderRoman {
            num,
            body: String::new(),
        };
    }

    let in_question_ctx = matches!(state, LineState::InQuestion | LineState::InOptions);
    let option = try_option(line, in_question_ctx);

    let qnum_only = match_qnum_only(line);

    let mut q_num_match = match_question_prefixed(line).or_else(|| match_question_bare_num(line));
    if let Some((num, body)) = &q_num_match {
        let reject = !is_valid_question_start(num, max_question_number)
            || (state == LineState::InOptions && body.is_empty())
            || option.is_some()
            || ANSWER_OR_SOLUTION_WORD_RE.is_match(body);
        if reject {
            q_num_match = None;
        }
    }

    let mut q_ocr_match = None;
    if state == LineState::Idle && q_num_match.is_none() && option.is_none() && qnum_only.is_none()
    {
        if let Some((spaced, body)) = match_question_ocr_spaced(line) {
            let collapsed: String = spaced.chars().filter(|c| !c.is_whitespace()).collect();
            if is_valid_question_start(&collapsed, max_question_number) {
                q_ocr_match = Some((collapsed, body));
            }
        }
    }

    if let Some(num) = qnum_only {
        if option.is_none() {
            return Classification::HeaderOnly { num };
        }
    }
    if let Some((num, body)) = q_num_match {
        if !body.is_empty() {
            return Classification::HeaderNumeric { num, body };
        }
    }
    if let Some((num, body)) = q_ocr_match {
        return Classification::HeaderOcr { num, body };
    }
    if let Some(opt) = option {
        if in_question_ctx {
            return opt;
        }
    }
    if in_question_ctx {
        return Classification::Continuation;
    }
    Classification::Ignored
}
