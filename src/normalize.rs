//! Symbol-font normalisation and Unicode sub/superscript digit mapping
//! (`spec.md` §4.1 Step 3-4).

/// Private-use and ambiguous code points mapped to their mathematical
/// equivalents. Some JEE/NEET PDFs embed Symbol-variant fonts whose glyph
/// codes land in these ranges instead of the expected Unicode code point.
const MATH_CHAR_MAP: &[(char, char)] = &[
    ('\u{f028}', '√'),
    ('\u{f0d6}', '√'),
    ('\u{221a}', '√'),
    ('\u{f0b0}', '°'),
    ('\u{f0b2}', '²'),
    ('\u{f0b3}', '³'),
    ('\u{f02d}', '−'),
    ('\u{2212}', '−'),
];

pub fn normalize_math_chars(text: &str) -> String {
    text.chars()
        .map(|c| {
            MATH_CHAR_MAP
                .iter()
                .find(|(src, _)| *src == c)
                .map_or(c, |(_, dst)| *dst)
        })
        .collect()
}

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

/// Map ASCII digits `0-9` to their Unicode super/subscript equivalents;
/// non-digit characters pass through unchanged.
pub fn digits_to_script(text: &str, superscript: bool) -> String {
    let table = if superscript {
        &SUPERSCRIPT_DIGITS
    } else {
        &SUBSCRIPT_DIGITS
    };
    text.chars()
        .map(|c| {
            if c.is_ascii_digit() {
                table[(c as u8 - b'0') as usize]
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_symbol_font_radical_and_minus() {
        let s = format!("{}25{}", '\u{f028}', '\u{f02d}');
        assert_eq!(normalize_math_chars(&s), "√25−");
    }

    #[test]
    fn leaves_ordinary_text_untouched() {
        assert_eq!(normalize_math_chars("plain text 123"), "plain text 123");
    }

    #[test]
    fn maps_digits_to_superscript_and_subscript() {
        assert_eq!(digits_to_script("12", true), "¹²");
        assert_eq!(digits_to_script("12", false), "₁₂");
    }

    #[test]
    fn non_digit_characters_pass_through() {
        assert_eq!(digits_to_script("x2y", true), "x²y");
    }
}
