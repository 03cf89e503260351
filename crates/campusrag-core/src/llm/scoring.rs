//! Parsing of numeric ratings returned by the completion model

/// Leading decimal number of `text`, ignoring surrounding whitespace
///
/// Accepts `"8"`, `"7.5"`, `"9/10"`, `"8. Highly relevant"`; rejects text
/// that does not start with a digit, sign or decimal point.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, ch) in text.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    text[..end].trim_end_matches('.').parse().ok()
}

/// A 0-10 rating mapped into [0, 1]
pub fn parse_rating(text: &str) -> Option<f64> {
    parse_leading_number(text)
        .filter(|n| n.is_finite())
        .map(|n| (n / 10.0).clamp(0.0, 1.0))
}
