//! Scanning helpers used by the parser. All positions are byte offsets; every
//! character the scanner acts on is ASCII, so offsets always fall on UTF-8
//! boundaries.

use crate::error::ExpressError;

/// Placeholder written into a scan pattern over masked characters.
pub const MASK: u8 = b'#';

/// Returns the index of the `)` matching the `(` at `open`, or `None` if the
/// input ends first.
pub fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut level = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => level += 1,
            b')' => {
                level -= 1;
                if level == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Checks that every parenthesis in `source` has a partner.
pub fn check_balanced(source: &str) -> Result<(), ExpressError> {
    let mut open = Vec::new();
    for (i, b) in source.bytes().enumerate() {
        match b {
            b'(' => open.push(i),
            b')' => {
                if open.pop().is_none() {
                    return Err(ExpressError::syntax("Unmatched ')'", &source[i..], i));
                }
            }
            _ => {}
        }
    }
    match open.first() {
        Some(&i) => Err(ExpressError::syntax("Unmatched '('", &source[i..], i)),
        None => Ok(()),
    }
}

/// Narrows `[start, end)` past surrounding whitespace.
pub fn trim_span(bytes: &[u8], mut start: usize, mut end: usize) -> (usize, usize) {
    while start < end && bytes[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    (start, end)
}

/// Removes parentheses that enclose the whole span, repeatedly: `((a+b))` → `a+b`.
pub fn strip_enclosing(bytes: &[u8], start: usize, end: usize) -> (usize, usize) {
    let (mut start, mut end) = trim_span(bytes, start, end);
    while end - start >= 2
        && bytes[start] == b'('
        && matching_paren(&bytes[..end], start) == Some(end - 1)
    {
        (start, end) = trim_span(bytes, start + 1, end - 1);
    }
    (start, end)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

/// True if the sign at `i` belongs to the exponent of a numeric literal,
/// as in `1e-3` or `2.5E+2`.
fn is_exponent_sign(bytes: &[u8], start: usize, i: usize) -> bool {
    if i < start + 2 || !matches!(bytes[i - 1], b'e' | b'E') {
        return false;
    }
    let mantissa_end = i - 1;
    let mut j = mantissa_end;
    while j > start && (bytes[j - 1].is_ascii_digit() || bytes[j - 1] == b'.') {
        j -= 1;
    }
    let mantissa = &bytes[j..mantissa_end];
    let standalone = j == start || !is_word_byte(bytes[j - 1]);
    standalone && mantissa.iter().any(u8::is_ascii_digit)
}

/// True if the `+`/`-` at `i` is a sign rather than a binary operator: it
/// starts the span, follows another operator, `(` or `,`, or is an exponent
/// sign.
pub fn is_unary_sign(bytes: &[u8], start: usize, i: usize) -> bool {
    let prev = bytes[start..i]
        .iter()
        .rev()
        .find(|b| !b.is_ascii_whitespace());
    match prev {
        None => true,
        Some(b'+' | b'-' | b'*' | b'/' | b'^' | b'(' | b',') => true,
        Some(_) => is_exponent_sign(bytes, start, i),
    }
}

/// Builds the scan pattern of `[start, end)`: a copy of the span in which
/// parenthesized sub-spans and unary signs are replaced by [`MASK`], so only
/// top-level binary operators remain visible.
pub fn scan_pattern(bytes: &[u8], start: usize, end: usize) -> Vec<u8> {
    let mut pattern = bytes[start..end].to_vec();
    let mut i = start;
    while i < end {
        match bytes[i] {
            b'(' => {
                let close = matching_paren(&bytes[..end], i).unwrap_or(end - 1);
                pattern[i - start..=close - start].fill(MASK);
                i = close + 1;
                continue;
            }
            b'+' | b'-' if is_unary_sign(bytes, start, i) => pattern[i - start] = MASK,
            _ => {}
        }
        i += 1;
    }
    pattern
}

/// Finds an operator from `ops` in `pattern`. `rightmost` selects the last
/// occurrence (left-associative split) instead of the first.
pub fn find_operator(pattern: &[u8], ops: &[u8], rightmost: bool) -> Option<usize> {
    if rightmost {
        pattern.iter().rposition(|b| ops.contains(b))
    } else {
        pattern.iter().position(|b| ops.contains(b))
    }
}

/// Splits `[start, end)` at commas that are not nested inside parentheses.
/// An empty or all-blank span yields no pieces.
pub fn split_top_level(bytes: &[u8], start: usize, end: usize) -> Vec<(usize, usize)> {
    let (trimmed_start, trimmed_end) = trim_span(bytes, start, end);
    if trimmed_start == trimmed_end {
        return Vec::new();
    }
    let mut pieces = Vec::new();
    let mut level = 0usize;
    let mut piece_start = start;
    for i in start..end {
        match bytes[i] {
            b'(' => level += 1,
            b')' => level = level.saturating_sub(1),
            b',' if level == 0 => {
                pieces.push((piece_start, i));
                piece_start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push((piece_start, end));
    pieces
}

/// Result of reading a span as a numeric literal.
#[derive(Debug, PartialEq)]
pub enum Literal {
    Number(f64),
    /// Literal syntax, but the value does not fit a finite `f64`.
    OutOfRange,
    NotALiteral,
}

/// Reads `text` as a finite decimal or scientific literal. Words such as
/// `inf` or `NaN` are not literals.
pub fn parse_literal(text: &str) -> Literal {
    let literal_chars = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if text.is_empty() || !literal_chars || !text.bytes().any(|b| b.is_ascii_digit()) {
        return Literal::NotALiteral;
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Literal::Number(value),
        Ok(_) => Literal::OutOfRange,
        Err(_) => Literal::NotALiteral,
    }
}
