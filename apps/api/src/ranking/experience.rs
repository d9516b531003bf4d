//! Years-of-experience extraction from free text.
//!
//! Best effort by design: the first "<n> years" phrase wins, and anything that
//! cannot be turned into a number counts as zero years.

use std::sync::LazyLock;

use regex::Regex;

/// `<digits or word>` followed by optional spaces, `+` or `-`, then "years".
static YEARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+|\w+)[\s+-]*years").expect("years pattern is valid"));

/// A single Unicode decimal digit, the same class `\d` matches above.
static DECIMAL_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\d\z").expect("digit pattern is valid"));

const NUMBER_WORDS: &[(&str, u32)] = &[
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

/// Returns the years of experience stated by the first "<n> years" phrase,
/// or 0 when there is none or it does not parse.
pub fn extract_years_of_experience(text: &str) -> u32 {
    let Some(caps) = YEARS_RE.captures(text) else {
        return 0;
    };
    let token = &caps[1];

    if token.chars().all(|c| digit_value(c).is_some()) {
        return parse_digits(token).unwrap_or(0);
    }
    word_to_number(token).unwrap_or(0)
}

/// Base-10 value of a run of decimal digits, `None` on overflow.
fn parse_digits(token: &str) -> Option<u32> {
    token.chars().try_fold(0u32, |acc, c| {
        acc.checked_mul(10)?.checked_add(digit_value(c)?)
    })
}

/// Value of any Unicode decimal digit, not only ASCII ones.
///
/// Decimal digits are encoded in contiguous runs of ten starting at zero, so
/// the value is the offset from the start of the run, modulo ten.
fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut start = c;
    while let Some(prev) = (start as u32).checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start = prev;
    }
    Some((c as u32 - start as u32) % 10)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT_RE.is_match(c.encode_utf8(&mut buf))
}

fn word_to_number(word: &str) -> Option<u32> {
    let word = word.to_lowercase();
    NUMBER_WORDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|&(_, n)| n)
}
