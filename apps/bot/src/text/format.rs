use crate::errors::ComposeError;
use crate::models::parcel::CellValue;

/// Below this many miles, distances read better in feet.
pub const MILES_FEET_CUTOFF: f64 = 0.1;
pub const METERS_IN_MILE: f64 = 1609.344;
pub const FEET_IN_MILE: f64 = 5280.0;

const VOWELS: &str = "AEIOUaeiou";

/// "0.25 miles", or whole feet (truncated) under a tenth of a mile.
pub fn humanize_distance(meters: f64) -> String {
    let miles = meters / METERS_IN_MILE;
    if miles < MILES_FEET_CUTOFF {
        format!("{} feet", (miles * FEET_IN_MILE) as i64)
    } else {
        format!("{miles:.2} miles")
    }
}

/// Picks "a" or "an" from the first letter only. "one" gets "an".
pub fn article_for(word: &str) -> Result<&'static str, ComposeError> {
    match word.chars().next() {
        None => Err(ComposeError::EmptyWord),
        Some(c) if VOWELS.contains(c) => Ok("an"),
        Some(_) => Ok("a"),
    }
}

/// Uppercases the first letter of each space-separated word and lowercases
/// the rest: "CENTRE ST" → "Centre St".
pub fn capitalize_each_word(text: &str) -> String {
    text.split(' ').map(capitalize).collect::<Vec<_>>().join(" ")
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Numeric cells always count; text counts if any ASCII digit appears.
pub fn contains_digit(value: &CellValue) -> bool {
    value.is_numeric() || value.to_string().chars().any(|c| c.is_ascii_digit())
}

/// en-US thousands grouping: 13234 → "13,234".
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Fraction to whole percent, truncated: 0.759 → 75.
pub fn percent_of(fraction: f64) -> i64 {
    (fraction * 100.0) as i64
}
