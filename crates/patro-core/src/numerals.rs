//! Devanagari numeral conversion and the shared "meaningful value" filter.

/// Devanagari digits, indexed by their Arabic value.
const NATIVE_DIGITS: [char; 10] = ['०', '१', '२', '३', '४', '५', '६', '७', '८', '९'];

/// Placeholder the source uses for "no value".
pub const PLACEHOLDER: &str = "--";

/// Map a single native digit to its Arabic counterpart.
pub fn native_digit_to_arabic(c: char) -> Option<char> {
    NATIVE_DIGITS
        .iter()
        .position(|&d| d == c)
        .and_then(|i| char::from_digit(i as u32, 10))
}

/// Convert every native digit in `text` to an Arabic digit.
///
/// Characters outside the ten-digit mapping pass through unchanged.
/// Example: `"२०८१"` → `"2081"`, `"१५ गते"` → `"15 गते"`.
pub fn native_to_arabic(text: &str) -> String {
    text.chars()
        .map(|c| native_digit_to_arabic(c).unwrap_or(c))
        .collect()
}

/// True when an optional text field carries a real value: present,
/// not blank, and not the `--` placeholder.
pub fn is_meaningful(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(v) => !v.is_empty() && v != PLACEHOLDER,
        None => false,
    }
}
