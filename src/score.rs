use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DECIMAL_REGEX: Regex =
        Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap();
    static ref INFINITY_REGEX: Regex = Regex::new(r"^([+-]?)Infinity$").unwrap();
    static ref RADIX_REGEX: Regex =
        Regex::new(r"^0([xXoObB])([0-9a-fA-F]+)$").unwrap();
}

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Converts a raw score entry into a number.
///
/// Follows the loose coercion the score form has always used: surrounding
/// whitespace is ignored, an empty entry is `0`, decimal and exponent
/// literals are accepted, as are `Infinity` and unsigned `0x`/`0o`/`0b`
/// literals. Anything else is not a number and yields `None`.
///
/// # Examples
/// ```
/// use gradesheet::score::coerce;
///
/// assert_eq!(coerce(" 42 "), Some(42.0));
/// assert_eq!(coerce(""), Some(0.0));
/// assert_eq!(coerce("abc"), None);
/// ```
pub fn coerce(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if trimmed.is_empty() {
        return Some(0.0);
    }

    if DECIMAL_REGEX.is_match(trimmed) {
        return trimmed.parse::<f64>().ok();
    }

    if let Some(caps) = INFINITY_REGEX.captures(trimmed) {
        return Some(if &caps[1] == "-" {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    if let Some(caps) = RADIX_REGEX.captures(trimmed) {
        let radix = match &caps[1] {
            "x" | "X" => 16,
            "o" | "O" => 8,
            _ => 2,
        };
        let mut value = 0.0;
        for c in caps[2].chars() {
            let digit = c.to_digit(radix)?;
            value = value * f64::from(radix) + f64::from(digit);
        }
        return Some(value);
    }

    None
}

/// Clamps a score into `[0, 100]`.
pub fn clamp(value: f64) -> f64 {
    value.clamp(MIN_SCORE, MAX_SCORE)
}

/// The value a raw entry contributes to a live total: coerced, with
/// non-numbers counting as `0`, then clamped.
pub fn effective(raw: &str) -> f64 {
    clamp(coerce(raw).unwrap_or(0.0))
}

/// Canonical text for a number, the way the form writes a committed score
/// back into its input.
pub fn number_text(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else {
        // f64's Display is already the shortest round-trip form.
        value.to_string()
    }
}

/// Formats `value` with a fixed number of decimals.
///
/// The stored binary value is rounded, not its shortest decimal form, so
/// `72.345` (really `72.34499...`) gives `72.34`. Only exact ties round away
/// from zero (`0.125` gives `0.13`), and negative zero prints as `0.00`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return number_text(value);
    }
    let value = if value == 0.0 { 0.0 } else { value };

    if is_exact_tie(value.abs(), digits) {
        let factor = 10f64.powi(digits as i32);
        let scaled = value.abs() * factor;
        let rounded = ((scaled.trunc() + 1.0) / factor).copysign(value);
        return format!("{:.*}", digits, rounded);
    }
    // Display rounds the exact binary expansion; ties are handled above.
    format!("{:.*}", digits, value)
}

/// Whether `value` lies exactly halfway between two multiples of
/// `10^-digits`.
///
/// A half-way point `(2k + 1) / (2 * 10^digits)` is a binary fraction only
/// when `5^digits` divides the odd numerator, which leaves an odd integer
/// over `2^(digits + 1)`. Scaling by a power of two is exact, so the test
/// needs no decimal arithmetic.
fn is_exact_tie(value: f64, digits: usize) -> bool {
    let scaled = value * 2f64.powi(digits as i32 + 1);
    scaled.is_finite() && scaled.fract() == 0.0 && scaled % 2.0 == 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_accepts_loose_numeric_forms() {
        assert_eq!(coerce("95"), Some(95.0));
        assert_eq!(coerce("  7.5\t"), Some(7.5));
        assert_eq!(coerce("1e2"), Some(100.0));
        assert_eq!(coerce(".5"), Some(0.5));
        assert_eq!(coerce("5."), Some(5.0));
        assert_eq!(coerce("-12"), Some(-12.0));
        assert_eq!(coerce("0x1F"), Some(31.0));
        assert_eq!(coerce("0b101"), Some(5.0));
        assert_eq!(coerce("0o17"), Some(15.0));
        assert_eq!(coerce("Infinity"), Some(f64::INFINITY));
        assert_eq!(coerce("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn coerce_rejects_everything_else() {
        for raw in ["abc", "12abc", "inf", "nan", "1,5", "0x", "-0x10", "0b102", "1_000"] {
            assert_eq!(coerce(raw), None, "{raw:?} should not coerce");
        }
    }

    #[test]
    fn empty_and_blank_entries_are_zero() {
        assert_eq!(coerce(""), Some(0.0));
        assert_eq!(coerce("   "), Some(0.0));
    }

    #[test]
    fn clamp_is_idempotent_inside_range() {
        for v in [0.0, 0.5, 42.0, 99.99, 100.0] {
            assert_eq!(clamp(v), v);
            assert_eq!(clamp(clamp(v)), v);
        }
        assert_eq!(clamp(150.0), 100.0);
        assert_eq!(clamp(-5.0), 0.0);
        assert_eq!(clamp(f64::INFINITY), 100.0);
    }

    #[test]
    fn effective_treats_garbage_as_zero() {
        assert_eq!(effective("abc"), 0.0);
        assert_eq!(effective("250"), 100.0);
        assert_eq!(effective("-3"), 0.0);
    }

    #[test]
    fn to_fixed_rounds_ties_away_from_zero() {
        assert_eq!(to_fixed(80.0, 2), "80.00");
        assert_eq!(to_fixed(160.0 / 3.0, 2), "53.33");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(-0.125, 2), "-0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(-0.0, 2), "0.00");
        assert_eq!(to_fixed(f64::NAN, 2), "NaN");
    }

    #[test]
    fn to_fixed_rounds_the_stored_value_when_not_a_tie() {
        // Expected strings are what `Number.prototype.toFixed` prints.
        let cases = [
            (72.345, 2, "72.34"),
            (0.015, 2, "0.01"),
            (199.975, 2, "199.97"),
            (1.005, 2, "1.00"),
            (8.345, 2, "8.35"),
            (-72.345, 2, "-72.34"),
            (0.1 + 0.2, 2, "0.30"),
            (1.45, 1, "1.4"),
            (1.55, 1, "1.6"),
            (72.375, 2, "72.38"),
        ];
        for (value, digits, expected) in cases {
            assert_eq!(to_fixed(value, digits), expected, "{value}.toFixed({digits})");
        }
    }

    #[test]
    fn exact_ties_are_only_true_half_way_points() {
        assert!(is_exact_tie(0.125, 2));
        assert!(is_exact_tie(2.5, 0));
        assert!(is_exact_tie(72.375, 2));
        assert!(!is_exact_tie(72.345, 2));
        assert!(!is_exact_tie(0.015, 2));
        assert!(!is_exact_tie(0.25, 2));
        assert!(!is_exact_tie(1e300, 2));
    }

    #[test]
    fn number_text_matches_form_output() {
        assert_eq!(number_text(100.0), "100");
        assert_eq!(number_text(7.5), "7.5");
        assert_eq!(number_text(-0.0), "0");
    }
}
