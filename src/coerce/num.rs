use once_cell::sync::Lazy;
use regex::Regex;

// Leading and trailing whitespace are allowed, as is a bare `.5` or `5.`.
// ASCII digits only.
static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t\n\r\x0B\x0C]*[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?[ \t\n\r\x0B\x0C]*$")
        .expect("valid regex")
});

static INTEGRAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid regex"));

const I64_LOWER: f64 = -9_223_372_036_854_775_808.0; // -2^63
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;  //  2^63, exclusive

fn trim(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C'))
}

pub fn is_numeric(s: &str) -> bool { NUMERIC.is_match(s) }

/// Numeric string → float. `None` for anything that is not a numeric string.
pub fn parse_float(s: &str) -> Option<f64> {
    if !is_numeric(s) {
        return None;
    }
    trim(s).parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Numeric string → integer, provided the number it spells is integral and
/// fits in `i64` (`"42"`, `"4.2e1"`, `" 7 "`).
pub fn parse_int(s: &str) -> Option<i64> {
    if !is_numeric(s) {
        return None;
    }
    let t = trim(s);
    if INTEGRAL.is_match(t) {
        if let Ok(i) = t.parse::<i64>() {
            return Some(i);
        }
    }
    parse_float(s).and_then(float_to_int)
}

/// Lossless float → integer.
pub fn float_to_int(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings() {
        for s in ["42", "-7", "+3", " 42", "42 ", "3.14", ".5", "5.", "1e3", "-2.5E-2"] {
            assert!(is_numeric(s), "{s:?} is numeric");
        }
        for s in ["", " ", "abc", "not a number", "0x1A", "inf", "NaN", "1e", "--1", "1 2", "4,2", "٤٢", "４２"] {
            assert!(!is_numeric(s), "{s:?} is not numeric");
        }
    }

    #[test]
    fn non_ascii_digits_are_not_numbers() {
        assert_eq!(parse_int("٤٢"), None);
        assert_eq!(parse_float("١.٥"), None);
        assert_eq!(parse_int("४२"), None);
    }

    #[test]
    fn ints_from_strings() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int(" -42\n"), Some(-42));
        assert_eq!(parse_int("4.2e1"), Some(42));
        assert_eq!(parse_int("42.0"), Some(42));
        assert_eq!(parse_int("42.5"), None);
        assert_eq!(parse_int("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_int("99999999999999999999"), None);
    }

    #[test]
    fn floats_to_ints() {
        assert_eq!(float_to_int(3.0), Some(3));
        assert_eq!(float_to_int(-0.0), Some(0));
        assert_eq!(float_to_int(3.5), None);
        assert_eq!(float_to_int(f64::NAN), None);
        assert_eq!(float_to_int(1e19), None);
    }
}
