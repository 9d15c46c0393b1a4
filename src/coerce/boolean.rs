use crate::value::Value;

/// Permissive boolean filter for lenient `bool` fields.
///
/// Only integers and strings are filtered. Strings are trimmed and compared
/// case-insensitively; integers are read as their decimal spelling, so only
/// `1` and `0` pass. Everything else yields `None`.
pub fn filter_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Int(i) => filter_str(&i.to_string()),
        Value::String(s) => filter_str(s),
        _ => None,
    }
}

fn filter_str(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_and_falsy_spellings() {
        for s in ["1", "true", "TRUE", " on ", "Yes"] {
            assert_eq!(filter_bool(&Value::String(s.into())), Some(true), "{s:?}");
        }
        for s in ["0", "false", "Off", "no", "", "  "] {
            assert_eq!(filter_bool(&Value::String(s.into())), Some(false), "{s:?}");
        }
        assert_eq!(filter_bool(&Value::String("not-a-bool".into())), None);
    }

    #[test]
    fn only_zero_and_one_integers() {
        assert_eq!(filter_bool(&Value::Int(1)), Some(true));
        assert_eq!(filter_bool(&Value::Int(0)), Some(false));
        assert_eq!(filter_bool(&Value::Int(123)), None);
        assert_eq!(filter_bool(&Value::Int(-1)), None);
    }

    #[test]
    fn other_kinds_never_pass() {
        assert_eq!(filter_bool(&Value::Null), None);
        assert_eq!(filter_bool(&Value::float(1.0)), None);
        assert_eq!(filter_bool(&Value::List(vec![Value::Int(1)])), None);
        assert_eq!(filter_bool(&Value::object("stdClass")), None);
    }
}
