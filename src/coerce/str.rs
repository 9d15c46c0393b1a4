/// String spelling of a scalar accepted by a `string` field.
pub fn bool_to_string(b: bool) -> String {
    if b { "1".to_string() } else { String::new() }
}

/// Shortest round-trip form; integral floats drop the fraction (`2.0` → `"2"`).
pub fn float_to_string(f: f64) -> String {
    format!("{f}")
}
