//! Marker grammar shared by every model-output parser
//!
//! Model responses are line oriented. A line of the form `MARKER: value`
//! is routed through a dispatch table to the setter registered for
//! `MARKER`; every other line is ignored. Markers are case-sensitive and
//! a repeated marker overwrites the earlier value.

use std::str::FromStr;

/// Literal the model uses for "intentionally absent"
pub const NOT_APPLICABLE: &str = "N/A";

/// Writes one trimmed marker value into the record being built
pub type Setter<T> = fn(&mut T, &str);

/// Marker name to setter
pub type MarkerTable<T> = [(&'static str, Setter<T>)];

/// Run every line of `text` through `table`, mutating `target` in place.
pub fn apply_markers<T>(table: &MarkerTable<T>, target: &mut T, text: &str) {
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if let Some(set) = lookup(table, key) {
            set(target, value.trim());
        }
    }
}

fn lookup<T>(table: &MarkerTable<T>, key: &str) -> Option<Setter<T>> {
    table
        .iter()
        .find(|(marker, _)| *marker == key)
        .map(|(_, set)| *set)
}

/// Split a multi-value field on `|`, dropping blanks and `N/A`
pub fn split_values(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != NOT_APPLICABLE)
        .map(str::to_string)
        .collect()
}

/// `None` for `N/A` or an empty value
pub fn optional_value(value: &str) -> Option<String> {
    match value.trim() {
        "" | NOT_APPLICABLE => None,
        v => Some(v.to_string()),
    }
}

/// First whitespace-delimited token parsed as `T`
pub fn leading_token<T: FromStr>(value: &str) -> Option<T> {
    value.split_whitespace().next()?.parse().ok()
}

/// Leading run of ASCII digits, so `85/100` and `7 (high)` both read as numbers
pub fn leading_digits(value: &str) -> Option<u32> {
    let value = value.trim_start();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

/// Score clamped into `min..=max`, or `default` when none can be read
pub fn score(value: &str, min: u8, max: u8, default: u8) -> u8 {
    match leading_digits(value) {
        Some(n) => n.clamp(u32::from(min), u32::from(max)) as u8,
        None => default,
    }
}
