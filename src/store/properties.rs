//! # Calibration File Codec
//!
//! Renders and parses the line-oriented `key=value` format of the
//! calibration file.
//!
//! The format is deliberately trivial so the file stays human-editable:
//! one remap per line, `#`/`!` comment lines, and a header comment
//! identifying the file. Keys split from values on the first `=`, so
//! device names may contain spaces and values may contain further `=`
//! characters.

use std::collections::BTreeMap;

/// Header comment written at the top of every calibration file.
pub const FILE_HEADER: &str = "Joystick Calibration File";

/// Parses calibration file text into a key/value map.
///
/// Tolerant by design: blank lines, comment lines, and lines without a
/// separator are skipped rather than rejected.
///
/// # Examples
///
/// ```
/// use gamepad_calibrator::store::properties::parse_properties;
///
/// let text = "# Joystick Calibration File\nPadX.Button0=L1\n";
/// let map = parse_properties(text);
/// assert_eq!(map.get("PadX.Button0").map(String::as_str), Some("L1"));
/// ```
#[must_use]
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        entries.insert(key.to_string(), value.trim().to_string());
    }
    entries
}

/// Renders a key/value map as calibration file text.
///
/// Output is deterministic: the header comment, a timestamp comment, then
/// one entry per line in key order.
#[must_use]
pub fn render_properties(entries: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    out.push_str("# ");
    out.push_str(FILE_HEADER);
    out.push('\n');
    out.push_str(&format!(
        "# {}\n",
        chrono::Local::now().format("%a %b %d %H:%M:%S %Y")
    ));
    for (key, value) in entries {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}
