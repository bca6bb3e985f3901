//! PIN and file name checks
//!
//! Every name that reaches the filesystem must be a single plain path
//! component so that nothing can resolve outside its PIN directory.

use crate::error::{Error, Result};

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn is_plain_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c: char| is_separator(c) || c == '\0')
}

/// Reduce a client-supplied upload name to its final path component.
///
/// `a/../../etc/passwd` becomes `passwd`. Names that reduce to nothing
/// usable (`""`, `.`, `..`) are rejected.
pub fn base_name(raw: &str) -> Result<String> {
    let name = raw
        .trim_end_matches(is_separator)
        .rsplit(is_separator)
        .next()
        .unwrap_or_default();

    if !is_plain_component(name) {
        return Err(Error::InvalidFileName(raw.to_string()));
    }
    Ok(name.to_string())
}

/// Check a PIN path segment.
///
/// PINs are free-form unless `strict` is set, in which case they must be
/// 6 to 8 ASCII digits.
pub fn validate_pin(pin: &str, strict: bool) -> Result<()> {
    if !is_plain_component(pin) {
        return Err(Error::InvalidPin(pin.to_string()));
    }
    if strict && !((6..=8).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit())) {
        return Err(Error::InvalidPin(pin.to_string()));
    }
    Ok(())
}

/// Check a download file name segment
pub fn validate_file_name(name: &str) -> Result<()> {
    if is_plain_component(name) {
        Ok(())
    } else {
        Err(Error::InvalidFileName(name.to_string()))
    }
}
