//! Background color handling
//!
//! Colors are stored as CSS `rgba(r, g, b, 0.4)` strings. Anything else
//! (hex from a color picker, older data with a different alpha) is
//! normalized to that form.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

use crate::serde_defaults::BACKGROUND_ALPHA;

use super::TimerError;

/// Dark tones that keep white text readable
pub const PALETTE: [[u8; 3]; 8] = [
    [30, 30, 30],
    [25, 25, 112],
    [139, 0, 0],
    [0, 100, 0],
    [139, 69, 19],
    [75, 0, 130],
    [128, 0, 128],
    [0, 0, 139],
];

/// Render RGB channels as the canonical background token
pub fn to_background(rgb: [u8; 3]) -> String {
    format!("rgba({}, {}, {}, {})", rgb[0], rgb[1], rgb[2], BACKGROUND_ALPHA)
}

/// Pick a palette color at random
pub fn random_background() -> String {
    // Fresh per-instance seed
    let seed = RandomState::new().build_hasher().finish();
    to_background(PALETTE[(seed % PALETTE.len() as u64) as usize])
}

/// Parse `#rgb`, `#rrggbb`, `rgb(...)` or `rgba(...)` into RGB channels.
///
/// The alpha of `rgba(...)` is validated but discarded.
pub fn parse_rgb(input: &str) -> Result<[u8; 3], TimerError> {
    let malformed = || TimerError::MalformedColor {
        input: input.to_string(),
    };
    let trimmed = input.trim();

    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(malformed);
    }

    let lower = trimmed.to_ascii_lowercase();
    let (body, expected_parts) = if let Some(rest) = lower.strip_prefix("rgba(") {
        (rest, 4)
    } else if let Some(rest) = lower.strip_prefix("rgb(") {
        (rest, 3)
    } else {
        return Err(malformed());
    };
    let body = body.strip_suffix(')').ok_or_else(malformed)?;

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != expected_parts {
        return Err(malformed());
    }

    let mut rgb = [0u8; 3];
    for (channel, part) in rgb.iter_mut().zip(&parts) {
        *channel = part.parse::<u8>().map_err(|_| malformed())?;
    }
    if expected_parts == 4 {
        let alpha: f32 = parts[3].parse().map_err(|_| malformed())?;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(malformed());
        }
    }
    Ok(rgb)
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (channel, c) in rgb.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *channel = v * 16 + v;
            }
            Some(rgb)
        }
        6 => Some([
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        ]),
        _ => None,
    }
}

/// Normalize a color to the canonical alpha.
///
/// Unparseable input is replaced by a freshly picked palette color.
pub fn normalize_color(input: &str) -> String {
    match parse_rgb(input) {
        Ok(rgb) => to_background(rgb),
        Err(err) => {
            tracing::warn!(error = %err, "Replacing background color");
            random_background()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_color_is_unchanged() {
        let color = "rgba(25, 25, 112, 0.4)";
        assert_eq!(normalize_color(color), color);
    }

    #[test]
    fn foreign_alpha_is_replaced() {
        assert_eq!(normalize_color("rgba(139,0,0,1)"), "rgba(139, 0, 0, 0.4)");
        assert_eq!(normalize_color("rgb(0, 100, 0)"), "rgba(0, 100, 0, 0.4)");
    }

    #[test]
    fn hex_colors_are_converted() {
        assert_eq!(normalize_color("#4b0082"), "rgba(75, 0, 130, 0.4)");
        assert_eq!(normalize_color("#fff"), "rgba(255, 255, 255, 0.4)");
    }

    #[test]
    fn garbage_falls_back_to_palette() {
        let color = normalize_color("not-a-color");
        assert!(PALETTE.iter().any(|rgb| to_background(*rgb) == color));
        assert!(parse_rgb("rgba(300, 0, 0, 0.4)").is_err());
        assert!(parse_rgb("rgba(1, 2, 3)").is_err());
        assert!(parse_rgb("#12345").is_err());
    }
}
