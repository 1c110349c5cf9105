//! Turns a colour specification into the normalised `iMainColor` vector.
//!
//! Parsing yields one of two shapes. Array-like channel lists are taken as
//! already normalised and copied through; packed `0xAARRGGBB` integers are
//! split into bytes and divided by 255. Resolution never fails: a bad
//! specification logs one warning and yields [`FALLBACK_COLOR`].

use crate::types::ColorVector;

/// Muted blue substituted for colours that cannot be parsed.
pub const FALLBACK_COLOR: ColorVector = [0.3, 0.6, 1.0];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("color specification is empty")]
    Empty,
    #[error("invalid hex color '{0}'")]
    InvalidHex(String),
    #[error("invalid rgb() color '{0}'")]
    InvalidRgb(String),
    #[error("invalid channel list '{0}'")]
    InvalidChannels(String),
    #[error("unrecognised color '{0}'")]
    Unknown(String),
}

/// Raw result of parsing a colour specification.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedColor {
    /// Indexable channel values, expected in `[0, 1]`. May hold fewer than
    /// three entries.
    Channels(Vec<f32>),
    /// `0xAARRGGBB`.
    Packed(u32),
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0xFF00_0000),
    ("silver", 0xFFC0_C0C0),
    ("gray", 0xFF80_8080),
    ("grey", 0xFF80_8080),
    ("white", 0xFFFF_FFFF),
    ("maroon", 0xFF80_0000),
    ("red", 0xFFFF_0000),
    ("purple", 0xFF80_0080),
    ("fuchsia", 0xFFFF_00FF),
    ("magenta", 0xFFFF_00FF),
    ("green", 0xFF00_8000),
    ("lime", 0xFF00_FF00),
    ("olive", 0xFF80_8000),
    ("yellow", 0xFFFF_FF00),
    ("navy", 0xFF00_0080),
    ("blue", 0xFF00_00FF),
    ("teal", 0xFF00_8080),
    ("aqua", 0xFF00_FFFF),
    ("cyan", 0xFF00_FFFF),
    ("orange", 0xFFFF_A500),
    ("pink", 0xFFFF_C0CB),
    ("transparent", 0x0000_0000),
];

/// Parses a colour specification.
///
/// Supports:
/// - Hex: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
/// - `rgb(r, g, b)` and `rgba(r, g, b, a)` with 0-255 channels and 0-1 alpha
/// - CSS basic named colours
/// - Normalised channel lists: `[r, g, b]`, one to four entries
pub fn parse_color(spec: &str) -> Result<ParsedColor, ColorError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(ColorError::Empty);
    }

    if let Some(hex) = spec.strip_prefix('#') {
        return parse_hex(hex).map(ParsedColor::Packed);
    }

    if let Some(inner) = spec.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return parse_channel_list(inner).map(ParsedColor::Channels);
    }

    let lower = spec.to_ascii_lowercase();
    if let Some(inner) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|s| s.strip_suffix(')'))
    {
        let has_alpha = lower.starts_with("rgba(");
        return parse_rgb_function(inner, has_alpha, spec).map(ParsedColor::Packed);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, packed)| ParsedColor::Packed(*packed))
        .ok_or_else(|| ColorError::Unknown(spec.to_string()))
}

/// Converts a parse result into a normalised vector.
///
/// Channel lists are not divided by 255; missing channels read as 0 and
/// out-of-range values are clamped. Packed values use bits `[16:24)`,
/// `[8:16)` and `[0:8)`; alpha is ignored.
pub fn decode(parsed: &ParsedColor) -> ColorVector {
    match parsed {
        ParsedColor::Channels(values) => {
            let channel = |index: usize| values.get(index).copied().unwrap_or(0.0).clamp(0.0, 1.0);
            [channel(0), channel(1), channel(2)]
        }
        ParsedColor::Packed(packed) => {
            let byte = |shift: u32| ((packed >> shift) & 0xFF) as f32 / 255.0;
            [byte(16), byte(8), byte(0)]
        }
    }
}

pub fn try_resolve_color(spec: &str) -> Result<ColorVector, ColorError> {
    parse_color(spec).map(|parsed| decode(&parsed))
}

/// Resolves a colour, handing any parse error to `on_failure` and returning
/// [`FALLBACK_COLOR`] in that case.
pub fn resolve_color_with<F>(spec: &str, on_failure: F) -> ColorVector
where
    F: FnOnce(&ColorError),
{
    match try_resolve_color(spec) {
        Ok(vector) => vector,
        Err(err) => {
            on_failure(&err);
            FALLBACK_COLOR
        }
    }
}

pub fn resolve_color(spec: &str) -> ColorVector {
    resolve_color_with(spec, |err| {
        tracing::warn!(spec, error = %err, "color parsing failed; using fallback color");
    })
}

fn parse_hex(hex: &str) -> Result<u32, ColorError> {
    let make_err = || ColorError::InvalidHex(format!("#{hex}"));
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(make_err());
    }

    let nibble = |index: usize| -> Result<u32, ColorError> {
        let digit = u32::from_str_radix(&hex[index..index + 1], 16).map_err(|_| make_err())?;
        Ok(digit * 17)
    };
    let byte = |index: usize| -> Result<u32, ColorError> {
        u32::from_str_radix(&hex[index..index + 2], 16).map_err(|_| make_err())
    };

    let (a, r, g, b) = match hex.len() {
        3 => (0xFF, nibble(0)?, nibble(1)?, nibble(2)?),
        4 => (nibble(3)?, nibble(0)?, nibble(1)?, nibble(2)?),
        6 => (0xFF, byte(0)?, byte(2)?, byte(4)?),
        8 => (byte(6)?, byte(0)?, byte(2)?, byte(4)?),
        _ => return Err(make_err()),
    };
    Ok(pack(a, r, g, b))
}

fn parse_rgb_function(inner: &str, has_alpha: bool, original: &str) -> Result<u32, ColorError> {
    let make_err = || ColorError::InvalidRgb(original.to_string());
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let expected = if has_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return Err(make_err());
    }

    let channel = |raw: &str| raw.parse::<u8>().map(u32::from).map_err(|_| make_err());
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if has_alpha {
        let alpha: f32 = parts[3].parse().map_err(|_| make_err())?;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(make_err());
        }
        (alpha * 255.0).round() as u32
    } else {
        0xFF
    };
    Ok(pack(a, r, g, b))
}

fn parse_channel_list(inner: &str) -> Result<Vec<f32>, ColorError> {
    let make_err = || ColorError::InvalidChannels(format!("[{inner}]"));
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let values = inner
        .split(',')
        .map(|raw| {
            raw.trim()
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(make_err)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() > 4 {
        return Err(make_err());
    }
    Ok(values)
}

fn pack(a: u32, r: u32, g: u32, b: u32) -> u32 {
    (a << 24) | (r << 16) | (g << 8) | b
}
