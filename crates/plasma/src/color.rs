//! Hex color parsing for the kernel tint.

/// Normalized RGB triple, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Returned for any color string that is not six hex digits.
pub const FALLBACK_COLOR: Rgb = Rgb::new(1.0, 0.5, 0.2);

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Formats the color as `#rrggbb`, rounding each channel to a byte.
    pub fn to_hex(self) -> String {
        let byte = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.r),
            byte(self.g),
            byte(self.b)
        )
    }
}

/// Parses `#rrggbb` or `rrggbb` (any case) into a normalized triple.
///
/// Malformed input never fails: it logs a warning and yields
/// [`FALLBACK_COLOR`].
pub fn parse_hex_color(value: &str) -> Rgb {
    match try_parse_hex(value) {
        Some(color) => color,
        None => {
            tracing::warn!(value, "malformed hex color; using fallback tint");
            FALLBACK_COLOR
        }
    }
}

fn try_parse_hex(value: &str) -> Option<Rgb> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .ok()
            .map(|byte| f32::from(byte) / 255.0)
    };
    Some(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
