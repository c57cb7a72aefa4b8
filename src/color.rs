use anyhow::{bail, Result};
use palette::{FromColor, Hsl, Srgb};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Core color type used throughout the engine.
/// Wraps sRGB u8 components and provides conversions to and from HSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in whole degrees, saturation and lightness in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HslTriple {
    pub h: u16,
    pub s: u8,
    pub l: u8,
}

impl HslTriple {
    pub const fn new(h: u16, s: u8, l: u8) -> Self {
        Self { h, s, l }
    }
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800` or `#FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            bail!(
                "invalid hex color: expected 6 hex digits, got {}",
                hex.len()
            );
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("invalid hex color: non-hex digit in {hex:?}");
        }
        let r = u8::from_str_radix(&hex[0..2], 16)?;
        let g = u8::from_str_radix(&hex[2..4], 16)?;
        let b = u8::from_str_radix(&hex[4..6], 16)?;
        Ok(Self { r, g, b })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build a color from HSL (`h` in degrees, `s`/`l` in percent) plus a
    /// signed brightness offset added to the lightness.
    ///
    /// Lightness is clamped to [0, 100] after the offset is applied. Hue is
    /// wrapped into [0, 360). Never fails.
    pub fn from_hsl(h: f32, s: f32, l: f32, brightness: f32) -> Self {
        let hue = h.rem_euclid(360.0);
        let saturation = s.clamp(0.0, 100.0) / 100.0;
        let lightness = (l + brightness).clamp(0.0, 100.0) / 100.0;
        let hsl: Hsl = Hsl::new(hue, saturation, lightness);
        Self::from_srgb_f32_clamped(Srgb::from_color(hsl))
    }

    /// Convert to HSL, rounding hue to the nearest degree and saturation and
    /// lightness to the nearest percent.
    pub fn to_hsl(self) -> HslTriple {
        let srgb: Srgb<f32> = Srgb::new(self.r, self.g, self.b).into_format();
        let hsl: Hsl = Hsl::from_color(srgb);
        let h = hsl.hue.into_positive_degrees().round() as u16 % 360;
        let s = (hsl.saturation.clamp(0.0, 1.0) * 100.0).round() as u8;
        let l = (hsl.lightness.clamp(0.0, 1.0) * 100.0).round() as u8;
        HslTriple { h, s, l }
    }

    /// Clamp an Srgb<f32> to [0, 1] and convert to Color.
    fn from_srgb_f32_clamped(srgb: Srgb<f32>) -> Self {
        let r = (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g = (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b = (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b }
    }

    /// WCAG 2.0 relative luminance.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(self) -> f32 {
        fn linearize(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}

/// Circular distance between two hues in degrees, in [0, 180].
pub fn hue_distance(a: u16, b: u16) -> u16 {
    let diff = (i32::from(a) - i32::from(b)).unsigned_abs() % 360;
    diff.min(360 - diff) as u16
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if !raw.starts_with('#') {
            return Err(serde::de::Error::custom(format!(
                "invalid hex color {raw:?}: missing '#'"
            )));
        }
        Color::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}
