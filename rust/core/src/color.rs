// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Linear RGB colour in the unit cube.

use serde::{Deserialize, Serialize};

/// An RGB colour with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Euclidean distance in RGB space. Ranges over `[0, sqrt(3)]`.
    #[inline]
    pub fn distance(&self, other: &Rgb) -> f32 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Returns a copy with every channel clamped to `[0, 1]`.
    pub fn clamped(&self) -> Rgb {
        Rgb::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    /// Rec. 709 relative luminance.
    #[inline]
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Converts to hue (degrees, `[0, 360)`), saturation and lightness.
    pub fn to_hsl(&self) -> (f32, f32, f32) {
        let c = self.clamped();
        let max = c.r.max(c.g).max(c.b);
        let min = c.r.min(c.g).min(c.b);
        let lightness = (max + min) / 2.0;
        let delta = max - min;

        if delta <= f32::EPSILON {
            return (0.0, 0.0, lightness);
        }

        let saturation = delta / (1.0 - (2.0 * lightness - 1.0).abs()).max(f32::EPSILON);

        let hue = if max == c.r {
            60.0 * (((c.g - c.b) / delta).rem_euclid(6.0))
        } else if max == c.g {
            60.0 * ((c.b - c.r) / delta + 2.0)
        } else {
            60.0 * ((c.r - c.g) / delta + 4.0)
        };

        (hue.rem_euclid(360.0), saturation.min(1.0), lightness)
    }

    /// Formats as a 6-digit lowercase hex string without a leading `#`.
    pub fn to_hex(&self) -> String {
        let c = self.clamped();
        format!(
            "{:02x}{:02x}{:02x}",
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8
        )
    }

    /// Parses a 6-digit hex string, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb::from_u8(r, g, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hex_roundtrip() {
        let c = Rgb::from_u8(0x12, 0xab, 0xff);
        assert_eq!(c.to_hex(), "12abff");
        assert_eq!(Rgb::from_hex("#12abff"), Some(c));
        assert_eq!(Rgb::from_hex("12abf"), None);
        assert_eq!(Rgb::from_hex("zzzzzz"), None);
    }

    #[test]
    fn hex_clamps_out_of_range_channels() {
        assert_eq!(Rgb::new(1.5, -0.2, 0.5).to_hex(), "ff0080");
    }

    #[test]
    fn distance_between_extremes() {
        assert_abs_diff_eq!(Rgb::BLACK.distance(&Rgb::WHITE), 3.0f32.sqrt(), epsilon = 1e-6);
        assert_eq!(Rgb::WHITE.distance(&Rgb::WHITE), 0.0);
    }

    #[test]
    fn hsl_primaries() {
        let (h, s, l) = Rgb::new(1.0, 0.0, 0.0).to_hsl();
        assert_abs_diff_eq!(h, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(s, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(l, 0.5, epsilon = 1e-4);

        let (h, _, _) = Rgb::new(0.0, 1.0, 0.0).to_hsl();
        assert_abs_diff_eq!(h, 120.0, epsilon = 1e-4);

        let (h, _, _) = Rgb::new(0.0, 0.0, 1.0).to_hsl();
        assert_abs_diff_eq!(h, 240.0, epsilon = 1e-4);
    }

    #[test]
    fn hsl_grey_has_no_saturation() {
        let (h, s, l) = Rgb::new(0.4, 0.4, 0.4).to_hsl();
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert_abs_diff_eq!(l, 0.4, epsilon = 1e-6);
    }
}
