// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-cell classification as an ordered rule table.
//!
//! Each [`Rule`] pairs a predicate over [`CellFeatures`] with a label and a
//! fixed confidence. [`classify_cell`] evaluates [`RULES`] top to bottom and
//! the first match wins. The last rule always matches.

use scenegrid_core::{Cell, Grid};

use crate::label::Label;
use crate::region::SegmentationConfig;

/// Normalised height band of a cell within the grid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeightBand {
    Low,
    Mid,
    High,
}

/// Features the classification rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellFeatures {
    /// Hue in degrees, `[0, 360)`.
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub luminance: f32,
    /// Mean point height normalised to `[0, 1]` within the grid bounds.
    pub normalized_height: f64,
    pub band: HeightBand,
    /// The occupied extent is tall relative to the nominal cell height and
    /// not wider than it is tall.
    pub vertical: bool,
}

impl CellFeatures {
    /// Extracts classification features for an occupied cell.
    pub fn from_cell(cell: &Cell, grid: &Grid, config: &SegmentationConfig) -> Self {
        let (hue, saturation, lightness) = cell.mean_color.to_hsl();
        let normalized_height = grid.normalized(&cell.mean_position).y.clamp(0.0, 1.0);

        let band = if normalized_height < config.low_height {
            HeightBand::Low
        } else if normalized_height < config.high_height {
            HeightBand::Mid
        } else {
            HeightBand::High
        };

        let extent = cell.occupied_size();
        let nominal_height = grid.cell_size().y;
        let vertical = nominal_height > 0.0
            && extent.y >= config.vertical_extent_fraction * nominal_height
            && extent.y >= extent.x
            && extent.y >= extent.z;

        Self {
            hue,
            saturation,
            lightness,
            luminance: cell.mean_color.luminance(),
            normalized_height,
            band,
            vertical,
        }
    }

    #[inline]
    fn hue_in(&self, lo: f32, hi: f32) -> bool {
        self.hue >= lo && self.hue <= hi
    }

    #[inline]
    fn is_blue(&self) -> bool {
        self.hue_in(180.0, 250.0)
    }

    #[inline]
    fn is_green(&self) -> bool {
        self.hue_in(60.0, 170.0)
    }

    #[inline]
    fn is_earthy(&self) -> bool {
        self.hue_in(15.0, 60.0)
    }
}

/// One entry of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Identifier reported alongside the classification.
    pub name: &'static str,
    pub label: Label,
    pub confidence: f32,
    pub predicate: fn(&CellFeatures) -> bool,
}

/// Outcome of classifying one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: Label,
    pub confidence: f32,
    /// Name of the rule that matched.
    pub rule: &'static str,
}

/// Classification rules in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "blue_sky",
        label: Label::Sky,
        confidence: 0.80,
        predicate: |f| {
            f.band == HeightBand::High && f.is_blue() && f.saturation >= 0.2 && f.lightness >= 0.45
        },
    },
    Rule {
        name: "overcast_sky",
        label: Label::Sky,
        confidence: 0.55,
        predicate: |f| f.band == HeightBand::High && f.lightness >= 0.8 && f.saturation < 0.15,
    },
    Rule {
        name: "water",
        label: Label::Water,
        confidence: 0.70,
        predicate: |f| f.band == HeightBand::Low && f.is_blue() && f.saturation >= 0.25,
    },
    Rule {
        name: "canopy",
        label: Label::Canopy,
        confidence: 0.75,
        predicate: |f| f.band == HeightBand::High && f.is_green() && f.saturation >= 0.15,
    },
    Rule {
        name: "vegetation",
        label: Label::Vegetation,
        confidence: 0.80,
        predicate: |f| f.is_green() && f.saturation >= 0.15,
    },
    Rule {
        name: "structure",
        label: Label::Structure,
        confidence: 0.65,
        predicate: |f| f.vertical && f.saturation < 0.25,
    },
    Rule {
        name: "ground",
        label: Label::Ground,
        confidence: 0.70,
        predicate: |f| f.band == HeightBand::Low && (f.is_earthy() || f.saturation < 0.25),
    },
    Rule {
        name: "snow",
        label: Label::Snow,
        confidence: 0.60,
        predicate: |f| f.luminance >= 0.85 && f.saturation < 0.10,
    },
    Rule {
        name: "rock",
        label: Label::Rock,
        confidence: 0.55,
        predicate: |f| f.saturation < 0.15 && (0.2..=0.7).contains(&f.lightness),
    },
    CATCH_ALL,
];

/// Final entry of [`RULES`]; matches every cell.
const CATCH_ALL: Rule = Rule {
    name: "object",
    label: Label::Object,
    confidence: 0.30,
    predicate: |_| true,
};

/// Classifies a cell by the first matching rule in [`RULES`].
pub fn classify_cell(features: &CellFeatures) -> Classification {
    let rule = RULES
        .iter()
        .find(|rule| (rule.predicate)(features))
        .unwrap_or(&CATCH_ALL);
    Classification {
        label: rule.label,
        confidence: rule.confidence,
        rule: rule.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenegrid_core::Rgb;

    fn features(color: Rgb, band: HeightBand, vertical: bool) -> CellFeatures {
        let (hue, saturation, lightness) = color.to_hsl();
        CellFeatures {
            hue,
            saturation,
            lightness,
            luminance: color.luminance(),
            normalized_height: match band {
                HeightBand::Low => 0.1,
                HeightBand::Mid => 0.5,
                HeightBand::High => 0.9,
            },
            band,
            vertical,
        }
    }

    fn rule_for(color: Rgb, band: HeightBand, vertical: bool) -> &'static str {
        classify_cell(&features(color, band, vertical)).rule
    }

    #[test]
    fn last_rule_is_catch_all() {
        let last = RULES.last().unwrap();
        assert_eq!(last.label, Label::Object);
        assert_eq!(last.name, CATCH_ALL.name);
        assert!((last.predicate)(&features(Rgb::new(0.9, 0.1, 0.5), HeightBand::Mid, false)));
    }

    #[test]
    fn sky_rules() {
        assert_eq!(rule_for(Rgb::new(0.4, 0.6, 0.95), HeightBand::High, false), "blue_sky");
        assert_eq!(rule_for(Rgb::new(0.9, 0.9, 0.92), HeightBand::High, false), "overcast_sky");
        // Blue at mid height is not sky.
        assert_ne!(
            classify_cell(&features(Rgb::new(0.4, 0.6, 0.95), HeightBand::Mid, false)).label,
            Label::Sky
        );
    }

    #[test]
    fn water_only_low() {
        assert_eq!(rule_for(Rgb::new(0.1, 0.3, 0.7), HeightBand::Low, false), "water");
    }

    #[test]
    fn green_splits_on_height() {
        let green = Rgb::new(0.2, 0.6, 0.2);
        assert_eq!(rule_for(green, HeightBand::High, false), "canopy");
        assert_eq!(rule_for(green, HeightBand::Mid, false), "vegetation");
        assert_eq!(rule_for(green, HeightBand::Low, false), "vegetation");
    }

    #[test]
    fn grey_vertical_is_structure() {
        let grey = Rgb::new(0.5, 0.5, 0.52);
        assert_eq!(rule_for(grey, HeightBand::Mid, true), "structure");
        assert_eq!(rule_for(grey, HeightBand::Mid, false), "rock");
        assert_eq!(rule_for(grey, HeightBand::Low, false), "ground");
    }

    #[test]
    fn earthy_low_is_ground() {
        assert_eq!(rule_for(Rgb::new(0.5, 0.35, 0.2), HeightBand::Low, false), "ground");
    }

    #[test]
    fn bright_white_mid_is_snow() {
        assert_eq!(rule_for(Rgb::new(0.95, 0.95, 0.95), HeightBand::Mid, false), "snow");
    }

    #[test]
    fn snow_needs_luminance_not_just_lightness() {
        let mut f = features(Rgb::new(0.95, 0.95, 0.95), HeightBand::Mid, false);
        assert_eq!(classify_cell(&f).rule, "snow");
        f.luminance = 0.6;
        assert_ne!(classify_cell(&f).label, Label::Snow);
    }

    #[test]
    fn saturated_red_falls_through() {
        let c = classify_cell(&features(Rgb::new(0.9, 0.1, 0.1), HeightBand::Mid, false));
        assert_eq!(c.label, Label::Object);
        assert_eq!(c.rule, "object");
    }
}
