// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Semantic labels assigned to cells and regions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semantic class of a cell or region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Sky,
    Water,
    Canopy,
    Vegetation,
    Structure,
    Ground,
    Snow,
    Rock,
    Object,
}

impl Label {
    pub const ALL: [Label; 9] = [
        Label::Sky,
        Label::Water,
        Label::Canopy,
        Label::Vegetation,
        Label::Structure,
        Label::Ground,
        Label::Snow,
        Label::Rock,
        Label::Object,
    ];

    /// Stable snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Sky => "sky",
            Label::Water => "water",
            Label::Canopy => "canopy",
            Label::Vegetation => "vegetation",
            Label::Structure => "structure",
            Label::Ground => "ground",
            Label::Snow => "snow",
            Label::Rock => "rock",
            Label::Object => "object",
        }
    }

    /// Name used in natural-language descriptions.
    pub fn human_name(&self) -> &'static str {
        match self {
            Label::Sky => "sky",
            Label::Water => "water",
            Label::Canopy => "tree canopy",
            Label::Vegetation => "vegetation",
            Label::Structure => "vertical structure",
            Label::Ground => "ground",
            Label::Snow => "snow",
            Label::Rock => "rock",
            Label::Object => "object",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| format!("unknown label: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_ids_roundtrip() {
        for label in Label::ALL {
            assert_eq!(label.as_str().parse::<Label>(), Ok(label));
            assert_eq!(label.to_string(), label.as_str());
        }
        assert!("lava".parse::<Label>().is_err());
    }
}
