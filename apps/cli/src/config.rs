// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

use scenegrid_context::ContextConfig;
use scenegrid_core::GridConfig;
use scenegrid_segmentation::SegmentationConfig;
use scenegrid_selection::SelectionConfig;

/// Pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub grid: GridConfig,
    pub segmentation: SegmentationConfig,
    pub selection: SelectionConfig,
    pub context: ContextConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(resolution) = lookup("SCENEGRID_RESOLUTION").and_then(|v| parse_resolution(&v))
        {
            config.grid.resolution = resolution;
        }
        if let Some(bottom) = parsed(&lookup, "SCENEGRID_CROP_BOTTOM") {
            config.grid.vertical_crop.0 = bottom;
        }
        if let Some(top) = parsed(&lookup, "SCENEGRID_CROP_TOP") {
            config.grid.vertical_crop.1 = top;
        }
        if let Some(min_points) = parsed(&lookup, "SCENEGRID_MIN_CELL_POINTS") {
            config.segmentation.min_cell_points = min_points;
            config.context.min_cell_points = min_points;
        }
        if let Some(max_cells) = parsed(&lookup, "SCENEGRID_MAX_CELLS") {
            config.context.max_cells = max_cells;
        }
        if let Some(threshold) = parsed(&lookup, "SCENEGRID_COLOR_THRESHOLD") {
            config.selection.color_distance_threshold = threshold;
        }
        if let Some(flag) = lookup("SCENEGRID_FLOOR_PROTECTION") {
            match flag.trim() {
                "0" | "false" | "off" => config.selection.floor_protection = None,
                "1" | "true" | "on" => {
                    config.selection.floor_protection.get_or_insert_with(Default::default);
                }
                other => tracing::warn!(value = other, "Ignoring SCENEGRID_FLOOR_PROTECTION"),
            }
        }

        config
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparsable setting");
            None
        }
    }
}

/// Parses `"20,20,20"`, or a single value applied to every axis.
fn parse_resolution(raw: &str) -> Option<[u32; 3]> {
    let parts: Vec<u32> = raw
        .split(',')
        .map(|s| s.trim().parse())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        &[n] => Some([n, n, n]),
        &[x, y, z] => Some([x, y, z]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config_from(&[]);
        assert_eq!(config.grid.resolution, [20, 20, 20]);
        assert_eq!(config.grid.vertical_crop, (0.1, 0.1));
        assert_eq!(config.context.max_cells, 600);
        assert!(config.selection.floor_protection.is_some());
    }

    #[test]
    fn variables_override_defaults() {
        let config = config_from(&[
            ("SCENEGRID_RESOLUTION", "32, 16, 32"),
            ("SCENEGRID_CROP_BOTTOM", "0.05"),
            ("SCENEGRID_CROP_TOP", "0"),
            ("SCENEGRID_MIN_CELL_POINTS", "4"),
            ("SCENEGRID_MAX_CELLS", "100"),
            ("SCENEGRID_COLOR_THRESHOLD", "0.4"),
            ("SCENEGRID_FLOOR_PROTECTION", "0"),
        ]);
        assert_eq!(config.grid.resolution, [32, 16, 32]);
        assert_eq!(config.grid.vertical_crop, (0.05, 0.0));
        assert_eq!(config.segmentation.min_cell_points, 4);
        assert_eq!(config.context.min_cell_points, 4);
        assert_eq!(config.context.max_cells, 100);
        assert_eq!(config.selection.color_distance_threshold, 0.4);
        assert!(config.selection.floor_protection.is_none());
    }

    #[test]
    fn bad_values_fall_back() {
        let config = config_from(&[
            ("SCENEGRID_RESOLUTION", "10,10"),
            ("SCENEGRID_MAX_CELLS", "lots"),
            ("SCENEGRID_FLOOR_PROTECTION", "maybe"),
        ]);
        assert_eq!(config.grid.resolution, [20, 20, 20]);
        assert_eq!(config.context.max_cells, 600);
        assert!(config.selection.floor_protection.is_some());
    }

    #[test]
    fn single_resolution_applies_to_all_axes() {
        assert_eq!(parse_resolution("8"), Some([8, 8, 8]));
        assert_eq!(parse_resolution("a,b,c"), None);
    }
}
