// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ASCII point cloud reader.
//!
//! One point per line: `x y z r g b [validity]`, whitespace separated.
//! Colours are taken as 0-255 when any channel of the line exceeds 1.
//! Blank lines and lines starting with `#` are ignored.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use scenegrid_core::{Point3, PointBuffer, Rgb};

/// Points read from a file, plus how many lines were rejected.
pub struct ParsedPoints {
    pub buffer: PointBuffer,
    pub skipped_lines: usize,
}

pub fn load(path: &Path) -> Result<ParsedPoints> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read point file {}", path.display()))?;
    Ok(parse_points(&text))
}

pub fn parse_points(text: &str) -> ParsedPoints {
    let mut buffer = PointBuffer::new();
    let mut skipped_lines = 0;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Some((position, color, validity)) => {
                buffer.push(position, color, validity);
            }
            None => {
                skipped_lines += 1;
                tracing::warn!(line = line_no + 1, "Skipping malformed point line");
            }
        }
    }

    if skipped_lines > 0 {
        tracing::warn!(skipped_lines, kept = buffer.len(), "Point file had malformed lines");
    }
    ParsedPoints {
        buffer,
        skipped_lines,
    }
}

fn parse_line(line: &str) -> Option<(Point3<f64>, Rgb, f32)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 6 && fields.len() != 7 {
        return None;
    }
    let mut coords = [0.0f64; 3];
    for (slot, field) in coords.iter_mut().zip(&fields[..3]) {
        *slot = field.parse().ok().filter(|v: &f64| v.is_finite())?;
    }
    let mut channels = [0.0f32; 3];
    for (slot, field) in channels.iter_mut().zip(&fields[3..6]) {
        *slot = field.parse().ok().filter(|v: &f32| v.is_finite())?;
    }
    if channels.iter().any(|&c| c > 1.0) {
        channels.iter_mut().for_each(|c| *c /= 255.0);
    }
    let validity = match fields.get(6) {
        Some(field) => field.parse().ok()?,
        None => 1.0,
    };

    Some((
        Point3::new(coords[0], coords[1], coords[2]),
        Rgb::new(channels[0], channels[1], channels[2]).clamped(),
        validity,
    ))
}
