// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SceneGrid CLI - scene summaries and click selections for point clouds.
//!
//! Reads an ASCII point file, builds the scene grid, segments it and prints
//! the scene context as JSON on stdout. With `--click`, the cluster grown
//! from that point is included as well.
//!
//! Usage:
//!   scenegrid <points.xyz> [--click x,y,z] [--pretty]
//!
//! Settings come from `SCENEGRID_*` environment variables, logging from
//! `RUST_LOG`. Logs go to stderr.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use scenegrid_context::{selection_context, SceneContext, SelectionSnapshot};
use scenegrid_core::{GridBuilder, Point3};
use scenegrid_segmentation::segment;
use scenegrid_selection::select_cluster;

mod config;
mod xyz;

use config::Config;

#[derive(Debug)]
struct Args {
    input: PathBuf,
    click: Option<Point3<f64>>,
    pretty: bool,
}

#[derive(Serialize)]
struct Output<'a> {
    scene: &'a SceneContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    selection: Option<SelectionSnapshot>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let Some(args) = parse_args(env::args().skip(1).collect())? else {
        print_usage();
        return Ok(());
    };
    let config = Config::from_env();

    tracing::info!(
        input = %args.input.display(),
        resolution = ?config.grid.resolution,
        vertical_crop = ?config.grid.vertical_crop,
        "Starting SceneGrid"
    );

    let points = xyz::load(&args.input)?;
    let grid = GridBuilder::new(config.grid.clone())
        .build(&points.buffer, &points.buffer)
        .context("failed to build scene grid")?;

    let segmentation = segment(&grid, &config.segmentation);
    let scene = SceneContext::build(&grid, &segmentation, &config.context);
    tracing::info!(
        regions = segmentation.regions.len(),
        description = %scene.description,
        "Scene segmented"
    );

    let selection = args.click.and_then(|click| {
        let result = select_cluster(&grid, &click, &config.selection);
        match &result {
            Some(r) => tracing::info!("{}", r.diagnostic_line()),
            None => tracing::warn!(?click, "No occupied cell near click point"),
        }
        result.as_ref().map(selection_context)
    });

    let output = Output {
        scene: &scene,
        selection,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}

/// Returns `None` when help was requested.
fn parse_args(args: Vec<String>) -> Result<Option<Args>> {
    let mut input = None;
    let mut click = None;
    let mut pretty = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(None),
            "--pretty" => pretty = true,
            "--click" => {
                let value = iter.next().context("--click needs a value like 1.0,2.0,3.0")?;
                click = Some(parse_point(&value)?);
            }
            other if other.starts_with("--") => bail!("unknown option: {other}"),
            path => {
                if input.is_some() {
                    bail!("more than one input file given");
                }
                input = Some(PathBuf::from(path));
            }
        }
    }

    match input {
        Some(input) => Ok(Some(Args {
            input,
            click,
            pretty,
        })),
        None => Ok(None),
    }
}

fn parse_point(raw: &str) -> Result<Point3<f64>> {
    let coords: Vec<f64> = raw
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("invalid click point: {raw}"))?;
    match coords.as_slice() {
        &[x, y, z] => Ok(Point3::new(x, y, z)),
        _ => bail!("click point needs three coordinates: {raw}"),
    }
}

fn print_usage() {
    eprintln!("Usage: scenegrid <points.xyz> [--click x,y,z] [--pretty]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SCENEGRID_RESOLUTION       cells per axis, e.g. 20,20,20");
    eprintln!("  SCENEGRID_CROP_BOTTOM      fraction of height cropped at the bottom");
    eprintln!("  SCENEGRID_CROP_TOP         fraction of height cropped at the top");
    eprintln!("  SCENEGRID_MIN_CELL_POINTS  minimum points for a labelled cell");
    eprintln!("  SCENEGRID_MAX_CELLS        maximum cells in the scene context");
    eprintln!("  SCENEGRID_COLOR_THRESHOLD  selection colour distance threshold");
    eprintln!("  SCENEGRID_FLOOR_PROTECTION 0 or 1");
}
