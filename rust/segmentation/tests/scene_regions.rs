// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segmentation of a small synthetic scene: a ground slab, a grey wall
//! column and a green shrub.

use scenegrid_core::{Aabb, CellKey, Grid, GridBuilder, GridConfig, Point3, PointBuffer, Rgb};
use scenegrid_segmentation::{segment, Label, SegmentationConfig};

const BROWN: Rgb = Rgb::new(0.5, 0.35, 0.2);
const GREY: Rgb = Rgb::new(0.5, 0.5, 0.52);
const GREEN: Rgb = Rgb::new(0.2, 0.6, 0.2);

fn flat_patch(buffer: &mut PointBuffer, key: (u32, u32, u32), color: Rgb) {
    for i in 0..12 {
        let t = 0.1 + 0.065 * i as f64;
        buffer.push(
            Point3::new(key.0 as f64 + t, key.1 as f64 + 0.5, key.2 as f64 + 0.9 - t),
            color,
            1.0,
        );
    }
}

fn wall_patch(buffer: &mut PointBuffer, key: (u32, u32, u32), color: Rgb) {
    for i in 0..12 {
        let t = 0.05 + 0.08 * i as f64;
        let jitter = if i % 2 == 0 { 0.45 } else { 0.55 };
        buffer.push(
            Point3::new(key.0 as f64 + jitter, key.1 as f64 + t, key.2 as f64 + jitter),
            color,
            1.0,
        );
    }
}

fn scene() -> Grid {
    let mut buffer = PointBuffer::new();
    for x in 0..10 {
        for z in 0..10 {
            flat_patch(&mut buffer, (x, 0, z), BROWN);
        }
    }
    for y in 4..7 {
        wall_patch(&mut buffer, (7, y, 7), GREY);
    }
    flat_patch(&mut buffer, (2, 3, 2), GREEN);
    flat_patch(&mut buffer, (2, 3, 3), GREEN);

    let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
    GridBuilder::new(GridConfig {
        resolution: [10, 10, 10],
        vertical_crop: (0.0, 0.0),
        ..Default::default()
    })
    .build(&buffer, &bounds)
    .unwrap()
}

#[test]
fn scene_splits_into_three_regions() {
    let grid = scene();
    let seg = segment(&grid, &SegmentationConfig::default());

    let labels: Vec<_> = seg.regions.iter().map(|r| r.label).collect();
    assert_eq!(labels, vec![Label::Ground, Label::Structure, Label::Vegetation]);

    assert_eq!(seg.regions[0].cell_count(), 100);
    assert_eq!(seg.regions[0].point_count, 1200);
    assert_eq!(seg.regions[1].cell_count(), 3);
    assert_eq!(seg.regions[2].cell_count(), 2);
    assert_eq!(seg.labeled_cells, 105);
    assert_eq!(seg.skipped_sparse, 0);
}

#[test]
fn wall_cells_are_vertical_structure() {
    let grid = scene();
    let seg = segment(&grid, &SegmentationConfig::default());
    for y in 4..7 {
        let class = seg.label_of(CellKey::new(7, y, 7)).unwrap();
        assert_eq!(class.label, Label::Structure);
        assert_eq!(class.rule, "structure");
    }
}

#[test]
fn region_bounds_cover_members() {
    let grid = scene();
    let seg = segment(&grid, &SegmentationConfig::default());
    for region in &seg.regions {
        for key in &region.member_cells {
            let cell = grid.cell(*key).unwrap();
            assert!(region.bounds.contains(&cell.bounds.min));
            assert!(region.bounds.contains(&cell.bounds.max));
        }
    }
}

#[test]
fn higher_threshold_drops_everything() {
    let grid = scene();
    let config = SegmentationConfig {
        min_cell_points: 13,
        ..Default::default()
    };
    let seg = segment(&grid, &config);
    assert!(seg.regions.is_empty());
    assert_eq!(seg.skipped_sparse, grid.len());
}
