// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seeded breadth-first cluster growth with floor protection.

use std::collections::VecDeque;

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashSet;

use scenegrid_core::{Aabb, Cell, CellKey, Grid};

use crate::config::{FloorProtection, SelectionConfig};
use crate::result::{SelectionDiagnostics, SelectionResult, TraversalLimit};
use crate::shape::suggest_shape;

/// A cluster member and its colour distance from the seed.
#[derive(Clone, Copy)]
struct Member<'a> {
    cell: &'a Cell,
    color_distance: f32,
}

/// Grows a cluster from the cell nearest `click`.
///
/// Returns `None` only when no seed cell can be located.
pub fn select_cluster(
    grid: &Grid,
    click: &Point3<f64>,
    config: &SelectionConfig,
) -> Option<SelectionResult> {
    let hit = grid.locate_within(click, config.max_search_rings)?;
    let seed = hit.cell;
    let mut diagnostics = SelectionDiagnostics::new(hit.kind);

    let mut members = grow(grid, seed, config, &mut diagnostics);
    diagnostics.accepted_before_floor = members.len();

    if let Some(floor) = &config.floor_protection {
        apply_floor_protection(grid, &mut members, floor, &mut diagnostics);
    }
    diagnostics.accepted_after_floor = members.len();

    let mut bounds = Aabb::empty();
    let mut weighted = Vector3::zeros();
    let mut point_count = 0u64;
    let mut distance_sum = 0.0f64;
    for m in &members {
        bounds = bounds.union(&m.cell.bounds);
        weighted += m.cell.mean_position.coords * m.cell.count as f64;
        point_count += m.cell.count as u64;
        distance_sum += m.color_distance as f64;
    }

    let mut centroid = Point3::from(weighted / point_count.max(1) as f64);
    if diagnostics.floor_filter_applied {
        if let Some(floor) = &config.floor_protection {
            centroid.y += floor.upward_center_bias_factor * bounds.size().y;
        }
    }

    let mean_distance = (distance_sum / members.len().max(1) as f64) as f32;
    diagnostics.mean_color_distance = mean_distance;

    let result = SelectionResult {
        seed_cell: seed.key,
        member_cells: members.iter().map(|m| m.cell.key).collect(),
        bounds,
        centroid,
        suggested_shape: suggest_shape(&bounds, centroid, config),
        confidence: confidence(mean_distance, config.color_distance_threshold),
        point_count,
        diagnostics,
    };

    tracing::debug!(
        seed = %result.seed_cell,
        cells = result.cell_count(),
        visited = result.diagnostics.visited_cells,
        limit = ?result.diagnostics.limit_hit,
        confidence = result.confidence,
        "Selection cluster grown"
    );

    Some(result)
}

/// Breadth-first growth gated by colour similarity to the seed.
fn grow<'a>(
    grid: &'a Grid,
    seed: &'a Cell,
    config: &SelectionConfig,
    diagnostics: &mut SelectionDiagnostics,
) -> Vec<Member<'a>> {
    let seed_color = seed.mean_color;
    let threshold = config.color_distance_threshold;

    let mut members = vec![Member {
        cell: seed,
        color_distance: 0.0,
    }];
    let mut visited: FxHashSet<CellKey> = FxHashSet::default();
    visited.insert(seed.key);
    let mut queue: VecDeque<(CellKey, u32)> = VecDeque::new();
    queue.push_back((seed.key, 0));

    'search: while let Some((key, depth)) = queue.pop_front() {
        let neighbors = grid.neighbors(key, config.neighbor_radius);

        if depth >= config.max_depth {
            if neighbors.iter().any(|n| !visited.contains(&n.key)) {
                diagnostics.note_limit(TraversalLimit::Depth);
            }
            continue;
        }

        for neighbor in neighbors {
            if visited.contains(&neighbor.key) {
                continue;
            }
            if diagnostics.visited_cells >= config.max_visited_cells {
                diagnostics.note_limit(TraversalLimit::VisitedCells);
                break 'search;
            }
            visited.insert(neighbor.key);
            diagnostics.visited_cells += 1;

            let distance = neighbor.mean_color.distance(&seed_color);
            if distance > threshold {
                diagnostics.color_rejected += 1;
                continue;
            }
            if members.len() >= config.max_cluster_cells {
                diagnostics.note_limit(TraversalLimit::ClusterSize);
                break 'search;
            }

            members.push(Member {
                cell: neighbor,
                color_distance: distance,
            });
            diagnostics.max_depth_reached = diagnostics.max_depth_reached.max(depth + 1);
            queue.push_back((neighbor.key, depth + 1));
        }
    }

    members
}

/// Drops the bottom quantile of members by nominal cell centre height,
/// unless that would leave fewer than `min_protected_cells`.
///
/// Cells level with the last rejected rank are dropped with it, so a layer
/// is never split. A cluster with no vertical extent has no floor.
fn apply_floor_protection(
    grid: &Grid,
    members: &mut Vec<Member<'_>>,
    floor: &FloorProtection,
    diagnostics: &mut SelectionDiagnostics,
) {
    let n = members.len();
    let quantile = floor.bottom_quantile_reject.clamp(0.0, 1.0);
    let reject = ((n as f64 * quantile).floor() as usize).min(n);
    diagnostics.floor_rejected_cells = 0;
    if reject == 0 {
        return;
    }

    let height = |m: &Member<'_>| grid.cell_world_center(m.cell.key).y;
    let mut heights: Vec<f64> = members.iter().map(height).collect();
    heights.sort_by(f64::total_cmp);
    if heights[n - 1] <= heights[0] {
        tracing::debug!(cells = n, "Floor filter skipped for flat cluster");
        return;
    }

    let cutoff = heights[reject - 1];
    let rejected = heights.partition_point(|&h| h <= cutoff);
    diagnostics.floor_rejected_cells = rejected;
    if rejected >= n || n - rejected < floor.min_protected_cells {
        tracing::debug!(
            cells = n,
            would_reject = rejected,
            min_protected = floor.min_protected_cells,
            "Floor filter skipped"
        );
        return;
    }

    members.retain(|m| height(m) > cutoff);
    diagnostics.floor_filter_applied = true;
}

fn confidence(mean_distance: f32, threshold: f32) -> f32 {
    if threshold <= 0.0 {
        return if mean_distance <= 0.0 { 1.0 } else { 0.0 };
    }
    (1.0 - mean_distance / threshold).clamp(0.0, 1.0)
}
