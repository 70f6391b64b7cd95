// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Natural-language scene descriptions from segmented regions.

use rustc_hash::FxHashMap;

use scenegrid_segmentation::{Label, Region};

/// Counts regions per label and renders them as a phrase such as
/// `"a ground area, a vertical structure area and 2 vegetation areas"`.
///
/// Labels appear in order of first appearance in `regions`.
pub fn describe_regions(regions: &[Region]) -> String {
    let mut order: Vec<(Label, usize)> = Vec::new();
    let mut slot: FxHashMap<Label, usize> = FxHashMap::default();
    for region in regions {
        match slot.get(&region.label) {
            Some(&i) => order[i].1 += 1,
            None => {
                slot.insert(region.label, order.len());
                order.push((region.label, 1));
            }
        }
    }

    let parts: Vec<String> = order
        .iter()
        .map(|&(label, count)| area_phrase(label.human_name(), count))
        .collect();
    join_with_and(&parts).unwrap_or_else(|| "no distinct regions".to_string())
}

fn area_phrase(name: &str, count: usize) -> String {
    if count == 1 {
        let article = if name.starts_with(['a', 'e', 'i', 'o', 'u']) {
            "an"
        } else {
            "a"
        };
        format!("{article} {name} area")
    } else {
        format!("{count} {name} areas")
    }
}

/// `"x"`, `"x and y"`, `"x, y and z"`. `None` when empty.
fn join_with_and(parts: &[String]) -> Option<String> {
    match parts {
        [] => None,
        [only] => Some(only.clone()),
        [head @ .., last] => Some(format!("{} and {}", head.join(", "), last)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use scenegrid_core::{Aabb, Rgb};

    fn region(label: Label) -> Region {
        Region {
            label,
            member_cells: BTreeSet::new(),
            bounds: Aabb::empty(),
            dominant_color: Rgb::BLACK,
            confidence: 0.5,
            point_count: 0,
        }
    }

    #[test]
    fn no_regions() {
        assert_eq!(describe_regions(&[]), "no distinct regions");
    }

    #[test]
    fn single_region() {
        assert_eq!(
            describe_regions(&[region(Label::Vegetation)]),
            "a vegetation area"
        );
    }

    #[test]
    fn counts_and_first_appearance_order() {
        let regions = [
            region(Label::Ground),
            region(Label::Vegetation),
            region(Label::Ground),
            region(Label::Structure),
            region(Label::Vegetation),
        ];
        assert_eq!(
            describe_regions(&regions),
            "2 ground areas, 2 vegetation areas and a vertical structure area"
        );
    }

    #[test]
    fn vowel_names_take_an() {
        let regions = [region(Label::Object), region(Label::Water)];
        assert_eq!(describe_regions(&regions), "an object area and a water area");
    }
}
