use crate::palette::ColorPalette;
use crate::quantile::quantile_cut;
use crate::types::{InputRecord, MatchedArea, ZctaDataset};
use std::collections::{HashMap, HashSet};

/// Number of population classes in automatic mode.
pub const QUINTILES: usize = 5;

/// How matched areas get their class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassMode {
    Quintiles,
    /// Same class for everything; must be a valid palette index.
    Override(usize),
}

/// Inner join of the dataset against the parsed rows, in dataset order.
///
/// Areas not named by any row are skipped entirely. A ZIP listed on several
/// rows yields one match per row, all sharing the area's geometry. Classes
/// are left at 0 until `classify` runs.
pub fn join_areas<'a>(
    dataset: &'a ZctaDataset,
    records: &[InputRecord],
    palette: &ColorPalette,
) -> Vec<MatchedArea<'a>> {
    let mut by_zip: HashMap<&str, Vec<u64>> = HashMap::new();
    for record in records {
        by_zip.entry(record.zip.as_str()).or_default().push(record.population);
    }

    let lowest = palette.fills()[0];
    let mut matched = Vec::new();
    for area in dataset.iter() {
        let Some(populations) = by_zip.get(area.id.as_str()) else {
            continue;
        };
        for &population in populations {
            matched.push(MatchedArea {
                id: area.id.clone(),
                population,
                geometry: &area.geometry,
                quintile_class: 0,
                fill_color: lowest,
            });
        }
    }
    matched
}

/// Assign class and fill color to every area.
///
/// Returns the palette the colors were drawn from: the full palette for an
/// override, otherwise cut down to the highest class in use.
pub fn classify(areas: &mut [MatchedArea<'_>], mode: ClassMode, palette: &ColorPalette) -> ColorPalette {
    let classes = match mode {
        ClassMode::Override(class) => {
            tracing::debug!("Applying color override {} to {} areas", class, areas.len());
            vec![class; areas.len()]
        }
        ClassMode::Quintiles => quintile_classes(areas),
    };

    let active = match mode {
        ClassMode::Override(_) => *palette,
        ClassMode::Quintiles => {
            let max_class = classes.iter().copied().max().unwrap_or(0);
            palette.truncated(max_class + 1)
        }
    };

    for (area, class) in areas.iter_mut().zip(classes) {
        area.quintile_class = class;
        // both modes keep classes inside `active`
        area.fill_color = active.fill(class).unwrap_or(palette.fills()[0]);
    }
    active
}

fn quintile_classes(areas: &[MatchedArea<'_>]) -> Vec<usize> {
    let distinct: HashSet<u64> = areas.iter().map(|a| a.population).collect();
    if distinct.len() < QUINTILES {
        tracing::debug!(
            "Only {} distinct populations, placing all {} areas in the lowest class",
            distinct.len(),
            areas.len()
        );
        return vec![0; areas.len()];
    }

    let populations: Vec<f64> = areas.iter().map(|a| a.population as f64).collect();
    quantile_cut(&populations, QUINTILES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoArea;
    use geo::{polygon, Geometry};

    fn dataset(ids: &[&str]) -> ZctaDataset {
        let areas = ids
            .iter()
            .map(|id| GeoArea {
                id: id.to_string(),
                geometry: Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]),
            })
            .collect();
        ZctaDataset::new(areas)
    }

    fn rows(pairs: &[(&str, u64)]) -> Vec<InputRecord> {
        pairs
            .iter()
            .map(|&(zip, population)| InputRecord { zip: zip.to_string(), population })
            .collect()
    }

    #[test]
    fn join_drops_unmatched_on_both_sides() {
        let ds = dataset(&["30012", "30013", "30014"]);
        let palette = ColorPalette::quintiles();
        let matched = join_areas(&ds, &rows(&[("30013", 5), ("99999", 1), ("30012", 7)]), &palette);
        let ids: Vec<&str> = matched.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["30012", "30013"]);
        assert_eq!(matched[0].population, 7);
        assert_eq!(matched[1].population, 5);
    }

    #[test]
    fn duplicate_rows_multiply() {
        let ds = dataset(&["30013"]);
        let palette = ColorPalette::quintiles();
        let matched = join_areas(&ds, &rows(&[("30013", 5), ("30013", 9)]), &palette);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].population, 5);
        assert_eq!(matched[1].population, 9);
        assert!(std::ptr::eq(matched[0].geometry, matched[1].geometry));
    }

    #[test]
    fn join_of_disjoint_sets_is_empty() {
        let ds = dataset(&["30013"]);
        let matched = join_areas(&ds, &rows(&[("10001", 5)]), &ColorPalette::quintiles());
        assert!(matched.is_empty());
    }

    #[test]
    fn few_distinct_populations_collapse_to_lowest() {
        let ds = dataset(&["1", "2", "3", "4", "5", "6"]);
        let palette = ColorPalette::quintiles();
        let input = rows(&[("1", 10), ("2", 20), ("3", 30), ("4", 40), ("5", 10), ("6", 20)]);
        let mut matched = join_areas(&ds, &input, &palette);
        let active = classify(&mut matched, ClassMode::Quintiles, &palette);
        assert!(matched.iter().all(|m| m.quintile_class == 0));
        assert!(matched.iter().all(|m| m.fill_color.as_str() == "bfc6ab81"));
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn quintiles_rank_populations() {
        let ds = dataset(&["1", "2", "3", "4", "5"]);
        let palette = ColorPalette::quintiles();
        let input = rows(&[("1", 500), ("2", 100), ("3", 400), ("4", 200), ("5", 300)]);
        let mut matched = join_areas(&ds, &input, &palette);
        let active = classify(&mut matched, ClassMode::Quintiles, &palette);
        let classes: Vec<usize> = matched.iter().map(|m| m.quintile_class).collect();
        assert_eq!(classes, vec![4, 0, 3, 1, 2]);
        assert_eq!(matched[0].fill_color.as_str(), "bf5568e6");
        assert_eq!(active.len(), 5);
    }

    #[test]
    fn collapsed_edges_truncate_palette() {
        let ids = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"];
        let ds = dataset(&ids);
        let palette = ColorPalette::quintiles();
        let pops = [1, 1, 1, 1, 1, 1, 2, 3, 4, 5];
        let input: Vec<InputRecord> = ids
            .iter()
            .zip(pops)
            .map(|(zip, population)| InputRecord { zip: zip.to_string(), population })
            .collect();
        let mut matched = join_areas(&ds, &input, &palette);
        let active = classify(&mut matched, ClassMode::Quintiles, &palette);
        let classes: Vec<usize> = matched.iter().map(|m| m.quintile_class).collect();
        assert_eq!(classes, vec![0, 0, 0, 0, 0, 0, 1, 1, 2, 2]);
        assert_eq!(active.len(), 3);
    }

    #[test]
    fn override_ignores_populations() {
        let ds = dataset(&["1", "2", "3", "4", "5"]);
        let palette = ColorPalette::quintiles();
        let input = rows(&[("1", 500), ("2", 100), ("3", 400), ("4", 200), ("5", 300)]);
        let mut matched = join_areas(&ds, &input, &palette);
        let active = classify(&mut matched, ClassMode::Override(3), &palette);
        assert!(matched.iter().all(|m| m.quintile_class == 3));
        assert!(matched.iter().all(|m| m.fill_color.as_str() == "bf4824ac"));
        assert_eq!(active.len(), 5);
    }
}
