use crate::palette::KmlColor;
use geo::Geometry;
use std::collections::HashMap;

/// One parsed row of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub zip: String,
    pub population: u64,
}

#[derive(Debug, Clone)]
pub struct GeoArea {
    pub id: String,
    pub geometry: Geometry<f64>,
}

/// Reference ZCTA geometry, loaded once and shared read-only by every request.
#[derive(Debug, Default)]
pub struct ZctaDataset {
    areas: Vec<GeoArea>,
    // id -> index of its first occurrence in `areas`
    index: HashMap<String, usize>,
}

impl ZctaDataset {
    pub fn new(areas: Vec<GeoArea>) -> Self {
        let mut index = HashMap::with_capacity(areas.len());
        for (i, area) in areas.iter().enumerate() {
            if index.contains_key(&area.id) {
                tracing::warn!("Duplicate area id {} in reference dataset", area.id);
                continue;
            }
            index.insert(area.id.clone(), i);
        }
        Self { areas, index }
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Look up an area by id; with duplicate ids this is the first one in the file.
    pub fn get(&self, id: &str) -> Option<&GeoArea> {
        self.index.get(id).map(|&i| &self.areas[i])
    }

    /// Areas in file order, duplicates included.
    pub fn iter(&self) -> impl Iterator<Item = &GeoArea> {
        self.areas.iter()
    }
}

/// An input record joined to its reference geometry, plus its class.
#[derive(Debug, Clone)]
pub struct MatchedArea<'a> {
    pub id: String,
    pub population: u64,
    pub geometry: &'a Geometry<f64>,
    pub quintile_class: usize,
    pub fill_color: KmlColor,
}
