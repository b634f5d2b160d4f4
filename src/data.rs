use crate::config::InputConfig;
use crate::types::{GeoArea, ZctaDataset};
use anyhow::{Context, Result, anyhow};
use geo::{Geometry, MultiPolygon};
use shapefile::Reader;
use std::fs::File;
use std::io::BufReader;
use tracing::{debug, info};

/// Load the reference ZCTA geometry. Called once at startup.
pub fn load_dataset(config: &InputConfig) -> Result<ZctaDataset> {
    info!("Loading reference geometry from {:?}...", config.geometry);

    let extension = config.geometry.extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Input geometry file has no extension"))?;

    let areas = match extension.as_str() {
        "shp" => load_shapefile(config)?,
        "json" | "geojson" => load_geojson(config)?,
        _ => return Err(anyhow!("Unsupported geometry format: {}", extension)),
    };

    info!("Loaded geometry for {} areas", areas.len());
    Ok(ZctaDataset::new(areas))
}

/// Integral ids become zero-padded digit strings, so 2134 reads as "02134".
fn numeric_id(value: f64, width: usize) -> Option<String> {
    if value.fract() != 0.0 || value < 0.0 {
        return None;
    }
    Some(format!("{:0width$}", value as u64, width = width))
}

/// Single-part shapes stay plain polygons.
fn simplify(mp: MultiPolygon<f64>) -> Geometry<f64> {
    if mp.0.len() == 1 {
        let mut parts = mp.0;
        Geometry::Polygon(parts.remove(0))
    } else {
        Geometry::MultiPolygon(mp)
    }
}

fn load_shapefile(config: &InputConfig) -> Result<Vec<GeoArea>> {
    use shapefile::dbase::FieldValue;

    let mut reader = Reader::from_path(&config.geometry)
        .with_context(|| format!("Failed to open Shapefile: {:?}", config.geometry))?;

    let mut areas = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let id_value = record.get(&config.id_column)
            .ok_or_else(|| anyhow!("Id column '{}' not found in Shapefile", config.id_column))?;

        let id = match id_value {
            FieldValue::Character(Some(s)) => s.trim().to_string(),
            FieldValue::Numeric(Some(n)) => match numeric_id(*n, config.id_width) {
                Some(id) => id,
                None => continue,
            },
            FieldValue::Integer(n) => match numeric_id(f64::from(*n), config.id_width) {
                Some(id) => id,
                None => continue,
            },
            FieldValue::Character(None) | FieldValue::Numeric(None) => {
                debug!("Skipping shape with null id");
                continue;
            }
            _ => return Err(anyhow!("Shapefile id column must be a string or number")),
        };

        let multi: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?,
            shapefile::Shape::PolygonM(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?,
            shapefile::Shape::PolygonZ(polygon) => polygon.try_into()
                .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?,
            _ => {
                debug!("Skipping non-polygon shape for {}", id);
                continue;
            }
        };

        areas.push(GeoArea { id, geometry: simplify(multi) });
    }

    Ok(areas)
}

fn load_geojson(config: &InputConfig) -> Result<Vec<GeoArea>> {
    use geojson::GeoJson;

    let file = File::open(&config.geometry)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", config.geometry))?;
    let reader = BufReader::new(file);

    // whole file in memory
    let geojson = GeoJson::from_reader(reader).context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    let mut areas = Vec::new();

    for feature in collection.features {
        let id_val = feature.properties.as_ref()
            .and_then(|props| props.get(&config.id_column));

        let id = match id_val {
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => match n.as_f64().and_then(|v| numeric_id(v, config.id_width)) {
                Some(id) => id,
                None => continue,
            },
            _ => {
                debug!("Skipping feature without a usable '{}'", config.id_column);
                continue;
            }
        };

        let Some(geometry) = feature.geometry else {
            debug!("Skipping feature {} without geometry", id);
            continue;
        };
        let geometry: Geometry<f64> = geometry.value.try_into()
            .map_err(|e| anyhow!("Failed to convert geojson geometry for {}: {:?}", id, e))?;

        areas.push(GeoArea { id, geometry });
    }

    Ok(areas)
}
