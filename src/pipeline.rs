use crate::error::{PipelineError, Result};
use crate::palette::ColorPalette;
use crate::parser::parse_records;
use crate::processing::{classify, join_areas, ClassMode};
use crate::render::render_kml;
use crate::types::ZctaDataset;

/// Raw rows in, KML out.
///
/// Everything is validated before rendering starts, so a failed request never
/// produces partial output. The result depends only on the arguments.
pub fn export_kml(
    dataset: &ZctaDataset,
    palette: &ColorPalette,
    raw_input: &str,
    color_override: Option<usize>,
) -> Result<String> {
    let records = parse_records(raw_input);
    if records.is_empty() {
        return Err(PipelineError::NoValidRows);
    }
    tracing::debug!("Parsed {} input rows", records.len());

    let mode = match color_override {
        Some(index) if index >= palette.len() => {
            return Err(PipelineError::InvalidOverride { index, palette_len: palette.len() });
        }
        Some(index) => ClassMode::Override(index),
        None => ClassMode::Quintiles,
    };

    let mut matched = join_areas(dataset, &records, palette);
    if matched.is_empty() {
        return Err(PipelineError::NoMatches);
    }

    let active = classify(&mut matched, mode, palette);
    tracing::info!(
        "Matched {} of {} rows, {} classes in use",
        matched.len(),
        records.len(),
        active.len()
    );

    // all styles are declared, even ones the truncated palette left unused
    Ok(render_kml(palette, &matched)?)
}
