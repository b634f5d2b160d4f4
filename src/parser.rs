use crate::types::InputRecord;

/// Parse free-text rows of `ZIP population`, dropping anything malformed.
///
/// A bare `\r` ends a line just like `\n`.
pub fn parse_records(raw: &str) -> Vec<InputRecord> {
    raw.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

/// Tab-separated if the line has a tab, otherwise whitespace/comma-separated.
pub fn parse_line(line: &str) -> Option<InputRecord> {
    let fields: Vec<&str> = if line.contains('\t') {
        line.split('\t').map(str::trim).collect()
    } else {
        line.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect()
    };

    let [zip, population] = fields.as_slice() else {
        return None;
    };
    if !is_digits(zip) || !is_digits(population) {
        return None;
    }

    Some(InputRecord {
        zip: zip.to_string(),
        // only fails on overflow
        population: population.parse().ok()?,
    })
}

fn is_digits(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}
