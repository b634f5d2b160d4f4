//! Equal-frequency binning.
//!
//! Edges are the empirical quantiles of the data, linearly interpolated
//! between order statistics. Repeated edges are collapsed, so heavily tied
//! data yields fewer bins instead of empty ones.

/// Bin edges for `bins` equal-frequency bins over an ascending slice.
///
/// Returns strictly increasing edges; `edges.len() - 1` is the number of
/// bins actually produced. Empty input yields no edges.
pub fn quantile_edges(sorted: &[f64], bins: usize) -> Vec<f64> {
    if sorted.is_empty() || bins == 0 {
        return Vec::new();
    }
    debug_assert!(sorted.windows(2).all(|w| w[0] <= w[1]), "input must be sorted");

    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| quantile(sorted, i as f64 / bins as f64))
        .collect();
    edges.dedup();
    edges
}

/// Linear-interpolated quantile `q` in [0, 1] of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Index of the bin holding `value`.
///
/// Bins are right-closed, `(e[i], e[i+1]]`, except the first which also
/// includes its lower edge. Values outside the edges give `None`.
pub fn assign_bin(edges: &[f64], value: f64) -> Option<usize> {
    let (&first, &last) = (edges.first()?, edges.last()?);
    if edges.len() < 2 || value < first || value > last {
        return None;
    }
    if value == first {
        return Some(0);
    }
    // first edge >= value
    let upper = edges.partition_point(|&e| e < value);
    Some(upper - 1)
}

/// Label every value with its equal-frequency bin, input order preserved.
pub fn quantile_cut(values: &[f64], bins: usize) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let edges = quantile_edges(&sorted, bins);
    values
        .iter()
        // every value lies within [min, max], so this only falls back on a degenerate edge set
        .map(|&v| assign_bin(&edges, v).unwrap_or(0))
        .collect()
}
