use super::candidate::Candidate;

/// Lines per page increment between two candidates of a sequence.
pub(super) fn avg_page_len(prev: &Candidate, curr: &Candidate) -> f64 {
    debug_assert!(prev.number < curr.number);
    let page_diff = (curr.number - prev.number) as f64;
    let line_diff = curr.line_index as f64 - prev.line_index as f64;
    line_diff / page_diff
}

pub(super) fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Median over sequences of the per-sequence median page length.
///
/// Sequences with fewer than two candidates carry no page length; when no
/// sequence does, there is no estimate.
pub(super) fn estimate_page_length(sequences: &[Vec<&Candidate>]) -> Option<f64> {
    let mut estimates = sequences
        .iter()
        .filter_map(|sequence| {
            let mut lengths = sequence
                .windows(2)
                .map(|pair| avg_page_len(pair[0], pair[1]))
                .collect::<Vec<f64>>();
            median(&mut lengths)
        })
        .collect::<Vec<f64>>();

    median(&mut estimates).filter(|length| *length > 0.0)
}
