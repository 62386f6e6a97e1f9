use regex::Regex;
use tracing::{debug, warn};

use super::candidate::Candidate;

/// Looser match used when searching for a missing page number: the number may
/// follow leading dashes and need not be the whole line, but must not run into
/// further digits.
fn line_has_page_number(line: &str, pattern: &Regex) -> Option<(usize, usize)> {
    let found = pattern.find(line)?;
    let runs_on = line[found.end()..]
        .chars()
        .next()
        .is_some_and(|character| character.is_ascii_digit());
    if runs_on {
        return None;
    }

    Some((found.start(), found.end()))
}

fn page_number_pattern(number: u64) -> Option<Regex> {
    Regex::new(&format!(r"^\s*(?:-+\s*)?{number}")).ok()
}

/// Searches outward from `start_line`, lower index first at each distance,
/// staying inside `min_line..=max_line`.
fn find_page_number<S: AsRef<str>>(
    number: u64,
    start_line: usize,
    min_line: usize,
    max_line: usize,
    lines: &[S],
) -> Option<Candidate> {
    let max_line = max_line.min(lines.len().checked_sub(1)?);
    if min_line > max_line {
        return None;
    }
    let start_line = start_line.clamp(min_line, max_line);
    let pattern = page_number_pattern(number)?;

    let reach = (start_line - min_line).max(max_line - start_line);
    for distance in 0..=reach {
        let lower = start_line.checked_sub(distance).filter(|index| *index >= min_line);
        let upper = Some(start_line + distance).filter(|index| *index <= max_line && distance > 0);

        for index in [lower, upper].into_iter().flatten() {
            let line = lines[index].as_ref();
            if let Some(span) = line_has_page_number(line, &pattern) {
                debug!(number, line_index = index, line = %line, "found missing page number");
                return Some(Candidate::new(number, line, index, Some(span)));
            }
        }
    }

    None
}

/// Fills numeric gaps in `sequence` with candidates found near the line where
/// each missing page number is expected.
pub(super) fn repair_sequence<S: AsRef<str>>(
    sequence: &[Candidate],
    lines: &[S],
    page_length: f64,
    max_gap: u64,
) -> Vec<Candidate> {
    if sequence.len() < 2 {
        return sequence.to_vec();
    }

    let mut repaired = Vec::<Candidate>::with_capacity(sequence.len());
    for pair in sequence.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        repaired.push(prev.clone());

        let missing = curr.number.saturating_sub(prev.number).saturating_sub(1);
        if missing == 0 {
            continue;
        }
        if missing > max_gap {
            warn!(
                from = prev.number,
                to = curr.number,
                missing,
                "not attempting to repair page number gap"
            );
            continue;
        }

        for number in prev.number + 1..curr.number {
            let start_line = prev.line_index as f64 + (number - prev.number) as f64 * page_length;
            let min_line = (prev.line_index as f64 + 1.0).max(start_line - page_length);
            let max_line = (curr.line_index as f64 - 1.0).min(start_line + page_length);
            if max_line < min_line {
                debug!(number, "no lines left to search for missing page number");
                continue;
            }

            match find_page_number(
                number,
                start_line as usize,
                min_line as usize,
                max_line as usize,
                lines,
            ) {
                Some(candidate) => repaired.push(candidate),
                None => debug!(number, around_line = start_line as usize, "missing page number not found"),
            }
        }
    }

    if let Some(last) = sequence.last() {
        repaired.push(last.clone());
    }

    repaired
}
