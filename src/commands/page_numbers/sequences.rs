use std::collections::HashMap;

use super::candidate::Candidate;

pub(super) type Sequence<'a> = Vec<&'a Candidate>;

pub(super) struct Enumeration<'a> {
    pub sequences: Vec<Sequence<'a>>,
    pub truncated: bool,
}

/// Every way to pick one candidate per number of `numbers` such that line
/// indices strictly increase, stopping after `max_sequences` results.
///
/// Works depth-first over the per-number buckets with an explicit stack of
/// bucket cursors, so the output order matches a recursive product taken in
/// document order. Picks that leave no room for a later bucket are never
/// descended into, so every branch explored ends in a sequence and
/// `max_sequences` bounds the work done.
pub(super) fn candidate_sequences<'a>(
    numbers: &[u64],
    candidates: &'a [Candidate],
    max_sequences: usize,
) -> Enumeration<'a> {
    let mut candidates_by_number = HashMap::<u64, Vec<&'a Candidate>>::new();
    for candidate in candidates {
        candidates_by_number
            .entry(candidate.number)
            .or_default()
            .push(candidate);
    }

    let buckets = numbers
        .iter()
        .map(|number| {
            candidates_by_number
                .get(number)
                .map(Vec::as_slice)
                .unwrap_or_default()
        })
        .collect::<Vec<&[&'a Candidate]>>();

    let mut sequences = Vec::<Sequence<'a>>::new();
    if buckets.is_empty() {
        sequences.push(Vec::new());
        return Enumeration {
            sequences,
            truncated: false,
        };
    }

    let Some(latest_lines) = latest_feasible_lines(&buckets) else {
        return Enumeration {
            sequences,
            truncated: false,
        };
    };

    let mut picked = Vec::<&'a Candidate>::with_capacity(buckets.len());
    let mut cursors = vec![0usize];

    while let Some(cursor) = cursors.last_mut() {
        let depth = picked.len();
        let bucket = buckets[depth];

        let previous_line = picked.last().map(|candidate| candidate.line_index);
        let next = bucket[*cursor..].iter().position(|candidate| {
            candidate.line_index <= latest_lines[depth]
                && previous_line.is_none_or(|line_index| candidate.line_index > line_index)
        });

        let Some(offset) = next else {
            cursors.pop();
            picked.pop();
            continue;
        };

        let chosen = bucket[*cursor + offset];
        *cursor += offset + 1;

        if depth + 1 == buckets.len() {
            let mut sequence = picked.clone();
            sequence.push(chosen);
            sequences.push(sequence);
            if sequences.len() >= max_sequences {
                return Enumeration {
                    sequences,
                    truncated: true,
                };
            }
        } else {
            picked.push(chosen);
            cursors.push(0);
        }
    }

    Enumeration {
        sequences,
        truncated: false,
    }
}

/// For each bucket, the latest line index a pick may sit on while every later
/// bucket still has a candidate further down. `None` when no complete
/// sequence exists.
fn latest_feasible_lines(buckets: &[&[&Candidate]]) -> Option<Vec<usize>> {
    let mut latest_lines = vec![0usize; buckets.len()];
    let mut limit = None::<usize>;

    for (depth, bucket) in buckets.iter().enumerate().rev() {
        let latest = bucket
            .iter()
            .map(|candidate| candidate.line_index)
            .filter(|line_index| limit.is_none_or(|limit| *line_index < limit))
            .max()?;
        latest_lines[depth] = latest;
        limit = Some(latest);
    }

    Some(latest_lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(number: u64, line_index: usize) -> Candidate {
        Candidate::new(number, &number.to_string(), line_index, None)
    }

    fn lines_of(sequence: &Sequence<'_>) -> Vec<usize> {
        sequence.iter().map(|candidate| candidate.line_index).collect()
    }

    #[test]
    fn single_occurrences_give_one_sequence() {
        let candidates = vec![candidate(1, 2), candidate(2, 10), candidate(3, 18)];
        let enumeration = candidate_sequences(&[1, 2, 3], &candidates, 100);
        assert_eq!(enumeration.sequences.len(), 1);
        assert_eq!(lines_of(&enumeration.sequences[0]), vec![2, 10, 18]);
        assert!(!enumeration.truncated);
    }

    #[test]
    fn duplicates_expand_in_document_order_respecting_line_order() {
        let candidates = vec![
            candidate(1, 0),
            candidate(2, 5),
            candidate(1, 7),
            candidate(2, 9),
            candidate(3, 12),
        ];
        let enumeration = candidate_sequences(&[1, 2, 3], &candidates, 100);
        let all = enumeration
            .sequences
            .iter()
            .map(lines_of)
            .collect::<Vec<Vec<usize>>>();
        assert_eq!(all, vec![vec![0, 5, 12], vec![0, 9, 12], vec![7, 9, 12]]);
    }

    #[test]
    fn unorderable_buckets_give_no_sequence() {
        let candidates = vec![candidate(2, 1), candidate(1, 4)];
        let enumeration = candidate_sequences(&[1, 2], &candidates, 100);
        assert!(enumeration.sequences.is_empty());
    }

    #[test]
    fn enumeration_stops_at_cap() {
        let mut candidates = Vec::new();
        for line_index in 0..10 {
            candidates.push(candidate(1, line_index));
        }
        for line_index in 10..20 {
            candidates.push(candidate(2, line_index));
        }
        let enumeration = candidate_sequences(&[1, 2], &candidates, 25);
        assert_eq!(enumeration.sequences.len(), 25);
        assert!(enumeration.truncated);
    }

    #[test]
    fn late_duplicates_before_no_final_number_are_not_explored() {
        let mut candidates = (1..=9)
            .map(|number| candidate(number, number as usize - 1))
            .collect::<Vec<Candidate>>();
        for repeat in 0..40 {
            for number in 1..=8 {
                candidates.push(candidate(number, 9 + repeat * 8 + number as usize - 1));
            }
        }

        let numbers = (1..=9).collect::<Vec<u64>>();
        let enumeration = candidate_sequences(&numbers, &candidates, 100);
        assert_eq!(enumeration.sequences.len(), 1);
        assert_eq!(
            lines_of(&enumeration.sequences[0]),
            (0..9).collect::<Vec<usize>>()
        );
        assert!(!enumeration.truncated);
    }

    #[test]
    fn feasible_lines_leave_room_for_later_buckets() {
        let candidates = vec![
            candidate(1, 0),
            candidate(1, 6),
            candidate(2, 3),
            candidate(2, 8),
            candidate(3, 5),
        ];
        let (ones, twos, threes) = (
            candidates[0..2].iter().collect::<Vec<&Candidate>>(),
            candidates[2..4].iter().collect::<Vec<&Candidate>>(),
            candidates[4..5].iter().collect::<Vec<&Candidate>>(),
        );
        let buckets = [ones.as_slice(), twos.as_slice(), threes.as_slice()];
        assert_eq!(latest_feasible_lines(&buckets), Some(vec![0, 3, 5]));

        let empty = [ones.as_slice(), &[][..]];
        assert_eq!(latest_feasible_lines(&empty), None);
    }

    #[test]
    fn no_numbers_gives_single_empty_sequence() {
        let enumeration = candidate_sequences(&[], &[], 100);
        assert_eq!(enumeration.sequences.len(), 1);
        assert!(enumeration.sequences[0].is_empty());
    }
}
