use std::cmp::Ordering;

use super::candidate::Candidate;
use super::estimate::avg_page_len;

// a pair whose page is this many times shorter than the estimate is noise
const MIN_PAGE_LENGTH_DIVISOR: f64 = 20.0;

fn plausible_page_number_pair(
    prev: &Candidate,
    curr: &Candidate,
    page_length: f64,
    max_gap: u64,
) -> bool {
    if curr.number > prev.number.saturating_add(max_gap) {
        return false;
    }

    MIN_PAGE_LENGTH_DIVISOR * avg_page_len(prev, curr) >= page_length
}

/// Cuts the sequence at its first implausible pair and keeps the longer side,
/// trimming the tail side the same way before comparing.
pub(super) fn trim_sequence<'s, 'a>(
    sequence: &'s [&'a Candidate],
    page_length: f64,
    max_gap: u64,
) -> &'s [&'a Candidate] {
    if sequence.len() < 2 {
        return sequence;
    }

    let split = sequence
        .windows(2)
        .position(|pair| !plausible_page_number_pair(pair[0], pair[1], page_length, max_gap))
        .map(|index| index + 1);

    let Some(split) = split else {
        return sequence;
    };

    let (head, tail) = sequence.split_at(split);
    let tail = trim_sequence(tail, page_length, max_gap);
    if head.len() > tail.len() { head } else { tail }
}

/// Longer sequences with page lengths closer to the estimate score higher;
/// each pair contributes at most 1.0.
pub(super) fn sequence_score(sequence: &[&Candidate], page_length: f64) -> f64 {
    sequence
        .windows(2)
        .map(|pair| {
            let ratio = avg_page_len(pair[0], pair[1]) / page_length;
            if ratio < 1.0 { ratio } else { 1.0 / ratio }
        })
        .sum()
}

/// Index of the best scoring sequence. Equal scores prefer the longer
/// sequence, then the one starting on the earliest line, then the earliest
/// enumerated.
pub(super) fn select_best_sequence(sequences: &[&[&Candidate]], page_length: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (index, sequence) in sequences.iter().enumerate() {
        let score = sequence_score(sequence, page_length);
        let better = match best {
            None => true,
            Some((best_index, best_score)) => {
                compare_candidates(sequence, score, sequences[best_index], best_score)
                    == Ordering::Greater
            }
        };
        if better {
            best = Some((index, score));
        }
    }

    best.map(|(index, _)| index)
}

fn compare_candidates(
    left: &[&Candidate],
    left_score: f64,
    right: &[&Candidate],
    right_score: f64,
) -> Ordering {
    let start_line = |sequence: &[&Candidate]| {
        sequence
            .first()
            .map(|candidate| candidate.line_index)
            .unwrap_or(usize::MAX)
    };

    left_score
        .total_cmp(&right_score)
        .then(left.len().cmp(&right.len()))
        .then(start_line(right).cmp(&start_line(left)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(number: u64, line_index: usize) -> Candidate {
        Candidate::new(number, &number.to_string(), line_index, None)
    }

    fn numbers(sequence: &[&Candidate]) -> Vec<u64> {
        sequence.iter().map(|candidate| candidate.number).collect()
    }

    #[test]
    fn plausible_sequence_is_untouched() {
        let candidates = [candidate(1, 0), candidate(2, 40), candidate(3, 80)];
        let sequence = candidates.iter().collect::<Vec<&Candidate>>();
        assert_eq!(numbers(trim_sequence(&sequence, 40.0, 10)), vec![1, 2, 3]);
    }

    #[test]
    fn large_numeric_jump_drops_shorter_side() {
        let candidates = [
            candidate(1, 0),
            candidate(2, 40),
            candidate(3, 80),
            candidate(40, 120),
            candidate(41, 160),
        ];
        let sequence = candidates.iter().collect::<Vec<&Candidate>>();
        assert_eq!(numbers(trim_sequence(&sequence, 40.0, 10)), vec![1, 2, 3]);
    }

    #[test]
    fn implausibly_short_page_splits_and_keeps_longer_tail() {
        let candidates = [
            candidate(1, 0),
            candidate(2, 1),
            candidate(3, 40),
            candidate(4, 80),
            candidate(5, 120),
        ];
        let sequence = candidates.iter().collect::<Vec<&Candidate>>();
        assert_eq!(numbers(trim_sequence(&sequence, 40.0, 10)), vec![2, 3, 4, 5]);
    }

    #[test]
    fn equal_length_split_keeps_tail() {
        let candidates = [
            candidate(1, 0),
            candidate(2, 40),
            candidate(30, 80),
            candidate(31, 120),
        ];
        let sequence = candidates.iter().collect::<Vec<&Candidate>>();
        assert_eq!(numbers(trim_sequence(&sequence, 40.0, 10)), vec![30, 31]);
    }

    #[test]
    fn short_sequences_pass_through() {
        let lone = [candidate(7, 3)];
        let sequence = lone.iter().collect::<Vec<&Candidate>>();
        assert_eq!(trim_sequence(&sequence, 40.0, 10).len(), 1);
    }

    #[test]
    fn score_rewards_uniform_page_lengths() {
        let uniform = [candidate(1, 0), candidate(2, 40), candidate(3, 80)];
        let uneven = [candidate(1, 0), candidate(2, 10), candidate(3, 80)];
        let uniform = uniform.iter().collect::<Vec<&Candidate>>();
        let uneven = uneven.iter().collect::<Vec<&Candidate>>();
        assert_eq!(sequence_score(&uniform, 40.0), 2.0);
        assert!(sequence_score(&uneven, 40.0) < 2.0);

        let sequences = [uneven.as_slice(), uniform.as_slice()];
        assert_eq!(select_best_sequence(&sequences, 40.0), Some(1));
    }

    #[test]
    fn ties_prefer_longer_then_earliest_start() {
        let early = [candidate(1, 0), candidate(2, 40)];
        let late = [candidate(1, 5), candidate(2, 45)];
        let early = early.iter().collect::<Vec<&Candidate>>();
        let late = late.iter().collect::<Vec<&Candidate>>();

        let sequences = [late.as_slice(), early.as_slice()];
        assert_eq!(select_best_sequence(&sequences, 40.0), Some(1));
        assert_eq!(select_best_sequence(&[], 40.0), None);
    }
}
