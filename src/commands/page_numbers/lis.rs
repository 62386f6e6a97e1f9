/// Longest strictly increasing subsequence of `values`, in O(n log n).
///
/// `tails[len]` holds the index of the smallest value ending an increasing
/// subsequence of length `len`; `predecessors` links each index back to the
/// element before it so the subsequence can be rebuilt.
pub(super) fn longest_increasing_subsequence(values: &[u64]) -> Vec<u64> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut tails = vec![0usize; values.len() + 1];
    let mut predecessors = vec![0usize; values.len()];
    let mut max_len = 0usize;

    for (index, &value) in values.iter().enumerate() {
        // smallest length in 1..=max_len whose tail is not below value
        let mut lo = 1usize;
        let mut hi = max_len + 1;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if values[tails[mid]] < value {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        let new_len = lo;
        predecessors[index] = tails[new_len - 1];
        tails[new_len] = index;
        max_len = max_len.max(new_len);
    }

    let mut lis = vec![0u64; max_len];
    let mut cursor = tails[max_len];
    for slot in lis.iter_mut().rev() {
        *slot = values[cursor];
        cursor = predecessors[cursor];
    }

    lis
}

#[cfg(test)]
mod tests {
    use super::longest_increasing_subsequence;

    #[test]
    fn empty_input_yields_empty_subsequence() {
        assert!(longest_increasing_subsequence(&[]).is_empty());
    }

    #[test]
    fn picks_strictly_increasing_skeleton_through_noise() {
        let values = [1, 2, 77, 3, 4, 1999, 5, 2, 6];
        assert_eq!(longest_increasing_subsequence(&values), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn repeated_values_are_not_counted_twice() {
        let values = [3, 3, 3, 4, 4, 5];
        assert_eq!(longest_increasing_subsequence(&values), vec![3, 4, 5]);
    }

    #[test]
    fn decreasing_input_keeps_a_single_value() {
        let lis = longest_increasing_subsequence(&[9, 7, 5, 3]);
        assert_eq!(lis.len(), 1);
    }
}
