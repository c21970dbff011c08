//! Helpers over concatenated target vectors.

use std::ops::Range;

/// Split a concatenation of per-life targets back into lives.
///
/// RUL decreases within a life, so a new life starts at every index `j`
/// where `y[j] > y[j - 1]`. The returned ranges are contiguous and cover
/// the whole input.
pub fn split_lives_indices(y_true: &[f64]) -> Vec<Range<usize>> {
    if y_true.is_empty() {
        return Vec::new();
    }
    let mut groups = Vec::new();
    let mut start = 0;
    for (j, pair) in y_true.windows(2).enumerate() {
        if pair[1] > pair[0] {
            groups.push(start..j + 1);
            start = j + 1;
        }
    }
    groups.push(start..y_true.len());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_no_lives() {
        assert!(split_lives_indices(&[]).is_empty());
    }

    #[test]
    fn plateaus_stay_in_one_life() {
        assert_eq!(
            split_lives_indices(&[3.0, 3.0, 2.0, 5.0, 5.0]),
            vec![0..3, 3..5]
        );
    }
}
