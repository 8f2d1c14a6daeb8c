/// Evenly spaced frame indices across `0..total`.
///
/// Returns exactly `count` non-decreasing indices, the first `0` and the last
/// `total - 1`. Indices repeat when `count` exceeds `total`.
pub fn sample_frame_indices(total: u64, count: usize) -> Vec<u64> {
    if total == 0 || count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![0];
    }

    let last = total - 1;
    let steps = (count - 1) as u64;
    (0..count as u64).map(|i| i * last / steps).collect()
}

/// Sorted indices with repeats removed, ready for decoding.
pub fn unique_indices(mut indices: Vec<u64>) -> Vec<u64> {
    indices.sort_unstable();
    indices.dedup();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_whole_video() {
        assert_eq!(sample_frame_indices(100, 5), vec![0, 24, 49, 74, 99]);
        assert_eq!(sample_frame_indices(300, 10).len(), 10);
        assert_eq!(*sample_frame_indices(300, 10).last().unwrap(), 299);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(sample_frame_indices(0, 10).is_empty());
        assert!(sample_frame_indices(50, 0).is_empty());
        assert_eq!(sample_frame_indices(50, 1), vec![0]);
        assert_eq!(sample_frame_indices(1, 3), vec![0, 0, 0]);
    }

    #[test]
    fn more_samples_than_frames_repeat() {
        let indices = sample_frame_indices(3, 5);
        assert_eq!(indices, vec![0, 0, 1, 1, 2]);
        assert_eq!(unique_indices(indices), vec![0, 1, 2]);
    }

    #[test]
    fn always_non_decreasing() {
        for total in 1..40u64 {
            for count in 1..25usize {
                let indices = sample_frame_indices(total, count);
                assert_eq!(indices.len(), count);
                assert!(indices.windows(2).all(|w| w[0] <= w[1]));
                assert_eq!(indices[0], 0);
                if count > 1 {
                    assert_eq!(*indices.last().unwrap(), total - 1);
                }
            }
        }
    }
}
