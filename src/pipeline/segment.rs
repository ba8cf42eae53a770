/// Boundary indices delimiting the maximal monotonic runs of the
/// smoothed elevation: index 0, every turning point, and the last
/// index, strictly increasing.
///
/// A turning point is recorded where the first difference changes sign
/// between two nonzero values. Flat stretches (zero difference) extend
/// the current run instead of breaking it, so a plateau between climb
/// and descent produces a single boundary where the descent starts.
pub fn segment_boundaries(filtered: &[f64]) -> Vec<usize> {
    let mut boundaries = vec![0];

    let mut last_sign = 0i8;
    for (i, pair) in filtered.windows(2).enumerate() {
        let sign = strict_sign(pair[1] - pair[0]);
        if sign != 0 {
            if last_sign != 0 && sign != last_sign {
                boundaries.push(i);
            }
            last_sign = sign;
        }
    }

    boundaries.push(filtered.len().saturating_sub(1));
    boundaries.dedup();
    boundaries
}

fn strict_sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}
