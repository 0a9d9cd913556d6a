/// Assigns midranks to values, averaging ranks across ties.
///
/// Ranks are 1-based: the smallest value gets rank 1, and a group of `k`
/// tied values all receive the mean of the `k` ranks they span. This is the
/// rank transform the Spearman coefficient is defined over.
///
/// # Examples
///
/// ```
/// use rigour_stats::ranks::midranks;
///
/// let ranks = midranks(&[10.0, 20.0, 20.0, 30.0]);
/// assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn midranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Positions i..=j are tied; they share the mean of ranks i+1..=j+1.
        let shared = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = shared;
        }
        i = j + 1;
    }
    ranks
}
