//! Trailing rolling statistics.

/// Trailing arithmetic mean over `window` periods.
///
/// Only fully-populated windows produce a value, so the result is
/// `window - 1` elements shorter than `values`; element `j` is the mean of
/// `values[j..j + window]` and lines up with `values[j + window - 1]`.
/// A `NaN` inside a window makes that window's mean `NaN`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// The tail of `items` aligned with [`rolling_mean`] output.
pub fn aligned_tail<T>(items: &[T], window: usize) -> &[T] {
    let skip = window.saturating_sub(1).min(items.len());
    &items[skip..]
}

/// `100 * part / whole`, or `NaN` when `whole` is zero or either side is missing.
pub fn percent(part: Option<f64>, whole: Option<f64>) -> f64 {
    match (part, whole) {
        (Some(part), Some(whole)) if whole != 0.0 => 100.0 * part / whole,
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_six_over_ten_values() {
        let values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let means = rolling_mean(&values, 6);

        assert_eq!(means.len(), 5);
        for (j, mean) in means.iter().enumerate() {
            let i = j + 5;
            let expected = values[i - 5..=i].iter().sum::<f64>() / 6.0;
            assert!((mean - expected).abs() < 1e-12, "index {i}");
        }
    }

    #[test]
    fn test_seven_weekly_values() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0];
        assert_eq!(rolling_mean(&values, 6), vec![35.0, 45.0]);
    }

    #[test]
    fn test_short_series_has_no_mean() {
        assert!(rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 6).is_empty());
        assert!(rolling_mean(&[], 6).is_empty());
        assert!(rolling_mean(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn test_nan_only_poisons_its_windows() {
        let values = [f64::NAN, 1.0, 2.0, 3.0];
        let means = rolling_mean(&values, 2);
        assert!(means[0].is_nan());
        assert_eq!(&means[1..], &[1.5, 2.5]);
    }

    #[test]
    fn test_aligned_tail() {
        let labels = ["a", "b", "c", "d", "e", "f", "g"];
        assert_eq!(aligned_tail(&labels, 6), &["f", "g"]);
        assert_eq!(aligned_tail(&labels, 1), &labels[..]);
        assert!(aligned_tail(&labels[..3], 6).is_empty());
        assert_eq!(aligned_tail(&labels, 0), &labels[..]);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(Some(25.0), Some(50.0)), 50.0);
        assert!(percent(Some(1.0), Some(0.0)).is_nan());
        assert!(percent(None, Some(10.0)).is_nan());
        assert!(percent(Some(1.0), None).is_nan());
    }
}
