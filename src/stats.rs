//! Robust statistics and filters over scalar series.
//!
//! All functions are total: constant series (zero MAD), empty input and
//! degenerate windows resolve to defined values rather than NaN.

use log::warn;

/// Scale factor making the MAD a consistent estimator of the standard
/// deviation under normality.
pub const MAD_SCALE: f64 = 1.4826;

/// Window used by [`hampel_outliers`] when given an even or too-small window.
pub const DEFAULT_HAMPEL_WINDOW: usize = 5;

/// Median of a series, `None` when empty.
///
/// ```rust
/// use gps_cleaner::stats::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
/// assert_eq!(median(&[]), None);
/// ```
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median absolute deviation from `center`, `None` when empty.
pub fn median_absolute_deviation(values: &[f64], center: f64) -> Option<f64> {
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

/// Robust z-score of every value: `(x - median) / (1.4826 * MAD)`.
///
/// When the MAD is zero (e.g. a constant series) every score is 0.
///
/// ```rust
/// use gps_cleaner::stats::robust_z_scores;
///
/// assert_eq!(robust_z_scores(&[1.0, 1.0, 1.0, 1.0]), vec![0.0; 4]);
/// ```
pub fn robust_z_scores(values: &[f64]) -> Vec<f64> {
    let Some(center) = median(values) else {
        return vec![];
    };
    let mad = median_absolute_deviation(values, center).unwrap_or(0.0);
    if mad == 0.0 {
        return vec![0.0; values.len()];
    }

    let scale = MAD_SCALE * mad;
    values.iter().map(|v| (v - center) / scale).collect()
}

/// Hampel filter: flag samples that deviate from their local median.
///
/// Index `i` is compared against a window of `window_size` samples centred
/// on it, clipped at the sequence ends. It is an outlier when
/// `|x[i] - median| > n_sigma * 1.4826 * MAD` of that window. Windows with
/// zero MAD never flag.
///
/// An even `window_size` or one below 3 is replaced by
/// [`DEFAULT_HAMPEL_WINDOW`] (with a warning); configurations should be
/// checked with `CleanerConfig::validate` to avoid relying on this.
///
/// ```rust
/// use gps_cleaner::stats::hampel_outliers;
///
/// let series = [1.0, 1.1, 0.9, 1.0, 9.0, 1.05, 0.95];
/// let flags = hampel_outliers(&series, 5, 3.0);
/// assert_eq!(flags, vec![false, false, false, false, true, false, false]);
/// ```
pub fn hampel_outliers(values: &[f64], window_size: usize, n_sigma: f64) -> Vec<bool> {
    let window_size = if window_size < 3 || window_size % 2 == 0 {
        warn!(
            "[Hampel] Window size {} is not odd and >= 3, using {}",
            window_size, DEFAULT_HAMPEL_WINDOW
        );
        DEFAULT_HAMPEL_WINDOW
    } else {
        window_size
    };
    let half = window_size / 2;
    let n = values.len();

    (0..n)
        .map(|i| {
            let window = &values[i.saturating_sub(half)..(i + half + 1).min(n)];
            let Some(center) = median(window) else {
                return false;
            };
            let mad = median_absolute_deviation(window, center).unwrap_or(0.0);
            if mad == 0.0 {
                return false;
            }
            (values[i] - center).abs() > n_sigma * MAD_SCALE * mad
        })
        .collect()
}

/// Exponential moving average seeded with the first value.
///
/// `ema[0] = x[0]`, `ema[i] = alpha * x[i] + (1 - alpha) * ema[i - 1]`, with
/// `alpha` clamped to [0, 1]. A NaN `alpha` is treated as 1 (no smoothing).
///
/// ```rust
/// use gps_cleaner::stats::ema;
///
/// assert_eq!(ema(&[0.0, 10.0, 20.0], 0.5), vec![0.0, 5.0, 12.5]);
/// assert!(ema(&[], 0.5).is_empty());
/// ```
pub fn ema(values: &[f64], alpha: f64) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return vec![];
    };
    let alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };

    let mut out = Vec::with_capacity(values.len());
    let mut prev = first;
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}
