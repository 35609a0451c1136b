//! Summaries of simulated count samples.
//!
//! Used to check a sampler against its distribution: sample mean and
//! variance, the observed zero fraction, the empirical PMF and the
//! dispersion index `Var/Mean` (1 for Poisson, above 1 for
//! over-dispersed families).
//!
//! # Algorithms
//!
//! - **Mean**: Neumaier compensated summation, O(ε) error independent of n.
//! - **Variance**: Welford's online update.
//!   Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).

/// Neumaier compensated summation.
///
/// Reference: Neumaier (1974), *ZAMM* 54(1), pp. 39–51.
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

/// Arithmetic mean, `None` if `data` is empty or holds NaN/Inf.
///
/// # Examples
/// ```
/// use count_sampler::stats::mean;
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Sample variance (denominator `n − 1`) by Welford's method.
///
/// Returns `None` if `data.len() < 2` or any value is NaN/Inf.
pub fn variance(data: &[f64]) -> Option<f64> {
    if data.len() < 2 || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    let mut count = 0_u64;
    let mut running_mean = 0.0;
    let mut m2 = 0.0;
    for &x in data {
        count += 1;
        let delta = x - running_mean;
        running_mean += delta / count as f64;
        m2 += delta * (x - running_mean);
    }
    Some(m2 / (count - 1) as f64)
}

fn as_f64(samples: &[u64]) -> Vec<f64> {
    samples.iter().map(|&k| k as f64).collect()
}

/// Mean of a count sample.
pub fn count_mean(samples: &[u64]) -> Option<f64> {
    mean(&as_f64(samples))
}

/// Sample variance of a count sample.
pub fn count_variance(samples: &[u64]) -> Option<f64> {
    variance(&as_f64(samples))
}

/// Fraction of observations equal to zero.
///
/// # Examples
/// ```
/// use count_sampler::stats::zero_fraction;
/// assert_eq!(zero_fraction(&[0, 3, 0, 1]), Some(0.5));
/// ```
pub fn zero_fraction(samples: &[u64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let zeros = samples.iter().filter(|&&k| k == 0).count();
    Some(zeros as f64 / samples.len() as f64)
}

/// Relative frequencies of `0, 1, ..., max_k`.
///
/// Entry `k` is `#{x == k} / n`; values above `max_k` are counted in `n`
/// but not reported, so the result sums to at most 1.
pub fn empirical_pmf(samples: &[u64], max_k: u64) -> Option<Vec<f64>> {
    if samples.is_empty() {
        return None;
    }
    let width = usize::try_from(max_k).ok()?.checked_add(1)?;
    let mut counts = vec![0_u64; width];
    for &k in samples {
        if k <= max_k {
            counts[k as usize] += 1;
        }
    }
    let n = samples.len() as f64;
    Some(counts.into_iter().map(|c| c as f64 / n).collect())
}

/// Variance-to-mean ratio. `None` for fewer than two samples or an
/// all-zero sample.
pub fn dispersion_index(samples: &[u64]) -> Option<f64> {
    let m = count_mean(samples)?;
    if m == 0.0 {
        return None;
    }
    Some(count_variance(samples)? / m)
}
