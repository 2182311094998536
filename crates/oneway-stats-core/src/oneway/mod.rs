//! Oneway group-comparison statistics
//!
//! This module family implements oneway ANOVA under three variance
//! treatments (standard, Welch, Brown-Forsythe), robust trimmed/winsorized
//! variants, noncentrality-based effect sizes and confidence intervals,
//! equivalence testing against a margin, Levene-type scale tests, and
//! analytic plus Monte Carlo power.

pub mod anova;
pub mod confint;
pub mod effectsize;
pub mod equivalence;
pub mod power;
pub mod scale;

use crate::{StatsError, StatsResult};

/// Alternative hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternative {
    TwoSided,
    Less,
    Greater,
}

/// How to treat heteroscedasticity across groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceMode {
    /// Variances assumed equal across groups (standard ANOVA)
    Equal,
    /// Unequal variances, Welch ANOVA with Satterthwaite-Welch df
    Unequal,
    /// Unequal variances, Brown-Forsythe (1971) statistic with the
    /// Mehrotra-corrected numerator df
    BrownForsythe,
}

impl Default for VarianceMode {
    fn default() -> Self {
        VarianceMode::Unequal
    }
}

/// Convention for the equivalence margin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginType {
    /// Margin is squared Cohen's f (signal-to-noise ratio)
    F2,
    /// Margin is Wellek's psi (the square enters the noncentrality)
    Wellek,
}

impl Default for MarginType {
    fn default() -> Self {
        MarginType::F2
    }
}

/// Per-group summary statistics
///
/// `variance` uses the sample correction (divisor `nobs - 1`). In the
/// trimmed case it is the rescaled winsorized variance and `nobs` is the
/// count after trimming, so downstream df arithmetic is unchanged.
#[derive(Debug, Clone, Copy)]
pub struct GroupSummary {
    /// Group mean (trimmed mean if a trim fraction was applied)
    pub mean: f64,
    /// Sample variance (winsorized and rescaled if trimmed)
    pub variance: f64,
    /// Observation count entering df computations
    pub nobs: f64,
}

/// Filter NaN values from a slice
pub(crate) fn filter_nan(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| !x.is_nan()).collect()
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn sample_variance(data: &[f64]) -> f64 {
    let m = mean(data);
    data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64
}

/// Summarize groups into mean/variance/count triples
///
/// With `trim_frac == 0` this is the plain mean and ddof-1 variance per
/// group. With `trim_frac > 0` each group is sorted, the lowest and
/// highest `floor(trim_frac * n)` observations are dropped for the
/// trimmed mean, and the variance is the sample variance of the
/// winsorized data (tails clamped to the boundary values) rescaled by
/// `(n - 1) / (n_trimmed - 1)`; `nobs` becomes the trimmed count. The
/// rescaling makes the Yuen variant of each ANOVA formula structurally
/// identical to the untrimmed one.
///
/// # Arguments
/// * `groups` - Sample data, one inner vector per group (NaN filtered)
/// * `trim_frac` - Fraction to trim from each tail, in `[0, 0.5)`
pub fn summarize_groups(groups: &[Vec<f64>], trim_frac: f64) -> StatsResult<Vec<GroupSummary>> {
    if !(0.0..0.5).contains(&trim_frac) {
        return Err(StatsError::InvalidTrimFraction(trim_frac));
    }

    let mut summaries = Vec::with_capacity(groups.len());
    for (i, group) in groups.iter().enumerate() {
        let g = filter_nan(group);
        if g.len() < 2 {
            return Err(StatsError::InsufficientData(format!(
                "group {} has {} observations, need at least 2",
                i,
                g.len()
            )));
        }

        if trim_frac == 0.0 {
            summaries.push(GroupSummary {
                mean: mean(&g),
                variance: sample_variance(&g),
                nobs: g.len() as f64,
            });
            continue;
        }

        let n = g.len();
        let cut = (trim_frac * n as f64).floor() as usize;
        let n_trimmed = n - 2 * cut;
        if n_trimmed < 2 {
            return Err(StatsError::InsufficientData(format!(
                "group {i}: trimming {cut} from each tail of {n} observations leaves fewer than 2"
            )));
        }

        let mut sorted = g;
        sorted.sort_unstable_by(f64::total_cmp);

        let trimmed = &sorted[cut..n - cut];
        let mean_trimmed = mean(trimmed);

        // Winsorize: clamp, do not drop, the same tail observations.
        let mut winsorized = sorted.clone();
        let lo = sorted[cut];
        let hi = sorted[n - cut - 1];
        for v in &mut winsorized[..cut] {
            *v = lo;
        }
        for v in &mut winsorized[n - cut..] {
            *v = hi;
        }
        let var_winsorized = sample_variance(&winsorized);

        summaries.push(GroupSummary {
            mean: mean_trimmed,
            variance: var_winsorized * (n as f64 - 1.0) / (n_trimmed as f64 - 1.0),
            nobs: n_trimmed as f64,
        });
    }

    Ok(summaries)
}

/// Broadcast a parameter vector to `len` groups; length 1 is repeated.
pub(crate) fn broadcast(values: &[f64], len: usize, name: &str) -> StatsResult<Vec<f64>> {
    match values.len() {
        1 => Ok(vec![values[0]; len]),
        n if n == len => Ok(values.to_vec()),
        n => Err(StatsError::DimensionMismatch(format!(
            "{name} has {n} elements, expected 1 or {len}"
        ))),
    }
}
