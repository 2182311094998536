//! Effect sizes for oneway ANOVA
//!
//! Squared Cohen's f from summary statistics (with Welch and
//! Brown-Forsythe adjustments so the value plugs into noncentral-F power
//! computations), conversions within the f-squared family, and Wellek's
//! equivalence effect size.

use crate::oneway::{broadcast, VarianceMode};
use crate::{StatsError, StatsResult};

/// Effect size corresponding to squared Cohen's f for oneway ANOVA
///
/// Equals the noncentrality parameter divided by the total number of
/// observations. Only relative sizes of `nobs` matter. `vars` and `nobs`
/// broadcast from length 1 (scalar variance is pooled, scalar nobs is a
/// balanced design). The inputs are generic parameter/scale vectors, not
/// necessarily raw-sample summaries, so fitted models can reuse this with
/// their own estimates.
///
/// For `BrownForsythe` the raw statistic is rescaled by the corrected
/// numerator df over `n_groups - 1`; the correction terms were chosen to
/// make noncentral-F power a good approximation, not taken from a single
/// textbook source, and are reproduced here literally.
///
/// # Arguments
/// * `means` - Group means (or fitted parameters)
/// * `vars` - Residual variance per group, or a single pooled value
/// * `nobs` - Observation counts, or a single balanced count
/// * `mode` - Variance treatment matching the intended ANOVA
/// * `ddof_between` - df correction for the weighted between sum of
///   squares; the denominator is `nobs_total - ddof_between` (default 0
///   matches power-analysis conventions)
pub fn effectsize_oneway(
    means: &[f64],
    vars: &[f64],
    nobs: &[f64],
    mode: VarianceMode,
    ddof_between: f64,
) -> StatsResult<f64> {
    let n_groups = means.len();
    if n_groups < 2 {
        return Err(StatsError::InsufficientData(
            "effect size requires at least 2 groups".into(),
        ));
    }
    let nobs = broadcast(nobs, n_groups, "nobs")?;
    let nobs_t: f64 = nobs.iter().sum();
    let k = n_groups as f64;

    let vars = match mode {
        VarianceMode::Equal => {
            let var_resid = if vars.len() == 1 {
                vars[0]
            } else if vars.len() == n_groups {
                nobs.iter()
                    .zip(vars)
                    .map(|(n, v)| (n - 1.0) * v)
                    .sum::<f64>()
                    / (nobs_t - k)
            } else {
                return Err(StatsError::DimensionMismatch(format!(
                    "vars has {} elements, expected 1 or {n_groups}",
                    vars.len()
                )));
            };
            vec![var_resid; n_groups]
        }
        VarianceMode::Unequal | VarianceMode::BrownForsythe => {
            broadcast(vars, n_groups, "vars")?
        }
    };
    for (i, &v) in vars.iter().enumerate() {
        if !(v > 0.0) || !v.is_finite() {
            return Err(StatsError::InvalidInput(format!(
                "group {i} has non-positive variance {v}"
            )));
        }
    }

    let weights: Vec<f64> = nobs.iter().zip(&vars).map(|(n, v)| n / v).collect();
    let w_total: f64 = weights.iter().sum();
    let meanw_t: f64 = weights
        .iter()
        .zip(means)
        .map(|(w, m)| w / w_total * m)
        .sum();

    let mut f2 = weights
        .iter()
        .zip(means)
        .map(|(w, m)| w * (m - meanw_t).powi(2))
        .sum::<f64>()
        / (nobs_t - ddof_between);

    if mode == VarianceMode::BrownForsythe {
        let meanw_t: f64 = nobs
            .iter()
            .zip(means)
            .map(|(n, m)| n / nobs_t * m)
            .sum();
        let tmp: f64 = nobs
            .iter()
            .zip(&vars)
            .map(|(n, v)| (1.0 - n / nobs_t) * v)
            .sum();
        let statistic = nobs
            .iter()
            .zip(means)
            .map(|(n, m)| n * (m - meanw_t).powi(2))
            .sum::<f64>()
            / tmp;
        f2 = statistic * nobs.iter().map(|n| 1.0 - n / nobs_t).sum::<f64>() / nobs_t;

        // Numerator-df correction ratio, same terms as the BF ANOVA df.
        let sum_v2: f64 = vars.iter().map(|v| v * v).sum();
        let sum_wv: f64 = nobs.iter().zip(&vars).map(|(n, v)| n / nobs_t * v).sum();
        let sum_wv2: f64 = nobs
            .iter()
            .zip(&vars)
            .map(|(n, v)| n / nobs_t * v * v)
            .sum();
        let df_num = tmp.powi(2) / (sum_v2 + sum_wv.powi(2) - 2.0 * sum_wv2);
        f2 *= df_num / (k - 1.0);
    }

    Ok(f2)
}

/// Convert squared Cohen's f to eta-squared (explained variance share)
pub fn f2_to_eta2(f2: f64) -> f64 {
    1.0 / (1.0 + 1.0 / f2)
}

/// Convert eta-squared to squared Cohen's f (signal-to-noise ratio)
pub fn eta2_to_f2(eta2: f64) -> f64 {
    eta2 / (1.0 - eta2)
}

/// Effect sizes in the f-squared family derived from an F statistic
#[derive(Debug, Clone, Copy)]
pub struct FTestEffectSizes {
    /// Squared Cohen's f, `F * df1 / df2`
    pub f2: f64,
    /// Eta-squared, `f2 / (f2 + 1)`
    pub eta2: f64,
    /// Omega-squared, `(f2 - df1/df2) / (f2 + 2)`
    pub omega2: f64,
    /// Epsilon-squared, `(f2 - df1/df2) / (f2 + 1)`
    pub eps2: f64,
}

/// Compute the f-squared effect-size family from an F statistic and its
/// df pair. Note the `f2` here uses `df2` in the denominator, unlike
/// [`effectsize_oneway`] which scales by total observations.
pub fn fstat_to_effectsize(f_stat: f64, df1: f64, df2: f64) -> FTestEffectSizes {
    let f2 = f_stat * df1 / df2;
    FTestEffectSizes {
        f2,
        eta2: f2 / (f2 + 1.0),
        omega2: (f2 - df1 / df2) / (f2 + 2.0),
        eps2: (f2 - df1 / df2) / (f2 + 1.0),
    }
}

/// Wellek's effect size (unsquared psi) to squared Cohen's f
pub fn wellek_to_f2(psi: f64, n_groups: usize) -> f64 {
    psi * psi / n_groups as f64
}

/// Squared Cohen's f to Wellek's effect size (unsquared psi)
pub fn f2_to_wellek(f2: f64, n_groups: usize) -> f64 {
    (n_groups as f64 * f2).sqrt()
}

/// F statistic to Wellek's squared effect size
pub fn fstat_to_wellek(f_stat: f64, n_groups: usize, nobs_mean: f64) -> f64 {
    f_stat * (n_groups as f64 - 1.0) / nobs_mean
}
