//! Oneway ANOVA engine
//!
//! - Standard (Fisher) ANOVA under equal variances
//! - Welch ANOVA with Satterthwaite-Welch degrees of freedom
//! - Brown-Forsythe ANOVA with the Mehrotra-corrected numerator df

use crate::distribution::f_sf;
use crate::oneway::{broadcast, summarize_groups, VarianceMode};
use crate::{StatsError, StatsResult};

/// Options for oneway ANOVA
#[derive(Debug, Clone)]
pub struct AnovaOptions {
    /// Variance treatment: Unequal (Welch, default), Equal or BrownForsythe
    pub mode: VarianceMode,
    /// Apply Welch's correction to the statistic in Unequal mode
    /// (default: true)
    pub welch_correction: bool,
    /// Trim fraction for the Yuen (trimmed/winsorized) variants
    /// (default: 0.0)
    pub trim_frac: f64,
}

impl Default for AnovaOptions {
    fn default() -> Self {
        Self {
            mode: VarianceMode::Unequal,
            welch_correction: true,
            trim_frac: 0.0,
        }
    }
}

/// Secondary Brown-Forsythe output: the uncorrected numerator df pair
/// and its p-value, as reported by reference implementations that skip
/// the Mehrotra correction (e.g. R's `onewaytests::bf.test`).
#[derive(Debug, Clone, Copy)]
pub struct BrownForsytheExtra {
    /// Uncorrected numerator df, `n_groups - 1`
    pub df_num2: f64,
    /// Denominator df paired with `df_num2`
    pub df_denom2: f64,
    /// Upper-tail p-value of the same statistic at `(df_num2, df_denom2)`
    pub p_value2: f64,
}

/// Result of a oneway ANOVA
#[derive(Debug, Clone)]
pub struct AnovaResult {
    /// Test statistic
    pub statistic: f64,
    /// Upper-tail p-value at `(df_num, df_denom)`
    pub p_value: f64,
    /// Numerator degrees of freedom
    pub df_num: f64,
    /// Denominator degrees of freedom
    pub df_denom: f64,
    /// Total number of observations (post-trimming if applicable)
    pub nobs_total: f64,
    /// Number of groups
    pub n_groups: usize,
    /// Second df pair and p-value, Brown-Forsythe mode only
    pub brown_forsythe: Option<BrownForsytheExtra>,
    /// Test method description
    pub method: String,
}

fn weighted_mean(weights: &[f64], means: &[f64]) -> f64 {
    let w_total: f64 = weights.iter().sum();
    weights
        .iter()
        .zip(means)
        .map(|(w, m)| w * m)
        .sum::<f64>()
        / w_total
}

/// Oneway ANOVA from summary statistics
///
/// `vars` and `nobs` broadcast from length 1 to the number of groups
/// (scalar variance is treated as pooled, scalar nobs as balanced).
///
/// # Arguments
/// * `means` - Group means
/// * `vars` - Group variances (ddof 1)
/// * `nobs` - Group observation counts
/// * `mode` - Variance treatment
/// * `welch_correction` - Welch's statistic correction (Unequal mode only)
pub fn anova_generic(
    means: &[f64],
    vars: &[f64],
    nobs: &[f64],
    mode: VarianceMode,
    welch_correction: bool,
) -> StatsResult<AnovaResult> {
    let n_groups = means.len();
    if n_groups < 2 {
        return Err(StatsError::InsufficientData(
            "ANOVA requires at least 2 groups".into(),
        ));
    }
    let vars = broadcast(vars, n_groups, "vars")?;
    let nobs = broadcast(nobs, n_groups, "nobs")?;

    for (i, (&v, &n)) in vars.iter().zip(&nobs).enumerate() {
        if !(n > 1.0) {
            return Err(StatsError::InsufficientData(format!(
                "group {i} has nobs {n}, need more than 1"
            )));
        }
        if !(v >= 0.0) || !v.is_finite() {
            return Err(StatsError::InvalidInput(format!(
                "group {i} has invalid variance {v}"
            )));
        }
        if mode == VarianceMode::Unequal && v == 0.0 {
            return Err(StatsError::InvalidInput(format!(
                "group {i} has zero variance, Welch weights are undefined"
            )));
        }
    }

    let k = n_groups as f64;
    let nobs_t: f64 = nobs.iter().sum();

    let weights: Vec<f64> = match mode {
        VarianceMode::Unequal => nobs.iter().zip(&vars).map(|(n, v)| n / v).collect(),
        VarianceMode::Equal | VarianceMode::BrownForsythe => nobs.clone(),
    };
    let w_total: f64 = weights.iter().sum();
    let meanw_t = weighted_mean(&weights, means);

    let mut statistic = weights
        .iter()
        .zip(means)
        .map(|(w, m)| w * (m - meanw_t).powi(2))
        .sum::<f64>()
        / (k - 1.0);
    let mut df_num = k - 1.0;
    let df_denom;
    let mut extra = None;

    match mode {
        VarianceMode::Unequal => {
            let tmp = weights
                .iter()
                .zip(&nobs)
                .map(|(w, n)| (1.0 - w / w_total).powi(2) / (n - 1.0))
                .sum::<f64>()
                / (k * k - 1.0);
            if welch_correction {
                statistic /= 1.0 + 2.0 * (k - 2.0) * tmp;
            }
            df_denom = 1.0 / (3.0 * tmp);
        }
        VarianceMode::Equal => {
            // Pooled residual variance of the group-demeaned total sample.
            let var_resid = nobs
                .iter()
                .zip(&vars)
                .map(|(n, v)| (n - 1.0) * v)
                .sum::<f64>()
                / (nobs_t - k);
            if var_resid == 0.0 {
                return Err(StatsError::InvalidInput(
                    "pooled variance is zero, F statistic is undefined".into(),
                ));
            }
            statistic /= var_resid;
            df_denom = nobs_t - k;
        }
        VarianceMode::BrownForsythe => {
            let tmp: f64 = nobs
                .iter()
                .zip(&vars)
                .map(|(n, v)| (1.0 - n / nobs_t) * v)
                .sum();
            if tmp == 0.0 {
                return Err(StatsError::InvalidInput(
                    "all variances are zero, Brown-Forsythe statistic is undefined".into(),
                ));
            }
            statistic = nobs
                .iter()
                .zip(means)
                .map(|(n, m)| n * (m - meanw_t).powi(2))
                .sum::<f64>()
                / tmp;

            df_denom = tmp.powi(2)
                / nobs
                    .iter()
                    .zip(&vars)
                    .map(|(n, v)| (1.0 - n / nobs_t).powi(2) * v * v / (n - 1.0))
                    .sum::<f64>();

            // Mehrotra correction for the numerator df.
            let sum_v2: f64 = vars.iter().map(|v| v * v).sum();
            let sum_wv: f64 = nobs.iter().zip(&vars).map(|(n, v)| n / nobs_t * v).sum();
            let sum_wv2: f64 = nobs
                .iter()
                .zip(&vars)
                .map(|(n, v)| n / nobs_t * v * v)
                .sum();
            df_num = tmp.powi(2) / (sum_v2 + sum_wv.powi(2) - 2.0 * sum_wv2);

            let df_num2 = k - 1.0;
            extra = Some(BrownForsytheExtra {
                df_num2,
                df_denom2: df_denom,
                p_value2: f_sf(statistic, df_num2, df_denom)?,
            });
        }
    }

    let method = match mode {
        VarianceMode::Equal => "Oneway ANOVA (equal variances)",
        VarianceMode::Unequal => "Welch's oneway ANOVA",
        VarianceMode::BrownForsythe => "Brown-Forsythe oneway ANOVA",
    };

    let p_value = f_sf(statistic, df_num, df_denom)?;
    Ok(AnovaResult {
        statistic,
        p_value,
        df_num,
        df_denom,
        nobs_total: nobs_t,
        n_groups,
        brown_forsythe: extra,
        method: method.to_string(),
    })
}

/// Oneway ANOVA from raw samples
///
/// Compares means across multiple groups; NaN values are filtered per
/// group. With `trim_frac > 0` the Yuen variant is computed on trimmed
/// means and rescaled winsorized variances.
///
/// # Arguments
/// * `groups` - Vector of group data
/// * `options` - Test options
pub fn anova_oneway(groups: &[Vec<f64>], options: &AnovaOptions) -> StatsResult<AnovaResult> {
    if groups.len() < 2 {
        return Err(StatsError::InsufficientData(
            "ANOVA requires at least 2 groups".into(),
        ));
    }

    let summaries = summarize_groups(groups, options.trim_frac)?;
    let means: Vec<f64> = summaries.iter().map(|s| s.mean).collect();
    let vars: Vec<f64> = summaries.iter().map(|s| s.variance).collect();
    let nobs: Vec<f64> = summaries.iter().map(|s| s.nobs).collect();

    anova_generic(&means, &vars, &nobs, options.mode, options.welch_correction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn example_groups() -> Vec<Vec<f64>> {
        vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 3.0, 4.0, 5.0, 6.0],
            vec![4.0, 5.0, 6.0, 7.0, 8.0],
        ]
    }

    #[test]
    fn equal_mode_matches_textbook_f() {
        // Balanced groups, equal variances 2.5; group means 3, 4, 6 and
        // grand mean 13/3 give SS_between = 5 * sum((m - 13/3)^2) = 70/3.
        let res = anova_oneway(
            &example_groups(),
            &AnovaOptions {
                mode: VarianceMode::Equal,
                ..Default::default()
            },
        )
        .unwrap();
        assert_abs_diff_eq!(res.statistic, (70.0 / 3.0 / 2.0) / 2.5, epsilon = 1e-10);
        assert_abs_diff_eq!(res.df_num, 2.0, epsilon = 0.0);
        assert_abs_diff_eq!(res.df_denom, 12.0, epsilon = 0.0);
        assert!(res.p_value > 0.0 && res.p_value < 1.0);
        assert!(res.brown_forsythe.is_none());
    }

    #[test]
    fn welch_equals_equal_mode_statistic_in_balanced_homoscedastic_limit() {
        // Identical variances and counts: the Welch statistic (before the
        // correction factor) coincides with the standard F.
        let res_eq = anova_oneway(
            &example_groups(),
            &AnovaOptions {
                mode: VarianceMode::Equal,
                ..Default::default()
            },
        )
        .unwrap();
        let res_w = anova_oneway(
            &example_groups(),
            &AnovaOptions {
                mode: VarianceMode::Unequal,
                welch_correction: false,
                trim_frac: 0.0,
            },
        )
        .unwrap();
        assert_relative_eq!(res_eq.statistic, res_w.statistic, max_relative = 1e-10);
    }

    #[test]
    fn welch_correction_shrinks_statistic() {
        let groups = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 5.0, 8.0, 11.0, 14.0, 17.0],
            vec![4.0, 4.5, 5.0, 5.5, 6.0, 6.5, 7.0],
        ];
        let uncorrected = anova_generic_from(&groups, false);
        let corrected = anova_generic_from(&groups, true);
        assert!(corrected.statistic < uncorrected.statistic);
        assert_abs_diff_eq!(corrected.df_denom, uncorrected.df_denom, epsilon = 1e-12);
    }

    fn anova_generic_from(groups: &[Vec<f64>], welch_correction: bool) -> AnovaResult {
        anova_oneway(
            groups,
            &AnovaOptions {
                mode: VarianceMode::Unequal,
                welch_correction,
                trim_frac: 0.0,
            },
        )
        .unwrap()
    }

    #[test]
    fn brown_forsythe_keeps_both_df_pairs() {
        let groups = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 5.0, 8.0, 11.0, 14.0],
            vec![4.0, 4.5, 5.0, 5.5, 6.0],
        ];
        let res = anova_oneway(
            &groups,
            &AnovaOptions {
                mode: VarianceMode::BrownForsythe,
                ..Default::default()
            },
        )
        .unwrap();
        let extra = res.brown_forsythe.expect("BF extra df pair");
        assert_abs_diff_eq!(extra.df_num2, 2.0, epsilon = 0.0);
        assert_abs_diff_eq!(extra.df_denom2, res.df_denom, epsilon = 0.0);
        // Both p-values must be consistent with their own F evaluation.
        let p1 = f_sf(res.statistic, res.df_num, res.df_denom).unwrap();
        let p2 = f_sf(res.statistic, extra.df_num2, extra.df_denom2).unwrap();
        assert_abs_diff_eq!(res.p_value, p1, epsilon = 1e-14);
        assert_abs_diff_eq!(extra.p_value2, p2, epsilon = 1e-14);
    }

    #[test]
    fn scalar_variance_and_nobs_broadcast() {
        let res = anova_generic(
            &[527.86, 660.43, 649.14],
            &[107.4304 * 107.4304],
            &[12.0],
            VarianceMode::Equal,
            true,
        )
        .unwrap();
        assert_abs_diff_eq!(res.nobs_total, 36.0, epsilon = 0.0);
        assert_abs_diff_eq!(res.df_denom, 33.0, epsilon = 0.0);
    }

    #[test]
    fn validation_errors() {
        assert!(matches!(
            anova_oneway(&[vec![1.0, 2.0]], &AnovaOptions::default()),
            Err(StatsError::InsufficientData(_))
        ));
        assert!(matches!(
            anova_generic(&[1.0, 2.0], &[1.0, 2.0, 3.0], &[5.0], VarianceMode::Equal, true),
            Err(StatsError::DimensionMismatch(_))
        ));
        // Zero variance group breaks Welch weights.
        assert!(matches!(
            anova_generic(
                &[1.0, 2.0],
                &[0.0, 1.0],
                &[5.0, 5.0],
                VarianceMode::Unequal,
                true
            ),
            Err(StatsError::InvalidInput(_))
        ));
    }
}
