//! Equivalence testing for oneway ANOVA (Wellek's Anova and extensions)
//!
//! The null hypothesis is that the means differ by more than the margin
//! in the anova distance measure. Rejecting it supports that the means
//! are equivalent, i.e. within the given distance.

use crate::distribution::{noncentral_f_cdf, noncentral_f_ppf};
use crate::oneway::anova::{anova_oneway, AnovaOptions};
use crate::oneway::{MarginType, VarianceMode};
use crate::{StatsError, StatsResult};

/// Noncentrality of exactly zero is substituted with this epsilon so the
/// computation stays valid for distribution backends that reject zero.
pub(crate) const ZERO_NC_EPS: f64 = 1e-13;

/// Options for the oneway equivalence test
#[derive(Debug, Clone)]
pub struct EquivalenceOptions {
    /// Variance treatment for the underlying ANOVA (default: Unequal)
    pub mode: VarianceMode,
    /// Welch's statistic correction in Unequal mode (default: true)
    pub welch_correction: bool,
    /// Trim fraction for the Yuen variants (default: 0.0)
    pub trim_frac: f64,
    /// Margin convention (default: F2)
    pub margin_type: MarginType,
    /// Significance level (default: 0.05)
    pub alpha: f64,
}

impl Default for EquivalenceOptions {
    fn default() -> Self {
        Self {
            mode: VarianceMode::Unequal,
            welch_correction: true,
            trim_frac: 0.0,
            margin_type: MarginType::F2,
            alpha: 0.05,
        }
    }
}

/// Result of a oneway equivalence test
#[derive(Debug, Clone)]
pub struct EquivalenceResult {
    /// Observed F statistic
    pub statistic: f64,
    /// CDF of the noncentral F at the observed statistic under the
    /// margin's implied noncentrality
    pub p_value: f64,
    /// Observed effect size, in the margin's convention
    pub effect_size: f64,
    /// Critical F value, the alpha-quantile of the noncentral F at the
    /// margin's noncentrality
    pub crit_f: f64,
    /// Critical effect size derived from `crit_f`
    pub crit_es: f64,
    /// True when the data supports equivalence (`effect_size < crit_es`)
    pub reject: bool,
    /// CDF of the critical value under (numerically) zero noncentrality
    pub power_zero: f64,
    /// Numerator degrees of freedom
    pub df_num: f64,
    /// Denominator degrees of freedom
    pub df_denom: f64,
    /// Test method description
    pub method: String,
}

/// Oneway equivalence test from an observed F statistic
///
/// The margin sets the null noncentrality: `nobs_mean * margin^2` for
/// the Wellek convention, `nobs_total * margin` for squared Cohen's f.
/// Note that with unequal-variance statistics the margins are not fully
/// comparable across variance treatments, since the statistic itself
/// carries mode-specific corrections.
///
/// # Arguments
/// * `f_stat` - Observed ANOVA statistic
/// * `n_groups` - Number of groups
/// * `nobs_total` - Total observation count
/// * `equiv_margin` - Equivalence margin in the chosen convention
/// * `df` - (numerator, denominator) degrees of freedom of the statistic
/// * `alpha` - Significance level
/// * `margin_type` - Margin convention
pub fn equivalence_oneway_generic(
    f_stat: f64,
    n_groups: usize,
    nobs_total: f64,
    equiv_margin: f64,
    df: (f64, f64),
    alpha: f64,
    margin_type: MarginType,
) -> StatsResult<EquivalenceResult> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(StatsError::InvalidAlpha(alpha));
    }
    if n_groups < 2 {
        return Err(StatsError::InsufficientData(
            "equivalence test requires at least 2 groups".into(),
        ));
    }
    if !(equiv_margin > 0.0) {
        return Err(StatsError::InvalidInput(format!(
            "equivalence margin must be positive, got {equiv_margin}"
        )));
    }

    let k = n_groups as f64;
    let nobs_mean = nobs_total / k;
    let (df1, df2) = df;

    let (nc_null, es, kind) = match margin_type {
        MarginType::Wellek => (
            nobs_mean * equiv_margin * equiv_margin,
            f_stat * (k - 1.0) / nobs_mean,
            "Wellek's psi-squared",
        ),
        MarginType::F2 => (
            nobs_total * equiv_margin,
            f_stat / nobs_total,
            "Cohen's f-squared",
        ),
    };

    let crit_f = noncentral_f_ppf(alpha, df1, df2, nc_null)?;
    let crit_es = match margin_type {
        MarginType::Wellek => crit_f * (k - 1.0) / nobs_mean,
        MarginType::F2 => crit_f / nobs_total,
    };

    let p_value = noncentral_f_cdf(f_stat, df1, df2, nc_null)?;
    let power_zero = noncentral_f_cdf(crit_f, df1, df2, ZERO_NC_EPS)?;

    Ok(EquivalenceResult {
        statistic: f_stat,
        p_value,
        effect_size: es,
        crit_f,
        crit_es,
        reject: es < crit_es,
        power_zero,
        df_num: df1,
        df_denom: df2,
        method: format!("Oneway equivalence test ({kind} margin)"),
    })
}

/// Oneway equivalence test from raw samples
///
/// Runs the ANOVA pipeline (summaries, statistic, df) for the chosen
/// variance treatment and tests equivalence against the margin.
///
/// # Arguments
/// * `groups` - Vector of group data
/// * `equiv_margin` - Equivalence margin in `options.margin_type` units
/// * `options` - Test options
pub fn equivalence_oneway(
    groups: &[Vec<f64>],
    equiv_margin: f64,
    options: &EquivalenceOptions,
) -> StatsResult<EquivalenceResult> {
    let res = anova_oneway(
        groups,
        &AnovaOptions {
            mode: options.mode,
            welch_correction: options.welch_correction,
            trim_frac: options.trim_frac,
        },
    )?;

    equivalence_oneway_generic(
        res.statistic,
        res.n_groups,
        res.nobs_total,
        equiv_margin,
        (res.df_num, res.df_denom),
        options.alpha,
        options.margin_type,
    )
}
