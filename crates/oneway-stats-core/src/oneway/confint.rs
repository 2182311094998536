//! Confidence intervals for the noncentrality parameter and derived
//! effect sizes
//!
//! The noncentrality CI inverts the noncentral-F CDF with respect to its
//! noncentrality parameter (Steiger 2004); effect-size intervals follow
//! by endpoint transformation.

use crate::distribution::noncentral_f_inv_nc;
use crate::oneway::effectsize::f2_to_eta2;
use crate::oneway::Alternative;
use crate::{StatsError, StatsResult};

/// Closed interval bounds
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    fn map(self, f: impl Fn(f64) -> f64) -> Interval {
        Interval {
            lower: f(self.lower),
            upper: f(self.upper),
        }
    }
}

/// Confidence interval for the noncentrality parameter of an F test
///
/// Finds the noncentralities at which the noncentral-F CDF evaluated at
/// the observed statistic equals `1 - alpha/2` (lower bound) and
/// `alpha/2` (upper bound). Bounds are clamped at zero, so they are
/// always non-negative with `lower <= upper`. Only the two-sided
/// alternative is supported.
pub fn confint_noncentrality(
    f_stat: f64,
    df1: f64,
    df2: f64,
    alpha: f64,
    alternative: Alternative,
) -> StatsResult<Interval> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(StatsError::InvalidAlpha(alpha));
    }
    if alternative != Alternative::TwoSided {
        return Err(StatsError::NotImplemented(
            "only the two-sided alternative is supported for noncentrality intervals".into(),
        ));
    }

    let alpha1s = alpha / 2.0;
    let lower = noncentral_f_inv_nc(1.0 - alpha1s, df1, df2, f_stat)?;
    let upper = noncentral_f_inv_nc(alpha1s, df1, df2, f_stat)?;
    Ok(Interval { lower, upper })
}

/// Confidence intervals for oneway effect sizes
#[derive(Debug, Clone)]
pub struct EffectSizeCi {
    /// Noncentrality parameter
    pub nc: Interval,
    /// Squared Cohen's f, `nc / nobs`
    pub f2: Interval,
    /// Eta-squared by endpoint transformation
    pub eta2: Interval,
    /// Cohen's f
    pub f: Interval,
    /// Eta
    pub eta: Interval,
    /// Bias-corrected f, `sqrt(f2 * (df1 + 1) / df1)` (Steiger)
    pub f_corrected: Interval,
}

/// Confidence interval for oneway ANOVA effect sizes from an F statistic
///
/// Inverts the noncentral-F CDF for the noncentrality interval, then
/// transforms the endpoints. `nobs` defaults to `df1 + df2 + 1`.
pub fn confint_effectsize_oneway(
    f_stat: f64,
    df1: f64,
    df2: f64,
    alpha: f64,
    nobs: Option<f64>,
) -> StatsResult<EffectSizeCi> {
    let nobs = nobs.unwrap_or(df1 + df2 + 1.0);
    if !(nobs > 0.0) {
        return Err(StatsError::InvalidInput(format!(
            "nobs must be positive, got {nobs}"
        )));
    }
    let nc = confint_noncentrality(f_stat, df1, df2, alpha, Alternative::TwoSided)?;

    let f2 = nc.map(|x| x / nobs);
    Ok(EffectSizeCi {
        nc,
        f2,
        eta2: f2.map(f2_to_eta2),
        f: f2.map(f64::sqrt),
        eta: f2.map(|x| f2_to_eta2(x).sqrt()),
        f_corrected: f2.map(|x| (x * (df1 + 1.0) / df1).sqrt()),
    })
}
