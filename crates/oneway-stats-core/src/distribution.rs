//! F-distribution primitives
//!
//! The central F distribution comes from statrs. statrs carries no
//! noncentral F, so the CDF is computed here as a Poisson mixture of
//! regularized incomplete beta terms, summed outward from the modal
//! Poisson weight. Quantiles and the inversion with respect to the
//! noncentrality parameter are bracketed bisections on that CDF.

use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use statrs::function::beta::{beta_reg, ln_beta};
use statrs::function::gamma::ln_gamma;

use crate::{StatsError, StatsResult};

/// Relative truncation threshold for the Poisson mixture series.
const SERIES_EPS: f64 = 1e-15;
/// Hard cap on series terms on either side of the modal weight.
const MAX_SERIES_TERMS: usize = 100_000;
/// Iteration cap for bracketed bisection.
const MAX_BISECT_ITER: usize = 200;
/// Interval width tolerance for bisection (relative to the bracket).
const BISECT_TOL: f64 = 1e-12;

fn validate_df(df1: f64, df2: f64) -> StatsResult<()> {
    if !(df1 > 0.0) || !df1.is_finite() || !(df2 > 0.0) || !df2.is_finite() {
        return Err(StatsError::InvalidInput(format!(
            "degrees of freedom must be positive and finite, got ({df1}, {df2})"
        )));
    }
    Ok(())
}

/// Survival function of the central F distribution.
pub fn f_sf(x: f64, df1: f64, df2: f64) -> StatsResult<f64> {
    let dist = FisherSnedecor::new(df1, df2)
        .map_err(|e| StatsError::InvalidInput(e.to_string()))?;
    Ok(dist.sf(x))
}

/// CDF of the noncentral F distribution with noncentrality `nc`.
///
/// Uses the representation
/// `P(F <= x) = sum_j Poisson(j; nc/2) * I_y(df1/2 + j, df2/2)`
/// with `y = df1 x / (df1 x + df2)`, evaluated upward and downward from
/// the modal Poisson term so large noncentralities do not underflow.
pub fn noncentral_f_cdf(x: f64, df1: f64, df2: f64, nc: f64) -> StatsResult<f64> {
    validate_df(df1, df2)?;
    if !nc.is_finite() || nc < 0.0 {
        return Err(StatsError::InvalidInput(format!(
            "noncentrality must be non-negative and finite, got {nc}"
        )));
    }
    if x <= 0.0 {
        return Ok(0.0);
    }

    let a = df1 / 2.0;
    let b = df2 / 2.0;
    let y = df1 * x / (df1 * x + df2);
    if nc == 0.0 {
        return Ok(beta_reg(a, b, y));
    }

    let half_nc = nc / 2.0;
    let ln_y = y.ln();
    let ln_1my = (-y).ln_1p();
    // Increment dropped when stepping I_y(a + j, b) -> I_y(a + j + 1, b).
    let step = |aj: f64| (aj * ln_y + b * ln_1my - ln_beta(aj, b) - aj.ln()).exp();

    let j0 = half_nc.floor() as usize;
    let w0 = (-half_nc + (j0 as f64) * half_nc.ln() - ln_gamma(j0 as f64 + 1.0)).exp();
    let i0 = beta_reg(a + j0 as f64, b, y);
    let mut sum = w0 * i0;

    // Upward pass: Poisson weights decay geometrically beyond the mode
    // and the beta terms are decreasing in j.
    let mut w = w0;
    let mut i_beta = i0;
    let mut j = j0;
    loop {
        i_beta = (i_beta - step(a + j as f64)).max(0.0);
        w *= half_nc / (j as f64 + 1.0);
        j += 1;
        let term = w * i_beta;
        sum += term;
        if term <= SERIES_EPS * sum || i_beta == 0.0 {
            break;
        }
        if j - j0 > MAX_SERIES_TERMS {
            return Err(StatsError::ConvergenceFailure {
                iterations: MAX_SERIES_TERMS,
                tolerance: SERIES_EPS,
            });
        }
    }

    // Downward pass toward j = 0.
    let mut w = w0;
    let mut i_beta = i0;
    let mut j = j0;
    while j > 0 {
        w *= j as f64 / half_nc;
        i_beta = (i_beta + step(a + (j - 1) as f64)).min(1.0);
        j -= 1;
        let term = w * i_beta;
        sum += term;
        if term <= SERIES_EPS * sum {
            break;
        }
    }

    Ok(sum.clamp(0.0, 1.0))
}

/// Quantile (inverse CDF) of the noncentral F distribution.
pub fn noncentral_f_ppf(p: f64, df1: f64, df2: f64, nc: f64) -> StatsResult<f64> {
    validate_df(df1, df2)?;
    if !(p > 0.0 && p < 1.0) {
        return Err(StatsError::InvalidInput(format!(
            "probability must be in (0, 1), got {p}"
        )));
    }

    // Bracket the quantile by doubling, then bisect. The CDF is strictly
    // increasing in x, so a plain bisection is sufficient.
    let mut hi = 1.0;
    let mut doublings = 0usize;
    while noncentral_f_cdf(hi, df1, df2, nc)? < p {
        hi *= 2.0;
        doublings += 1;
        if doublings > 1024 {
            return Err(StatsError::ConvergenceFailure {
                iterations: doublings,
                tolerance: BISECT_TOL,
            });
        }
    }

    let mut lo = 0.0;
    for _ in 0..MAX_BISECT_ITER {
        let mid = 0.5 * (lo + hi);
        if noncentral_f_cdf(mid, df1, df2, nc)? < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= BISECT_TOL * (1.0 + hi) {
            break;
        }
    }
    Ok(0.5 * (lo + hi))
}

/// Inverts the noncentral F CDF with respect to its noncentrality
/// parameter: finds `nc >= 0` with `cdf(f_stat; df1, df2, nc) = prob`.
///
/// The CDF is strictly decreasing in `nc` for a fixed `f_stat`. When even
/// `nc = 0` leaves the CDF at or below `prob` there is no positive root
/// and the result is clamped to 0, which keeps confidence bounds
/// non-negative. A root that cannot be bracketed is a convergence error.
pub fn noncentral_f_inv_nc(prob: f64, df1: f64, df2: f64, f_stat: f64) -> StatsResult<f64> {
    validate_df(df1, df2)?;
    if !(prob > 0.0 && prob < 1.0) {
        return Err(StatsError::InvalidInput(format!(
            "probability must be in (0, 1), got {prob}"
        )));
    }
    if !(f_stat > 0.0) || !f_stat.is_finite() {
        return Err(StatsError::InvalidInput(format!(
            "F statistic must be positive and finite, got {f_stat}"
        )));
    }

    if noncentral_f_cdf(f_stat, df1, df2, 0.0)? <= prob {
        return Ok(0.0);
    }

    let mut hi = 4.0;
    let mut doublings = 0usize;
    while noncentral_f_cdf(f_stat, df1, df2, hi)? > prob {
        hi *= 2.0;
        doublings += 1;
        if hi > 1e9 {
            return Err(StatsError::ConvergenceFailure {
                iterations: doublings,
                tolerance: BISECT_TOL,
            });
        }
    }

    let mut lo = 0.0;
    for _ in 0..MAX_BISECT_ITER {
        let mid = 0.5 * (lo + hi);
        if noncentral_f_cdf(f_stat, df1, df2, mid)? > prob {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= BISECT_TOL * (1.0 + hi) {
            break;
        }
    }
    Ok(0.5 * (lo + hi))
}
