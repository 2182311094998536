//! Tests for equality of scale across groups
//!
//! Levene-type tests: every observation is replaced by a deviation from
//! its group center and the oneway ANOVA machinery runs on the
//! transformed samples. The classic Levene test is the `Mean` center
//! with absolute deviations under the equal-variance ANOVA; the
//! Brown-Forsythe variant of Levene's test uses the `Median` center.
//! Unequal-variance and trimmed ANOVA backends combine freely with any
//! center and transform.

use crate::oneway::anova::{anova_oneway, AnovaOptions, AnovaResult};
use crate::oneway::equivalence::{equivalence_oneway, EquivalenceOptions, EquivalenceResult};
use crate::oneway::{filter_nan, mean};
use crate::{StatsError, StatsResult};

/// Group center the deviations are taken from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleCenter {
    /// Group median (Brown-Forsythe variant of Levene's test)
    Median,
    /// Group mean (classic Levene)
    Mean,
    /// Trimmed group mean, dropping the given fraction from each tail
    Trimmed(f64),
    /// Fixed, caller-supplied center
    Value(f64),
}

impl Default for ScaleCenter {
    fn default() -> Self {
        ScaleCenter::Median
    }
}

/// How deviations from the center enter the transformed sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleTransform {
    /// Absolute deviations (Levene, Brown-Forsythe)
    Abs,
    /// Squared deviations
    Square,
    /// Signed deviations, plain centering
    Identity,
}

impl Default for ScaleTransform {
    fn default() -> Self {
        ScaleTransform::Abs
    }
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Transform a sample to deviations from its center
///
/// NaN values are dropped before the center is computed. The returned
/// sample is what the oneway ANOVA machinery sees in the Levene-type
/// scale tests; with `Identity` and a fixed `Value` center the
/// transformation is a plain shift and the downstream test reduces to
/// the ordinary location ANOVA.
pub fn scale_transform(
    data: &[f64],
    center: ScaleCenter,
    transform: ScaleTransform,
) -> StatsResult<Vec<f64>> {
    let g = filter_nan(data);
    if g.is_empty() {
        return Err(StatsError::InsufficientData(
            "scale transform requires at least 1 observation".into(),
        ));
    }

    let c = match center {
        ScaleCenter::Value(c) => c,
        ScaleCenter::Mean => mean(&g),
        ScaleCenter::Median => {
            let mut sorted = g.clone();
            sorted.sort_unstable_by(f64::total_cmp);
            median(&sorted)
        }
        ScaleCenter::Trimmed(trim_frac) => {
            if !(0.0..0.5).contains(&trim_frac) {
                return Err(StatsError::InvalidTrimFraction(trim_frac));
            }
            let mut sorted = g.clone();
            sorted.sort_unstable_by(f64::total_cmp);
            let cut = (trim_frac * sorted.len() as f64).floor() as usize;
            mean(&sorted[cut..sorted.len() - cut])
        }
    };

    Ok(g.iter()
        .map(|x| {
            let d = x - c;
            match transform {
                ScaleTransform::Abs => d.abs(),
                ScaleTransform::Square => d * d,
                ScaleTransform::Identity => d,
            }
        })
        .collect())
}

/// Oneway ANOVA test for equality of scale
///
/// Each group is transformed to deviations from its own center, then the
/// ANOVA for the chosen variance treatment runs on the transformed
/// samples. `options.trim_frac` trims the transformed data, not the
/// original observations.
///
/// # Arguments
/// * `groups` - Vector of group data
/// * `center` - Group center the deviations are taken from
/// * `transform` - Deviation transform
/// * `options` - Options for the ANOVA on the transformed data
pub fn test_scale_oneway(
    groups: &[Vec<f64>],
    center: ScaleCenter,
    transform: ScaleTransform,
    options: &AnovaOptions,
) -> StatsResult<AnovaResult> {
    let transformed = groups
        .iter()
        .map(|g| scale_transform(g, center, transform))
        .collect::<StatsResult<Vec<_>>>()?;
    anova_oneway(&transformed, options)
}

/// Oneway equivalence test for group scales
///
/// Transforms the groups like [`test_scale_oneway`] and tests
/// equivalence of the transformed means against the margin. The margin
/// is interpreted on the transformed scale; absolute deviations are not
/// rescaled to match the variance under normality.
///
/// # Arguments
/// * `groups` - Vector of group data
/// * `equiv_margin` - Equivalence margin in `options.margin_type` units
/// * `center` - Group center the deviations are taken from
/// * `transform` - Deviation transform
/// * `options` - Equivalence test options
pub fn equivalence_scale_oneway(
    groups: &[Vec<f64>],
    equiv_margin: f64,
    center: ScaleCenter,
    transform: ScaleTransform,
    options: &EquivalenceOptions,
) -> StatsResult<EquivalenceResult> {
    let transformed = groups
        .iter()
        .map(|g| scale_transform(g, center, transform))
        .collect::<StatsResult<Vec<_>>>()?;
    equivalence_oneway(&transformed, equiv_margin, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oneway::{MarginType, VarianceMode};
    use approx::assert_abs_diff_eq;

    #[test]
    fn transform_centers_and_maps() {
        let data = [1.0, 2.0, 3.0, 4.0, 10.0];
        let abs = scale_transform(&data, ScaleCenter::Median, ScaleTransform::Abs).unwrap();
        assert_eq!(abs, vec![2.0, 1.0, 0.0, 1.0, 7.0]);

        let sq = scale_transform(&data, ScaleCenter::Median, ScaleTransform::Square).unwrap();
        for (s, a) in sq.iter().zip(&abs) {
            assert_abs_diff_eq!(*s, a * a, epsilon = 1e-12);
        }

        let id = scale_transform(&data, ScaleCenter::Value(2.0), ScaleTransform::Identity).unwrap();
        assert_eq!(id, vec![-1.0, 0.0, 1.0, 2.0, 8.0]);
    }

    #[test]
    fn even_length_median_and_trimmed_center() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let id = scale_transform(&data, ScaleCenter::Median, ScaleTransform::Identity).unwrap();
        assert_abs_diff_eq!(id[0], -1.5, epsilon = 1e-12);

        // trim 0.25 of n = 4 cuts one value from each tail, center 2.5
        let id = scale_transform(&data, ScaleCenter::Trimmed(0.25), ScaleTransform::Identity)
            .unwrap();
        assert_abs_diff_eq!(id[3], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn nan_is_dropped_before_the_center() {
        let data = [1.0, f64::NAN, 3.0];
        let abs = scale_transform(&data, ScaleCenter::Median, ScaleTransform::Abs).unwrap();
        assert_eq!(abs, vec![1.0, 1.0]);
    }

    #[test]
    fn location_shift_leaves_the_scale_test_unchanged() {
        let a = vec![1.0, 3.0, 4.0, 7.0, 10.0, 12.0];
        let shifted: Vec<f64> = a.iter().map(|x| x + 5.0).collect();
        let res = test_scale_oneway(
            &[a, shifted],
            ScaleCenter::Median,
            ScaleTransform::Abs,
            &AnovaOptions {
                mode: VarianceMode::Equal,
                ..Default::default()
            },
        )
        .unwrap();
        assert_abs_diff_eq!(res.statistic, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(res.p_value, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn detects_unequal_spread() {
        let narrow: Vec<f64> = (0..20).map(|i| (i as f64 - 9.5) * 0.1).collect();
        let wide: Vec<f64> = (0..20).map(|i| (i as f64 - 9.5) * 2.0).collect();
        let res = test_scale_oneway(
            &[narrow, wide],
            ScaleCenter::Median,
            ScaleTransform::Abs,
            &AnovaOptions {
                mode: VarianceMode::Equal,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(res.p_value < 1e-6, "p-value {} too large", res.p_value);
    }

    #[test]
    fn identity_with_fixed_center_reduces_to_location_anova() {
        let groups = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 5.0, 8.0, 11.0, 14.0],
            vec![4.0, 4.5, 5.0, 5.5, 6.0],
        ];
        let res = test_scale_oneway(
            &groups,
            ScaleCenter::Value(0.0),
            ScaleTransform::Identity,
            &AnovaOptions::default(),
        )
        .unwrap();
        let direct = anova_oneway(&groups, &AnovaOptions::default()).unwrap();
        assert_abs_diff_eq!(res.statistic, direct.statistic, epsilon = 0.0);
        assert_abs_diff_eq!(res.p_value, direct.p_value, epsilon = 0.0);
        assert_abs_diff_eq!(res.df_denom, direct.df_denom, epsilon = 0.0);
    }

    #[test]
    fn equivalence_composes_on_the_transformed_samples() {
        let groups = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![2.0, 3.5, 5.0, 6.5, 8.0, 9.5],
            vec![0.5, 1.5, 2.5, 3.5, 4.5, 5.5],
        ];
        let options = EquivalenceOptions {
            mode: VarianceMode::Equal,
            margin_type: MarginType::Wellek,
            ..Default::default()
        };
        let res = equivalence_scale_oneway(
            &groups,
            1.0,
            ScaleCenter::Median,
            ScaleTransform::Abs,
            &options,
        )
        .unwrap();

        let transformed: Vec<Vec<f64>> = groups
            .iter()
            .map(|g| scale_transform(g, ScaleCenter::Median, ScaleTransform::Abs).unwrap())
            .collect();
        let direct = equivalence_oneway(&transformed, 1.0, &options).unwrap();
        assert_abs_diff_eq!(res.p_value, direct.p_value, epsilon = 0.0);
        assert_abs_diff_eq!(res.statistic, direct.statistic, epsilon = 0.0);
        assert_eq!(res.reject, direct.reject);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            scale_transform(&[], ScaleCenter::Median, ScaleTransform::Abs),
            Err(StatsError::InsufficientData(_))
        ));
        assert!(matches!(
            scale_transform(&[1.0, 2.0], ScaleCenter::Trimmed(0.5), ScaleTransform::Abs),
            Err(StatsError::InvalidTrimFraction(_))
        ));
    }
}
