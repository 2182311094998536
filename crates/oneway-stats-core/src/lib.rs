//! oneway-stats-core: oneway ANOVA under unequal variances
//!
//! Group-comparison statistics that stay valid when groups are
//! heteroscedastic (Welch, Brown-Forsythe) or analyzed with robust
//! trimmed/winsorized estimators (Yuen variants), plus
//! noncentrality-based effect sizes with confidence intervals,
//! equivalence testing against a margin, Levene-type tests for equality
//! of scale, and analytic and Monte Carlo power.

pub mod distribution;
pub mod errors;
pub mod oneway;

pub use errors::{StatsError, StatsResult};
pub use oneway::anova::{anova_generic, anova_oneway, AnovaOptions, AnovaResult, BrownForsytheExtra};
pub use oneway::confint::{
    confint_effectsize_oneway, confint_noncentrality, EffectSizeCi, Interval,
};
pub use oneway::effectsize::{
    effectsize_oneway, eta2_to_f2, f2_to_eta2, f2_to_wellek, fstat_to_effectsize,
    fstat_to_wellek, wellek_to_f2, FTestEffectSizes,
};
pub use oneway::equivalence::{
    equivalence_oneway, equivalence_oneway_generic, EquivalenceOptions, EquivalenceResult,
};
pub use oneway::power::{
    power_equivalence_oneway, power_equivalence_posthoc, simulate_power_equivalence,
    PowerSimulationResult, SimulationOptions,
};
pub use oneway::scale::{
    equivalence_scale_oneway, scale_transform, test_scale_oneway, ScaleCenter, ScaleTransform,
};
pub use oneway::{summarize_groups, Alternative, GroupSummary, MarginType, VarianceMode};
