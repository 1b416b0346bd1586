use anyhow::bail;
use log::debug;

use super::validation::validate_groups;
use super::{AnovaResult, HypothesisTestEngine};
use crate::distribution::DistributionCdf;
use crate::rank::RankTransform;
use crate::utils::mean;
use crate::HypothesisTestError;

impl<R: RankTransform, D: DistributionCdf> HypothesisTestEngine<R, D> {
    /// One-way analysis of variance over two or more independent groups.
    ///
    /// The overall mean is the unweighted mean of the group means, while the
    /// between-group sum of squares weights each group by its size. For balanced
    /// designs this is the textbook decomposition; for unbalanced designs it differs
    /// from the grand-mean formulation.
    ///
    /// # Errors
    ///
    /// [`HypothesisTestError::InsufficientGroups`] for fewer than two groups,
    /// [`HypothesisTestError::EmptySample`] for an empty group and
    /// [`HypothesisTestError::Degenerate`] when there are no within-group degrees of
    /// freedom or the within-group variance is zero.
    pub fn one_way_anova(&self, groups: &[&[f64]]) -> anyhow::Result<AnovaResult> {
        let n_total = validate_groups(groups)?;

        let group_means: Vec<f64> = groups.iter().map(|g| mean(g)).collect();
        let ss_within: f64 = groups
            .iter()
            .zip(&group_means)
            .map(|(group, &m)| group.iter().map(|&x| (x - m) * (x - m)).sum::<f64>())
            .sum();

        let overall_mean = mean(&group_means);
        let ss_between: f64 = groups
            .iter()
            .zip(&group_means)
            .map(|(group, &m)| group.len() as f64 * (m - overall_mean) * (m - overall_mean))
            .sum();

        let df_between = groups.len() - 1;
        let df_within = n_total - 1 - df_between;
        if df_within == 0 {
            bail!(HypothesisTestError::Degenerate {
                reason: "no within-group degrees of freedom"
            });
        }

        // constant groups leave rounding noise in ss_within, so test the values themselves
        if ss_within == 0.0 || groups.iter().all(|g| g.iter().all(|&x| x == g[0])) {
            bail!(HypothesisTestError::Degenerate {
                reason: "zero within-group variance"
            });
        }

        let ms_between = ss_between / df_between as f64;
        let ms_within = ss_within / df_within as f64;

        let f_statistic = ms_between / ms_within;
        let p_value = self.distribution.f_sf(f_statistic, df_between, df_within)?;
        debug!(
            "one-way ANOVA: k={} N={} SS_BG={} SS_WG={} F={} p={}",
            groups.len(),
            n_total,
            ss_between,
            ss_within,
            f_statistic,
            p_value
        );

        Ok(AnovaResult {
            f_statistic: self.round(f_statistic, 3),
            df_between,
            df_within,
            ms_between: self.round(ms_between, 3),
            ms_within: self.round(ms_within, 3),
            ss_between: self.round(ss_between, 3),
            ss_within: self.round(ss_within, 3),
            p_value: self.round(p_value, 4),
        })
    }
}

/// [`HypothesisTestEngine::one_way_anova`] with the default engine.
pub fn one_way_anova(groups: &[&[f64]]) -> anyhow::Result<AnovaResult> {
    HypothesisTestEngine::new().one_way_anova(groups)
}
