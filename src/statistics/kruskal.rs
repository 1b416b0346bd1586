use anyhow::bail;
use log::debug;

use super::validation::validate_groups;
use super::{rank_of, HypothesisTestEngine, TestResult};
use crate::distribution::DistributionCdf;
use crate::rank::{tie_correction_factor, RankTransform};
use crate::HypothesisTestError;

impl<R: RankTransform, D: DistributionCdf> HypothesisTestEngine<R, D> {
    /// Kruskal-Wallis H test for two or more independent groups.
    ///
    /// All observations are pooled and ranked together (by magnitude unless the
    /// engine is configured with [`RankingMode::Signed`](super::RankingMode::Signed)),
    /// then
    ///
    /// `H = (12 / (N(N+1)) · Σ Rᵢ²/nᵢ − 3(N+1)) / C`, `C = 1 − Σ(t³ − t) / (N³ − N)`
    ///
    /// is compared against χ²(k − 1).
    ///
    /// # Errors
    ///
    /// [`HypothesisTestError::InsufficientGroups`], [`HypothesisTestError::EmptySample`],
    /// or [`HypothesisTestError::Degenerate`] when every observation shares one rank.
    pub fn kruskal_wallis(&self, groups: &[&[f64]]) -> anyhow::Result<TestResult> {
        let n_total = validate_groups(groups)?;
        let n = n_total as f64;

        let mut pooled: Vec<f64> = groups
            .iter()
            .flat_map(|group| group.iter().map(|&x| self.ranking.key(x)))
            .collect();
        pooled.sort_by(|a, b| a.total_cmp(b));

        let ranks = self.rank_transform.calculate_ranks(&pooled);
        let tie_sum = self.rank_transform.sum_of_tied_pairs(&pooled);

        let mut weighted_rank_sum = 0.0;
        for group in groups {
            let mut rank_sum = 0.0;
            for &x in group.iter() {
                rank_sum += rank_of(&ranks, self.ranking.key(x))?;
            }
            weighted_rank_sum += rank_sum * rank_sum / group.len() as f64;
        }

        let tie_correction = tie_correction_factor(tie_sum, n * n * n - n);
        if tie_correction <= 0.0 {
            bail!(HypothesisTestError::Degenerate {
                reason: "all observations are tied"
            });
        }

        let h = 12.0 * weighted_rank_sum / (n * (n + 1.0)) - 3.0 * (n + 1.0);
        let statistic = h / tie_correction;
        let df = groups.len() - 1;
        let p_value = 1.0 - self.distribution.chi_square_cdf(statistic, df)?;
        debug!(
            "Kruskal-Wallis: k={} N={} tie_sum={} C={} H={} p={}",
            groups.len(),
            n_total,
            tie_sum,
            tie_correction,
            statistic,
            p_value
        );

        Ok(TestResult {
            statistic: self.round(statistic, 4),
            df,
            p_value: self.round(p_value, 6),
            tie_correction,
        })
    }
}

/// [`HypothesisTestEngine::kruskal_wallis`] with the default engine.
pub fn kruskal_wallis(groups: &[&[f64]]) -> anyhow::Result<TestResult> {
    HypothesisTestEngine::new().kruskal_wallis(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::{init_test_logger, HypothesisTestEngineBuilder, RankingMode};
    use approx::assert_relative_eq;

    #[test]
    fn test_separated_groups() -> anyhow::Result<()> {
        init_test_logger();
        let result = kruskal_wallis(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]])?;

        // rank sums 6, 15, 24: 12 * 279 / 90 - 30
        assert_relative_eq!(result.statistic, 7.2);
        assert_eq!(result.df, 2);
        assert_eq!(result.tie_correction, 1.0);
        // P(χ²(2) > 7.2) = exp(-3.6)
        assert_relative_eq!(result.p_value, 0.027324);
        Ok(())
    }

    #[test]
    fn test_identical_groups() -> anyhow::Result<()> {
        let group = [1.0, 2.0, 3.0];
        let result = kruskal_wallis(&[&group, &group, &group])?;

        assert_relative_eq!(result.statistic, 0.0);
        assert_relative_eq!(result.p_value, 1.0);
        // three triples: 1 - 72 / 720
        assert_relative_eq!(result.tie_correction, 0.9);
        Ok(())
    }

    #[test]
    fn test_tie_correction_inflates_statistic() -> anyhow::Result<()> {
        let engine = HypothesisTestEngineBuilder::new().round_results(false).build();
        let result = engine.kruskal_wallis(&[&[1.0, 1.0, 2.0], &[3.0, 4.0, 4.0]])?;

        // ranks 1.5, 1.5, 3 | 4, 5.5, 5.5; tie sum 12 over 6³ - 6
        let h = 12.0 * (36.0 / 3.0 + 225.0 / 3.0) / 42.0 - 21.0;
        let c = 1.0 - 12.0 / 210.0;
        assert_relative_eq!(result.tie_correction, c);
        assert_relative_eq!(result.statistic, h / c, epsilon = 1e-12);
        assert!(result.statistic > h);
        Ok(())
    }

    #[test]
    fn test_magnitude_ranking_ties_opposite_signs() -> anyhow::Result<()> {
        let engine = HypothesisTestEngineBuilder::new().round_results(false).build();
        let mixed = engine.kruskal_wallis(&[&[-1.0, 2.0], &[1.0, 3.0]])?;
        let positive = engine.kruskal_wallis(&[&[1.0, 2.0], &[1.0, 3.0]])?;

        assert_eq!(mixed, positive);
        assert!(mixed.tie_correction < 1.0);
        Ok(())
    }

    #[test]
    fn test_signed_ranking() -> anyhow::Result<()> {
        let engine = HypothesisTestEngineBuilder::new()
            .ranking(RankingMode::Signed)
            .round_results(false)
            .build();
        let result = engine.kruskal_wallis(&[&[-1.0, 2.0], &[1.0, 3.0]])?;

        // ranks 1, 3 | 2, 4
        let h = 12.0 * (16.0 / 2.0 + 36.0 / 2.0) / 20.0 - 15.0;
        assert_eq!(result.tie_correction, 1.0);
        assert_relative_eq!(result.statistic, h, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_all_tied_is_degenerate() {
        let err = kruskal_wallis(&[&[5.0, 5.0], &[-5.0, 5.0]]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HypothesisTestError>(),
            Some(HypothesisTestError::Degenerate { .. })
        ));
    }
}
