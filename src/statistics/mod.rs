use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;

use crate::distribution::{DistributionCdf, StatrsCdf};
use crate::rank::{MidRank, RankTable, RankTransform};
use crate::utils::round_to;

mod anova;
mod design;
mod friedman;
mod kruskal;
mod types;
mod validation;

pub use anova::one_way_anova;
pub use design::RepeatedMeasuresDesign;
pub use friedman::friedman;
pub use kruskal::kruskal_wallis;
pub use types::*;

/// Key the rank tests sort and look up observations by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingMode {
    /// Rank by `|x|`; `-2.0` and `2.0` tie.
    #[default]
    Magnitude,
    /// Rank by the signed value.
    Signed,
}

impl RankingMode {
    pub fn key(self, value: f64) -> f64 {
        match self {
            RankingMode::Magnitude => value.abs(),
            RankingMode::Signed => value,
        }
    }
}

pub struct HypothesisTestEngineBuilder<R: RankTransform = MidRank, D: DistributionCdf = StatrsCdf> {
    ranking: RankingMode,
    round_results: bool,
    rank_transform: R,
    distribution: D,
}

impl HypothesisTestEngineBuilder {
    pub fn new() -> Self {
        HypothesisTestEngineBuilder {
            ranking: RankingMode::default(),
            round_results: true,
            rank_transform: MidRank,
            distribution: StatrsCdf,
        }
    }
}

impl Default for HypothesisTestEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RankTransform, D: DistributionCdf> HypothesisTestEngineBuilder<R, D> {
    pub fn ranking(mut self, ranking: RankingMode) -> Self {
        self.ranking = ranking;
        self
    }

    /// Round results to display precision (default `true`).
    pub fn round_results(mut self, round_results: bool) -> Self {
        self.round_results = round_results;
        self
    }

    pub fn rank_transform<R2: RankTransform>(
        self,
        rank_transform: R2,
    ) -> HypothesisTestEngineBuilder<R2, D> {
        HypothesisTestEngineBuilder {
            ranking: self.ranking,
            round_results: self.round_results,
            rank_transform,
            distribution: self.distribution,
        }
    }

    pub fn distribution<D2: DistributionCdf>(
        self,
        distribution: D2,
    ) -> HypothesisTestEngineBuilder<R, D2> {
        HypothesisTestEngineBuilder {
            ranking: self.ranking,
            round_results: self.round_results,
            rank_transform: self.rank_transform,
            distribution,
        }
    }

    pub fn build(self) -> HypothesisTestEngine<R, D> {
        HypothesisTestEngine {
            ranking: self.ranking,
            round_results: self.round_results,
            rank_transform: Arc::new(self.rank_transform),
            distribution: Arc::new(self.distribution),
        }
    }
}

/// Computes one-way ANOVA, Kruskal-Wallis and Friedman tests.
///
/// The engine holds only configuration and shared, stateless collaborators, so a
/// single instance can serve concurrent callers. Identical input always produces
/// bit-identical output.
pub struct HypothesisTestEngine<R: RankTransform = MidRank, D: DistributionCdf = StatrsCdf> {
    ranking: RankingMode,
    round_results: bool,
    rank_transform: Arc<R>,
    distribution: Arc<D>,
}

impl HypothesisTestEngine {
    pub fn new() -> Self {
        HypothesisTestEngineBuilder::new().build()
    }
}

impl Default for HypothesisTestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RankTransform, D: DistributionCdf> Clone for HypothesisTestEngine<R, D> {
    fn clone(&self) -> Self {
        HypothesisTestEngine {
            ranking: self.ranking,
            round_results: self.round_results,
            rank_transform: Arc::clone(&self.rank_transform),
            distribution: Arc::clone(&self.distribution),
        }
    }
}

impl<R: RankTransform, D: DistributionCdf> fmt::Debug for HypothesisTestEngine<R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HypothesisTestEngine")
            .field("ranking", &self.ranking)
            .field("round_results", &self.round_results)
            .finish_non_exhaustive()
    }
}

impl<R: RankTransform, D: DistributionCdf> HypothesisTestEngine<R, D> {
    pub fn ranking(&self) -> RankingMode {
        self.ranking
    }

    pub fn rounds_results(&self) -> bool {
        self.round_results
    }

    fn round(&self, value: f64, places: u32) -> f64 {
        if self.round_results {
            round_to(value, places)
        } else {
            value
        }
    }
}

fn rank_of(table: &RankTable, key: f64) -> anyhow::Result<f64> {
    table
        .rank_of(key)
        .ok_or_else(|| anyhow!("No rank assigned to key {}", key))
}

#[cfg(test)]
pub(crate) fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn unrounded() -> HypothesisTestEngine {
        HypothesisTestEngineBuilder::new().round_results(false).build()
    }

    proptest! {
        #[test]
        fn anova_degrees_of_freedom_cover_observations(
            g1 in proptest::collection::vec(-1e3_f64..1e3, 2..=15),
            g2 in proptest::collection::vec(-1e3_f64..1e3, 2..=15),
            g3 in proptest::collection::vec(-1e3_f64..1e3, 2..=15),
        ) {
            let n = g1.len() + g2.len() + g3.len();
            if let Ok(r) = unrounded().one_way_anova(&[&g1, &g2, &g3]) {
                prop_assert_eq!(r.df_between + r.df_within + 1, n);
                prop_assert!(r.f_statistic >= 0.0, "F = {}", r.f_statistic);
                prop_assert!(r.p_value >= 0.0 && r.p_value <= 1.0, "p = {}", r.p_value);
            }
        }

        #[test]
        fn kruskal_tie_correction_bounded(
            g1 in proptest::collection::vec(-20_i32..20, 2..=12),
            g2 in proptest::collection::vec(-20_i32..20, 2..=12),
        ) {
            let a: Vec<f64> = g1.iter().map(|&v| v as f64).collect();
            let b: Vec<f64> = g2.iter().map(|&v| v as f64).collect();
            if let Ok(r) = unrounded().kruskal_wallis(&[&a, &b]) {
                prop_assert!(r.tie_correction > 0.0 && r.tie_correction <= 1.0,
                    "C = {}", r.tie_correction);
                prop_assert!(r.p_value >= -1e-12 && r.p_value <= 1.0 + 1e-12, "p = {}", r.p_value);
                prop_assert_eq!(r.df, 1);
            }
        }

        #[test]
        fn friedman_without_ties_has_unit_correction(
            rows in proptest::collection::vec(
                proptest::sample::subsequence((1..=20).collect::<Vec<i32>>(), 3).prop_shuffle(),
                1..=10,
            ),
        ) {
            let columns: Vec<Vec<f64>> = (0..3)
                .map(|j| rows.iter().map(|row| row[j] as f64).collect())
                .collect();
            let groups: Vec<&[f64]> = columns.iter().map(|c| c.as_slice()).collect();
            let r = unrounded().friedman(&groups).unwrap();
            prop_assert_eq!(r.tie_correction, 1.0);
            prop_assert!(r.statistic >= -1e-9, "statistic = {}", r.statistic);
            // Q is bounded by the case where every row ranks the treatments identically
            prop_assert!(r.statistic <= 2.0 * rows.len() as f64 + 1e-9,
                "statistic = {}", r.statistic);
            prop_assert_eq!(r.df, 2);
        }

        #[test]
        fn friedman_statistic_follows_row_order(
            rows in proptest::collection::vec(
                proptest::sample::subsequence((1..=20).collect::<Vec<i32>>(), 3).prop_shuffle(),
                2..=10,
            ),
        ) {
            let columns: Vec<Vec<f64>> = (0..3)
                .map(|j| rows.iter().map(|row| row[j] as f64).collect())
                .collect();
            let groups: Vec<&[f64]> = columns.iter().map(|c| c.as_slice()).collect();
            let r = unrounded().friedman(&groups).unwrap();

            let mut rank_sums = [0.0f64; 3];
            for row in &rows {
                for (j, &v) in row.iter().enumerate() {
                    rank_sums[j] += 1.0 + row.iter().filter(|&&other| other < v).count() as f64;
                }
            }
            let n = rows.len() as f64;
            let squared: f64 = rank_sums.iter().map(|s| s * s).sum();
            let expected = 12.0 * squared / (n * 12.0) - 12.0 * n;
            prop_assert!((r.statistic - expected).abs() < 1e-9,
                "statistic = {}, expected = {}", r.statistic, expected);
        }
    }
}
