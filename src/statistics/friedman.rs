use anyhow::bail;
use log::{debug, trace};

use super::{rank_of, HypothesisTestEngine, RepeatedMeasuresDesign, TestResult};
use crate::distribution::DistributionCdf;
use crate::rank::{tie_correction_factor, RankTransform};
use crate::utils::ZeroVec;
use crate::HypothesisTestError;

impl<R: RankTransform, D: DistributionCdf> HypothesisTestEngine<R, D> {
    /// Friedman test for repeated measures.
    ///
    /// Each slice in `groups` is one treatment; the value at offset `i` of every
    /// treatment belongs to subject `i`, so all treatments must have the same length.
    ///
    /// # Errors
    ///
    /// [`HypothesisTestError::InsufficientGroups`] for fewer than two treatments,
    /// [`HypothesisTestError::DimensionMismatch`] when treatment lengths differ,
    /// [`HypothesisTestError::EmptySample`] when there are no subjects, and
    /// [`HypothesisTestError::Degenerate`] when every row is entirely tied.
    pub fn friedman(&self, groups: &[&[f64]]) -> anyhow::Result<TestResult> {
        let design = RepeatedMeasuresDesign::from_groups(groups)?;
        self.friedman_design(&design)
    }

    /// Friedman test on an already validated design.
    ///
    /// Every subject row is ranked on its own; with `n` subjects, `p` treatments and
    /// treatment rank sums `Rⱼ`,
    ///
    /// `Q = (12 / (n·p·(p+1)) · Σ Rⱼ² − 3·n·(p+1)) / C`, `C = 1 − Σ(t³ − t) / (n·(p³ − p))`
    ///
    /// is compared against χ²(p − 1).
    pub fn friedman_design(&self, design: &RepeatedMeasuresDesign) -> anyhow::Result<TestResult> {
        let subjects = design.subjects();
        let treatments = design.treatments();

        let mut rank_sums: Vec<f64> = Vec::new();
        rank_sums.zero_len(treatments);
        let mut row_keys: Vec<f64> = Vec::with_capacity(treatments);
        let mut tie_sum = 0.0;

        let data = design.data();
        for (i, row) in data.rows().into_iter().enumerate() {
            row_keys.clear();
            row_keys.extend(row.iter().map(|&x| self.ranking.key(x)));

            tie_sum += self.rank_transform.sum_of_tied_pairs(&row_keys);
            let ranks = self.rank_transform.calculate_ranks(&row_keys);
            for (sum, &key) in rank_sums.iter_mut().zip(row_keys.iter()) {
                *sum += rank_of(&ranks, key)?;
            }
            trace!("Friedman row {}: keys={:?} rank_sums={:?}", i, row_keys, rank_sums);
        }

        let n = subjects as f64;
        let p = treatments as f64;
        let squared_rank_sums: f64 = rank_sums.iter().map(|r| r * r).sum();

        let tie_correction = tie_correction_factor(tie_sum, n * (p * p * p - p));
        if tie_correction <= 0.0 {
            bail!(HypothesisTestError::Degenerate {
                reason: "every subject has identical values across treatments"
            });
        }

        let raw = 12.0 * squared_rank_sums / (n * p * (p + 1.0)) - 3.0 * n * (p + 1.0);
        let statistic = raw / tie_correction;
        let df = treatments - 1;
        let p_value = 1.0 - self.distribution.chi_square_cdf(statistic, df)?;
        debug!(
            "Friedman: n={} p={} rank_sums={:?} tie_sum={} C={} Q={} p={}",
            subjects,
            treatments,
            rank_sums,
            tie_sum,
            tie_correction,
            statistic,
            p_value
        );

        Ok(TestResult {
            statistic: self.round(statistic, 4),
            df,
            p_value: self.round(p_value, 5),
            tie_correction,
        })
    }
}

/// [`HypothesisTestEngine::friedman`] with the default engine.
pub fn friedman(groups: &[&[f64]]) -> anyhow::Result<TestResult> {
    HypothesisTestEngine::new().friedman(groups)
}
