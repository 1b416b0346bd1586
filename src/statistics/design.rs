use anyhow::{anyhow, bail};
use ndarray::{Array2, ArrayView2};
use num_traits::{Float, ToPrimitive};

use super::validation::validate_group_count;
use crate::HypothesisTestError;

/// Repeated-measures layout: every subject is measured once under every treatment.
///
/// Stored as a subjects × treatments matrix, so row `i` is subject `i` and column
/// `j` is treatment `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatedMeasuresDesign {
    data: Array2<f64>,
}

impl RepeatedMeasuresDesign {
    /// Builds a design from one slice per treatment; offset `i` of every slice is subject `i`.
    pub fn from_groups(groups: &[&[f64]]) -> anyhow::Result<Self> {
        validate_group_count(groups.len())?;
        let expected = groups[0].len();
        for (index, group) in groups.iter().enumerate() {
            if group.len() != expected {
                bail!(HypothesisTestError::DimensionMismatch {
                    index,
                    expected,
                    found: group.len(),
                });
            }
        }
        if expected == 0 {
            bail!(HypothesisTestError::EmptySample { index: 0 });
        }

        let data = Array2::from_shape_fn((expected, groups.len()), |(i, j)| groups[j][i]);
        Ok(Self { data })
    }

    /// Builds a design from a subjects × treatments matrix.
    pub fn from_matrix<T>(matrix: ArrayView2<T>) -> anyhow::Result<Self>
    where
        T: Float + ToPrimitive,
    {
        let (subjects, treatments) = matrix.dim();
        validate_group_count(treatments)?;
        if subjects == 0 {
            bail!(HypothesisTestError::EmptySample { index: 0 });
        }

        let mut data = Array2::<f64>::zeros((subjects, treatments));
        for (dst, src) in data.iter_mut().zip(matrix.iter()) {
            *dst = src
                .to_f64()
                .ok_or_else(|| anyhow!("Numeric conversion failed"))?;
        }
        Ok(Self { data })
    }

    pub fn subjects(&self) -> usize {
        self.data.nrows()
    }

    pub fn treatments(&self) -> usize {
        self.data.ncols()
    }

    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}
