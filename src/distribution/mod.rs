use anyhow::anyhow;
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};

/// Reference distributions used to turn a test statistic into a p-value.
pub trait DistributionCdf: Send + Sync {
    /// Lower-tail probability `P(F <= statistic)` of the F distribution.
    fn f_cdf(&self, statistic: f64, df1: usize, df2: usize) -> anyhow::Result<f64>;

    /// Upper-tail probability `P(F > statistic)`; the p-value of a one-way ANOVA.
    fn f_sf(&self, statistic: f64, df1: usize, df2: usize) -> anyhow::Result<f64> {
        Ok(1.0 - self.f_cdf(statistic, df1, df2)?)
    }

    /// Lower-tail probability `P(X <= statistic)` of the chi-square distribution.
    fn chi_square_cdf(&self, statistic: f64, df: usize) -> anyhow::Result<f64>;

    /// Upper-tail probability `P(X > statistic)` for callers that want it directly.
    /// The rank tests report `1 - chi_square_cdf` instead.
    fn chi_square_sf(&self, statistic: f64, df: usize) -> anyhow::Result<f64> {
        Ok(1.0 - self.chi_square_cdf(statistic, df)?)
    }
}

/// [`DistributionCdf`] backed by `statrs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatrsCdf;

impl StatrsCdf {
    fn fisher(df1: usize, df2: usize) -> anyhow::Result<FisherSnedecor> {
        FisherSnedecor::new(df1 as f64, df2 as f64)
            .map_err(|e| anyhow!("Invalid F distribution ({}, {}): {}", df1, df2, e))
    }

    fn chi_squared(df: usize) -> anyhow::Result<ChiSquared> {
        ChiSquared::new(df as f64)
            .map_err(|e| anyhow!("Invalid chi-square distribution ({}): {}", df, e))
    }
}

impl DistributionCdf for StatrsCdf {
    fn f_cdf(&self, statistic: f64, df1: usize, df2: usize) -> anyhow::Result<f64> {
        Ok(Self::fisher(df1, df2)?.cdf(statistic))
    }

    fn f_sf(&self, statistic: f64, df1: usize, df2: usize) -> anyhow::Result<f64> {
        Ok(Self::fisher(df1, df2)?.sf(statistic))
    }

    fn chi_square_cdf(&self, statistic: f64, df: usize) -> anyhow::Result<f64> {
        Ok(Self::chi_squared(df)?.cdf(statistic))
    }

    fn chi_square_sf(&self, statistic: f64, df: usize) -> anyhow::Result<f64> {
        Ok(Self::chi_squared(df)?.sf(statistic))
    }
}
