/// Result of a one-way analysis of variance.
///
/// When the engine rounds results, F and the sums/mean squares carry 3 decimal
/// places and the p-value carries 4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaResult {
    pub f_statistic: f64,
    /// Degrees of freedom between groups (`k - 1`).
    pub df_between: usize,
    /// Degrees of freedom within groups (`N - k`).
    pub df_within: usize,
    pub ms_between: f64,
    pub ms_within: f64,
    pub ss_between: f64,
    pub ss_within: f64,
    /// Upper-tail probability of `f_statistic` under F(df_between, df_within).
    pub p_value: f64,
}

/// Result of a rank-based test (Kruskal-Wallis or Friedman).
///
/// When the engine rounds results the statistic carries 4 decimal places; the
/// p-value carries 6 (Kruskal-Wallis) or 5 (Friedman).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    /// Tie-corrected statistic.
    pub statistic: f64,
    pub df: usize,
    pub p_value: f64,
    /// Tie-correction factor the raw statistic was divided by. Exactly 1 without ties.
    pub tie_correction: f64,
}
