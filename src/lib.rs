//! # single-anova
//!
//! Multi-sample hypothesis tests for the single-rust ecosystem: parametric one-way
//! analysis of variance and the rank-based Kruskal-Wallis and Friedman tests.
//!
//! All tests are pure computations over `f64` samples. Ranking and the reference
//! distributions are pluggable through the [`RankTransform`] and [`DistributionCdf`]
//! traits; the defaults are [`MidRank`] and [`StatrsCdf`].
//!
//! ```
//! use single_anova::statistics::one_way_anova;
//!
//! let a = [2.0, 3.0, 4.0];
//! let b = [5.0, 6.0, 7.0];
//! let c = [8.0, 9.0, 10.0];
//! let result = one_way_anova(&[&a, &b, &c]).unwrap();
//! assert_eq!(result.f_statistic, 27.0);
//! ```
//!
//! ## Ranking convention
//!
//! Both rank tests rank observations by magnitude (`|x|`) by default, so `-2.0` and
//! `2.0` tie. Use [`RankingMode::Signed`] through [`HypothesisTestEngineBuilder`] to
//! rank by signed value instead.

pub mod distribution;
mod error;
pub mod rank;
pub mod statistics;
mod utils;

pub use distribution::{DistributionCdf, StatrsCdf};
pub use error::HypothesisTestError;
pub use rank::{MidRank, RankTable, RankTransform};
pub use statistics::{
    AnovaResult, HypothesisTestEngine, HypothesisTestEngineBuilder, RankingMode,
    RepeatedMeasuresDesign, TestResult,
};
pub use utils::{mean, round_to};
