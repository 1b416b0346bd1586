use std::cmp::Ordering;

/// Converts a sequence of ranking keys into mid-ranks and reports the tie statistic
/// used by the rank-test correction factors.
///
/// Keys are ranked as given. Callers decide whether a key is the signed observation
/// or its magnitude. Input order does not matter.
pub trait RankTransform: Send + Sync {
    /// Maps every distinct key to its rank (1-based, ties share the mean position).
    fn calculate_ranks(&self, keys: &[f64]) -> RankTable;

    /// Σ (t³ − t) over every group of `t` equal keys.
    fn sum_of_tied_pairs(&self, keys: &[f64]) -> f64;
}

/// Lookup table from a ranking key to its rank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankTable {
    keys: Vec<f64>,
    ranks: Vec<f64>,
}

impl RankTable {
    /// Builds a table from `(key, rank)` pairs. Pairs are sorted by key; duplicate
    /// keys keep the first rank seen.
    pub fn from_pairs(mut pairs: Vec<(f64, f64)>) -> Self {
        pairs.sort_by(|a, b| total_key_cmp(a.0, b.0));
        pairs.dedup_by(|later, earlier| total_key_cmp(later.0, earlier.0) == Ordering::Equal);
        let (keys, ranks) = pairs.into_iter().unzip();
        Self { keys, ranks }
    }

    pub fn rank_of(&self, key: f64) -> Option<f64> {
        self.keys
            .binary_search_by(|probe| total_key_cmp(*probe, key))
            .ok()
            .map(|idx| self.ranks[idx])
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Standard mid-rank assignment: tied keys receive the average of the positions they occupy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidRank;

impl RankTransform for MidRank {
    fn calculate_ranks(&self, keys: &[f64]) -> RankTable {
        let sorted = sorted_keys(keys);
        let mut table = RankTable::default();
        for_each_tie_run(&sorted, |start, end| {
            // positions start+1 ..= end share their mean
            table.keys.push(sorted[start]);
            table.ranks.push((start + 1 + end) as f64 / 2.0);
        });
        table
    }

    fn sum_of_tied_pairs(&self, keys: &[f64]) -> f64 {
        let sorted = sorted_keys(keys);
        let mut total = 0.0;
        for_each_tie_run(&sorted, |start, end| {
            let t = (end - start) as f64;
            total += t * t * t - t;
        });
        total
    }
}

/// Tie-correction factor `C = 1 − tie_sum / denominator`.
///
/// Equals 1 when there are no ties; shrinks towards 0 as more observations tie.
pub fn tie_correction_factor(tie_sum: f64, denominator: f64) -> f64 {
    1.0 - tie_sum / denominator
}

// -0.0 and 0.0 must land on the same key
fn normalize_key(key: f64) -> f64 {
    key + 0.0
}

fn total_key_cmp(a: f64, b: f64) -> Ordering {
    normalize_key(a).total_cmp(&normalize_key(b))
}

fn sorted_keys(keys: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = keys.iter().map(|&k| normalize_key(k)).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

// Calls `f(start, end)` for every maximal run `sorted[start..end]` of equal keys.
fn for_each_tie_run(sorted: &[f64], mut f: impl FnMut(usize, usize)) {
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start + 1;
        while end < sorted.len() && total_key_cmp(sorted[end], sorted[start]) == Ordering::Equal {
            end += 1;
        }
        f(start, end);
        start = end;
    }
}
