use anyhow::bail;

use crate::HypothesisTestError;

pub(crate) fn validate_group_count(found: usize) -> anyhow::Result<()> {
    if found < 2 {
        bail!(HypothesisTestError::InsufficientGroups { found });
    }
    Ok(())
}

/// Checks a sample set of independent groups and returns the total observation count.
pub(crate) fn validate_groups(groups: &[&[f64]]) -> anyhow::Result<usize> {
    validate_group_count(groups.len())?;
    if let Some(index) = groups.iter().position(|g| g.is_empty()) {
        bail!(HypothesisTestError::EmptySample { index });
    }
    Ok(groups.iter().map(|g| g.len()).sum())
}
