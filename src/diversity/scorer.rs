//! Concentration scoring over the provider distribution.
//!
//! Uses the Herfindahl-Hirschman index (sum of squared peer shares) over
//! the true per-operator distribution. Folding operators into "Others" is
//! presentation only and never changes the index.

use super::types::{AsAggregation, DiversityScore, ScoreTier};

/// Herfindahl-Hirschman index over a count distribution, in [0,1].
///
/// Returns 0.0 for an empty distribution; callers distinguish that case
/// via [`DiversityScore::NoData`] before interpreting the index.
pub fn herfindahl_index(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    counts
        .iter()
        .map(|&c| {
            let share = c as f64 / total as f64;
            share * share
        })
        .sum()
}

/// Score one aggregation pass.
pub fn score(aggregation: &AsAggregation) -> DiversityScore {
    if aggregation.analyzable_count == 0 {
        return DiversityScore::NoData;
    }

    let counts: Vec<usize> = aggregation.operators.iter().map(|a| a.peer_count).collect();
    let hhi = herfindahl_index(&counts);
    let value = ((1.0 - hhi) * 10.0).clamp(0.0, 10.0);

    DiversityScore::Rated {
        score: value,
        tier: ScoreTier::for_score(value),
        analyzable_peers: aggregation.analyzable_count,
    }
}
