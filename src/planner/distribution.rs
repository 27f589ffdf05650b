use std::collections::{HashMap, HashSet};

use crate::models::PatternDistribution;

/// Restrict a distribution to the available patterns and rescale it to 100.
///
/// Unavailable patterns are dropped, not zeroed. If what is left adds up to
/// zero, every remaining pattern gets an equal share. Returns an empty list
/// when no configured pattern is available.
pub fn normalize_distribution(
    distributions: &[PatternDistribution],
    available_ids: &HashSet<&str>,
) -> Vec<PatternDistribution> {
    let available: Vec<&PatternDistribution> = distributions
        .iter()
        .filter(|d| available_ids.contains(d.pattern_id.as_str()))
        .collect();

    if available.is_empty() {
        return Vec::new();
    }

    let total: f64 = available.iter().map(|d| d.percentage).sum();

    if total == 0.0 {
        let equal = 100.0 / available.len() as f64;
        return available
            .into_iter()
            .map(|d| PatternDistribution::new(&d.pattern_id, equal))
            .collect();
    }

    available
        .into_iter()
        .map(|d| PatternDistribution::new(&d.pattern_id, d.percentage / total * 100.0))
        .collect()
}

/// Turn a percentage distribution into whole-day targets over `total_days`.
///
/// Entries with a non-positive share are ignored. Targets are rounded in
/// descending-percentage order and the rounding error is charged to the
/// largest entry, so the targets always add up to `total_days`.
pub fn calculate_pattern_occurrences(
    distributions: &[PatternDistribution],
    total_days: u32,
) -> HashMap<String, i64> {
    let mut active: Vec<&PatternDistribution> =
        distributions.iter().filter(|d| d.percentage > 0.0).collect();

    if active.is_empty() {
        return HashMap::new();
    }

    // Stable sort keeps configuration order among equal percentages.
    active.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let days = i64::from(total_days);
    let mut occurrences = HashMap::new();
    let mut assigned: i64 = 0;

    for dist in &active {
        let target = (dist.percentage / 100.0 * days as f64).round() as i64;
        *occurrences.entry(dist.pattern_id.clone()).or_insert(0) += target;
        assigned += target;
    }

    if assigned != days {
        let main = &active[0].pattern_id;
        *occurrences.entry(main.clone()).or_insert(0) += days - assigned;
    }

    occurrences
}
