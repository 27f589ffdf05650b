use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Ingredient;
use crate::planner::constants::SELECTION_POOL_FACTOR;
use crate::state::UsageCounter;

/// Repetition policy applied when picking ingredients.
#[derive(Debug, Clone, Copy)]
pub struct RepetitionLimit {
    pub enabled: bool,
    pub max_per_horizon: u32,
}

impl RepetitionLimit {
    pub fn off() -> Self {
        Self {
            enabled: false,
            max_per_horizon: 0,
        }
    }
}

/// Pick `quantity` ingredients, favoring the least used.
///
/// Candidates are ordered by usage (stable, so library order breaks ties).
/// With the repetition limit on, candidates at or above the cap are dropped
/// unless that would leave nothing. A pool of the `SELECTION_POOL_FACTOR * quantity`
/// least used is then shuffled and the first `quantity` returned.
pub fn select_least_used<'a, R: Rng + ?Sized>(
    candidates: &[&'a Ingredient],
    quantity: u32,
    usage: &UsageCounter,
    limit: RepetitionLimit,
    rng: &mut R,
) -> Vec<&'a Ingredient> {
    let mut sorted: Vec<&Ingredient> = candidates.to_vec();
    sorted.sort_by_key(|i| usage.get(&i.id));

    let pool_source = if limit.enabled {
        let under_cap: Vec<&Ingredient> = sorted
            .iter()
            .copied()
            .filter(|i| usage.get(&i.id) < limit.max_per_horizon)
            .collect();
        if under_cap.is_empty() {
            sorted
        } else {
            under_cap
        }
    } else {
        sorted
    };

    let quantity = quantity as usize;
    if pool_source.len() <= quantity {
        return pool_source;
    }

    let pool_size = (quantity * SELECTION_POOL_FACTOR).min(pool_source.len());
    let mut pool = pool_source[..pool_size].to_vec();
    pool.shuffle(rng);
    pool.truncate(quantity);
    pool
}
