use std::collections::HashMap;

/// How many times each ingredient has been picked in the current run.
///
/// Owned by exactly one planning run and dropped with it.
#[derive(Debug, Default, Clone)]
pub struct UsageCounter {
    counts: HashMap<String, u32>,
}

impl UsageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Times `id` has been selected so far (0 if never).
    pub fn get(&self, id: &str) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Record one more selection of `id`.
    pub fn record(&mut self, id: &str) {
        *self.counts.entry(id.to_string()).or_insert(0) += 1;
    }
}
