pub mod dedupe;
pub mod merge;

pub use dedupe::*;
pub use merge::*;

use crate::models::CallInsights;

impl CallInsights {
    /// Deduplicate every category independently
    pub fn dedupe(&mut self, config: &DedupConfig) {
        self.map_categories(|_, insights| dedupe(insights, config));
    }

    /// Merge similar insights within every category independently
    pub fn merge_similar(&mut self, config: &MergeConfig) {
        self.map_categories(|_, insights| merge_similar(insights, config));
    }
}
