//! The reasoning cycle.

use std::sync::atomic::Ordering;

use rayon::prelude::*;

use crate::trigger::Trigger;

use super::Agent;

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Number of this cycle, starting at 1.
    pub cycle: u64,
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// The agent slept through this cycle.
    pub sleeping: bool,
}

impl Agent {
    /// Run one cycle: count down a sleep, otherwise drain the queued triggers and
    /// dispatch them all in parallel. Triggers raised meanwhile wait for the
    /// next cycle.
    pub fn cycle(&self) -> CycleSummary {
        let cycle = self.cycle.fetch_add(1, Ordering::Relaxed) + 1;
        if self.tick_sleep() {
            tracing::trace!(agent = %self.config.name, cycle, "sleeping");
            return CycleSummary {
                cycle,
                sleeping: true,
                ..CycleSummary::default()
            };
        }

        let triggers = self.drain_pending();
        let outcomes: Vec<bool> = self.pool.install(|| {
            triggers
                .par_iter()
                .map(|trigger| match self.dispatch(trigger, 0) {
                    Ok((result, _)) => self.fuzzy.is_success(&result),
                    Err(error) => {
                        tracing::warn!(error = %error, trigger = %trigger, "dispatch faulted");
                        false
                    }
                })
                .collect()
        });

        let succeeded = outcomes.iter().filter(|ok| **ok).count();
        let summary = CycleSummary {
            cycle,
            dispatched: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            sleeping: false,
        };
        tracing::debug!(
            agent = %self.config.name,
            cycle,
            dispatched = summary.dispatched,
            succeeded = summary.succeeded,
            "cycle finished"
        );
        summary
    }

    fn drain_pending(&self) -> Vec<Trigger> {
        let keys: Vec<u64> = self.pending.iter().map(|entry| *entry.key()).collect();
        keys.into_iter()
            .filter_map(|key| self.pending.remove(&key).map(|(_, trigger)| trigger))
            .collect()
    }
}
