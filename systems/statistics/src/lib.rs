#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session statistics derived purely from world events.

use castle_defence_core::{Event, StatsReport};

/// Pure system that folds world events into a running [`StatsReport`].
#[derive(Debug, Default)]
pub struct Statistics {
    report: StatsReport,
}

impl Statistics {
    /// Creates a statistics system with an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies kills, leaks, spending and damage carried by `events`.
    ///
    /// Rejected placements and upgrades never reach the tally since the world
    /// only reports the cost of requests it accepted.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyKilled { kind, .. } => {
                    *self.report.kills_by_kind.entry(*kind).or_insert(0) += 1;
                }
                Event::EnemyLeaked { .. } => {
                    self.report.leaks = self.report.leaks.saturating_add(1);
                }
                Event::TurretPlaced { cost, .. } | Event::TurretUpgraded { cost, .. } => {
                    self.report.currency_spent += u64::from(*cost);
                }
                Event::EnemyDamaged { amount, .. } => {
                    self.report.damage_dealt += f64::from(*amount);
                }
                _ => {}
            }
        }
    }

    /// Report accumulated so far.
    #[must_use]
    pub fn report(&self) -> &StatsReport {
        &self.report
    }

    /// Discards every tally.
    pub fn reset(&mut self) {
        self.report = StatsReport::default();
    }
}
