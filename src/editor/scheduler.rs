// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Deferred layout passes
//!
//! After a load the editor waits for the renderer to measure nodes, then
//! arranges, then zooms. Passes are tagged with the load generation that
//! scheduled them so a newer load drops them.

use std::time::Instant;

/// Kind of deferred pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Arrange,
    Zoom,
}

#[derive(Debug, Clone)]
struct ScheduledPass {
    kind: PassKind,
    generation: u64,
    due: Instant,
}

/// Queue of pending layout passes, ordered by due time
#[derive(Debug, Clone, Default)]
pub struct LayoutScheduler {
    pending: Vec<ScheduledPass>,
}

impl LayoutScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a pass; a pending pass of the same kind is replaced
    pub fn schedule(&mut self, kind: PassKind, generation: u64, due: Instant) {
        self.pending.retain(|p| p.kind != kind);
        self.pending.push(ScheduledPass {
            kind,
            generation,
            due,
        });
        self.pending.sort_by_key(|p| p.due);
    }

    /// Remove and return passes due at `now`, oldest first
    ///
    /// Passes scheduled by an older generation are dropped.
    pub fn take_due(&mut self, now: Instant, generation: u64) -> Vec<PassKind> {
        let mut due = Vec::new();
        self.pending.retain(|p| {
            if p.generation != generation {
                tracing::debug!("Dropping {:?} pass from load #{}", p.kind, p.generation);
                return false;
            }
            if p.due <= now {
                due.push(p.kind);
                return false;
            }
            true
        });
        due
    }

    /// When the next pass falls due
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.first().map(|p| p.due)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_passes_fire_in_order() {
        let start = Instant::now();
        let mut scheduler = LayoutScheduler::new();
        scheduler.schedule(PassKind::Zoom, 1, start + Duration::from_millis(1300));
        scheduler.schedule(PassKind::Arrange, 1, start + Duration::from_millis(300));

        assert_eq!(scheduler.next_due(), Some(start + Duration::from_millis(300)));
        assert!(scheduler.take_due(start, 1).is_empty());
        assert_eq!(
            scheduler.take_due(start + Duration::from_millis(300), 1),
            vec![PassKind::Arrange]
        );
        assert_eq!(
            scheduler.take_due(start + Duration::from_secs(2), 1),
            vec![PassKind::Zoom]
        );
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_stale_generation_dropped() {
        let start = Instant::now();
        let mut scheduler = LayoutScheduler::new();
        scheduler.schedule(PassKind::Arrange, 1, start);

        assert!(scheduler.take_due(start + Duration::from_secs(1), 2).is_empty());
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_reschedule_replaces_pending() {
        let start = Instant::now();
        let mut scheduler = LayoutScheduler::new();
        scheduler.schedule(PassKind::Arrange, 1, start);
        scheduler.schedule(PassKind::Arrange, 1, start + Duration::from_millis(300));

        assert!(scheduler.take_due(start, 1).is_empty());
        assert_eq!(
            scheduler.take_due(start + Duration::from_millis(300), 1),
            vec![PassKind::Arrange]
        );
    }
}
