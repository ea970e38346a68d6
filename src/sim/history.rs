// src/sim/history.rs

use super::persistence::{CellSnapshot, SnapshotStore};
use crate::math::{optimization::CheckpointSink, point_distribution::CellArray};
use bevy::prelude::*;
use std::collections::VecDeque;

/// Begrenzter Verlauf der Checkpoints im Speicher; der älteste fällt heraus.
#[derive(Resource, Debug)]
pub struct CheckpointHistory {
    pub snapshots: VecDeque<CellSnapshot>,
    pub max_size: usize,
}

impl CheckpointHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    pub fn add_snapshot(&mut self, snapshot: CellSnapshot) {
        if self.max_size == 0 {
            return;
        }
        if self.snapshots.len() == self.max_size {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn get_snapshot_by_index(&self, index: usize) -> Option<&CellSnapshot> {
        self.snapshots.get(index)
    }

    pub fn latest(&self) -> Option<&CellSnapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Index des jüngsten Snapshots nach der äußeren Iteration `iteration`.
    pub fn find_by_iteration(&self, iteration: usize) -> Option<usize> {
        self.snapshots
            .iter()
            .rposition(|snapshot| snapshot.iteration == iteration)
    }
}

impl Default for CheckpointHistory {
    fn default() -> Self {
        Self::new(200)
    }
}

/// Schreibt jeden Checkpoint auf die Platte und in den Verlauf.
pub struct Checkpointer<'a> {
    pub store: &'a mut SnapshotStore,
    pub history: &'a mut CheckpointHistory,
}

impl CheckpointSink for Checkpointer<'_> {
    fn checkpoint(&mut self, iteration: usize, cells: &CellArray) {
        let snapshot = CellSnapshot::from_cells(iteration, cells);
        match self.store.save(&snapshot) {
            Ok(paths) => info!("Data saved to file: {}", paths.centres.display()),
            Err(e) => warn!("Checkpoint {} not written: {}", iteration, e),
        }
        self.history.add_snapshot(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(iteration: usize) -> CellSnapshot {
        CellSnapshot {
            iteration,
            coordinates: vec![iteration as f64, 0.0],
            radii: vec![0.5],
        }
    }

    #[test]
    fn test_oldest_snapshot_is_dropped() {
        let mut history = CheckpointHistory::new(3);
        for i in 0..5 {
            history.add_snapshot(snapshot(i));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.get_snapshot_by_index(0).unwrap().iteration, 2);
        assert_eq!(history.latest().unwrap().iteration, 4);
        assert_eq!(history.find_by_iteration(3), Some(1));
        assert_eq!(history.find_by_iteration(1), None);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = CheckpointHistory::new(0);
        history.add_snapshot(snapshot(1));
        assert!(history.is_empty());
    }
}
