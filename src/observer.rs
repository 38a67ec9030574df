//! Progress hooks for watching a search unfold, e.g. to paint discovered tiles.
//!
//! Observers are advisory. The search behaves the same with or without them.
use std::sync::mpsc::Sender;

use crate::{index::Index3, pathfind::PathfinderState};

/// Receives search progress from a [`crate::pathfind::Pathfinder`]. Every method defaults to a no-op.
pub trait PathfindingObserver {
    /// A node was discovered, had its cost improved, or was picked for analysis.
    fn on_node_discovered_or_updated(&mut self, _index: Index3) {}

    /// The per-query working state was reset.
    fn on_query_state_cleared(&mut self) {}

    /// A query finished. `path` is exactly what the caller receives.
    fn on_pathfinding_completed(&mut self, _path: &[Index3]) {}

    /// The pathfinder moved to `state`. Rejected queries never leave `Idle` and report nothing.
    fn on_state_changed(&mut self, _state: PathfinderState) {}
}

/// Owned form of the observer callbacks, for sending across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathfindingEvent {
    NodeDiscoveredOrUpdated(Index3),
    QueryStateCleared,
    PathfindingCompleted(Vec<Index3>),
    StateChanged(PathfinderState),
}

/// Forwards every callback as a [`PathfindingEvent`]. A dropped receiver is ignored.
impl PathfindingObserver for Sender<PathfindingEvent> {
    fn on_node_discovered_or_updated(&mut self, index: Index3) {
        let _ = self.send(PathfindingEvent::NodeDiscoveredOrUpdated(index));
    }

    fn on_query_state_cleared(&mut self) {
        let _ = self.send(PathfindingEvent::QueryStateCleared);
    }

    fn on_pathfinding_completed(&mut self, path: &[Index3]) {
        let _ = self.send(PathfindingEvent::PathfindingCompleted(path.to_vec()));
    }

    fn on_state_changed(&mut self, state: PathfinderState) {
        let _ = self.send(PathfindingEvent::StateChanged(state));
    }
}

/// Fan-out over a list of observers.
#[derive(Default)]
pub(crate) struct Observers(Vec<Box<dyn PathfindingObserver + Send>>);

impl Observers {
    pub(crate) fn push(&mut self, observer: Box<dyn PathfindingObserver + Send>) {
        self.0.push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn node_discovered_or_updated(&mut self, index: Index3) {
        for observer in self.0.iter_mut() {
            observer.on_node_discovered_or_updated(index);
        }
    }

    pub(crate) fn query_state_cleared(&mut self) {
        for observer in self.0.iter_mut() {
            observer.on_query_state_cleared();
        }
    }

    pub(crate) fn pathfinding_completed(&mut self, path: &[Index3]) {
        for observer in self.0.iter_mut() {
            observer.on_pathfinding_completed(path);
        }
    }

    pub(crate) fn state_changed(&mut self, state: PathfinderState) {
        for observer in self.0.iter_mut() {
            observer.on_state_changed(state);
        }
    }
}
