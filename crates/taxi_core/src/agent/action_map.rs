use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::grid::Coord;

/// Ordered multimap from a cell to the actions to run on reaching it.
///
/// Registering never replaces: a second action for the same cell is appended
/// after the first, so a drop-off and a later pickup on one cell both fire in
/// the order they were registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCoordinateMap {
    entries: BTreeMap<Coord, Vec<Action>>,
}

impl ActionCoordinateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, coord: Coord, action: Action) {
        self.entries.entry(coord).or_default().push(action);
    }

    /// Actions pending at `coord`, in registration order.
    pub fn pending_at(&self, coord: Coord) -> &[Action] {
        self.entries.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove and return everything pending at `coord`.
    pub fn take(&mut self, coord: Coord) -> Vec<Action> {
        self.entries.remove(&coord).unwrap_or_default()
    }

    /// Put actions back at the front of `coord`'s list, ahead of anything
    /// registered since they were taken.
    pub fn restore(&mut self, coord: Coord, mut actions: Vec<Action>) {
        if actions.is_empty() {
            return;
        }
        if let Some(later) = self.entries.remove(&coord) {
            actions.extend(later);
        }
        self.entries.insert(coord, actions);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of pending actions over all cells.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Every pending `(cell, action)`, cells ascending, actions in order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Action)> + '_ {
        self.entries
            .iter()
            .flat_map(|(&coord, actions)| actions.iter().map(move |&action| (coord, action)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_appends_in_order() {
        let mut map = ActionCoordinateMap::new();
        let cell = Coord::new(1, 2);
        map.register(cell, Action::DropOff(0));
        map.register(cell, Action::Pickup);
        map.register(Coord::new(0, 0), Action::DropOff(1));
        assert_eq!(map.pending_at(cell), &[Action::DropOff(0), Action::Pickup]);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn take_then_restore_keeps_deferred_actions_first() {
        let mut map = ActionCoordinateMap::new();
        let cell = Coord::new(0, 1);
        map.register(cell, Action::DropOff(2));
        let taken = map.take(cell);
        assert!(map.pending_at(cell).is_empty());
        map.register(cell, Action::DropOff(3));
        map.restore(cell, taken);
        assert_eq!(map.pending_at(cell), &[Action::DropOff(2), Action::DropOff(3)]);
    }

    #[test]
    fn restoring_nothing_leaves_no_entry() {
        let mut map = ActionCoordinateMap::new();
        map.restore(Coord::new(0, 0), Vec::new());
        assert!(map.is_empty());
    }
}
